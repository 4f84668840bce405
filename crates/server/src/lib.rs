//! HTTP backend for the deal feed.
//!
//! Deals, comments and vote events live in Postgres when `DATABASE_URL` is set
//! and reachable. Otherwise the server keeps working from the bundled seed
//! collection held in memory. Identity comes from Supabase JWTs; without
//! `SUPABASE_URL` every bearer token maps to a single demo user.

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod store;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::signal;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use auth::Verifier;
use config::Config;
use store::{MemoryStore, PgStore, Store, memory::load_seed};

// ===== App State =====

#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub verifier: Verifier,
}

impl AppState {
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = match &config.database_url {
            Some(url) => match PgStore::connect(url, config.max_connections).await {
                Ok(pg) => {
                    info!("Connected to database");
                    Store::Postgres(pg)
                }
                Err(e) => {
                    warn!("Database unavailable ({e}), serving the fallback collection");
                    fallback(config)?
                }
            },
            None => fallback(config)?,
        };

        let verifier = match config.jwks_url() {
            Some(jwks_url) => Verifier::supabase(&jwks_url),
            None => {
                warn!("SUPABASE_URL not set, accepting any bearer token as the demo user");
                Verifier::Mock
            }
        };

        Ok(Self { store, verifier })
    }
}

fn fallback(config: &Config) -> anyhow::Result<Store> {
    let deals = load_seed(config.seed_path.as_deref())?;
    info!("Loaded {} fallback deals", deals.len());
    Ok(Store::Memory(MemoryStore::new(deals)))
}

// ===== Router =====

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(routes::root))
        .route("/health", get(routes::health))
        .route("/deals", get(routes::list_deals).post(routes::create_deal))
        .route("/deals/:id", get(routes::get_deal))
        .route("/deals/:id/vote", post(routes::vote_deal))
        .route(
            "/deals/:id/comments",
            get(routes::list_comments).post(routes::create_comment),
        )
        .route("/comments/:id/vote", post(routes::vote_comment))
        .route("/categories", get(routes::categories))
        .route("/me", get(routes::me))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
