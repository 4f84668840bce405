use std::sync::{Arc, Mutex};

use axum::{Router, extract::Query, routing::get};
use colored::*;
use maud::{DOCTYPE, Markup, PreEscaped, html};

use crate::models::CallbackParams;

const CALLBACK_PORT: u16 = 8080;

type TokenStore = Arc<Mutex<Option<Result<String, String>>>>;

/// Opens the Supabase sign-in page and waits for the redirect to hand the
/// access token to a local callback server.
pub async fn authenticate(supabase_url: &str, provider: &str) -> anyhow::Result<String> {
    let token_store: TokenStore = Arc::new(Mutex::new(None));
    let token_store_clone = token_store.clone();

    let app = Router::new().route(
        "/callback",
        get(move |query: Query<CallbackParams>| callback_handler(query, token_store_clone.clone())),
    );

    let listener = tokio::net::TcpListener::bind(format!("127.0.0.1:{}", CALLBACK_PORT)).await?;
    println!(
        "{}",
        format!("🔓 Local callback server started on port {}", CALLBACK_PORT).cyan()
    );

    let server_handle = tokio::spawn(async move { axum::serve(listener, app).await });

    let auth_url = format!(
        "{}/auth/v1/authorize?provider={}&redirect_to=http://localhost:{}/callback",
        supabase_url.trim_end_matches('/'),
        provider,
        CALLBACK_PORT
    );

    println!("{}", format!("Opening browser for {provider} login...").yellow());
    if let Err(e) = webbrowser::open(&auth_url) {
        eprintln!("{} {}", "⚠️  Could not open browser automatically:".yellow(), e);
        println!("{}", "Please open this URL manually:".bright_white().bold());
        println!("{}", auth_url.bright_blue().underline());
    }

    let timeout = tokio::time::Duration::from_secs(120);
    let start = tokio::time::Instant::now();

    loop {
        tokio::time::sleep(tokio::time::Duration::from_millis(500)).await;

        let outcome = match token_store.lock() {
            Ok(mut store) => store.take(),
            Err(_) => Some(Err("token store poisoned".to_string())),
        };

        if let Some(outcome) = outcome {
            server_handle.abort();
            return outcome.map_err(|e| anyhow::anyhow!(e));
        }

        if start.elapsed() > timeout {
            server_handle.abort();
            anyhow::bail!("Authentication timeout (2 minutes)");
        }
    }
}

async fn callback_handler(Query(params): Query<CallbackParams>, token_store: TokenStore) -> Markup {
    let outcome = match (params.access_token, params.error) {
        (_, Some(error)) => Some(Err(error)),
        (Some(token), None) => Some(Ok(token)),
        // Supabase puts the token in the URL fragment; the page below posts it back.
        (None, None) => None,
    };

    let markup = match &outcome {
        Some(Err(error)) => page("❌ Authentication Failed", error, None),
        Some(Ok(_)) => page("✅ Signed in", "You can close this window.", None),
        None => page("Signing in…", "Finishing up.", Some(FRAGMENT_SCRIPT)),
    };

    if outcome.is_some() {
        if let Ok(mut store) = token_store.lock() {
            *store = outcome;
        }
    }

    markup
}

const FRAGMENT_SCRIPT: &str = r#"
    const params = new URLSearchParams(window.location.hash.substring(1));
    const token = params.get('access_token');
    const error = params.get('error_description') || params.get('error');
    const query = token
        ? 'access_token=' + encodeURIComponent(token)
        : 'error=' + encodeURIComponent(error || 'No token found');
    window.location.replace('/callback?' + query);
"#;

fn page(title: &str, message: &str, script: Option<&'static str>) -> Markup {
    html! {
        (DOCTYPE)
        html {
            head {
                title { "DealFeed" }
                style { "body { font-family: Arial, sans-serif; text-align: center; margin-top: 20vh; }" }
            }
            body {
                h1 { (title) }
                p { (message) }
                @if let Some(script) = script {
                    script { (PreEscaped(script)) }
                }
            }
        }
    }
}
