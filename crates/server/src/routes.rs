use std::collections::BTreeMap;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use dealfeed_core::{
    Author, Comment, Deal, NewComment, NewDeal, VoteState, filter_deals, sort_deals,
};
use tracing::info;

use crate::{
    AppState,
    error::AppError,
    models::{CategoryCount, FeedEntry, FeedQuery, MeResponse, VoteRequest, VoteResponse, VotedItem},
    store::{Store, VoteTarget},
};

pub async fn root() -> &'static str {
    "DealFeed Backend (Supabase Auth) - Use /health to check status"
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let store = match (&state.store, state.store.is_healthy().await) {
        (Store::Memory(_), _) => "fallback",
        (_, true) => "connected",
        (_, false) => "disconnected",
    };
    let status = if store == "disconnected" { "error" } else { "ok" };
    let auth = if state.verifier.is_mock() { "mock" } else { "supabase" };

    Json(serde_json::json!({
        "status": status,
        "store": store,
        "auth": auth,
    }))
}

pub async fn list_deals(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<FeedEntry>>, AppError> {
    let viewer = state.verifier.viewer(&headers).await?;

    let deals = state.store.list_deals().await?;
    let filters = query.filters();
    let sort = query.sort.unwrap_or_default();

    let votes = match &viewer {
        Some(user_id) => state.store.deal_votes(user_id).await?,
        None => Default::default(),
    };

    let visible = sort_deals(filter_deals(&deals, &filters), sort);
    let entries = visible
        .into_iter()
        .map(|deal| FeedEntry {
            my_vote: votes.get(&deal.id).copied().unwrap_or_default(),
            deal: deal.clone(),
        })
        .collect();

    Ok(Json(entries))
}

pub async fn get_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<FeedEntry>, AppError> {
    let viewer = state.verifier.viewer(&headers).await?;

    let deal = state
        .store
        .get_deal(&id)
        .await?
        .ok_or(AppError::NotFound("deal"))?;

    let my_vote = match &viewer {
        Some(user_id) => state
            .store
            .deal_votes(user_id)
            .await?
            .remove(&id)
            .unwrap_or_default(),
        None => VoteState::None,
    };

    Ok(Json(FeedEntry { deal, my_vote }))
}

pub async fn create_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(new_deal): Json<NewDeal>,
) -> Result<(StatusCode, Json<Deal>), AppError> {
    let user_id = state.verifier.require(&headers).await?;
    new_deal.validate()?;

    let author = author_for(&state, &user_id).await?;
    let deal = state.store.insert_deal(new_deal, author, &user_id).await?;
    info!("Deal {} posted by {}", deal.id, user_id);

    Ok((StatusCode::CREATED, Json(deal)))
}

pub async fn vote_deal(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(vote_req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    vote(state, headers, VoteTarget::Deal, id, vote_req).await
}

pub async fn vote_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(vote_req): Json<VoteRequest>,
) -> Result<Json<VoteResponse>, AppError> {
    vote(state, headers, VoteTarget::Comment, id, vote_req).await
}

async fn vote(
    state: AppState,
    headers: HeaderMap,
    target: VoteTarget,
    id: String,
    vote_req: VoteRequest,
) -> Result<Json<VoteResponse>, AppError> {
    let user_id = state.verifier.require(&headers).await?;

    let tally = state
        .store
        .record_vote(target, &user_id, &id, vote_req.direction)
        .await?
        .ok_or(match target {
            VoteTarget::Deal => AppError::NotFound("deal"),
            VoteTarget::Comment => AppError::NotFound("comment"),
        })?;

    let item = match target {
        VoteTarget::Deal => VotedItem::Deal(id),
        VoteTarget::Comment => VotedItem::Comment(id),
    };
    Ok(Json(VoteResponse::new(item, tally)))
}

pub async fn list_comments(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<Comment>>, AppError> {
    let comments = state
        .store
        .list_comments(&id)
        .await?
        .ok_or(AppError::NotFound("deal"))?;

    Ok(Json(comments))
}

pub async fn create_comment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(new_comment): Json<NewComment>,
) -> Result<(StatusCode, Json<Comment>), AppError> {
    let user_id = state.verifier.require(&headers).await?;
    new_comment.validate()?;

    let author = author_for(&state, &user_id).await?;
    let comment = state
        .store
        .insert_comment(&id, new_comment, author)
        .await?
        .ok_or(AppError::NotFound("deal"))?;

    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryCount>>, AppError> {
    let deals = state.store.list_deals().await?;

    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for deal in &deals {
        *counts.entry(deal.category.clone()).or_default() += 1;
    }

    Ok(Json(
        counts
            .into_iter()
            .map(|(category, deals)| CategoryCount { category, deals })
            .collect(),
    ))
}

pub async fn me(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<MeResponse>, AppError> {
    let Some(user_id) = state.verifier.viewer(&headers).await? else {
        return Ok(Json(MeResponse {
            authenticated: false,
            user_id: None,
            profile: None,
            role: None,
            can_moderate: false,
        }));
    };

    let profile = state.store.profile(&user_id).await?;
    let role = profile.as_ref().map(|p| p.role).unwrap_or_default();

    Ok(Json(MeResponse {
        authenticated: true,
        user_id: Some(user_id),
        profile,
        role: Some(role),
        can_moderate: role.can_moderate(),
    }))
}

async fn author_for(state: &AppState, user_id: &str) -> Result<Author, AppError> {
    Ok(state
        .store
        .profile(user_id)
        .await?
        .map(|profile| profile.author())
        .unwrap_or_else(Author::guest))
}
