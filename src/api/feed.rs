//! Feed endpoints
//!
//! `feed.list`, `feed.listFollowing` and `feed.listByProfile`.

use axum::{
    extract::{Path, Query, State},
    response::Json,
};

use super::dto::{FeedPage, FeedParams, FeedSelector};
use crate::AppState;
use crate::auth::MaybeUser;
use crate::error::AppError;
use crate::metrics::{
    DB_QUERIES_TOTAL, DB_QUERY_DURATION_SECONDS, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL,
};
use crate::service::FeedService;

/// GET /api/feed
pub async fn global_feed(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, AppError> {
    load_page(&state, FeedSelector::Global, &viewer, params, "/api/feed").await
}

/// GET /api/feed/following
pub async fn following_feed(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, AppError> {
    load_page(
        &state,
        FeedSelector::Following,
        &viewer,
        params,
        "/api/feed/following",
    )
    .await
}

/// GET /api/profiles/:id/feed
pub async fn profile_feed(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
    Query(params): Query<FeedParams>,
) -> Result<Json<FeedPage>, AppError> {
    load_page(
        &state,
        FeedSelector::Profile(id),
        &viewer,
        params,
        "/api/profiles/:id/feed",
    )
    .await
}

async fn load_page(
    state: &AppState,
    selector: FeedSelector,
    viewer: &MaybeUser,
    params: FeedParams,
    endpoint: &str,
) -> Result<Json<FeedPage>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", endpoint])
        .start_timer();

    let limit = state.config.feed.page_size(params.limit);
    let feed_service = FeedService::new(state.db.clone());

    let db_timer = DB_QUERY_DURATION_SECONDS
        .with_label_values(&["SELECT", "tweets"])
        .start_timer();
    let window = feed_service
        .page(&selector, viewer.user_id(), params.cursor.as_deref(), limit)
        .await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "tweets"])
        .inc();
    db_timer.observe_duration();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", endpoint, "200"])
        .inc();

    Ok(Json(window.into()))
}
