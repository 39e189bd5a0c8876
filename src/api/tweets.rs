//! Tweet endpoints
//!
//! `tweet.create` and `tweet.toggleLike`.

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::dto::{CreateTweetRequest, ToggleLikeResponse, Tweet};
use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::TweetService;

/// POST /api/tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Json(request): Json<CreateTweetRequest>,
) -> Result<Json<Tweet>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/tweets"])
        .start_timer();

    let tweet_service = TweetService::new(state.db.clone(), &state.config.feed);
    let tweet = tweet_service
        .create(&session.user_id, request.content)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/tweets", "200"])
        .inc();

    Ok(Json(tweet.into()))
}

/// POST /api/tweets/:id/like
///
/// Flips the viewer's like on the tweet.
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ToggleLikeResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/tweets/:id/like"])
        .start_timer();

    let tweet_service = TweetService::new(state.db.clone(), &state.config.feed);
    let added_like = tweet_service.toggle_like(&session.user_id, &id).await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/tweets/:id/like", "200"])
        .inc();

    Ok(Json(ToggleLikeResponse { added_like }))
}
