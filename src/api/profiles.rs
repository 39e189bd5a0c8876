//! Profile endpoints
//!
//! `profile.getById` and `profile.toggleFollow`.

use axum::{
    extract::{Path, State},
    response::Json,
};

use super::dto::{Profile, ToggleFollowResponse};
use crate::AppState;
use crate::auth::{CurrentUser, MaybeUser};
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::ProfileService;

/// GET /api/profiles/:id
pub async fn get_profile(
    State(state): State<AppState>,
    viewer: MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Profile>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["GET", "/api/profiles/:id"])
        .start_timer();

    let profile = ProfileService::new(state.db.clone())
        .get(&id, viewer.user_id())
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["GET", "/api/profiles/:id", "200"])
        .inc();

    Ok(Json(profile.into()))
}

/// POST /api/profiles/:id/follow
///
/// Flips whether the viewer follows the profile.
pub async fn toggle_follow(
    State(state): State<AppState>,
    CurrentUser(session): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<ToggleFollowResponse>, AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/api/profiles/:id/follow"])
        .start_timer();

    let added_follow = ProfileService::new(state.db.clone())
        .toggle_follow(&session.user_id, &id)
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/api/profiles/:id/follow", "200"])
        .inc();

    Ok(Json(ToggleFollowResponse { added_follow }))
}
