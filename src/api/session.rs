//! Session endpoint

use axum::response::Json;

use super::dto::SessionResponse;
use crate::auth::MaybeUser;

/// GET /api/auth/session
///
/// Returns the verified session, or `null` for anonymous viewers.
pub async fn get_session(MaybeUser(session): MaybeUser) -> Json<Option<SessionResponse>> {
    Json(session.map(SessionResponse::from))
}
