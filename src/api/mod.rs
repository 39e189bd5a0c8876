//! API layer
//!
//! HTTP handlers for:
//! - Feed, tweet and profile procedures
//! - Session lookup
//! - Metrics (Prometheus)

mod converters;
mod dto;
mod feed;
pub mod metrics;
mod profiles;
mod session;
mod tweets;

pub use dto::*;
pub use metrics::metrics_router;

use axum::{
    Router,
    routing::{get, post},
};

use crate::AppState;

/// Create the remote procedure router (mounted under `/api`)
///
/// Reads accept anonymous viewers; mutations require a session.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/session", get(session::get_session))
        .route("/feed", get(feed::global_feed))
        .route("/feed/following", get(feed::following_feed))
        .route("/tweets", post(tweets::create_tweet))
        .route("/tweets/:id/like", post(tweets::toggle_like))
        .route("/profiles/:id", get(profiles::get_profile))
        .route("/profiles/:id/feed", get(feed::profile_feed))
        .route("/profiles/:id/follow", post(profiles::toggle_follow))
}
