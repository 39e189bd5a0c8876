//! Session authentication
//!
//! Handles:
//! - Signed session tokens (issued by the identity provider)
//! - Current-viewer extractors

mod middleware;
pub mod session;

pub use middleware::{CurrentUser, MaybeUser};
pub use session::{Session, create_session_token, verify_session_token};
