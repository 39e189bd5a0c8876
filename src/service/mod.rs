//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate database reads and the toggle mutations.

mod feed;
mod profile;
mod tweet;

pub use feed::{FeedService, FeedWindow};
pub use profile::ProfileService;
pub use tweet::TweetService;
