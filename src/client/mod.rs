//! Feed client core
//!
//! Framework-independent client for the remote procedures in [`crate::api`]:
//!
//! - [`cache`]: explicit keyed query cache shared by every view
//! - [`feed`]: cursor-paginated feed queries
//! - [`list`]: infinite list view model and scroll gating
//! - [`mutation`]: like/follow/create calls with post-success cache patches
//! - [`composer`] and [`profile`]: tweet composer and profile page models
//! - [`remote`]: the `FeedApi` transport trait and its HTTP implementation
//!
//! The cache is only ever patched after a remote call succeeded, so a failed
//! mutation leaves every view exactly as it was.

pub mod cache;
pub mod composer;
mod error;
pub mod feed;
pub mod list;
pub mod mutation;
pub mod profile;
pub mod remote;

pub use cache::{ClientCache, FeedKey, InfiniteData, QueryCache};
pub use composer::TweetComposer;
pub use error::ClientError;
pub use feed::{FeedQuery, FeedState, FetchOutcome, pages};
pub use list::{HeartButton, InfiniteList, ListView, ScrollPosition, TweetCard};
pub use mutation::{MutationDispatcher, MutationStatus};
pub use profile::{FollowButton, ProfileHeader, ProfilePage, load_profile};
pub use remote::{FeedApi, HttpFeedApi};
