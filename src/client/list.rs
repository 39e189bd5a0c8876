//! Infinite list view model
//!
//! Turns a [`FeedState`] into what the list shows, and decides when
//! scrolling should request the next page.

use std::collections::HashSet;

use super::error::ClientError;
use super::feed::{FeedQuery, FeedState, FetchOutcome};
use crate::api::Tweet;
use crate::config::ClientConfig;

/// Default distance from the end of the list that triggers the next page
pub const DEFAULT_SCROLL_THRESHOLD_PX: u32 = 250;

/// Message shown when the feed failed to load
pub const ERROR_MESSAGE: &str = "Error...";

/// Message shown for a feed without tweets
pub const EMPTY_MESSAGE: &str = "No Tweets";

/// What the list renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListView {
    /// Initial page pending; only a spinner
    Loading,
    /// The last fetch failed
    Error { message: &'static str },
    /// The feed has no tweets
    Empty { message: &'static str },
    /// One card per tweet, plus a trailing spinner while more pages exist
    Items {
        cards: Vec<TweetCard>,
        trailing_loader: bool,
    },
}

/// One rendered tweet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetCard {
    pub id: String,
    pub author_id: String,
    pub author_name: Option<String>,
    pub author_image: Option<String>,
    /// Link to the author's profile page
    pub profile_href: String,
    /// Short date, e.g. "1/5/24"
    pub date: String,
    pub content: String,
    pub heart: HeartButton,
}

/// Like button of a tweet card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartButton {
    /// Filled heart
    pub liked: bool,
    pub like_count: u64,
    /// Anonymous viewers see a read-only count
    pub interactive: bool,
    /// Disabled while this tweet's like toggle is pending
    pub disabled: bool,
}

impl TweetCard {
    pub fn new(tweet: &Tweet, authenticated: bool, like_pending: bool) -> Self {
        Self {
            id: tweet.id.clone(),
            author_id: tweet.user.id.clone(),
            author_name: tweet.user.name.clone(),
            author_image: tweet.user.image.clone(),
            profile_href: format!("/profiles/{}", urlencoding::encode(&tweet.user.id)),
            date: tweet.created_at.format("%-m/%-d/%y").to_string(),
            content: tweet.content.clone(),
            heart: HeartButton {
                liked: tweet.liked_by_me,
                like_count: tweet.like_count,
                interactive: authenticated,
                disabled: authenticated && like_pending,
            },
        }
    }
}

/// Build the list view for a feed state
///
/// # Arguments
/// * `state` - Feed snapshot from [`FeedQuery::state`]
/// * `authenticated` - Whether the viewer has a session
/// * `pending_likes` - Tweets whose like toggle is in flight
pub fn render(state: &FeedState, authenticated: bool, pending_likes: &HashSet<String>) -> ListView {
    if state.is_loading {
        return ListView::Loading;
    }
    if state.is_error {
        return ListView::Error {
            message: ERROR_MESSAGE,
        };
    }

    match &state.tweets {
        Some(tweets) if !tweets.is_empty() => ListView::Items {
            cards: tweets
                .iter()
                .map(|tweet| TweetCard::new(tweet, authenticated, pending_likes.contains(&tweet.id)))
                .collect(),
            trailing_loader: state.has_more,
        },
        _ => ListView::Empty {
            message: EMPTY_MESSAGE,
        },
    }
}

/// Viewport position reported by the host on scroll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollPosition {
    /// Distance scrolled from the top
    pub offset: u32,
    /// Visible height
    pub viewport: u32,
    /// Total height of the list content
    pub content: u32,
}

impl ScrollPosition {
    /// Distance between the bottom of the viewport and the end of the list
    pub fn remaining(&self) -> u32 {
        self.content
            .saturating_sub(self.offset.saturating_add(self.viewport))
    }
}

/// Scroll-driven pagination for one feed
pub struct InfiniteList {
    threshold_px: u32,
}

impl Default for InfiniteList {
    fn default() -> Self {
        Self::new(DEFAULT_SCROLL_THRESHOLD_PX)
    }
}

impl InfiniteList {
    pub fn new(threshold_px: u32) -> Self {
        Self { threshold_px }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(config.scroll_threshold_px)
    }

    /// Whether a scroll at `position` should request the next page
    ///
    /// Only near the end of the list, only while more pages exist, and never
    /// while another page request is in flight or the feed is in error.
    pub fn should_fetch_more(&self, state: &FeedState, position: &ScrollPosition) -> bool {
        state.has_more
            && !state.is_loading
            && !state.is_fetching_next
            && !state.is_error
            && position.remaining() <= self.threshold_px
    }

    /// Handle a scroll event
    ///
    /// # Returns
    /// `None` if no fetch was triggered, else what the fetch did
    pub async fn on_scroll(
        &self,
        query: &FeedQuery,
        position: &ScrollPosition,
    ) -> Result<Option<FetchOutcome>, ClientError> {
        if !self.should_fetch_more(&query.state(), position) {
            return Ok(None);
        }
        query.fetch_next().await.map(Some)
    }
}
