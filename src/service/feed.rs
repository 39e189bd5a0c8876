//! Feed service
//!
//! Cursor pagination over the global, following-only and profile feeds.

use std::sync::Arc;

use crate::api::FeedSelector;
use crate::data::{Database, FeedCursor, FeedFilter, TweetRow};
use crate::error::AppError;

/// Feed service
pub struct FeedService {
    db: Arc<Database>,
}

/// One page of a feed, as rows
#[derive(Debug, Clone)]
pub struct FeedWindow {
    pub tweets: Vec<TweetRow>,
    /// Start of the next page, None on the last page
    pub next_cursor: Option<FeedCursor>,
}

impl FeedService {
    /// Create new feed service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Fetch one page of a feed
    ///
    /// Reads `limit + 1` rows; the extra row, if present, becomes the next
    /// cursor and is not returned. Fetching the same cursor twice yields the
    /// same page as long as no tweets were inserted before it.
    ///
    /// # Arguments
    /// * `selector` - Which feed
    /// * `viewer_id` - Viewer for `liked_by_me`; for `Following` an anonymous
    ///   viewer gets the unrestricted feed
    /// * `cursor` - Opaque token from the previous page
    /// * `limit` - Page size (already clamped by the caller)
    pub async fn page(
        &self,
        selector: &FeedSelector,
        viewer_id: Option<&str>,
        cursor: Option<&str>,
        limit: usize,
    ) -> Result<FeedWindow, AppError> {
        let cursor = cursor.map(FeedCursor::decode).transpose()?;
        let filter = feed_filter(selector, viewer_id);

        let mut tweets = self
            .db
            .list_tweets(&filter, viewer_id, cursor.as_ref(), limit + 1)
            .await?;

        let next_cursor = if tweets.len() > limit {
            tweets.pop().map(|row| FeedCursor::at(&row))
        } else {
            None
        };

        tracing::debug!(
            feed = ?selector,
            count = tweets.len(),
            has_more = next_cursor.is_some(),
            "Feed page loaded"
        );

        Ok(FeedWindow {
            tweets,
            next_cursor,
        })
    }
}

fn feed_filter(selector: &FeedSelector, viewer_id: Option<&str>) -> FeedFilter {
    match (selector, viewer_id) {
        (FeedSelector::Global, _) => FeedFilter::All,
        (FeedSelector::Following, Some(viewer_id)) => FeedFilter::FollowedBy(viewer_id.to_string()),
        (FeedSelector::Following, None) => FeedFilter::All,
        (FeedSelector::Profile(profile_id), _) => FeedFilter::Author(profile_id.clone()),
    }
}
