//! Tweet service
//!
//! Creating tweets and toggling likes.

use std::sync::Arc;

use crate::config::FeedConfig;
use crate::data::{Database, EntityId, TweetRow, now_timestamp};
use crate::error::AppError;
use crate::metrics::{LIKE_TOGGLES_TOTAL, TWEETS_CREATED_TOTAL, toggle_direction};

/// Tweet service
pub struct TweetService {
    db: Arc<Database>,
    max_length: usize,
}

impl TweetService {
    /// Create new tweet service
    pub fn new(db: Arc<Database>, feed: &FeedConfig) -> Self {
        Self {
            db,
            max_length: feed.max_tweet_length,
        }
    }

    /// Create a tweet authored by `user_id`
    ///
    /// Content is stored as written; it must not be blank and must fit
    /// `max_tweet_length` characters.
    ///
    /// # Returns
    /// The stored tweet as its author sees it
    pub async fn create(&self, user_id: &str, content: String) -> Result<TweetRow, AppError> {
        if content.trim().is_empty() {
            return Err(AppError::Validation(
                "Tweet content must not be empty".to_string(),
            ));
        }
        let length = content.chars().count();
        if length > self.max_length {
            return Err(AppError::Validation(format!(
                "Tweet content must be at most {} characters (got {})",
                self.max_length, length
            )));
        }

        let id = EntityId::new().0;
        self.db
            .insert_tweet(&id, user_id, &content, &now_timestamp())
            .await?;
        TWEETS_CREATED_TOTAL.inc();

        tracing::info!(tweet_id = %id, user_id = %user_id, "Tweet created");

        self.db
            .get_tweet(&id, Some(user_id))
            .await?
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("created tweet {id} not found")))
    }

    /// Flip the like relation between `user_id` and `tweet_id`
    ///
    /// # Returns
    /// `true` if a like was added
    ///
    /// # Errors
    /// `NotFound` if the tweet does not exist
    pub async fn toggle_like(&self, user_id: &str, tweet_id: &str) -> Result<bool, AppError> {
        if !self.db.tweet_exists(tweet_id).await? {
            return Err(AppError::NotFound);
        }

        let added_like = self.db.toggle_like(user_id, tweet_id).await?;
        LIKE_TOGGLES_TOTAL
            .with_label_values(&[toggle_direction(added_like)])
            .inc();

        tracing::info!(tweet_id = %tweet_id, user_id = %user_id, added_like, "Like toggled");
        Ok(added_like)
    }
}
