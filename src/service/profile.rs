//! Profile service
//!
//! Profile lookup and follow toggling.

use std::sync::Arc;

use crate::data::{Database, ProfileRow};
use crate::error::AppError;
use crate::metrics::{FOLLOW_TOGGLES_TOTAL, toggle_direction};

/// Profile service
pub struct ProfileService {
    db: Arc<Database>,
}

impl ProfileService {
    /// Create new profile service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Get a profile as seen by `viewer_id`
    ///
    /// # Errors
    /// `NotFound` if no user has this ID
    pub async fn get(&self, id: &str, viewer_id: Option<&str>) -> Result<ProfileRow, AppError> {
        self.db
            .get_profile(id, viewer_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Flip the follow relation `follower_id -> profile_id`
    ///
    /// # Returns
    /// `true` if a follow was added
    ///
    /// # Errors
    /// `Validation` when following oneself, `NotFound` for unknown profiles
    pub async fn toggle_follow(
        &self,
        follower_id: &str,
        profile_id: &str,
    ) -> Result<bool, AppError> {
        if follower_id == profile_id {
            return Err(AppError::Validation(
                "You cannot follow yourself".to_string(),
            ));
        }
        if self.db.get_user(profile_id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let added_follow = self.db.toggle_follow(follower_id, profile_id).await?;
        FOLLOW_TOGGLES_TOTAL
            .with_label_values(&[toggle_direction(added_follow)])
            .inc();

        tracing::info!(
            follower_id = %follower_id,
            profile_id = %profile_id,
            added_follow,
            "Follow toggled"
        );
        Ok(added_follow)
    }
}
