//! Profile page model

use super::cache::ClientCache;
use super::error::ClientError;
use super::remote::FeedApi;
use crate::api::{Profile, SessionResponse};

/// What the profile route renders
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfilePage {
    /// 404 page
    NotFound,
    Found(ProfileHeader),
}

/// Header above a profile's feed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileHeader {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    /// e.g. "1 Tweet - 10 Followers - 2 Following"
    pub summary: String,
    /// Hidden on the viewer's own profile and for anonymous viewers
    pub follow_button: Option<FollowButton>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowButton {
    /// "Follow" or "Unfollow"
    pub label: &'static str,
    /// Disabled while the follow toggle is pending
    pub disabled: bool,
}

/// English singular or plural form for `count`
fn plural(count: u64, singular: &str, plural: &str) -> String {
    if count == 1 {
        format!("{count} {singular}")
    } else {
        format!("{count} {plural}")
    }
}

impl ProfilePage {
    /// Build the page from a `profile.getById` result
    ///
    /// A missing profile, or one without a display name, renders as
    /// [`ProfilePage::NotFound`].
    pub fn from_query(
        profile: Option<&Profile>,
        viewer: Option<&SessionResponse>,
        follow_pending: bool,
    ) -> Self {
        let Some(profile) = profile else {
            return Self::NotFound;
        };
        let Some(name) = profile.name.clone() else {
            return Self::NotFound;
        };

        let summary = format!(
            "{} - {} - {} Following",
            plural(profile.tweets_count, "Tweet", "Tweets"),
            plural(profile.followers_count, "Follower", "Followers"),
            profile.follows_count,
        );

        let follow_button = viewer
            .filter(|session| session.user_id != profile.id)
            .map(|_| FollowButton {
                label: if profile.is_following {
                    "Unfollow"
                } else {
                    "Follow"
                },
                disabled: follow_pending,
            });

        Self::Found(ProfileHeader {
            id: profile.id.clone(),
            name,
            image: profile.image.clone(),
            summary,
            follow_button,
        })
    }
}

/// Fetch a profile into the cache
///
/// # Returns
/// `None` if the server does not know the profile; any stale cache entry is
/// dropped in that case
pub async fn load_profile(
    api: &dyn FeedApi,
    cache: &ClientCache,
    profile_id: &str,
) -> Result<Option<Profile>, ClientError> {
    match api.get_profile(profile_id.to_string()).await {
        Ok(profile) => {
            cache.profiles.set(profile_id.to_string(), profile.clone());
            Ok(Some(profile))
        }
        Err(ClientError::NotFound) => {
            cache.profiles.invalidate(&profile_id.to_string());
            Ok(None)
        }
        Err(error) => Err(error),
    }
}
