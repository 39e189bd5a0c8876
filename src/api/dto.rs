//! Remote procedure DTOs
//!
//! JSON shapes shared by the HTTP handlers and the feed client.
//! Field names are camelCase on the wire.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which feed a page belongs to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FeedSelector {
    /// Every tweet, newest first
    Global,
    /// Tweets by authors the viewer follows
    Following,
    /// Tweets by one profile
    Profile(String),
}

/// Author summary embedded in each tweet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TweetAuthor {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
}

/// Tweet as seen by one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tweet {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: u64,
    pub liked_by_me: bool,
    pub user: TweetAuthor,
}

/// One page of a feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedPage {
    pub tweets: Vec<Tweet>,
    pub next_cursor: Option<String>,
}

impl FeedPage {
    pub fn has_more(&self) -> bool {
        self.next_cursor.is_some()
    }
}

/// Profile as seen by one viewer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub tweets_count: u64,
    pub followers_count: u64,
    pub follows_count: u64,
    pub is_following: bool,
}

/// Query parameters of every feed procedure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeedParams {
    pub cursor: Option<String>,
    pub limit: Option<usize>,
}

/// `tweet.create` request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTweetRequest {
    pub content: String,
}

/// `tweet.toggleLike` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleLikeResponse {
    pub added_like: bool,
}

/// `profile.toggleFollow` response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToggleFollowResponse {
    pub added_follow: bool,
}

/// Current session as exposed to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub user_id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub expires_at: DateTime<Utc>,
}
