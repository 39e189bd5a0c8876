//! Data models
//!
//! Rust structs representing database rows.
//! All models use ULID for IDs and chrono for timestamps.

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Timestamps
// =============================================================================

/// Current time at the precision stored in the database (microseconds).
pub fn now_timestamp() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 text, so stored timestamps order lexicographically.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Micros, true)
}

// =============================================================================
// Users
// =============================================================================

/// A user known to this instance
///
/// Rows are upserted from verified sessions.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub name: Option<String>,
    /// Avatar URL from the identity provider
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Profile row with aggregate counts, computed for one viewer
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    pub id: String,
    pub name: Option<String>,
    pub image: Option<String>,
    pub tweets_count: i64,
    pub followers_count: i64,
    pub follows_count: i64,
    /// Whether the viewer follows this user (false for anonymous viewers)
    pub is_following: bool,
}

// =============================================================================
// Tweets
// =============================================================================

/// Tweet joined with its author and like aggregates, computed for one viewer
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct TweetRow {
    pub id: String,
    pub user_id: String,
    pub user_name: Option<String>,
    pub user_image: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub like_count: i64,
    pub liked_by_me: bool,
}

/// Which tweets a feed query selects
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedFilter {
    /// Every tweet
    All,
    /// Tweets whose author is followed by this user
    FollowedBy(String),
    /// Tweets written by this user
    Author(String),
}

/// Position of the first tweet of the next page
///
/// Feeds are ordered by (created_at desc, id desc); a query with a cursor
/// returns the cursor tweet and everything after it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedCursor {
    pub id: String,
    pub created_at: DateTime<Utc>,
}

impl FeedCursor {
    /// Cursor pointing at `row`
    pub fn at(row: &TweetRow) -> Self {
        Self {
            id: row.id.clone(),
            created_at: row.created_at,
        }
    }

    /// Encode to the opaque token handed to clients
    pub fn encode(&self) -> String {
        // Serializing two plain fields cannot fail.
        let json = serde_json::to_vec(self).unwrap_or_default();
        URL_SAFE_NO_PAD.encode(json)
    }

    /// Decode a token produced by [`FeedCursor::encode`]
    ///
    /// # Errors
    /// Returns a validation error for anything that is not a valid token
    pub fn decode(token: &str) -> Result<Self, AppError> {
        let invalid = || AppError::Validation("Invalid cursor".to_string());
        let bytes = URL_SAFE_NO_PAD.decode(token).map_err(|_| invalid())?;
        serde_json::from_slice(&bytes).map_err(|_| invalid())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_token_decodes_to_same_position() {
        let cursor = FeedCursor {
            id: EntityId::new().0,
            created_at: now_timestamp(),
        };

        let decoded = FeedCursor::decode(&cursor.encode()).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn garbage_cursor_is_a_validation_error() {
        assert!(matches!(
            FeedCursor::decode("not a cursor!"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            FeedCursor::decode(&URL_SAFE_NO_PAD.encode(b"{\"id\":1}")),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn formatted_timestamps_sort_like_instants() {
        let earlier = "2024-01-01T00:00:00.5Z".parse::<DateTime<Utc>>().unwrap();
        let later = "2024-01-01T00:00:01Z".parse::<DateTime<Utc>>().unwrap();

        assert!(format_timestamp(&earlier) < format_timestamp(&later));
        assert_eq!(format_timestamp(&later), "2024-01-01T00:00:01.000000Z");
    }
}
