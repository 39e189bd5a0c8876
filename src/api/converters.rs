//! Row to DTO conversions

use super::dto::{FeedPage, Profile, SessionResponse, Tweet, TweetAuthor};
use crate::auth::Session;
use crate::data::{ProfileRow, TweetRow};
use crate::service::FeedWindow;

fn count(value: i64) -> u64 {
    u64::try_from(value).unwrap_or_default()
}

impl From<TweetRow> for Tweet {
    fn from(row: TweetRow) -> Self {
        Self {
            id: row.id,
            content: row.content,
            created_at: row.created_at,
            like_count: count(row.like_count),
            liked_by_me: row.liked_by_me,
            user: TweetAuthor {
                id: row.user_id,
                name: row.user_name,
                image: row.user_image,
            },
        }
    }
}

impl From<FeedWindow> for FeedPage {
    fn from(window: FeedWindow) -> Self {
        Self {
            tweets: window.tweets.into_iter().map(Tweet::from).collect(),
            next_cursor: window.next_cursor.map(|cursor| cursor.encode()),
        }
    }
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            image: row.image,
            tweets_count: count(row.tweets_count),
            followers_count: count(row.followers_count),
            follows_count: count(row.follows_count),
            is_following: row.is_following,
        }
    }
}

impl From<Session> for SessionResponse {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            name: session.name,
            image: session.image,
            expires_at: session.expires_at,
        }
    }
}
