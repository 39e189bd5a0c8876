//! Tweet composer

use super::error::ClientError;
use super::mutation::MutationDispatcher;
use crate::api::{SessionResponse, Tweet};

/// Input state of the tweet form
///
/// Only exists for authenticated viewers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TweetComposer {
    input: String,
}

impl TweetComposer {
    /// Composer for `viewer`, `None` for anonymous viewers
    pub fn for_viewer(viewer: Option<&SessionResponse>) -> Option<Self> {
        viewer.map(|_| Self::default())
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    /// Send the current input as a new tweet
    ///
    /// Clears the input on success. On error the input is kept so the user
    /// can submit again.
    pub async fn submit(&mut self, dispatcher: &MutationDispatcher) -> Result<Tweet, ClientError> {
        let tweet = dispatcher.create_tweet(&self.input).await?;
        self.input.clear();
        Ok(tweet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TweetAuthor;
    use crate::client::cache::ClientCache;
    use crate::client::remote::MockFeedApi;
    use chrono::Utc;
    use std::sync::Arc;

    fn session() -> SessionResponse {
        SessionResponse {
            user_id: "u1".to_string(),
            name: Some("Alice".to_string()),
            image: None,
            expires_at: Utc::now(),
        }
    }

    #[test]
    fn anonymous_viewer_has_no_composer() {
        assert!(TweetComposer::for_viewer(None).is_none());
        assert_eq!(
            TweetComposer::for_viewer(Some(&session())).map(|c| c.input().to_string()),
            Some(String::new())
        );
    }

    #[tokio::test]
    async fn submit_clears_input_on_success() {
        let mut api = MockFeedApi::new();
        api.expect_create_tweet().times(1).returning(|content| {
            Ok(Tweet {
                id: "t1".to_string(),
                content,
                created_at: Utc::now(),
                like_count: 0,
                liked_by_me: false,
                user: TweetAuthor {
                    id: "u1".to_string(),
                    name: None,
                    image: None,
                },
            })
        });
        let dispatcher = MutationDispatcher::new(Arc::new(api), Arc::new(ClientCache::new()));
        let mut composer = TweetComposer::for_viewer(Some(&session())).unwrap();
        composer.set_input("first!");

        let tweet = composer.submit(&dispatcher).await.unwrap();

        assert_eq!(tweet.content, "first!");
        assert_eq!(composer.input(), "");
    }

    #[tokio::test]
    async fn submit_keeps_input_on_error() {
        let mut api = MockFeedApi::new();
        api.expect_create_tweet().returning(|_| {
            Err(ClientError::Status {
                status: 400,
                message: "Tweet is empty".to_string(),
            })
        });
        let dispatcher = MutationDispatcher::new(Arc::new(api), Arc::new(ClientCache::new()));
        let mut composer = TweetComposer::for_viewer(Some(&session())).unwrap();
        composer.set_input("   ");

        assert!(composer.submit(&dispatcher).await.is_err());
        assert_eq!(composer.input(), "   ");
    }
}
