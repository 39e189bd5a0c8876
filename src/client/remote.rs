//! Remote procedure transport
//!
//! [`FeedApi`] is the seam between the client core and the server.
//! [`HttpFeedApi`] speaks the JSON-over-HTTP surface served by
//! [`crate::api::api_router`].

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use super::error::ClientError;
use crate::api::{
    CreateTweetRequest, FeedPage, FeedParams, FeedSelector, Profile, SessionResponse,
    ToggleFollowResponse, ToggleLikeResponse, Tweet,
};
use crate::config::ClientConfig;

/// Remote procedures the client consumes
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FeedApi: Send + Sync {
    /// `feed.list` / `feed.listFollowing` / `feed.listByProfile`
    async fn list_feed(
        &self,
        selector: FeedSelector,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<FeedPage, ClientError>;

    /// `tweet.create`
    async fn create_tweet(&self, content: String) -> Result<Tweet, ClientError>;

    /// `tweet.toggleLike`
    async fn toggle_like(&self, tweet_id: String) -> Result<ToggleLikeResponse, ClientError>;

    /// `profile.getById`
    async fn get_profile(&self, profile_id: String) -> Result<Profile, ClientError>;

    /// `profile.toggleFollow`
    async fn toggle_follow(&self, profile_id: String)
    -> Result<ToggleFollowResponse, ClientError>;

    /// Current session, `None` for anonymous viewers
    async fn session(&self) -> Result<Option<SessionResponse>, ClientError>;
}

/// [`FeedApi`] over HTTP
#[derive(Clone)]
pub struct HttpFeedApi {
    client: reqwest::Client,
    base_url: String,
    session_token: Option<String>,
}

impl HttpFeedApi {
    /// Create a client for the server at `base_url`
    ///
    /// # Errors
    /// Returns error if `base_url` is not an absolute URL or the HTTP client
    /// cannot be built
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ClientError> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }

        let client = reqwest::Client::builder()
            .user_agent("Chirp/0.1.0")
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            session_token: None,
        })
    }

    /// Create a client from the `[client]` config section
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        Self::new(
            &config.base_url,
            Duration::from_secs(config.timeout_seconds),
        )
    }

    /// Send requests as the holder of this session token
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request).send().await?;
        let response = check_status(response).await?;
        Ok(response.json::<T>().await?)
    }
}

/// Map non-success statuses to [`ClientError`]
async fn check_status(response: Response) -> Result<Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    match status {
        StatusCode::NOT_FOUND => Err(ClientError::NotFound),
        StatusCode::UNAUTHORIZED => Err(ClientError::Unauthorized),
        _ => {
            let message = response
                .json::<serde_json::Value>()
                .await
                .ok()
                .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or_else(|| status.to_string());
            tracing::warn!(status = status.as_u16(), %message, "Remote procedure failed");
            Err(ClientError::Status {
                status: status.as_u16(),
                message,
            })
        }
    }
}

fn feed_path(selector: &FeedSelector) -> String {
    match selector {
        FeedSelector::Global => "/feed".to_string(),
        FeedSelector::Following => "/feed/following".to_string(),
        FeedSelector::Profile(profile_id) => {
            format!("/profiles/{}/feed", urlencoding::encode(profile_id))
        }
    }
}

#[async_trait]
impl FeedApi for HttpFeedApi {
    async fn list_feed(
        &self,
        selector: FeedSelector,
        cursor: Option<String>,
        limit: usize,
    ) -> Result<FeedPage, ClientError> {
        let params = FeedParams {
            cursor,
            limit: Some(limit),
        };
        let request = self.client.get(self.url(&feed_path(&selector))).query(&params);
        self.send(request).await
    }

    async fn create_tweet(&self, content: String) -> Result<Tweet, ClientError> {
        let request = self
            .client
            .post(self.url("/tweets"))
            .json(&CreateTweetRequest { content });
        self.send(request).await
    }

    async fn toggle_like(&self, tweet_id: String) -> Result<ToggleLikeResponse, ClientError> {
        let path = format!("/tweets/{}/like", urlencoding::encode(&tweet_id));
        let request = self.client.post(self.url(&path));
        self.send(request).await
    }

    async fn get_profile(&self, profile_id: String) -> Result<Profile, ClientError> {
        let path = format!("/profiles/{}", urlencoding::encode(&profile_id));
        let request = self.client.get(self.url(&path));
        self.send(request).await
    }

    async fn toggle_follow(
        &self,
        profile_id: String,
    ) -> Result<ToggleFollowResponse, ClientError> {
        let path = format!("/profiles/{}/follow", urlencoding::encode(&profile_id));
        let request = self.client.post(self.url(&path));
        self.send(request).await
    }

    async fn session(&self) -> Result<Option<SessionResponse>, ClientError> {
        let request = self.client.get(self.url("/auth/session"));
        self.send(request).await
    }
}
