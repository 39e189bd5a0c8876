//! Common test utilities for E2E tests

#![allow(dead_code)]

use chirp::data::{EntityId, User};
use chirp::{AppState, config};
use chrono::{DateTime, Duration, Utc};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server instance
    pub async fn new() -> Self {
        // Create temporary directory for test database
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: config::DatabaseConfig { path: db_path },
            auth: config::AuthConfig {
                session_secret: "test-secret-key-32-bytes-long!!!".to_string(),
                session_max_age: 604800,
            },
            feed: config::FeedConfig {
                default_page_size: 10,
                max_page_size: 50,
                max_tweet_length: 280,
            },
            client: config::ClientConfig {
                base_url: "http://localhost:8080".to_string(),
                timeout_seconds: 10,
                scroll_threshold_px: 250,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let state = AppState::new(config).await.unwrap();

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = chirp::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait a bit for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// Create a user row directly in the database
    pub async fn create_user(&self, id: &str, name: &str) -> User {
        let user = User {
            id: id.to_string(),
            name: Some(name.to_string()),
            image: Some(format!("https://img.example/{id}.png")),
            created_at: Utc::now(),
        };
        self.state.db.upsert_user(&user).await.unwrap();
        user
    }

    /// Insert a tweet with a fixed timestamp, returning its ID
    pub async fn create_tweet_at(
        &self,
        user_id: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> String {
        let id = EntityId::new().0;
        self.state
            .db
            .insert_tweet(&id, user_id, content, &created_at)
            .await
            .unwrap();
        id
    }

    /// Insert `count` tweets one minute apart, oldest first, returning their IDs
    pub async fn seed_tweets(&self, user_id: &str, count: usize) -> Vec<String> {
        let start = Utc::now() - Duration::days(1);
        let mut ids = Vec::with_capacity(count);
        for i in 0..count {
            let created_at = start + Duration::minutes(i as i64);
            ids.push(
                self.create_tweet_at(user_id, &format!("tweet {i}"), created_at)
                    .await,
            );
        }
        ids
    }

    /// Create a signed session token for `user_id`
    pub fn create_test_token(&self, user_id: &str, name: &str) -> String {
        use chirp::auth::{Session, create_session_token};

        let session = Session {
            user_id: user_id.to_string(),
            name: Some(name.to_string()),
            image: None,
            created_at: Utc::now(),
            expires_at: Utc::now() + Duration::days(7),
        };

        create_session_token(&session, &self.state.config.auth.session_secret)
            .expect("Failed to create test token")
    }
}
