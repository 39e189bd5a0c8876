//! E2E tests for health, metrics and session endpoints

mod common;

use chirp::api::SessionResponse;
use common::TestServer;

#[tokio::test]
async fn test_health_check() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/health"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let server = TestServer::new().await;

    // Generate some traffic first
    server
        .client
        .get(server.url("/api/feed"))
        .send()
        .await
        .unwrap();

    let response = server
        .client
        .get(server.url("/metrics"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("chirp_http_requests_total"));
}

#[tokio::test]
async fn test_session_endpoint() {
    let server = TestServer::new().await;

    let anonymous: Option<SessionResponse> = server
        .client
        .get(server.url("/api/auth/session"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(anonymous.is_none());

    let token = server.create_test_token("alice", "Alice");
    let session: Option<SessionResponse> = server
        .client
        .get(server.url("/api/auth/session"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let session = session.unwrap();
    assert_eq!(session.user_id, "alice");
    assert_eq!(session.name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_unknown_route() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/nope"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}
