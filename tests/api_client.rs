//! Integration tests for the HTTP gateway against a mock aggregation server.
//!
//! Each test starts its own wiremock server and an in-memory session store.

use pretty_assertions::assert_eq;
use rssdeck::api::{ApiClient, ApiError, FeedId};
use rssdeck::session::SessionStore;
use rssdeck::storage::Database;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn test_store() -> SessionStore {
    SessionStore::new(Database::open(":memory:").await.unwrap())
}

async fn signed_in_store() -> SessionStore {
    let store = test_store().await;
    store
        .establish(
            serde_json::from_value(json!({
                "ID": "u-1",
                "Username": "alice",
                "ApiKey": "key-123"
            }))
            .unwrap(),
        )
        .await
        .unwrap();
    store
}

async fn client(server: &MockServer, store: SessionStore) -> ApiClient {
    ApiClient::new(&server.uri(), store).unwrap()
}

// ============================================================================
// Credentials
// ============================================================================

#[tokio::test]
async fn test_authenticated_call_sends_raw_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .and(header("Authorization", "key-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    assert!(api.posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_discovery_never_sends_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/feeds"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    api.discover_feeds().await.unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_missing_session_sends_bare_request_and_surfaces_401() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": "Couldn't get api key"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, test_store().await).await;
    let err = api.posts().await.unwrap_err();

    assert!(err.is_auth_failure());
    assert_eq!(err.to_string(), "HTTP 401: Couldn't get api key");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_login_posts_credentials_without_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/users/login"))
        .and(body_json(json!({"username": "alice", "password": "hunter2"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ID": "u-1",
            "Username": "alice",
            "ApiKey": "key-123",
            "CreatedAt": "2024-03-01T10:00:00Z"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    let user = api
        .login("alice", &SecretString::from("hunter2".to_string()))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.api_key, "key-123");
    assert!(user.extra.contains_key("CreatedAt"));

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

// ============================================================================
// Response Handling
// ============================================================================

#[tokio::test]
async fn test_null_list_is_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/feed_follows"))
        .respond_with(ResponseTemplate::new(200).set_body_string("null"))
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    assert!(api.feed_follows().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_empty_body_on_success_is_accepted() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feed_follows/f-1"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    api.unfollow(&FeedId::from("f-1")).await.unwrap();
}

#[tokio::test]
async fn test_unfollow_escapes_feed_id_as_one_segment() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feed_follows/a%20b"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/v1/feed_follows/x%2Fy"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    api.unfollow(&FeedId::new("a b")).await.unwrap();
    api.unfollow(&FeedId::new("x/y")).await.unwrap();
}

#[tokio::test]
async fn test_unfollow_keeps_base_path_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/rss/v1/feed_follows/42"))
        .and(header("Authorization", "key-123"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let base = format!("{}/rss", server.uri());
    let api = ApiClient::new(&base, signed_in_store().await).unwrap();
    api.unfollow(&FeedId::from(42)).await.unwrap();
}

#[tokio::test]
async fn test_error_without_envelope_uses_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/healthz"))
        .respond_with(ResponseTemplate::new(503).set_body_string("<html>down</html>"))
        .mount(&server)
        .await;

    let api = client(&server, test_store().await).await;
    let err = api.healthz().await.unwrap_err();

    assert_eq!(err.status(), Some(503));
    assert!(!err.is_auth_failure());
}

#[tokio::test]
async fn test_malformed_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/posts"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    assert!(matches!(
        api.posts().await,
        Err(ApiError::MalformedResponse(_))
    ));
}

#[tokio::test]
async fn test_follow_echoes_numeric_feed_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/feed_follows"))
        .and(body_json(json!({"feed_id": 42})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"ID": "ff-1", "FeedID": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    api.follow(&FeedId::from(42)).await.unwrap();
}

#[tokio::test]
async fn test_create_feed_returns_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/feeds"))
        .and(body_json(json!({"name": "Rust Blog", "url": "https://blog.rust-lang.org/feed.xml"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "ID": "f-9",
            "Name": "Rust Blog",
            "Url": "https://blog.rust-lang.org/feed.xml",
            "LastFetchedAt": {"Time": "0001-01-01T00:00:00Z", "Valid": false}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = client(&server, signed_in_store().await).await;
    let feed = api
        .create_feed("Rust Blog", "https://blog.rust-lang.org/feed.xml")
        .await
        .unwrap();

    assert_eq!(feed.id, FeedId::from("f-9"));
    assert_eq!(feed.last_fetched_at, None);
}

#[tokio::test]
async fn test_base_url_trailing_slash_and_scheme() {
    let store = test_store().await;
    let api = ApiClient::new("http://localhost:8080/", store.clone()).unwrap();
    assert_eq!(api.base_url(), "http://localhost:8080");

    assert!(matches!(
        ApiClient::new("ftp://localhost", store.clone()),
        Err(ApiError::InvalidBaseUrl(_))
    ));
    assert!(matches!(
        ApiClient::new("not a url", store),
        Err(ApiError::InvalidBaseUrl(_))
    ));
}
