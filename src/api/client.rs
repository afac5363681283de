use super::types::{FeedId, FeedRecord, FollowRecord, PostRecord, UserRecord};
use crate::session::SessionStore;
use futures::StreamExt;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

/// Ceiling on response bodies; a server answer beyond this is not a list we can render.
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Longest server error message carried into a notification.
const MAX_ERROR_MESSAGE_LEN: usize = 200;

/// Errors from a single API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status.
    #[error("{}", describe_status(*status, message.as_deref()))]
    RequestFailed {
        status: u16,
        message: Option<String>,
    },
    /// The request never produced a response (DNS, connect, TLS, reset).
    #[error("Network error: {0}")]
    TransportFailed(#[source] reqwest::Error),
    /// A 2xx response whose body is not the expected JSON.
    #[error("Unexpected response from server: {0}")]
    MalformedResponse(#[source] serde_json::Error),
    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),
    #[error("Invalid server URL: {0}")]
    InvalidBaseUrl(String),
}

impl ApiError {
    /// HTTP status for `RequestFailed`, `None` otherwise.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True for 401/403: the server rejected or did not receive a credential.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}

fn describe_status(status: u16, message: Option<&str>) -> String {
    match message {
        Some(msg) => format!("HTTP {}: {}", status, msg),
        None => format!("HTTP error: status {}", status),
    }
}

/// Follow at most 3 redirects and stop on loops.
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }
        let url = attempt.url();
        if attempt.previous().iter().any(|prev| prev == url) {
            return attempt.error("Redirect loop detected");
        }
        tracing::debug!(to = %url, hop = attempt.previous().len() + 1, "Following redirect");
        attempt.follow()
    })
}

/// HTTP gateway to the aggregation server.
///
/// Every call is a single attempt: no retries, no timeout, no coalescing of
/// identical in-flight requests. Authenticated calls read the credential from
/// the shared [`SessionStore`] at send time.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
}

impl ApiClient {
    /// Create a client for the server at `base_url` (e.g. `http://localhost:8080`).
    pub fn new(base_url: &str, session: SessionStore) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .redirect(create_redirect_policy())
            .pool_max_idle_per_host(2)
            .build()
            .map_err(ApiError::TransportFailed)?;
        Self::with_http_client(http, base_url, session)
    }

    /// Create a client around an existing `reqwest::Client`.
    pub fn with_http_client(
        http: reqwest::Client,
        base_url: &str,
        session: SessionStore,
    ) -> Result<Self, ApiError> {
        let parsed =
            url::Url::parse(base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ApiError::InvalidBaseUrl(format!(
                "unsupported scheme '{}'",
                parsed.scheme()
            )));
        }
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Issue one request and return the parsed JSON body.
    ///
    /// When `requires_auth` is set and a session is active, its API key goes
    /// in the `Authorization` header. Without a session the request is sent
    /// bare and the server decides. An empty 2xx body yields `Value::Null`.
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<Value, ApiError> {
        let url = format!("{}{}", self.base_url, path);
        self.send(method, &url, path, body, requires_auth).await
    }

    /// Send to a fully built `url`; `path` only labels log lines.
    async fn send(
        &self,
        method: Method,
        url: &str,
        path: &str,
        body: Option<&Value>,
        requires_auth: bool,
    ) -> Result<Value, ApiError> {
        let mut request = self
            .http
            .request(method.clone(), url)
            .header(CONTENT_TYPE, "application/json");

        if requires_auth {
            match self.session.authorization() {
                Some(value) => request = request.header(AUTHORIZATION, value),
                None => tracing::debug!(path, "No active session, sending without credentials"),
            }
        }

        if let Some(body) = body {
            request = request.body(body.to_string());
        }

        let response = request.send().await.map_err(ApiError::TransportFailed)?;
        let status = response.status();

        if !status.is_success() {
            let message = read_limited(response, MAX_RESPONSE_SIZE)
                .await
                .ok()
                .and_then(|bytes| error_message(&bytes));
            tracing::debug!(%method, path, status = status.as_u16(), "Request failed");
            return Err(ApiError::RequestFailed {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = read_limited(response, MAX_RESPONSE_SIZE).await?;
        tracing::debug!(%method, path, status = status.as_u16(), bytes = bytes.len(), "Request succeeded");

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(ApiError::MalformedResponse)
    }

    // ========================================================================
    // Endpoints
    // ========================================================================

    /// `GET /v1/healthz`
    pub async fn healthz(&self) -> Result<(), ApiError> {
        self.request(Method::GET, "/v1/healthz", None, false)
            .await
            .map(|_| ())
    }

    /// `POST /v1/users`: create an account; the response carries the API key.
    pub async fn register(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserRecord, ApiError> {
        let body = credentials_body(username, password);
        decode(
            self.request(Method::POST, "/v1/users", Some(&body), false)
                .await?,
        )
    }

    /// `POST /v1/users/login`
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<UserRecord, ApiError> {
        let body = credentials_body(username, password);
        decode(
            self.request(Method::POST, "/v1/users/login", Some(&body), false)
                .await?,
        )
    }

    /// `GET /v1/users`: the server's view of the current credential.
    pub async fn current_user(&self) -> Result<UserRecord, ApiError> {
        decode(self.request(Method::GET, "/v1/users", None, true).await?)
    }

    /// `GET /v1/posts`
    pub async fn posts(&self) -> Result<Vec<PostRecord>, ApiError> {
        decode_list(self.request(Method::GET, "/v1/posts", None, true).await?)
    }

    /// `GET /v1/feed_follows`
    pub async fn feed_follows(&self) -> Result<Vec<FollowRecord>, ApiError> {
        decode_list(
            self.request(Method::GET, "/v1/feed_follows", None, true)
                .await?,
        )
    }

    /// `POST /v1/feed_follows`. The follow record is returned as-is.
    pub async fn follow(&self, feed_id: &FeedId) -> Result<Value, ApiError> {
        let body = serde_json::json!({ "feed_id": feed_id });
        self.request(Method::POST, "/v1/feed_follows", Some(&body), true)
            .await
    }

    /// `DELETE /v1/feed_follows/{feed_id}`
    pub async fn unfollow(&self, feed_id: &FeedId) -> Result<(), ApiError> {
        let mut url =
            url::Url::parse(&self.base_url).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        // The id is one path segment whatever it contains (spaces, slashes).
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidBaseUrl("URL cannot have a path".to_string()))?
            .pop_if_empty()
            .extend(["v1", "feed_follows", &feed_id.to_string()]);
        self.send(Method::DELETE, url.as_str(), "/v1/feed_follows/{id}", None, true)
            .await
            .map(|_| ())
    }

    /// `GET /v1/feeds`: every feed on the server, no credential needed.
    pub async fn discover_feeds(&self) -> Result<Vec<FeedRecord>, ApiError> {
        decode_list(self.request(Method::GET, "/v1/feeds", None, false).await?)
    }

    /// `POST /v1/feeds`
    pub async fn create_feed(&self, name: &str, url: &str) -> Result<FeedRecord, ApiError> {
        let body = serde_json::json!({ "name": name, "url": url });
        decode(
            self.request(Method::POST, "/v1/feeds", Some(&body), true)
                .await?,
        )
    }
}

fn credentials_body(username: &str, password: &SecretString) -> Value {
    serde_json::json!({
        "username": username,
        "password": password.expose_secret(),
    })
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(ApiError::MalformedResponse)
}

/// Decode a JSON array; the server encodes an empty result set as `null`.
fn decode_list<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    if value.is_null() {
        return Ok(Vec::new());
    }
    decode(value)
}

/// Extract `{"error": "..."}` from an error body.
fn error_message(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    let message = value.get("error")?.as_str()?.trim();
    if message.is_empty() {
        return None;
    }
    Some(message.chars().take(MAX_ERROR_MESSAGE_LEN).collect())
}

async fn read_limited(response: reqwest::Response, limit: usize) -> Result<Vec<u8>, ApiError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(ApiError::TransportFailed)?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(ApiError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}
