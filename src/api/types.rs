//! Wire records exchanged with the aggregation server.
//!
//! The server serializes its database rows directly, so field names are Go
//! identifiers (`FeedName`, `ApiKey`) and nullable columns arrive as
//! `database/sql` wrappers such as `{"String": "...", "Valid": true}`.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Stable identifier of a feed on the server.
///
/// Opaque to the client: only compared, displayed and echoed back in
/// requests. go-rss uses UUID strings; numeric ids are carried as numbers so
/// they round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeedId(RawId);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

impl FeedId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(RawId::Text(id.into()))
    }

    pub fn is_empty(&self) -> bool {
        match &self.0 {
            RawId::Text(id) => id.trim().is_empty(),
            RawId::Number(_) => false,
        }
    }
}

impl fmt::Display for FeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            RawId::Text(id) => f.write_str(id),
            RawId::Number(id) => write!(f, "{}", id),
        }
    }
}

impl From<&str> for FeedId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<i64> for FeedId {
    fn from(id: i64) -> Self {
        Self(RawId::Number(id))
    }
}

// ============================================================================
// Nullable Columns
// ============================================================================

#[derive(Deserialize)]
struct SqlNullWrapper<T> {
    #[serde(
        rename = "String",
        alias = "Int64",
        alias = "Int32",
        alias = "Time",
        alias = "Bool"
    )]
    value: Option<T>,
    #[serde(rename = "Valid")]
    valid: bool,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum SqlNull<T> {
    Wrapped(SqlNullWrapper<T>),
    Bare(Option<T>),
}

/// Deserialize a column that may be a `sql.Null*` wrapper, a bare value, or `null`.
///
/// A wrapper with `"Valid": false` yields `None` regardless of its payload.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(match SqlNull::<T>::deserialize(deserializer)? {
        SqlNull::Wrapped(w) if w.valid => w.value,
        SqlNull::Wrapped(_) => None,
        SqlNull::Bare(v) => v,
    })
}

// ============================================================================
// Records
// ============================================================================

/// A user row as returned by register/login.
///
/// Fields the client does not interpret are kept in `extra` so the persisted
/// record is the server's record, not a projection of it.
///
/// `Debug` masks `api_key`.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    /// Kept in its wire form: go-rss sends UUID strings, other servers numbers.
    #[serde(rename = "ID", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<serde_json::Value>,
    #[serde(rename = "Username", default)]
    pub username: String,
    #[serde(rename = "ApiKey", default)]
    pub api_key: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl fmt::Debug for UserRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserRecord")
            .field("id", &self.id)
            .field("username", &self.username)
            .field(
                "api_key",
                &(!self.api_key.is_empty()).then_some("[REDACTED]"),
            )
            .field("extra_keys", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// An aggregated article (`GET /v1/posts`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "Title", default)]
    pub title: String,
    #[serde(rename = "Url", default)]
    pub url: String,
    #[serde(rename = "FeedName", default)]
    pub feed_name: String,
    #[serde(rename = "PublishedAt", default, deserialize_with = "nullable")]
    pub published_at: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "nullable")]
    pub description: Option<String>,
}

/// A followed feed (`GET /v1/feed_follows`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FollowRecord {
    #[serde(rename = "FeedID")]
    pub feed_id: FeedId,
    #[serde(rename = "FeedName", default)]
    pub feed_name: String,
    #[serde(rename = "FeedUrl", default)]
    pub feed_url: String,
}

/// A feed known to the server (`GET /v1/feeds`, `POST /v1/feeds`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedRecord {
    #[serde(rename = "ID")]
    pub id: FeedId,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Url", default)]
    pub url: String,
    #[serde(rename = "FollowsCount", default, deserialize_with = "nullable")]
    pub follows_count: Option<i64>,
    #[serde(rename = "LastFetchedAt", default, deserialize_with = "nullable")]
    pub last_fetched_at: Option<String>,
}
