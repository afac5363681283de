//! Authenticated session state.
//!
//! A [`SessionStore`] owns the one active [`Session`] of a client instance and
//! persists it in the `session.user` slot of the local database, so a restart
//! picks up where the last run left off. Clones of the store share the same
//! state: the API client reads the credential from it on every authenticated
//! request while the command runner is the only writer.

use crate::api::UserRecord;
use crate::storage::{Database, DatabaseError};
use reqwest::header::HeaderValue;
use secrecy::{ExposeSecret, SecretString};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use thiserror::Error;

/// Key of the durable slot holding the serialized user record.
pub const SESSION_KEY: &str = "session.user";

#[derive(Debug, Error)]
pub enum SessionError {
    /// Persisted content could not be turned back into a session.
    #[error("Stored session is unreadable: {0}")]
    DeserializationFailed(String),

    /// The server's user record lacks a username or an API key.
    #[error("User record is missing its {0}")]
    Incomplete(&'static str),

    #[error("Could not serialize user record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Storage(#[from] DatabaseError),
}

/// An authenticated identity: username, API key, and the server's user record.
///
/// Construction guarantees both identity and credential are non-empty.
pub struct Session {
    identity: String,
    credential: SecretString,
    raw: UserRecord,
}

impl Session {
    /// Build a session from a user record returned by register/login.
    pub fn from_record(raw: UserRecord) -> Result<Self, SessionError> {
        if raw.username.trim().is_empty() {
            return Err(SessionError::Incomplete("username"));
        }
        if raw.api_key.trim().is_empty() {
            return Err(SessionError::Incomplete("API key"));
        }
        Ok(Self {
            identity: raw.username.clone(),
            credential: SecretString::from(raw.api_key.clone()),
            raw,
        })
    }

    /// Parse the persisted slot content.
    fn from_persisted(content: &str) -> Result<Self, SessionError> {
        let raw: UserRecord = serde_json::from_str(content)
            .map_err(|e| SessionError::DeserializationFailed(e.to_string()))?;
        Self::from_record(raw).map_err(|e| SessionError::DeserializationFailed(e.to_string()))
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn raw(&self) -> &UserRecord {
        &self.raw
    }

    /// The credential formatted as an `Authorization` header value.
    ///
    /// The server expects the bare API key with no scheme prefix. Returns
    /// `None` if the key contains bytes not allowed in a header.
    pub fn authorization(&self) -> Option<HeaderValue> {
        let mut value = HeaderValue::from_str(self.credential.expose_secret()).ok()?;
        value.set_sensitive(true);
        Some(value)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("identity", &self.identity)
            .field("credential", &"[REDACTED]")
            .finish()
    }
}

/// Shared handle to the client's single session slot.
#[derive(Clone)]
pub struct SessionStore {
    db: Database,
    active: Arc<RwLock<Option<Arc<Session>>>>,
}

impl SessionStore {
    /// Create a store backed by `db`. Nothing is loaded until [`restore`](Self::restore).
    pub fn new(db: Database) -> Self {
        Self {
            db,
            active: Arc::new(RwLock::new(None)),
        }
    }

    /// Load the persisted session and make it active.
    ///
    /// Never fails: unreadable content is deleted from the slot and reported
    /// as absent, and storage errors are logged and treated as absent.
    pub async fn restore(&self) -> Option<Arc<Session>> {
        let content = match self.db.get_preference(SESSION_KEY).await {
            Ok(Some(content)) => content,
            Ok(None) => {
                self.set_active(None);
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read stored session");
                self.set_active(None);
                return None;
            }
        };

        match Session::from_persisted(&content) {
            Ok(session) => {
                let session = Arc::new(session);
                tracing::info!(identity = %session.identity(), "Restored session");
                self.set_active(Some(Arc::clone(&session)));
                Some(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable stored session");
                if let Err(e) = self.db.delete_preference(SESSION_KEY).await {
                    tracing::warn!(error = %e, "Failed to delete unreadable session");
                }
                self.set_active(None);
                None
            }
        }
    }

    /// Persist and activate a session for `raw`, replacing any previous one.
    ///
    /// Nothing changes unless the record is complete and the write succeeds.
    pub async fn establish(&self, raw: UserRecord) -> Result<Arc<Session>, SessionError> {
        let session = Session::from_record(raw)?;
        let content = serde_json::to_string(session.raw())?;
        self.db.set_preference(SESSION_KEY, &content).await?;

        let session = Arc::new(session);
        tracing::info!(identity = %session.identity(), "Session established");
        self.set_active(Some(Arc::clone(&session)));
        Ok(session)
    }

    /// Deactivate and forget the session.
    ///
    /// The in-memory session is dropped even when deleting the stored copy
    /// fails; the error is returned so the caller can tell the user.
    pub async fn clear(&self) -> Result<(), SessionError> {
        self.set_active(None);
        self.db.delete_preference(SESSION_KEY).await?;
        tracing::info!("Session cleared");
        Ok(())
    }

    /// The active session, if any.
    pub fn current(&self) -> Option<Arc<Session>> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_active(&self) -> bool {
        self.current().is_some()
    }

    pub fn identity(&self) -> Option<String> {
        self.current().map(|s| s.identity().to_string())
    }

    /// `Authorization` header value for the active session.
    pub fn authorization(&self) -> Option<HeaderValue> {
        self.current().and_then(|s| s.authorization())
    }

    fn set_active(&self, session: Option<Arc<Session>>) {
        *self.active.write().unwrap_or_else(PoisonError::into_inner) = session;
    }
}
