//! Session and synchronization layer.
//!
//! A [`Synchronizer`] sits between the terminal UI and the server. It owns the
//! view router, runs the loaders when a view is shown, and executes mutation
//! commands followed by the reloads they invalidate. Results reach the UI only
//! as [`AppEvent`]s on the channel the UI loop drains, so the UI state has a
//! single writer.

mod commands;
mod loaders;
mod router;

pub use commands::{Confirmed, Credentials, NewFeed, PendingConfirmation};
pub use loaders::{
    map_articles, map_feeds, map_follows, ArticleSummary, Collection, FeedSummary, Listing,
    LoaderKind, NO_ARTICLES, NO_FEEDS, NO_FOLLOWS,
};
pub use router::{View, ViewRouter};

use crate::api::{ApiClient, ApiError};
use crate::app::AppEvent;
use crate::session::{SessionError, SessionStore};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Normal,
    Error,
}

/// A transient message for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub message: String,
    pub severity: Severity,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Normal,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity: Severity::Error,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

/// Why a command did not complete.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Local input check failed; no request was sent.
    #[error("{0}")]
    ValidationFailed(&'static str),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

/// Drives views, loaders and commands against one server.
///
/// Cheap to clone; each spawned UI task gets its own handle.
#[derive(Clone)]
pub struct Synchronizer {
    api: ApiClient,
    session: SessionStore,
    router: Arc<Mutex<ViewRouter>>,
    events: mpsc::Sender<AppEvent>,
}

impl Synchronizer {
    /// `initial` is the view assumed to be on screen; nothing is emitted for it.
    pub fn new(api: ApiClient, events: mpsc::Sender<AppEvent>, initial: View) -> Self {
        let session = api.session().clone();
        Self {
            api,
            session,
            router: Arc::new(Mutex::new(ViewRouter::new(initial))),
            events,
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub async fn active_view(&self) -> View {
        self.router.lock().await.active()
    }

    /// Show `view` and run its loader, if it has one.
    ///
    /// `ShowView` is sent while the router is locked, so the UI receives view
    /// changes in the order the router made them.
    pub async fn navigate(&self, view: View) {
        let loader = {
            let mut router = self.router.lock().await;
            let loader = router.show(view);
            self.emit(AppEvent::ShowView(view)).await;
            loader
        };
        if let Some(kind) = loader {
            self.load(kind).await;
        }
    }

    /// Show the active view again, refreshing its data.
    pub async fn reload(&self) {
        let view = self.active_view().await;
        self.navigate(view).await;
    }

    /// Pick the starting view from the persisted session and load it.
    ///
    /// Returns the restored identity, if any.
    pub async fn start(&self) -> Option<String> {
        match self.session.restore().await {
            Some(session) => {
                let identity = session.identity().to_string();
                self.emit(AppEvent::SessionChanged(Some(identity.clone())))
                    .await;
                self.navigate(View::Home).await;
                Some(identity)
            }
            None => {
                self.emit(AppEvent::SessionChanged(None)).await;
                self.navigate(View::LoginForm).await;
                None
            }
        }
    }

    pub async fn notify(&self, notification: Notification) {
        if notification.is_error() {
            tracing::debug!(message = %notification.message, "Error notification");
        }
        self.emit(AppEvent::Notify(notification)).await;
    }

    pub(crate) async fn emit(&self, event: AppEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("Event receiver dropped, discarding event");
        }
    }
}
