//! State-changing user actions.
//!
//! Every command checks its input before touching the network, reports its
//! outcome as a notification, and on success reloads exactly the collections
//! it invalidated. A failed command changes no view and reloads nothing.

use super::{LoaderKind, Notification, SyncError, Synchronizer, View};
use crate::api::FeedId;
use crate::app::AppEvent;
use secrecy::{ExposeSecret, SecretString};

/// Username and password as typed into a form.
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }

    /// Username is trimmed; the password is only checked for emptiness since
    /// surrounding spaces may be part of it.
    fn validate(&self) -> Result<&str, SyncError> {
        let username = self.username.trim();
        if username.is_empty() || self.password.expose_secret().is_empty() {
            return Err(SyncError::ValidationFailed(
                "Please enter a username and password",
            ));
        }
        Ok(username)
    }
}

/// Input of the add-feed form. Only the URL is required.
#[derive(Debug, Clone, Default)]
pub struct NewFeed {
    pub name: String,
    pub url: String,
}

/// A destructive action waiting for a yes/no answer.
#[derive(Debug)]
pub struct PendingConfirmation<T> {
    subject: T,
    prompt: String,
}

impl<T> PendingConfirmation<T> {
    pub fn new(subject: T, prompt: impl Into<String>) -> Self {
        Self {
            subject,
            prompt: prompt.into(),
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn subject(&self) -> &T {
        &self.subject
    }

    pub fn accept(self) -> Confirmed<T> {
        Confirmed(self.subject)
    }

    pub fn decline(self) {
        tracing::debug!(prompt = %self.prompt, "Confirmation declined");
    }
}

/// Proof that the user agreed to act on `T`; only [`PendingConfirmation::accept`] makes one.
#[derive(Debug)]
pub struct Confirmed<T>(T);

impl<T> Confirmed<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

#[derive(Clone, Copy)]
enum AuthFlow {
    Login,
    Register,
}

impl Synchronizer {
    pub async fn login(&self, credentials: Credentials) -> Result<(), SyncError> {
        let result = self.authenticate(AuthFlow::Login, &credentials).await;
        self.report("Login failed", result).await
    }

    pub async fn register(&self, credentials: Credentials) -> Result<(), SyncError> {
        let result = self.authenticate(AuthFlow::Register, &credentials).await;
        self.report("Registration failed", result).await
    }

    async fn authenticate(
        &self,
        flow: AuthFlow,
        credentials: &Credentials,
    ) -> Result<(), SyncError> {
        let username = credentials.validate()?;
        let record = match flow {
            AuthFlow::Login => self.api.login(username, &credentials.password).await?,
            AuthFlow::Register => self.api.register(username, &credentials.password).await?,
        };
        let session = self.session.establish(record).await?;
        let identity = session.identity().to_string();

        self.notify(Notification::info(match flow {
            AuthFlow::Login => format!("Logged in as {}", identity),
            AuthFlow::Register => format!("Account created. Welcome, {}", identity),
        }))
        .await;
        self.emit(AppEvent::SessionChanged(Some(identity))).await;
        self.navigate(View::Home).await;
        Ok(())
    }

    /// Forget the session locally. The server keeps the API key valid.
    pub async fn logout(&self) -> Result<(), SyncError> {
        if !self.session.is_active() {
            return self
                .report(
                    "Logout failed",
                    Err(SyncError::ValidationFailed("Not logged in")),
                )
                .await;
        }

        // The in-memory session is gone even if the stored copy survives.
        let cleared = self.session.clear().await;
        self.emit(AppEvent::SessionChanged(None)).await;
        self.navigate(View::LoginForm).await;

        match cleared {
            Ok(()) => {
                self.notify(Notification::info("Logged out")).await;
                Ok(())
            }
            Err(e) => {
                self.report("Logged out, but the stored session was not removed", Err(e.into()))
                    .await
            }
        }
    }

    /// Create a feed, then refresh articles and followed feeds together.
    pub async fn add_feed(&self, feed: NewFeed) -> Result<(), SyncError> {
        let result: Result<(), SyncError> = async {
            let url = feed.url.trim();
            if url.is_empty() {
                return Err(SyncError::ValidationFailed("Please enter an RSS feed URL"));
            }
            let created = self.api.create_feed(feed.name.trim(), url).await?;
            tracing::info!(feed_id = %created.id, "Feed created");
            Ok(())
        }
        .await;
        self.report("Failed to add feed", result).await?;

        self.notify(Notification::info("Feed added")).await;
        self.emit(AppEvent::FeedFormCleared).await;
        tokio::join!(
            self.load(LoaderKind::Articles),
            self.load(LoaderKind::MyFeeds)
        );
        Ok(())
    }

    pub async fn follow(&self, feed_id: &FeedId) -> Result<(), SyncError> {
        let result: Result<(), SyncError> = async {
            if feed_id.is_empty() {
                return Err(SyncError::ValidationFailed("No feed selected"));
            }
            self.api.follow(feed_id).await?;
            Ok(())
        }
        .await;
        self.report("Failed to follow feed", result).await?;

        tracing::info!(%feed_id, "Followed feed");
        self.notify(Notification::info("Followed")).await;
        self.load(LoaderKind::MyFeeds).await;
        Ok(())
    }

    pub async fn unfollow(&self, target: Confirmed<FeedId>) -> Result<(), SyncError> {
        let feed_id = target.into_inner();
        let result = self.api.unfollow(&feed_id).await.map_err(SyncError::from);
        self.report("Failed to unfollow feed", result).await?;

        tracing::info!(%feed_id, "Unfollowed feed");
        self.notify(Notification::info("Unfollowed")).await;
        self.load(LoaderKind::MyFeeds).await;
        Ok(())
    }

    /// Raise an error notification for a failed command and pass the result on.
    async fn report(
        &self,
        context: &str,
        result: Result<(), SyncError>,
    ) -> Result<(), SyncError> {
        if let Err(e) = &result {
            let message = match e {
                SyncError::ValidationFailed(msg) => (*msg).to_string(),
                other => format!("{}: {}", context, other),
            };
            tracing::warn!(error = %e, "{}", context);
            self.notify(Notification::error(message)).await;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_require_both_fields() {
        assert!(Credentials::new("", "pw").validate().is_err());
        assert!(Credentials::new("   ", "pw").validate().is_err());
        assert!(Credentials::new("alice", "").validate().is_err());
        assert_eq!(Credentials::new(" alice ", "pw").validate().unwrap(), "alice");
    }

    #[test]
    fn test_password_is_not_trimmed() {
        assert!(Credentials::new("alice", "  ").validate().is_ok());
    }

    #[test]
    fn test_accept_yields_subject() {
        let pending = PendingConfirmation::new(FeedId::new("f-1"), "Unfollow Rust Blog?");
        assert_eq!(pending.prompt(), "Unfollow Rust Blog?");
        assert_eq!(pending.accept().into_inner(), FeedId::new("f-1"));
    }
}
