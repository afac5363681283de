use crate::api::FeedId;
use crate::sync::{
    ArticleSummary, Collection, FeedSummary, Listing, Notification, PendingConfirmation, View,
};
use std::time::Duration;
use tokio::time::Instant;

// ============================================================================
// Events
// ============================================================================

/// Events sent from background tasks to the UI loop.
#[derive(Debug)]
pub enum AppEvent {
    /// Make `View` the visible screen.
    ShowView(View),
    /// Replace one rendered collection wholesale.
    CollectionLoaded(Collection),
    /// A feed was added; empty the add-feed form.
    FeedFormCleared,
    /// Signed in as the given user, or signed out.
    SessionChanged(Option<String>),
    Notify(Notification),
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "login", "load")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Forms
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthField {
    #[default]
    Username,
    Password,
}

/// Login or register form contents.
#[derive(Debug, Default)]
pub struct AuthForm {
    pub username: String,
    pub password: String,
    pub focus: AuthField,
}

impl AuthForm {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            AuthField::Username => AuthField::Password,
            AuthField::Password => AuthField::Username,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            AuthField::Username => &mut self.username,
            AuthField::Password => &mut self.password,
        }
    }

    /// Drop the typed password (after submit or logout).
    pub fn clear_password(&mut self) {
        self.password.clear();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedField {
    Name,
    #[default]
    Url,
}

/// The add-feed form shown over the Feeds view.
#[derive(Debug, Default)]
pub struct FeedForm {
    pub name: String,
    pub url: String,
    pub focus: FeedField,
}

impl FeedForm {
    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FeedField::Name => FeedField::Url,
            FeedField::Url => FeedField::Name,
        };
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            FeedField::Name => &mut self.name,
            FeedField::Url => &mut self.url,
        }
    }
}

// ============================================================================
// Confirmation Dialog
// ============================================================================

/// Pending confirmation action for destructive operations.
pub enum ConfirmAction {
    /// Stop following a feed.
    Unfollow(PendingConfirmation<FeedId>),
}

impl ConfirmAction {
    pub fn prompt(&self) -> &str {
        match self {
            ConfirmAction::Unfollow(pending) => pending.prompt(),
        }
    }
}

// ============================================================================
// Application State
// ============================================================================

/// UI-facing settings taken from the config file.
#[derive(Debug, Clone)]
pub struct UiSettings {
    pub notification_ttl: Duration,
    pub open_links_in_browser: bool,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            notification_ttl: Duration::from_secs(3),
            open_links_in_browser: true,
        }
    }
}

/// Central application state. Only the UI loop mutates it.
pub struct App {
    pub settings: UiSettings,

    pub view: View,
    /// Signed-in username, shown in the header.
    pub identity: Option<String>,

    // Data (`None` until the first load completes)
    pub articles: Option<Listing<ArticleSummary>>,
    pub my_feeds: Option<Listing<FeedSummary>>,
    pub discovery: Option<Listing<FeedSummary>>,

    // Selection
    pub selected_article: usize,
    pub selected_feed: usize,
    pub selected_discovery: usize,

    // Forms
    pub login_form: AuthForm,
    pub register_form: AuthForm,
    /// Add-feed form; `Some` while open.
    pub feed_form: Option<FeedForm>,

    // Overlays
    pub pending_confirm: Option<ConfirmAction>,
    pub show_help: bool,

    /// Notification shown in the status bar and when it was raised.
    pub notification: Option<(Notification, Instant)>,

    /// Only render when state has changed
    pub needs_redraw: bool,
}

impl App {
    pub fn new(settings: UiSettings, view: View) -> Self {
        Self {
            settings,
            view,
            identity: None,
            articles: None,
            my_feeds: None,
            discovery: None,
            selected_article: 0,
            selected_feed: 0,
            selected_discovery: 0,
            login_form: AuthForm::default(),
            register_form: AuthForm::default(),
            feed_form: None,
            pending_confirm: None,
            show_help: false,
            notification: None,
            needs_redraw: true,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    /// Replace the collection a loader produced and keep selection in range.
    pub fn apply_collection(&mut self, collection: Collection) {
        match collection {
            Collection::Articles(listing) => self.articles = Some(listing),
            Collection::MyFeeds(listing) => self.my_feeds = Some(listing),
            Collection::Discovery(listing) => self.discovery = Some(listing),
        }
        self.clamp_selections();
    }

    /// Ensure selection indices are within bounds.
    pub fn clamp_selections(&mut self) {
        fn clamp<T>(selected: &mut usize, listing: &Option<Listing<T>>) {
            let len = listing.as_ref().map_or(0, |l| l.items().len());
            *selected = (*selected).min(len.saturating_sub(1));
        }
        clamp(&mut self.selected_article, &self.articles);
        clamp(&mut self.selected_feed, &self.my_feeds);
        clamp(&mut self.selected_discovery, &self.discovery);
    }

    pub fn selected_article(&self) -> Option<&ArticleSummary> {
        self.articles.as_ref()?.items().get(self.selected_article)
    }

    pub fn selected_followed_feed(&self) -> Option<&FeedSummary> {
        self.my_feeds.as_ref()?.items().get(self.selected_feed)
    }

    pub fn selected_discovery_feed(&self) -> Option<&FeedSummary> {
        self.discovery.as_ref()?.items().get(self.selected_discovery)
    }

    /// Navigate up in the current list
    pub fn nav_up(&mut self) {
        if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_sub(1);
        }
    }

    /// Navigate down in the current list
    pub fn nav_down(&mut self) {
        let len = match self.view {
            View::Home => self.articles.as_ref().map_or(0, |l| l.items().len()),
            View::Feeds => self.my_feeds.as_ref().map_or(0, |l| l.items().len()),
            View::Square => self.discovery.as_ref().map_or(0, |l| l.items().len()),
            View::LoginForm | View::RegisterForm => 0,
        };
        if let Some(selected) = self.selection_mut() {
            *selected = selected.saturating_add(1).min(len.saturating_sub(1));
        }
    }

    fn selection_mut(&mut self) -> Option<&mut usize> {
        match self.view {
            View::Home => Some(&mut self.selected_article),
            View::Feeds => Some(&mut self.selected_feed),
            View::Square => Some(&mut self.selected_discovery),
            View::LoginForm | View::RegisterForm => None,
        }
    }

    /// Forget everything tied to the previous user.
    pub fn reset_user_state(&mut self) {
        self.articles = None;
        self.my_feeds = None;
        self.discovery = None;
        self.selected_article = 0;
        self.selected_feed = 0;
        self.selected_discovery = 0;
        self.feed_form = None;
        self.pending_confirm = None;
        self.login_form.clear_password();
        self.register_form = AuthForm::default();
    }

    /// Show a notification (auto-expires after the configured duration)
    pub fn set_status(&mut self, notification: Notification) {
        self.notification = Some((notification, Instant::now()));
    }

    /// Clear the notification if expired.
    /// Returns true if a message was actually cleared
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, raised)) = &self.notification {
            if raised.elapsed() >= self.settings.notification_ttl {
                self.notification = None;
                return true;
            }
        }
        false
    }
}
