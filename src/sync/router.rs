use super::loaders::LoaderKind;

/// The screens of the client. Exactly one is visible at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    LoginForm,
    RegisterForm,
    /// Aggregated articles from followed feeds.
    Home,
    /// Feeds the user follows, plus the add-feed form.
    Feeds,
    /// Every feed on the server (discovery).
    Square,
}

impl View {
    /// Views reachable from the navigation bar once signed in, in key order (1-3).
    pub const NAVIGABLE: [View; 3] = [View::Home, View::Feeds, View::Square];

    /// Loader whose data this view displays.
    pub fn loader(self) -> Option<LoaderKind> {
        match self {
            View::Home => Some(LoaderKind::Articles),
            View::Feeds => Some(LoaderKind::MyFeeds),
            View::Square => Some(LoaderKind::Discovery),
            View::LoginForm | View::RegisterForm => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            View::LoginForm => "Log in",
            View::RegisterForm => "Register",
            View::Home => "Home",
            View::Feeds => "My Feeds",
            View::Square => "Square",
        }
    }

    /// Form views are the only ones usable without a session.
    pub fn is_form(self) -> bool {
        matches!(self, View::LoginForm | View::RegisterForm)
    }
}

/// Tracks which view is active.
#[derive(Debug)]
pub struct ViewRouter {
    active: View,
}

impl ViewRouter {
    pub fn new(initial: View) -> Self {
        Self { active: initial }
    }

    pub fn active(&self) -> View {
        self.active
    }

    /// Make `view` the only active view and return the loader to run for it.
    ///
    /// Showing the already-active view is not a no-op for the caller: the
    /// loader is returned again so the data is refreshed.
    pub fn show(&mut self, view: View) -> Option<LoaderKind> {
        if self.active != view {
            tracing::debug!(from = ?self.active, to = ?view, "View changed");
        }
        self.active = view;
        view.loader()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_show_activates_exactly_one_view() {
        let mut router = ViewRouter::new(View::LoginForm);
        router.show(View::Feeds);
        assert_eq!(router.active(), View::Feeds);
        router.show(View::Square);
        assert_eq!(router.active(), View::Square);
    }

    #[test]
    fn test_show_is_idempotent() {
        let mut router = ViewRouter::new(View::LoginForm);
        assert_eq!(router.show(View::Home), Some(LoaderKind::Articles));
        assert_eq!(router.show(View::Home), Some(LoaderKind::Articles));
        assert_eq!(router.active(), View::Home);
    }

    #[test]
    fn test_loader_per_view() {
        assert_eq!(View::Home.loader(), Some(LoaderKind::Articles));
        assert_eq!(View::Feeds.loader(), Some(LoaderKind::MyFeeds));
        assert_eq!(View::Square.loader(), Some(LoaderKind::Discovery));
        assert_eq!(View::LoginForm.loader(), None);
        assert_eq!(View::RegisterForm.loader(), None);
    }
}
