//! Helper functions shared across the UI layer.

use crate::app::{App, AppEvent};
use crate::sync::{Notification, Synchronizer};
use crate::util::validate_link;
use futures::FutureExt;
use std::future::Future;
use std::panic::AssertUnwindSafe;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a panicking background task silently disappearing, the panic
/// message comes back as `Err(String)` so the UI can report it.
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            }
        })
}

/// Run a synchronizer operation in the background.
///
/// Commands report their own failures as notifications, so the task only has
/// to surface panics.
pub(super) fn spawn_sync<F, Fut>(sync: &Synchronizer, task: &'static str, op: F)
where
    F: FnOnce(Synchronizer) -> Fut,
    Fut: Future<Output = ()> + Send + 'static,
{
    let work = op(sync.clone());
    let sync = sync.clone();
    tokio::spawn(async move {
        if let Err(panic_msg) = catch_task_panic(work).await {
            tracing::error!(task, error = %panic_msg, "Background task panicked");
            sync.emit(AppEvent::TaskPanicked {
                task,
                error: panic_msg,
            })
            .await;
        }
    });
}

/// Open `link` in the system browser, or show it when opening is disabled.
pub(super) fn open_link(app: &mut App, link: &str) {
    if link.is_empty() {
        app.set_status(Notification::error("No link for this item"));
        return;
    }
    if !app.settings.open_links_in_browser {
        app.set_status(Notification::info(link.to_string()));
        return;
    }
    match validate_link(link) {
        Ok(url) => match open::that(url.as_str()) {
            Ok(()) => app.set_status(Notification::info("Opening in browser...")),
            Err(e) => app.set_status(Notification::error(format!(
                "Failed to open browser: {}",
                e
            ))),
        },
        Err(e) => app.set_status(Notification::error(e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::UiSettings;
    use crate::sync::View;

    #[tokio::test]
    async fn test_catch_task_panic_ok() {
        assert_eq!(catch_task_panic(async { 7 }).await, Ok(7));
    }

    #[tokio::test]
    async fn test_catch_task_panic_message() {
        let result = catch_task_panic(async {
            panic!("loader exploded");
        })
        .await;
        assert_eq!(result, Err::<(), _>("loader exploded".to_string()));
    }

    #[test]
    fn test_open_link_disabled_shows_url() {
        let mut app = App::new(
            UiSettings {
                open_links_in_browser: false,
                ..UiSettings::default()
            },
            View::Home,
        );
        open_link(&mut app, "https://example.com/post");
        let (notification, _) = app.notification.as_ref().unwrap();
        assert_eq!(notification.message, "https://example.com/post");
        assert!(!notification.is_error());
    }

    #[test]
    fn test_open_link_rejects_other_schemes() {
        let mut app = App::new(UiSettings::default(), View::Home);
        open_link(&mut app, "javascript:alert(1)");
        assert!(app.notification.as_ref().unwrap().0.is_error());
    }
}
