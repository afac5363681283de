//! Application event handling.
//!
//! Applies the results of background tasks to the UI state.

use crate::app::{App, AppEvent};
use crate::sync::Notification;

/// Handle one event from a background task.
pub(super) fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::ShowView(view) => {
            if view.is_form() {
                app.feed_form = None;
                app.pending_confirm = None;
            }
            app.show_help = false;
            app.view = view;
        }
        AppEvent::CollectionLoaded(collection) => {
            tracing::debug!(loader = ?collection.kind(), "Collection replaced");
            app.apply_collection(collection);
        }
        AppEvent::FeedFormCleared => {
            app.feed_form = None;
        }
        AppEvent::SessionChanged(identity) => {
            if app.identity != identity {
                app.reset_user_state();
            }
            app.identity = identity;
        }
        AppEvent::Notify(notification) => {
            app.set_status(notification);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error = %error, "Background task panicked");
            app.set_status(Notification::error(format!("Internal error in {}", task)));
        }
    }
}
