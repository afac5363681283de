//! Input handling for the TUI.
//!
//! Keys are routed by overlay first (help, confirmation, add-feed form), then
//! by the active view. Anything that talks to the server is spawned through
//! the synchronizer; this module only ever mutates local state.

use crate::app::{App, AuthForm, ConfirmAction, FeedForm};
use crate::sync::{Credentials, NewFeed, Notification, PendingConfirmation, Synchronizer, View};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::helpers::{open_link, spawn_sync};
use super::Action;

/// Longest value accepted in any text field.
const MAX_FIELD_LENGTH: usize = 2048;

/// Main input dispatch function.
pub(super) fn handle_input(app: &mut App, key: KeyEvent, sync: &Synchronizer) -> Action {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    // Overlays capture all keys while visible
    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?')
        ) {
            app.show_help = false;
        }
        return Action::Continue;
    }
    if app.pending_confirm.is_some() {
        handle_confirm_input(app, key.code, sync);
        return Action::Continue;
    }
    if app.feed_form.is_some() {
        handle_feed_form_input(app, key.code, sync);
        return Action::Continue;
    }

    match app.view {
        View::LoginForm | View::RegisterForm => handle_auth_input(app, key, sync),
        View::Home | View::Feeds | View::Square => handle_list_input(app, key.code, sync),
    }
}

// ============================================================================
// Forms
// ============================================================================

fn handle_auth_input(app: &mut App, key: KeyEvent, sync: &Synchronizer) -> Action {
    let registering = app.view == View::RegisterForm;

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        if key.code == KeyCode::Char('r') {
            let other = if registering {
                View::LoginForm
            } else {
                View::RegisterForm
            };
            spawn_sync(sync, "navigate", move |s| async move { s.navigate(other).await });
        }
        return Action::Continue;
    }

    let form = if registering {
        &mut app.register_form
    } else {
        &mut app.login_form
    };

    match key.code {
        KeyCode::Esc => return Action::Quit,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
        KeyCode::Enter => submit_auth(form, registering, sync),
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) => push_char(form.focused_mut(), c),
        _ => {}
    }
    Action::Continue
}

fn submit_auth(form: &AuthForm, registering: bool, sync: &Synchronizer) {
    let credentials = Credentials::new(form.username.clone(), form.password.clone());
    if registering {
        spawn_sync(sync, "register", move |s| async move {
            let _ = s.register(credentials).await;
        });
    } else {
        spawn_sync(sync, "login", move |s| async move {
            let _ = s.login(credentials).await;
        });
    }
}

fn handle_feed_form_input(app: &mut App, code: KeyCode, sync: &Synchronizer) {
    let Some(form) = app.feed_form.as_mut() else {
        return;
    };
    match code {
        KeyCode::Esc => app.feed_form = None,
        KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => form.toggle_focus(),
        KeyCode::Enter => {
            // The form stays open until the server accepts the feed.
            let feed = NewFeed {
                name: form.name.clone(),
                url: form.url.clone(),
            };
            spawn_sync(sync, "add_feed", move |s| async move {
                let _ = s.add_feed(feed).await;
            });
        }
        KeyCode::Backspace => {
            form.focused_mut().pop();
        }
        KeyCode::Char(c) => push_char(form.focused_mut(), c),
        _ => {}
    }
}

fn push_char(field: &mut String, c: char) {
    if !c.is_control() && field.len() < MAX_FIELD_LENGTH {
        field.push(c);
    }
}

// ============================================================================
// Lists
// ============================================================================

fn handle_list_input(app: &mut App, code: KeyCode, sync: &Synchronizer) -> Action {
    match code {
        KeyCode::Char('q') => return Action::Quit,
        KeyCode::Char('?') => app.show_help = true,
        KeyCode::Char('j') | KeyCode::Down => app.nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.nav_up(),
        KeyCode::Char(c @ '1'..='3') => {
            let index = c as usize - '1' as usize;
            let view = View::NAVIGABLE[index];
            spawn_sync(sync, "navigate", move |s| async move { s.navigate(view).await });
        }
        KeyCode::Char('r') => {
            spawn_sync(sync, "reload", |s| async move { s.reload().await });
        }
        KeyCode::Char('L') => {
            spawn_sync(sync, "logout", |s| async move {
                let _ = s.logout().await;
            });
        }
        KeyCode::Char('o') | KeyCode::Enter => {
            let link = match app.view {
                View::Home => app.selected_article().map(|a| a.url.clone()),
                View::Feeds => app.selected_followed_feed().map(|f| f.url.clone()),
                View::Square => app.selected_discovery_feed().map(|f| f.url.clone()),
                View::LoginForm | View::RegisterForm => None,
            };
            if let Some(link) = link {
                open_link(app, &link);
            }
        }
        KeyCode::Char('a') if app.view == View::Feeds => {
            app.feed_form = Some(FeedForm::default());
        }
        KeyCode::Char('d') if app.view == View::Feeds => {
            if let Some(feed) = app.selected_followed_feed() {
                let prompt = format!("Unfollow '{}'? (y/n)", feed.name);
                app.pending_confirm = Some(ConfirmAction::Unfollow(PendingConfirmation::new(
                    feed.id.clone(),
                    prompt,
                )));
            }
        }
        KeyCode::Char('f') if app.view == View::Square => {
            if let Some(feed) = app.selected_discovery_feed() {
                let feed_id = feed.id.clone();
                spawn_sync(sync, "follow", move |s| async move {
                    let _ = s.follow(&feed_id).await;
                });
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Handle y/n on the confirmation overlay.
fn handle_confirm_input(app: &mut App, code: KeyCode, sync: &Synchronizer) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            if let Some(ConfirmAction::Unfollow(pending)) = app.pending_confirm.take() {
                let confirmed = pending.accept();
                spawn_sync(sync, "unfollow", move |s| async move {
                    let _ = s.unfollow(confirmed).await;
                });
            }
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            if let Some(ConfirmAction::Unfollow(pending)) = app.pending_confirm.take() {
                pending.decline();
            }
            app.set_status(Notification::info("Cancelled"));
        }
        _ => {}
    }
}
