//! Render functions for the TUI.
//!
//! This module handles all rendering logic, dispatching to the appropriate
//! view based on application state.

use crate::app::{App, ConfirmAction, FeedField, FeedForm};
use crate::sync::View;
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use super::{articles, feeds, forms, help, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 50;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Main render dispatch function.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    render_header(f, app, chunks[0]);
    match app.view {
        View::LoginForm | View::RegisterForm => forms::render(f, app, chunks[1]),
        View::Home => articles::render(f, app, chunks[1]),
        View::Feeds | View::Square => feeds::render(f, app, chunks[1]),
    }
    status::render(f, app, chunks[2]);

    if let Some(ref form) = app.feed_form {
        render_feed_form_overlay(f, form);
    }

    if app.show_help {
        help::render(f);
    }

    // Confirmation dialog goes on top of everything
    if let Some(ref confirm) = app.pending_confirm {
        render_confirm_overlay(f, confirm);
    }
}

/// Navigation tabs on the left, signed-in user on the right.
fn render_header(f: &mut Frame, app: &App, area: Rect) {
    let mut spans = vec![Span::styled(
        " rssdeck ",
        Style::default()
            .fg(Color::Black)
            .bg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )];

    if app.is_signed_in() {
        for (i, view) in View::NAVIGABLE.iter().enumerate() {
            let style = if *view == app.view {
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            spans.push(Span::styled(format!(" [{}] {} ", i + 1, view.title()), style));
        }
    }

    let user = match &app.identity {
        Some(name) => format!("Welcome, {} ", name),
        None => "Not logged in ".to_string(),
    };
    let used: usize = spans.iter().map(|s| s.width()).sum();
    let room = (area.width as usize).saturating_sub(used);
    let user = truncate_to_width(&user, room);
    spans.push(Span::raw(format!("{:>width$}", user, width = room)));

    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

/// Centered rectangle of at most `width` x `height`, or `None` if it would be unusably small.
pub(super) fn centered(area: Rect, width: u16, height: u16) -> Option<Rect> {
    let width = width.min(area.width.saturating_sub(4));
    let height = height.min(area.height.saturating_sub(4));
    if width < 20 || height < 5 {
        return None;
    }
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Some(Rect::new(x, y, width, height))
}

/// Render a confirmation dialog overlay centered on screen.
fn render_confirm_overlay(f: &mut Frame, confirm: &ConfirmAction) {
    let Some(overlay) = centered(f.area(), 50, 7) else {
        return;
    };
    let text = match confirm {
        ConfirmAction::Unfollow(_) => format!(
            "{}\n\nArticles from it will leave your home page.",
            confirm.prompt()
        ),
    };

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Yellow))
                .title(" Confirm "),
        )
        .alignment(Alignment::Center);
    f.render_widget(paragraph, overlay);
}

/// Render the add-feed form overlay.
fn render_feed_form_overlay(f: &mut Frame, form: &FeedForm) {
    let Some(overlay) = centered(f.area(), 64, 9) else {
        return;
    };
    let field_width = overlay.width.saturating_sub(10) as usize;

    let field = |label: &str, value: &str, focused: bool| {
        let cursor = if focused { "_" } else { "" };
        let style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!("{:<6}", label), style),
            Span::raw(format!(
                "> {}{}",
                forms::tail_to_width(value, field_width),
                cursor
            )),
        ])
    };

    let lines = vec![
        field("Name", &form.name, form.focus == FeedField::Name),
        field("URL", &form.url, form.focus == FeedField::Url),
        Line::from(""),
        Line::from(Span::styled(
            "(Enter) Add  (Tab) Next field  (Esc) Cancel",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, overlay);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Add Feed "),
    );
    f.render_widget(paragraph, overlay);
}
