use crate::app::{App, AuthField, AuthForm};
use crate::sync::View;
use crate::util::display_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::render::centered;

/// Render the login or register form.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let registering = app.view == View::RegisterForm;
    let (form, title, other) = if registering {
        (&app.register_form, " Register ", "Log in instead")
    } else {
        (&app.login_form, " Log in ", "Create an account")
    };

    let Some(panel) = centered(area, 56, 10) else {
        return;
    };
    let field_width = panel.width.saturating_sub(14) as usize;

    let masked = "*".repeat(form.password.chars().count());
    let lines = vec![
        Line::from(""),
        field_line("Username", &form.username, form, AuthField::Username, field_width),
        field_line("Password", &masked, form, AuthField::Password, field_width),
        Line::from(""),
        Line::from(Span::styled(
            format!("(Enter) Submit  (Tab) Next field  (Ctrl+R) {}", other),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "(Esc) Quit",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    f.render_widget(Clear, panel);
    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(title),
    );
    f.render_widget(paragraph, panel);
}

fn field_line(
    label: &str,
    value: &str,
    form: &AuthForm,
    field: AuthField,
    width: usize,
) -> Line<'static> {
    let focused = form.focus == field;
    let label_style = if focused {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(vec![
        Span::styled(format!(" {:<9}", label), label_style),
        Span::raw(format!(
            "> {}{}",
            tail_to_width(value, width),
            if focused { "_" } else { "" }
        )),
    ])
}

/// The end of `s` that fits in `width` columns, so the cursor stays visible.
pub(super) fn tail_to_width(s: &str, width: usize) -> &str {
    if display_width(s) <= width {
        return s;
    }
    let mut used = 0;
    let mut start = s.len();
    for (idx, c) in s.char_indices().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = idx;
    }
    &s[start..]
}
