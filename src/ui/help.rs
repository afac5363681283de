//! Help overlay: key table grouped by view.

use ratatui::{
    layout::{Constraint, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Clear, Row, Table},
    Frame,
};

/// (key, description); an empty key marks a section heading.
const BINDINGS: &[(&str, &str)] = &[
    ("", "Everywhere"),
    ("1 / 2 / 3", "Home / My Feeds / Square"),
    ("j / k", "Move selection"),
    ("o / Enter", "Open link in browser"),
    ("r", "Reload current view"),
    ("L", "Log out"),
    ("q / Ctrl+C", "Quit"),
    ("", "My Feeds"),
    ("a", "Add a feed by URL"),
    ("d", "Unfollow selected feed"),
    ("", "Square"),
    ("f", "Follow selected feed"),
];

/// Render the help overlay on top of the current view.
pub fn render(f: &mut Frame) {
    let overlay = centered_rect(60, 70, f.area());
    if overlay.width < 20 || overlay.height < 6 {
        return;
    }
    f.render_widget(Clear, overlay);

    let heading = Style::default().add_modifier(Modifier::BOLD);
    let rows: Vec<Row> = BINDINGS
        .iter()
        .map(|(key, description)| {
            if key.is_empty() {
                Row::new(vec![format!("-- {} --", description), String::new()]).style(heading)
            } else {
                Row::new(vec![format!("  {}", key), description.to_string()])
            }
        })
        .collect();

    let widths = [Constraint::Length(14), Constraint::Min(20)];
    let table = Table::new(rows, widths).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Help (? to close) "),
    );
    f.render_widget(table, overlay);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let width = area.width * percent_x / 100;
    let height = area.height * percent_y / 100;
    let x = area.x + (area.width.saturating_sub(width)) / 2;
    let y = area.y + (area.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width, height)
}
