use crate::app::App;
use crate::sync::{Severity, View};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    widgets::Paragraph,
    Frame,
};

/// Render the status bar
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    // Status bar needs at least 1 char width to be meaningful
    if area.width < 1 || area.height < 1 {
        return;
    }

    if let Some((notification, _)) = &app.notification {
        let style = match notification.severity {
            Severity::Normal => Style::default().bg(Color::Green).fg(Color::Black),
            Severity::Error => Style::default().bg(Color::Red).fg(Color::White),
        };
        f.render_widget(
            Paragraph::new(notification.message.as_str()).style(style),
            area,
        );
        return;
    }

    // Static keybinding hints
    let hints = match app.view {
        View::LoginForm | View::RegisterForm => "[Tab]next field [Enter]submit [Ctrl+R]switch form [Esc]quit",
        View::Home => "[1-3]views [j/k]move [o]pen [r]eload [L]ogout [?]help [q]uit",
        View::Feeds => "[1-3]views [a]dd feed [d]unfollow [o]pen [r]eload [L]ogout [?]help [q]uit",
        View::Square => "[1-3]views [f]ollow [o]pen [r]eload [L]ogout [?]help [q]uit",
    };

    let style = Style::default().bg(Color::DarkGray).fg(Color::White);
    f.render_widget(Paragraph::new(hints).style(style), area);
}
