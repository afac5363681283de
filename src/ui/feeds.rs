use crate::app::App;
use crate::sync::{FeedSummary, Listing, View};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Render the Feeds view (followed feeds) or the Square view (all feeds).
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let (listing, selected, title) = if app.view == View::Square {
        (&app.discovery, app.selected_discovery, "Square")
    } else {
        (&app.my_feeds, app.selected_feed, "My Feeds")
    };
    let inner_width = area.width.saturating_sub(2) as usize;

    let (items, count) = feed_items(listing, selected, inner_width);

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!("{} ({})", title, count)),
    );

    let mut state = ListState::default().with_selected((count > 0).then_some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn feed_items(
    listing: &Option<Listing<FeedSummary>>,
    selected: usize,
    width: usize,
) -> (Vec<ListItem<'static>>, usize) {
    let Some(listing) = listing else {
        return (vec![ListItem::new("Loading...")], 0);
    };
    if let Some(text) = listing.placeholder() {
        return (vec![ListItem::new(text)], 0);
    }

    let items = listing
        .items()
        .iter()
        .enumerate()
        .map(|(i, feed)| {
            let name_style = if i == selected {
                Style::default().bg(Color::DarkGray).fg(Color::White)
            } else {
                Style::default()
            };

            let mut lines = vec![
                Line::from(Span::styled(
                    truncate_to_width(&feed.name, width).into_owned(),
                    name_style,
                )),
                Line::from(Span::styled(
                    truncate_to_width(&feed.url, width).into_owned(),
                    Style::default().fg(Color::Blue),
                )),
            ];

            // Discovery rows carry follower stats; followed feeds do not
            if feed.follower_count.is_some() || feed.last_fetched_at.is_some() {
                let meta = format!(
                    "Followers: {} | Updated: {}",
                    feed.follower_count.unwrap_or(0),
                    feed.last_fetched_at.as_deref().unwrap_or("never")
                );
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&meta, width).into_owned(),
                    Style::default().fg(Color::DarkGray),
                )));
            }

            ListItem::new(lines)
        })
        .collect();

    (items, listing.items().len())
}
