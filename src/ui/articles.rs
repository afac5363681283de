use crate::app::App;
use crate::sync::ArticleSummary;
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

/// Shown in the description line when the server has none.
const NO_CONTENT: &str = "No content";

/// Render the Home view: aggregated articles, three lines each.
pub fn render(f: &mut Frame, app: &App, area: Rect) {
    let inner_width = area.width.saturating_sub(2) as usize;

    let (items, count): (Vec<ListItem>, usize) = match &app.articles {
        None => (vec![ListItem::new("Loading...")], 0),
        Some(listing) => match listing.placeholder() {
            Some(text) => (vec![ListItem::new(text)], 0),
            None => (
                listing
                    .items()
                    .iter()
                    .enumerate()
                    .map(|(i, article)| {
                        article_item(article, i == app.selected_article, inner_width)
                    })
                    .collect(),
                listing.items().len(),
            ),
        },
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!("Articles ({})", count)),
    );

    // ListState keeps the selected row scrolled into view
    let mut state = ListState::default().with_selected((count > 0).then_some(app.selected_article));
    f.render_stateful_widget(list, area, &mut state);
}

fn article_item(article: &ArticleSummary, selected: bool, width: usize) -> ListItem<'static> {
    let title_style = if selected {
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    let mut meta = format!("From: {}", article.feed_name);
    if let Some(published) = &article.published_at {
        meta.push_str(&format!(" | Published: {}", published));
    }
    let description = article.description.as_deref().unwrap_or(NO_CONTENT);

    ListItem::new(vec![
        Line::from(Span::styled(
            truncate_to_width(&article.title, width).into_owned(),
            title_style,
        )),
        Line::from(Span::styled(
            truncate_to_width(&meta, width).into_owned(),
            Style::default().fg(Color::Gray),
        )),
        Line::from(Span::styled(
            truncate_to_width(description, width).into_owned(),
            Style::default().fg(Color::DarkGray),
        )),
    ])
}
