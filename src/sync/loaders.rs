//! Read-side refresh of the three server collections.
//!
//! Fetching and mapping are separate: [`Synchronizer::fetch`] performs the
//! request, the `map_*` functions turn the wire records into render-ready
//! rows without touching the network, and [`Synchronizer::load`] delivers the
//! result to the UI or reports the failure.

use super::{Notification, Synchronizer};
use crate::api::{ApiError, FeedId, FeedRecord, FollowRecord, PostRecord};
use crate::app::AppEvent;
use crate::util::one_line;
use chrono::{DateTime, Utc};
use std::collections::HashSet;

pub const NO_ARTICLES: &str = "No articles yet. Add an RSS feed to get started.";
pub const NO_FOLLOWS: &str = "You are not following any feeds yet.";
pub const NO_FEEDS: &str = "No feeds available.";

/// Which collection a loader refreshes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoaderKind {
    /// `GET /v1/posts` (auth)
    Articles,
    /// `GET /v1/feed_follows` (auth)
    MyFeeds,
    /// `GET /v1/feeds`
    Discovery,
}

impl LoaderKind {
    pub fn label(self) -> &'static str {
        match self {
            LoaderKind::Articles => "articles",
            LoaderKind::MyFeeds => "your feeds",
            LoaderKind::Discovery => "feeds",
        }
    }

    fn placeholder(self) -> &'static str {
        match self {
            LoaderKind::Articles => NO_ARTICLES,
            LoaderKind::MyFeeds => NO_FOLLOWS,
            LoaderKind::Discovery => NO_FEEDS,
        }
    }
}

/// A rendered collection: either rows or the fixed text for "nothing here".
#[derive(Debug, Clone, PartialEq)]
pub enum Listing<T> {
    Placeholder(&'static str),
    Items(Vec<T>),
}

impl<T> Listing<T> {
    fn from_rows(rows: Vec<T>, placeholder: &'static str) -> Self {
        if rows.is_empty() {
            Listing::Placeholder(placeholder)
        } else {
            Listing::Items(rows)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            Listing::Items(items) => items,
            Listing::Placeholder(_) => &[],
        }
    }

    pub fn placeholder(&self) -> Option<&'static str> {
        match self {
            Listing::Placeholder(text) => Some(text),
            Listing::Items(_) => None,
        }
    }
}

/// One article row.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleSummary {
    pub title: String,
    pub url: String,
    pub feed_name: String,
    /// `YYYY-MM-DD HH:MM` in UTC, or the server's text if it is not RFC 3339.
    pub published_at: Option<String>,
    pub description: Option<String>,
}

/// One feed row, shared by "my feeds" and discovery.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedSummary {
    pub id: FeedId,
    pub name: String,
    pub url: String,
    pub follower_count: Option<i64>,
    /// `YYYY-MM-DD`, absent for feeds never fetched.
    pub last_fetched_at: Option<String>,
}

/// A freshly loaded collection, replacing whatever was rendered before.
#[derive(Debug, Clone, PartialEq)]
pub enum Collection {
    Articles(Listing<ArticleSummary>),
    MyFeeds(Listing<FeedSummary>),
    Discovery(Listing<FeedSummary>),
}

impl Collection {
    pub fn kind(&self) -> LoaderKind {
        match self {
            Collection::Articles(_) => LoaderKind::Articles,
            Collection::MyFeeds(_) => LoaderKind::MyFeeds,
            Collection::Discovery(_) => LoaderKind::Discovery,
        }
    }
}

// ============================================================================
// Mapping
// ============================================================================

pub fn map_articles(posts: Vec<PostRecord>) -> Listing<ArticleSummary> {
    let rows = posts
        .into_iter()
        .map(|post| ArticleSummary {
            title: one_line(&post.title),
            url: post.url.trim().to_string(),
            feed_name: one_line(&post.feed_name),
            published_at: post.published_at.as_deref().map(|t| format_time(t, "%Y-%m-%d %H:%M")),
            description: post
                .description
                .as_deref()
                .map(one_line)
                .filter(|d| !d.is_empty()),
        })
        .collect();
    Listing::from_rows(rows, LoaderKind::Articles.placeholder())
}

/// Followed feeds, one row per feed id (first occurrence wins).
pub fn map_follows(follows: Vec<FollowRecord>) -> Listing<FeedSummary> {
    let mut seen = HashSet::new();
    let rows = follows
        .into_iter()
        .filter(|follow| seen.insert(follow.feed_id.clone()))
        .map(|follow| FeedSummary {
            id: follow.feed_id,
            name: one_line(&follow.feed_name),
            url: follow.feed_url.trim().to_string(),
            follower_count: None,
            last_fetched_at: None,
        })
        .collect();
    Listing::from_rows(rows, LoaderKind::MyFeeds.placeholder())
}

/// Discovery list in server order.
pub fn map_feeds(feeds: Vec<FeedRecord>) -> Listing<FeedSummary> {
    let rows = feeds
        .into_iter()
        .map(|feed| FeedSummary {
            id: feed.id,
            name: one_line(&feed.name),
            url: feed.url.trim().to_string(),
            follower_count: feed.follows_count,
            last_fetched_at: feed
                .last_fetched_at
                .as_deref()
                .map(|t| format_time(t, "%Y-%m-%d")),
        })
        .collect();
    Listing::from_rows(rows, LoaderKind::Discovery.placeholder())
}

fn format_time(raw: &str, fmt: &str) -> String {
    match DateTime::parse_from_rfc3339(raw.trim()) {
        Ok(t) => t.with_timezone(&Utc).format(fmt).to_string(),
        Err(_) => one_line(raw),
    }
}

// ============================================================================
// Loading
// ============================================================================

impl Synchronizer {
    /// Fetch and map one collection.
    pub async fn fetch(&self, kind: LoaderKind) -> Result<Collection, ApiError> {
        let collection = match kind {
            LoaderKind::Articles => Collection::Articles(map_articles(self.api.posts().await?)),
            LoaderKind::MyFeeds => {
                Collection::MyFeeds(map_follows(self.api.feed_follows().await?))
            }
            LoaderKind::Discovery => {
                Collection::Discovery(map_feeds(self.api.discover_feeds().await?))
            }
        };
        Ok(collection)
    }

    /// Refresh one collection in the UI.
    ///
    /// On failure an error notification is raised and the rendered
    /// collection is left as it was.
    pub async fn load(&self, kind: LoaderKind) {
        tracing::debug!(loader = ?kind, "Loading collection");
        match self.fetch(kind).await {
            Ok(collection) => self.emit(AppEvent::CollectionLoaded(collection)).await,
            Err(e) => {
                tracing::warn!(loader = ?kind, error = %e, "Loader failed");
                self.notify(Notification::error(format!(
                    "Failed to load {}: {}",
                    kind.label(),
                    e
                )))
                .await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn follow(id: &str, name: &str) -> FollowRecord {
        serde_json::from_value(json!({
            "FeedID": id,
            "FeedName": name,
            "FeedUrl": format!("https://example.com/{}.xml", id)
        }))
        .unwrap()
    }

    #[test]
    fn test_empty_posts_render_placeholder() {
        assert_eq!(map_articles(Vec::new()), Listing::Placeholder(NO_ARTICLES));
        assert_eq!(map_follows(Vec::new()), Listing::Placeholder(NO_FOLLOWS));
        assert_eq!(map_feeds(Vec::new()), Listing::Placeholder(NO_FEEDS));
    }

    #[test]
    fn test_map_articles_formats_row() {
        let post: PostRecord = serde_json::from_value(json!({
            "Title": "Release\n notes",
            "Url": " https://example.com/post ",
            "FeedName": "Example\x1b[31m",
            "PublishedAt": "2024-03-01T10:05:00+02:00",
            "Description": {"String": "", "Valid": true}
        }))
        .unwrap();

        let listing = map_articles(vec![post]);
        assert_eq!(
            listing.items(),
            &[ArticleSummary {
                title: "Release notes".to_string(),
                url: "https://example.com/post".to_string(),
                feed_name: "Example".to_string(),
                published_at: Some("2024-03-01 08:05".to_string()),
                description: None,
            }]
        );
    }

    #[test]
    fn test_unparseable_time_is_kept_verbatim() {
        assert_eq!(format_time("yesterday", "%Y-%m-%d"), "yesterday");
    }

    #[test]
    fn test_map_follows_dedupes_by_feed_id() {
        let listing = map_follows(vec![
            follow("42", "Answer"),
            follow("7", "Seven"),
            follow("42", "Answer again"),
        ]);
        let ids: Vec<String> = listing.items().iter().map(|f| f.id.to_string()).collect();
        assert_eq!(ids, vec!["42", "7"]);
        assert_eq!(listing.items()[0].name, "Answer");
    }

    #[test]
    fn test_map_feeds_keeps_counts() {
        let feed: FeedRecord = serde_json::from_value(json!({
            "ID": "f-1",
            "Name": "Rust",
            "Url": "https://blog.rust-lang.org/feed.xml",
            "FollowsCount": {"Int64": 3, "Valid": true},
            "LastFetchedAt": {"Time": "2024-03-01T23:59:00Z", "Valid": true}
        }))
        .unwrap();
        let listing = map_feeds(vec![feed]);
        let row = &listing.items()[0];
        assert_eq!(row.follower_count, Some(3));
        assert_eq!(row.last_fetched_at.as_deref(), Some("2024-03-01"));
        assert_eq!(listing.placeholder(), None);
    }
}
