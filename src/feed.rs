use chrono::{ DateTime, Utc };
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Serialize;
use std::fmt;

use crate::data::{ AtomFeed, AtomText, RssDocument };
use crate::outcome::ListOutcome;

pub const DEFAULT_FEED_TITLE: &str = "RSS Feed";
pub const NO_TITLE: &str = "No Title";
pub const NO_DESCRIPTION: &str = "No Description";
pub const PLACEHOLDER_LINK: &str = "#";

/// Result of parsing a feed body. A parse failure is data, not an error:
/// it carries the parser's diagnostic through to the rendered page.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedDocument {
    WellFormed(Channel),
    Malformed(String),
}

/// Format independent view of a parsed feed.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct Channel {
    pub title: Option<String>,
    pub items: Vec<FeedItem>,
}

/// One item as it appeared in the document; the date is still the raw string.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
}

impl FeedDocument {
    /// Parses an RSS 2.0 or Atom document.
    pub fn parse(xml: &str) -> Self {
        let root = match root_element(xml) {
            Ok(root) => root,
            Err(e) => {
                return FeedDocument::Malformed(e);
            }
        };

        let channel = match root.as_str() {
            "rss" =>
                quick_xml::de::from_str::<RssDocument>(xml).map(|doc| Channel {
                    title: doc.channel.title,
                    items: doc.channel.items
                        .into_iter()
                        .map(|item| FeedItem {
                            title: item.title,
                            link: item.link,
                            description: item.description,
                            published: item.pub_date,
                        })
                        .collect(),
                }),
            "feed" =>
                quick_xml::de::from_str::<AtomFeed>(xml).map(|doc| Channel {
                    title: doc.title.map(|t| t.value),
                    items: doc.entries
                        .into_iter()
                        .map(|entry| FeedItem {
                            link: entry.alternate_link().map(str::to_string),
                            title: entry.title.map(|t| t.value),
                            description: entry.summary.or(entry.content).map(|t: AtomText| t.value),
                            published: entry.published,
                        })
                        .collect(),
                }),
            other => {
                return FeedDocument::Malformed(format!("unsupported feed root element <{}>", other));
            }
        };

        match channel {
            Ok(channel) => FeedDocument::WellFormed(channel),
            Err(e) => FeedDocument::Malformed(format!("invalid {} document: {}", root, e)),
        }
    }

    pub fn title(&self) -> &str {
        match self {
            FeedDocument::WellFormed(Channel { title: Some(title), .. }) if !title.trim().is_empty() => title.as_str(),
            _ => DEFAULT_FEED_TITLE,
        }
    }
}

/// Local name of the first element, or the reader's diagnostic.
fn root_element(xml: &str) -> Result<String, String> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => {
                return Err("document has no root element".to_string());
            }
            Ok(_) => {}
            Err(e) => {
                return Err(format!("XML error at byte {}: {}", reader.buffer_position(), e));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Published {
    Structured(DateTime<Utc>),
    /// The source string, verbatim, when it is not a recognizable date.
    Raw(String),
}

impl Published {
    fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        match DateTime::parse_from_rfc2822(trimmed).or_else(|_| DateTime::parse_from_rfc3339(trimmed)) {
            Ok(date) => Published::Structured(date.with_timezone(&Utc)),
            Err(_) => Published::Raw(raw.to_string()),
        }
    }
}

impl fmt::Display for Published {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Published::Structured(date) => write!(f, "{}", date.format("%Y-%m-%d %H:%M:%S")),
            Published::Raw(raw) => f.write_str(raw),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEntry {
    pub title: String,
    pub link: Option<String>,
    pub description: String,
    pub published_at: Option<Published>,
}

impl FeedEntry {
    pub fn href(&self) -> &str {
        self.link.as_deref().unwrap_or(PLACEHOLDER_LINK)
    }
}

impl From<&FeedItem> for FeedEntry {
    fn from(item: &FeedItem) -> Self {
        FeedEntry {
            title: item.title.clone().unwrap_or_else(|| NO_TITLE.to_string()),
            link: item.link
                .as_deref()
                .map(str::trim)
                .filter(|link| !link.is_empty())
                .map(str::to_string),
            description: item.description.clone().unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            published_at: item.published
                .as_deref()
                .filter(|raw| !raw.trim().is_empty())
                .map(Published::from_raw),
        }
    }
}

/// Maps a parsed document to display entries, keeping at most `limit` leading items.
pub fn normalize_feed(document: &FeedDocument, limit: Option<usize>) -> ListOutcome<FeedEntry> {
    match document {
        FeedDocument::Malformed(diagnostic) => ListOutcome::MalformedResponse(diagnostic.clone()),
        FeedDocument::WellFormed(channel) =>
            ListOutcome::Records(
                channel.items
                    .iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .map(FeedEntry::from)
                    .collect()
            ),
    }
}
