//! Feed item sources.
//!
//! Feeds are read once from a JSON array or a JSONL file (one item per
//! line). Without a file the built-in demo feed is used.
//!
//! Item fields: `id`, `media` (alias `mediaUrl`), optional `resume_ms`
//! (alias `lastPlayedPosition`), optional `thumbnail` (alias
//! `thumbnailFilePath`).

use crate::model::error::{AppError, FeedParseError, InputError};
use crate::model::{FeedItem, ItemId, MediaLocator};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Raw JSON structure for deserializing feed items.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RawFeedItem {
    id: String,
    #[serde(alias = "mediaUrl")]
    media: String,
    #[serde(default, alias = "lastPlayedPosition")]
    resume_ms: Option<u64>,
    #[serde(default, alias = "thumbnailFilePath")]
    thumbnail: Option<String>,
}

impl RawFeedItem {
    /// Validate into a [`FeedItem`].
    pub(crate) fn into_item(self) -> Result<FeedItem, String> {
        let id = ItemId::new(self.id).map_err(|e| e.to_string())?;
        let media = MediaLocator::new(self.media).map_err(|e| format!("{id}: {e}"))?;
        let mut item = FeedItem::new(id, media);
        if let Some(ms) = self.resume_ms {
            item = item.with_resume_offset(Duration::from_millis(ms));
        }
        if let Some(thumbnail) = self.thumbnail {
            item = item.with_thumbnail(thumbnail);
        }
        Ok(item)
    }
}

/// Validate a list of raw items; `line_of(i)` gives the line to report.
pub(crate) fn validate_items(
    raw: Vec<RawFeedItem>,
    line_of: impl Fn(usize) -> usize,
) -> Result<Vec<FeedItem>, FeedParseError> {
    let mut seen = HashSet::new();
    let mut items = Vec::with_capacity(raw.len());
    for (i, raw_item) in raw.into_iter().enumerate() {
        let item = raw_item
            .into_item()
            .map_err(|reason| FeedParseError::InvalidItem {
                line: line_of(i),
                reason,
            })?;
        if !seen.insert(item.id().clone()) {
            return Err(FeedParseError::DuplicateId {
                id: item.id().clone(),
            });
        }
        items.push(item);
    }
    Ok(items)
}

/// Parse feed text: a JSON array, or JSONL with one item per line.
///
/// ```
/// use feedplay::source::parse_feed;
///
/// let items = parse_feed(r#"[{"id":"a","media":"https://cdn.example.com/a.mp4"}]"#).unwrap();
/// assert_eq!(items[0].id().as_str(), "a");
/// ```
pub fn parse_feed(text: &str) -> Result<Vec<FeedItem>, FeedParseError> {
    if text.trim_start().starts_with('[') {
        let raw: Vec<RawFeedItem> =
            serde_json::from_str(text).map_err(|e| FeedParseError::InvalidJson {
                line: e.line(),
                reason: e.to_string(),
            })?;
        return validate_items(raw, |_| 1);
    }

    let mut raw = Vec::new();
    let mut lines = Vec::new();
    for (index, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let line_number = index + 1;
        let item: RawFeedItem =
            serde_json::from_str(line).map_err(|e| FeedParseError::InvalidJson {
                line: line_number,
                reason: e.to_string(),
            })?;
        raw.push(item);
        lines.push(line_number);
    }
    validate_items(raw, |i| lines[i])
}

/// Read a whole file.
///
/// # Errors
///
/// `InputError::FileNotFound` if the path does not exist, `InputError::Io`
/// for other failures.
pub fn read_file(path: &Path) -> Result<String, InputError> {
    if !path.exists() {
        return Err(InputError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(std::fs::read_to_string(path)?)
}

/// Load a feed from `path`, or the demo feed when `path` is `None`.
pub fn load_feed(path: Option<&Path>) -> Result<Vec<FeedItem>, AppError> {
    let Some(path) = path else {
        return Ok(demo_feed());
    };
    let text = read_file(path)?;
    let items = parse_feed(&text)?;
    info!(path = %path.display(), count = items.len(), "Loaded feed");
    Ok(items)
}

/// Built-in feed used when no file is given. Item `clip-05` points at
/// unavailable media to show the thumbnail fallback.
pub fn demo_feed() -> Vec<FeedItem> {
    (1..=12)
        .map(|n| {
            let id = format!("clip-{n:02}");
            let media = if n == 5 {
                format!("fail:https://media.example.com/{id}.mp4")
            } else {
                format!("https://media.example.com/{id}.mp4")
            };
            RawFeedItem {
                thumbnail: Some(format!("thumbs/{id}.jpg")),
                resume_ms: (n == 3).then_some(12_000),
                id,
                media,
            }
        })
        .filter_map(|raw| raw.into_item().ok())
        .collect()
}
