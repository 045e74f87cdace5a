//! Feed items as delivered by the feed data source.

use super::identifiers::{ItemId, MediaLocator};
use std::time::Duration;

/// A single playable entry of a feed.
///
/// Immutable once fetched. Resume positions captured during playback are
/// tracked by the coordinator, not written back into the item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedItem {
    id: ItemId,
    media: MediaLocator,
    resume_offset: Option<Duration>,
    thumbnail: Option<String>,
}

impl FeedItem {
    /// Create an item with no resume offset and no thumbnail.
    pub fn new(id: ItemId, media: MediaLocator) -> Self {
        Self {
            id,
            media,
            resume_offset: None,
            thumbnail: None,
        }
    }

    /// Set the last-played position the item should resume from.
    pub fn with_resume_offset(mut self, offset: Duration) -> Self {
        self.resume_offset = Some(offset);
        self
    }

    /// Set the thumbnail reference shown while no frame is available.
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = Some(thumbnail.into());
        self
    }

    /// Stable unique id.
    pub fn id(&self) -> &ItemId {
        &self.id
    }

    /// Media locator handed to the playback backend.
    pub fn media(&self) -> &MediaLocator {
        &self.media
    }

    /// Last-played position delivered with the item, if any.
    pub fn resume_offset(&self) -> Option<Duration> {
        self.resume_offset
    }

    /// Thumbnail reference, if any.
    pub fn thumbnail(&self) -> Option<&str> {
        self.thumbnail.as_deref()
    }
}

/// Find the position of `id` in an item list.
pub fn position_of(items: &[FeedItem], id: &ItemId) -> Option<usize> {
    items.iter().position(|item| item.id() == id)
}
