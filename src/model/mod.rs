//! Domain model types (pure).
//!
//! All types in this module are pure data with smart constructors.

pub mod error;
pub mod feed_item;
pub mod identifiers;
pub mod viewport;

// Re-export for convenience
pub use error::{
    AppError, FeedParseError, FocusError, InputError, PlaybackError, ScriptParseError,
};
pub use feed_item::{position_of, FeedItem};
pub use identifiers::{InvalidItemId, InvalidMediaLocator, ItemId, MediaLocator};
pub use viewport::{HostEvent, HostState, ViewportSnapshot, VisibleEntry};
