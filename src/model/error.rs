//! Error types for feedplay.
//!
//! Errors are split by blast radius:
//!
//! - [`PlaybackError`] and [`FocusError`] are **contained**: the coordinator and
//!   controller return or log them, and the feed keeps running. A failed prepare
//!   leaves the coordinator idle; the caller may retry by re-sending the focus.
//! - [`InputError`], [`FeedParseError`] and [`ScriptParseError`] come from the
//!   shell (files on disk). Feed loading failures are fatal at startup; script
//!   lines that fail to parse are reported and skipped.
//! - [`AppError`] is the top-level error of the binary.

use super::identifiers::ItemId;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error.
#[derive(Debug, Error)]
pub enum AppError {
    /// Failed to read a feed or script file.
    #[error("Failed to read input: {0}")]
    Input(#[from] InputError),

    /// Feed file content was invalid.
    #[error("Failed to load feed: {0}")]
    Feed(#[from] FeedParseError),

    /// Terminal or stdout error.
    #[error("Terminal error: {0}")]
    Terminal(#[from] std::io::Error),
}

/// Errors encountered when reading files from disk.
#[derive(Debug, Error)]
pub enum InputError {
    /// The given path does not exist.
    ///
    /// ```
    /// use std::path::PathBuf;
    /// use feedplay::model::error::InputError;
    ///
    /// let err = InputError::FileNotFound {
    ///     path: PathBuf::from("/tmp/missing.json")
    /// };
    /// assert!(err.to_string().contains("/tmp/missing.json"));
    /// ```
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found.
        path: PathBuf,
    },

    /// Any other I/O failure (permissions, disk errors).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A feed file that could not be turned into [`crate::model::FeedItem`]s.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FeedParseError {
    /// Not valid JSON / JSONL.
    #[error("Invalid JSON at line {line}: {reason}")]
    InvalidJson {
        /// 1-based line number (1 for whole-document JSON).
        line: usize,
        /// Parser message.
        reason: String,
    },

    /// JSON was well formed but an item was rejected.
    #[error("Invalid feed item at line {line}: {reason}")]
    InvalidItem {
        /// 1-based line number (1 for whole-document JSON).
        line: usize,
        /// Validation message.
        reason: String,
    },

    /// Two items share an id.
    #[error("Duplicate item id: {id}")]
    DuplicateId {
        /// The repeated id.
        id: ItemId,
    },
}

/// A replay script line that could not be parsed. Non-fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScriptParseError {
    /// Not valid JSON, or not a known event shape.
    #[error("Invalid script event at line {line}: {reason}")]
    InvalidEvent {
        /// 1-based line number.
        line: usize,
        /// Parser message.
        reason: String,
    },

    /// Event was well formed but carried invalid values.
    #[error("Invalid value at line {line}: {reason}")]
    InvalidValue {
        /// 1-based line number.
        line: usize,
        /// Validation message.
        reason: String,
    },
}

impl ScriptParseError {
    /// Line the error was found on.
    pub fn line(&self) -> usize {
        match self {
            Self::InvalidEvent { line, .. } | Self::InvalidValue { line, .. } => *line,
        }
    }
}

/// Playback failures surfaced by the coordinator.
///
/// Recoverable: no playback starts for the item, the coordinator returns to
/// idle, and re-sending the same focus retries the prepare.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    /// The resource failed to load the item's media.
    #[error("Failed to prepare {item}: {cause}")]
    PrepareFailed {
        /// Item whose prepare failed.
        item: ItemId,
        /// Backend-supplied cause.
        cause: String,
    },
}

impl PlaybackError {
    /// Item the failure belongs to.
    pub fn item(&self) -> &ItemId {
        match self {
            Self::PrepareFailed { item, .. } => item,
        }
    }
}

/// Focus requests that cannot be honoured. Treated as null focus.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FocusError {
    /// The id is not present in the current item list.
    #[error("Focused item {id} is not in the current feed")]
    InvalidFocus {
        /// The unknown id.
        id: ItemId,
    },
}
