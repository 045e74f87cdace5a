//! Seams between the coordinator and the external playback resource.
//!
//! A [`PlaybackBackend`] creates one [`PlaybackHandle`] per prepare. Preparation
//! is asynchronous: `begin_prepare` returns immediately with the handle, and the
//! outcome is delivered later through
//! [`PlaybackCoordinator::on_prepare_complete`](super::PlaybackCoordinator::on_prepare_complete)
//! tagged with the request's [`PrepareTicket`].

use crate::model::{ItemId, MediaLocator};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Identifies one prepare request. Strictly increasing per coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PrepareTicket(u64);

impl PrepareTicket {
    /// Wrap a raw ticket value.
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// Raw ticket value.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PrepareTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Everything a backend needs to load one item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrepareRequest {
    /// Ticket the completion must be reported with.
    pub ticket: PrepareTicket,
    /// Item being loaded.
    pub item: ItemId,
    /// Media to load.
    pub media: MediaLocator,
    /// Position playback starts from.
    pub start_at: Duration,
}

/// Backend-reported reason a prepare failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct PrepareFailure(pub String);

impl PrepareFailure {
    /// Create a failure from any message.
    pub fn new(cause: impl Into<String>) -> Self {
        Self(cause.into())
    }
}

/// A live playback resource bound to one item.
///
/// Exclusively owned by the coordinator. `release` consumes the handle so a
/// released resource cannot be driven again.
pub trait PlaybackHandle {
    /// Start or resume playback.
    fn play(&mut self);

    /// Pause, retaining position.
    fn pause(&mut self);

    /// Current playback position.
    fn position(&self) -> Duration;

    /// Free the resource.
    fn release(self);
}

/// Factory for playback resources.
pub trait PlaybackBackend {
    /// Resource type produced by this backend.
    type Handle: PlaybackHandle;

    /// Start preparing `request` and return the (not yet ready) handle.
    ///
    /// Must not block. The handle starts paused.
    fn begin_prepare(&mut self, request: PrepareRequest) -> Self::Handle;
}

/// Whole milliseconds in `duration`, saturating at `u64::MAX`.
pub fn duration_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
