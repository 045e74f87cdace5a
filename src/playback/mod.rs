//! Playback lifecycle coordination.
//!
//! [`PlaybackCoordinator`] translates focus changes and host lifecycle events
//! into commands on a single [`PlaybackHandle`] obtained from a
//! [`PlaybackBackend`].

pub mod coordinator;
pub mod resource;

pub use coordinator::{CompletionOutcome, CoordinatorState, PlaybackCoordinator};
pub use resource::{duration_millis, PlaybackBackend, PlaybackHandle, PrepareFailure, PrepareRequest, PrepareTicket};
