//! Playback coordinator: keeps at most one resource bound to the focused item.
//!
//! ```text
//!            focus(x)               prepare ok + foreground
//!   Idle ───────────────▶ Loading ─────────────────────────▶ Playing
//!    ▲  ◀──── prepare err ──┘  │                             │   ▲
//!    │                         │ prepare ok + background     bg  fg
//!    │                         ▼                             ▼   │
//!    └──── focus(null) ─── ReadyPaused ◀─────────────────────────┘
//!
//!   dispose() from anywhere ──▶ Released (terminal)
//! ```
//!
//! The bound resource lives inside the phase enum, so there is never more
//! than one, and it is only reachable through the coordinator. Every exit
//! from a phase that owns a handle releases it.

use super::resource::{duration_millis, PlaybackBackend, PlaybackHandle, PrepareFailure, PrepareRequest, PrepareTicket};
use crate::model::{FeedItem, HostEvent, HostState, ItemId, PlaybackError};
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Externally visible coordinator state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoordinatorState {
    /// No session.
    Idle,
    /// Resource is being prepared.
    Loading,
    /// Resource is playing.
    Playing,
    /// Resource is loaded and paused.
    ReadyPaused,
    /// Disposed; accepts no further commands.
    Released,
}

impl CoordinatorState {
    /// Lowercase name used in logs and replay output.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Playing => "playing",
            Self::ReadyPaused => "ready_paused",
            Self::Released => "released",
        }
    }
}

impl fmt::Display for CoordinatorState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of delivering a prepare completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// The resource is bound; coordinator is now in the given state.
    Bound(CoordinatorState),
    /// The prepare failed; coordinator is idle.
    Failed(PlaybackError),
    /// The ticket was superseded or the coordinator was disposed.
    Stale,
}

struct Session<H> {
    item: ItemId,
    handle: H,
}

enum Phase<H> {
    Idle,
    Loading {
        session: Session<H>,
        ticket: PrepareTicket,
    },
    Playing(Session<H>),
    ReadyPaused(Session<H>),
    Released,
}

impl<H> Phase<H> {
    fn state(&self) -> CoordinatorState {
        match self {
            Phase::Idle => CoordinatorState::Idle,
            Phase::Loading { .. } => CoordinatorState::Loading,
            Phase::Playing(_) => CoordinatorState::Playing,
            Phase::ReadyPaused(_) => CoordinatorState::ReadyPaused,
            Phase::Released => CoordinatorState::Released,
        }
    }

    fn session(&self) -> Option<&Session<H>> {
        match self {
            Phase::Loading { session, .. } | Phase::Playing(session) | Phase::ReadyPaused(session) => {
                Some(session)
            }
            Phase::Idle | Phase::Released => None,
        }
    }

    fn loaded(&self) -> Option<&Session<H>> {
        match self {
            Phase::Playing(session) | Phase::ReadyPaused(session) => Some(session),
            _ => None,
        }
    }

    fn loaded_mut(&mut self) -> Option<&mut Session<H>> {
        match self {
            Phase::Playing(session) | Phase::ReadyPaused(session) => Some(session),
            _ => None,
        }
    }
}

/// Drives one playback resource from a stream of focus values and host
/// lifecycle events.
///
/// All methods are expected to be called from a single execution context.
/// Preparation completes asynchronously; the last [`on_focus_changed`] call
/// always wins and completions for superseded tickets are discarded.
///
/// Dropping the coordinator disposes it.
///
/// [`on_focus_changed`]: PlaybackCoordinator::on_focus_changed
pub struct PlaybackCoordinator<B: PlaybackBackend> {
    backend: B,
    phase: Phase<B::Handle>,
    host: HostState,
    focus: Option<ItemId>,
    resume_offsets: HashMap<ItemId, Duration>,
    next_ticket: u64,
    last_error: Option<PlaybackError>,
}

impl<B: PlaybackBackend> PlaybackCoordinator<B> {
    /// Create an idle coordinator for a foregrounded host.
    pub fn new(backend: B) -> Self {
        Self::with_host_state(backend, HostState::Foreground)
    }

    /// Create an idle coordinator with an explicit initial host state.
    pub fn with_host_state(backend: B, host: HostState) -> Self {
        Self {
            backend,
            phase: Phase::Idle,
            host,
            focus: None,
            resume_offsets: HashMap::new(),
            next_ticket: 1,
            last_error: None,
        }
    }

    /// Current state.
    pub fn state(&self) -> CoordinatorState {
        self.phase.state()
    }

    /// Last focus value received.
    pub fn focus(&self) -> Option<&ItemId> {
        self.focus.as_ref()
    }

    /// Item the resource is bound to (Loading, Playing or Ready-Paused).
    pub fn bound_item(&self) -> Option<&ItemId> {
        self.phase.session().map(|session| &session.item)
    }

    /// The bound resource, only while Playing or Ready-Paused.
    pub fn handle(&self) -> Option<&B::Handle> {
        self.phase.loaded().map(|session| &session.handle)
    }

    /// Mutable access to the bound resource for attaching a view sink.
    pub fn handle_mut(&mut self) -> Option<&mut B::Handle> {
        self.phase.loaded_mut().map(|session| &mut session.handle)
    }

    /// Position of the loaded resource, if any.
    pub fn position(&self) -> Option<Duration> {
        self.handle().map(PlaybackHandle::position)
    }

    /// Ticket of the in-flight prepare, if Loading.
    pub fn pending_ticket(&self) -> Option<PrepareTicket> {
        match &self.phase {
            Phase::Loading { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    /// Host state as last reported.
    pub fn host_state(&self) -> HostState {
        self.host
    }

    /// Position `id` will resume from, if one has been recorded.
    pub fn resume_offset(&self, id: &ItemId) -> Option<Duration> {
        self.resume_offsets.get(id).copied()
    }

    /// Most recent prepare failure, cleared when a new prepare starts.
    pub fn last_error(&self) -> Option<&PlaybackError> {
        self.last_error.as_ref()
    }

    /// The backend.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Mutable access to the backend (e.g. to poll completions).
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// Handle a new focus value.
    ///
    /// Same item as the bound session: no-op. Different item or `None`: the
    /// current session is torn down (capturing its position if loaded) before
    /// anything new is bound. An idle coordinator re-sent the same focus
    /// retries the prepare.
    pub fn on_focus_changed(&mut self, new_focus: Option<&FeedItem>) {
        if self.is_released() {
            trace!("Focus change ignored: coordinator released");
            return;
        }

        let new_id = new_focus.map(|item| item.id().clone());
        self.focus = new_id.clone();

        if let Some(bound) = self.bound_item() {
            if Some(bound) == new_id.as_ref() {
                trace!(item = %bound, "Focus unchanged");
                return;
            }
        }

        self.teardown_session();

        match new_focus {
            Some(item) => self.begin_load(item),
            None => {
                info!("Focus cleared, coordinator idle");
                self.phase = Phase::Idle;
            }
        }
    }

    /// Deliver the outcome of a prepare started with `ticket`.
    pub fn on_prepare_complete(
        &mut self,
        ticket: PrepareTicket,
        result: Result<(), PrepareFailure>,
    ) -> CompletionOutcome {
        let current = match &self.phase {
            Phase::Loading { ticket: current, .. } => Some(*current),
            _ => None,
        };
        if current != Some(ticket) {
            debug!(%ticket, state = %self.state(), "Discarding stale prepare completion");
            return CompletionOutcome::Stale;
        }

        let Phase::Loading { mut session, .. } = std::mem::replace(&mut self.phase, Phase::Idle)
        else {
            return CompletionOutcome::Stale;
        };

        match result {
            Ok(()) => {
                self.phase = match self.host {
                    HostState::Foreground => {
                        session.handle.play();
                        Phase::Playing(session)
                    }
                    HostState::Background => Phase::ReadyPaused(session),
                };
                info!(%ticket, state = %self.state(), item = ?self.bound_item(), "Prepare complete");
                CompletionOutcome::Bound(self.state())
            }
            Err(failure) => {
                let error = PlaybackError::PrepareFailed {
                    item: session.item,
                    cause: failure.0,
                };
                session.handle.release();
                warn!(%ticket, error = %error, "Prepare failed, coordinator idle");
                self.last_error = Some(error.clone());
                CompletionOutcome::Failed(error)
            }
        }
    }

    /// Handle a host lifecycle event. The bound item and its position are
    /// kept across background/foreground.
    pub fn on_host_lifecycle(&mut self, event: HostEvent) {
        if self.is_released() {
            trace!(?event, "Host event ignored: coordinator released");
            return;
        }

        match event {
            HostEvent::Foregrounded => {
                self.host = HostState::Foreground;
                if let Phase::ReadyPaused(_) = self.phase {
                    if let Phase::ReadyPaused(mut session) =
                        std::mem::replace(&mut self.phase, Phase::Idle)
                    {
                        session.handle.play();
                        info!(item = %session.item, "Host foregrounded, resuming");
                        self.phase = Phase::Playing(session);
                    }
                }
            }
            HostEvent::Backgrounded => {
                self.host = HostState::Background;
                if let Phase::Playing(_) = self.phase {
                    if let Phase::Playing(mut session) =
                        std::mem::replace(&mut self.phase, Phase::Idle)
                    {
                        session.handle.pause();
                        info!(item = %session.item, "Host backgrounded, pausing");
                        self.phase = Phase::ReadyPaused(session);
                    }
                }
            }
            HostEvent::Destroyed => self.dispose(),
        }
    }

    /// Release the resource and enter the terminal Released state.
    ///
    /// Idempotent. An in-flight prepare is abandoned; its completion will be
    /// reported as stale.
    pub fn dispose(&mut self) {
        if self.is_released() {
            return;
        }
        self.teardown_session();
        self.phase = Phase::Released;
        self.focus = None;
        info!("Coordinator released");
    }

    fn is_released(&self) -> bool {
        matches!(self.phase, Phase::Released)
    }

    fn begin_load(&mut self, item: &FeedItem) {
        let ticket = PrepareTicket::new(self.next_ticket);
        self.next_ticket += 1;

        let start_at = self
            .resume_offsets
            .get(item.id())
            .copied()
            .or(item.resume_offset())
            .unwrap_or_default();

        let request = PrepareRequest {
            ticket,
            item: item.id().clone(),
            media: item.media().clone(),
            start_at,
        };
        info!(%ticket, item = %item.id(), start_ms = duration_millis(start_at), "Loading");

        let handle = self.backend.begin_prepare(request);
        self.last_error = None;
        self.phase = Phase::Loading {
            session: Session {
                item: item.id().clone(),
                handle,
            },
            ticket,
        };
    }

    /// Release whatever session exists, capturing its position if loaded.
    /// Leaves the phase Idle (unless already Released).
    fn teardown_session(&mut self) {
        let phase = std::mem::replace(&mut self.phase, Phase::Idle);
        match phase {
            Phase::Loading { session, ticket } => {
                debug!(%ticket, item = %session.item, "Abandoning in-flight prepare");
                session.handle.release();
            }
            Phase::Playing(session) | Phase::ReadyPaused(session) => {
                let position = session.handle.position();
                debug!(item = %session.item, position_ms = duration_millis(position), "Capturing resume position");
                self.resume_offsets.insert(session.item, position);
                session.handle.release();
            }
            Phase::Released => self.phase = Phase::Released,
            Phase::Idle => {}
        }
    }
}

impl<B: PlaybackBackend> Drop for PlaybackCoordinator<B> {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl<B: PlaybackBackend> fmt::Debug for PlaybackCoordinator<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackCoordinator")
            .field("state", &self.state())
            .field("bound_item", &self.bound_item())
            .field("focus", &self.focus)
            .field("host", &self.host)
            .field("pending_ticket", &self.pending_ticket())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
