//! Simulated playback backend driven by a virtual clock.
//!
//! Used by the interactive demo, script replay and tests. Prepares complete
//! after a fixed delay of virtual time; media locators starting with
//! [`FAILING_MEDIA_PREFIX`] fail to prepare. Every command issued to a handle
//! is appended to a shared [`CommandLog`].

use crate::model::ItemId;
use crate::playback::{duration_millis, PlaybackBackend, PlaybackHandle, PrepareFailure, PrepareRequest, PrepareTicket};
use serde::Serialize;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

/// Media locators with this prefix fail to prepare.
pub const FAILING_MEDIA_PREFIX: &str = "fail:";

/// Shared virtual clock.
#[derive(Debug, Clone, Default)]
pub struct SimClock(Rc<Cell<Duration>>);

impl SimClock {
    /// Clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.0.get()
    }

    /// Move time forward by `delta`.
    pub fn advance(&self, delta: Duration) {
        self.0.set(self.0.get() + delta);
    }

    /// Jump to `time`. Never moves backwards.
    pub fn set(&self, time: Duration) {
        if time > self.0.get() {
            self.0.set(time);
        }
    }
}

/// A command the coordinator issued to a simulated resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum PlayerCommand {
    /// Prepare started.
    Load {
        /// Item id.
        item: String,
        /// Media locator.
        media: String,
        /// Start position in milliseconds.
        start_ms: u64,
    },
    /// Playback started or resumed.
    Play {
        /// Item id.
        item: String,
        /// Position in milliseconds.
        position_ms: u64,
    },
    /// Playback paused.
    Pause {
        /// Item id.
        item: String,
        /// Position in milliseconds.
        position_ms: u64,
    },
    /// Resource freed.
    Release {
        /// Item id.
        item: String,
        /// Position in milliseconds at release.
        position_ms: u64,
    },
}

/// Shared, append-only command log.
#[derive(Debug, Clone, Default)]
pub struct CommandLog(Rc<RefCell<Vec<PlayerCommand>>>);

impl CommandLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, command: PlayerCommand) {
        self.0.borrow_mut().push(command);
    }

    /// Copy of all commands recorded so far.
    pub fn snapshot(&self) -> Vec<PlayerCommand> {
        self.0.borrow().clone()
    }

    /// Remove and return all recorded commands.
    pub fn drain(&self) -> Vec<PlayerCommand> {
        std::mem::take(&mut *self.0.borrow_mut())
    }
}

#[derive(Debug)]
struct PendingPrepare {
    ticket: PrepareTicket,
    ready_at: Duration,
    outcome: Result<(), PrepareFailure>,
}

/// Backend whose prepares complete after `prepare_delay` of virtual time.
#[derive(Debug)]
pub struct SimBackend {
    clock: SimClock,
    log: CommandLog,
    prepare_delay: Duration,
    pending: Vec<PendingPrepare>,
    live_handles: Rc<Cell<usize>>,
}

impl SimBackend {
    /// Create a backend on `clock`.
    pub fn new(clock: SimClock, prepare_delay: Duration) -> Self {
        Self {
            clock,
            log: CommandLog::new(),
            prepare_delay,
            pending: Vec::new(),
            live_handles: Rc::new(Cell::new(0)),
        }
    }

    /// The shared command log.
    pub fn log(&self) -> CommandLog {
        self.log.clone()
    }

    /// The shared clock.
    pub fn clock(&self) -> &SimClock {
        &self.clock
    }

    /// Number of handles created and not yet released.
    pub fn live_handles(&self) -> usize {
        self.live_handles.get()
    }

    /// Time the earliest pending prepare becomes ready.
    pub fn next_ready_at(&self) -> Option<Duration> {
        self.pending.iter().map(|pending| pending.ready_at).min()
    }

    /// Remove and return every prepare that is ready at the current time,
    /// in ticket order. Abandoned prepares are returned too; the coordinator
    /// discards them.
    pub fn poll_completions(&mut self) -> Vec<(PrepareTicket, Result<(), PrepareFailure>)> {
        let now = self.clock.now();
        let (mut ready, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.pending)
            .into_iter()
            .partition(|pending| pending.ready_at <= now);
        self.pending = pending;
        ready.sort_by_key(|pending| pending.ticket);
        ready
            .into_iter()
            .map(|pending| (pending.ticket, pending.outcome))
            .collect()
    }
}

impl PlaybackBackend for SimBackend {
    type Handle = SimHandle;

    fn begin_prepare(&mut self, request: PrepareRequest) -> SimHandle {
        let outcome = if request.media.as_str().starts_with(FAILING_MEDIA_PREFIX) {
            Err(PrepareFailure::new(format!(
                "source unavailable: {}",
                request.media
            )))
        } else {
            Ok(())
        };
        self.pending.push(PendingPrepare {
            ticket: request.ticket,
            ready_at: self.clock.now() + self.prepare_delay,
            outcome,
        });
        self.log.push(PlayerCommand::Load {
            item: request.item.to_string(),
            media: request.media.to_string(),
            start_ms: duration_millis(request.start_at),
        });
        self.live_handles.set(self.live_handles.get() + 1);

        SimHandle {
            item: request.item,
            clock: self.clock.clone(),
            log: self.log.clone(),
            live_handles: Rc::clone(&self.live_handles),
            base: request.start_at,
            playing_since: None,
        }
    }
}

/// Simulated resource. Position advances with the clock while playing.
#[derive(Debug)]
pub struct SimHandle {
    item: ItemId,
    clock: SimClock,
    log: CommandLog,
    live_handles: Rc<Cell<usize>>,
    base: Duration,
    playing_since: Option<Duration>,
}

impl SimHandle {
    /// Item this handle was prepared for.
    pub fn item(&self) -> &ItemId {
        &self.item
    }

    /// Whether the handle is playing.
    pub fn is_playing(&self) -> bool {
        self.playing_since.is_some()
    }
}

impl PlaybackHandle for SimHandle {
    fn play(&mut self) {
        if self.playing_since.is_none() {
            self.playing_since = Some(self.clock.now());
            self.log.push(PlayerCommand::Play {
                item: self.item.to_string(),
                position_ms: duration_millis(self.base),
            });
        }
    }

    fn pause(&mut self) {
        if self.playing_since.is_some() {
            self.base = self.position();
            self.playing_since = None;
            self.log.push(PlayerCommand::Pause {
                item: self.item.to_string(),
                position_ms: duration_millis(self.base),
            });
        }
    }

    fn position(&self) -> Duration {
        match self.playing_since {
            Some(since) => self.base + self.clock.now().saturating_sub(since),
            None => self.base,
        }
    }

    fn release(self) {
        self.log.push(PlayerCommand::Release {
            item: self.item.to_string(),
            position_ms: duration_millis(self.position()),
        });
        self.live_handles.set(self.live_handles.get().saturating_sub(1));
    }
}
