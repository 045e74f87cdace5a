//! Headless replay of scripted feed sessions.
//!
//! Wires a [`FeedController`] to a [`SimBackend`] on a virtual clock and
//! turns each [`ScriptEvent`] into calls on the controller. Everything the
//! coordinator does is reported as a [`ReplayRecord`], so a replay is fully
//! deterministic and testable without a terminal.

use crate::feed::{FeedController, FeedLayout, FocusMode};
use crate::model::{FeedItem, HostState, ItemId, ViewportSnapshot};
use crate::playback::{duration_millis, CompletionOutcome, CoordinatorState, PlaybackCoordinator, PrepareTicket};
use crate::script::{Script, ScriptEvent, DEFAULT_ITEM_SIZE};
use crate::sim::{CommandLog, PlayerCommand, SimBackend, SimClock};
use serde::Serialize;
use std::io::Write;
use std::time::Duration;
use tracing::debug;

/// One line of replay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
pub enum ReplayRecord {
    /// A command issued to the simulated resource.
    Command {
        /// Virtual time in milliseconds.
        at_ms: u64,
        /// The command.
        command: PlayerCommand,
    },
    /// The controller's focus changed.
    Focus {
        /// Virtual time in milliseconds.
        at_ms: u64,
        /// New focus, `None` for null focus.
        item: Option<String>,
    },
    /// The coordinator changed state.
    State {
        /// Virtual time in milliseconds.
        at_ms: u64,
        /// New state.
        state: String,
    },
    /// A contained error (failed prepare, invalid selection).
    Error {
        /// Virtual time in milliseconds.
        at_ms: u64,
        /// Error message.
        message: String,
    },
    /// A prepare completion arrived for a superseded ticket.
    Stale {
        /// Virtual time in milliseconds.
        at_ms: u64,
        /// The discarded ticket.
        ticket: u64,
    },
    /// A script line that failed to parse.
    ParseError {
        /// 1-based script line.
        line: usize,
        /// Error message.
        message: String,
    },
}

/// Settings for a replay run.
#[derive(Debug, Clone)]
pub struct ReplayOptions {
    /// Focus mode of the controller.
    pub mode: FocusMode,
    /// Virtual time each prepare takes.
    pub prepare_delay: Duration,
    /// Start with the host in the background.
    pub start_in_background: bool,
    /// Feed used until the script sends an `items` event.
    pub items: Vec<FeedItem>,
    /// Card size for the initial feed's layout.
    pub item_size: u32,
}

impl Default for ReplayOptions {
    fn default() -> Self {
        Self {
            mode: FocusMode::default(),
            prepare_delay: Duration::from_millis(crate::config::DEFAULT_PREPARE_DELAY_MS),
            start_in_background: false,
            items: Vec::new(),
            item_size: DEFAULT_ITEM_SIZE,
        }
    }
}

/// Build a controller on a fresh simulated backend.
pub fn sim_controller(
    items: Vec<FeedItem>,
    mode: FocusMode,
    clock: &SimClock,
    prepare_delay: Duration,
    host: HostState,
) -> FeedController<SimBackend> {
    let backend = SimBackend::new(clock.clone(), prepare_delay);
    let coordinator = PlaybackCoordinator::with_host_state(backend, host);
    FeedController::new(items, mode, coordinator)
}

/// Deliver every prepare completion that is ready at the clock's current
/// time.
pub fn deliver_ready(
    controller: &mut FeedController<SimBackend>,
) -> Vec<(PrepareTicket, CompletionOutcome)> {
    let ready = controller.coordinator_mut().backend_mut().poll_completions();
    ready
        .into_iter()
        .map(|(ticket, result)| (ticket, controller.on_prepare_complete(ticket, result)))
        .collect()
}

struct Replay {
    clock: SimClock,
    log: CommandLog,
    controller: FeedController<SimBackend>,
    layout: FeedLayout,
    item_size: u32,
    records: Vec<ReplayRecord>,
    seen_focus: Option<ItemId>,
    seen_state: CoordinatorState,
}

impl Replay {
    fn new(options: &ReplayOptions) -> Self {
        let clock = SimClock::new();
        let host = if options.start_in_background {
            HostState::Background
        } else {
            HostState::Foreground
        };
        let controller = sim_controller(
            options.items.clone(),
            options.mode,
            &clock,
            options.prepare_delay,
            host,
        );
        let log = controller.coordinator().backend().log();
        let layout = FeedLayout::uniform(options.items.len(), options.item_size);
        let seen_state = controller.coordinator().state();

        Self {
            clock,
            log,
            controller,
            layout,
            item_size: options.item_size,
            records: Vec::new(),
            seen_focus: None,
            seen_state,
        }
    }

    fn now_ms(&self) -> u64 {
        duration_millis(self.clock.now())
    }

    fn apply(&mut self, line: usize, event: ScriptEvent) {
        debug!(line, ?event, "Replaying event");
        match event {
            ScriptEvent::Items { items, item_size } => {
                self.relayout(&items, item_size);
                self.controller.replace_items(items);
            }
            ScriptEvent::Viewport {
                entries,
                start,
                end,
                total,
            } => {
                let total = total.unwrap_or(self.controller.items().len());
                self.controller
                    .on_viewport(ViewportSnapshot::new(entries, start, end, total));
            }
            ScriptEvent::Scroll { offset, viewport } => {
                let scroll = self.layout.clamp_scroll(offset, viewport);
                let snapshot = self.layout.snapshot(scroll, viewport);
                self.controller.on_viewport(snapshot);
            }
            ScriptEvent::Select(id) => {
                if let Err(error) = self.controller.select(&id) {
                    self.observe();
                    self.records.push(ReplayRecord::Error {
                        at_ms: self.now_ms(),
                        message: error.to_string(),
                    });
                }
            }
            ScriptEvent::Retry => self.controller.retry(),
            ScriptEvent::Host(event) => self.controller.on_host_lifecycle(event),
            ScriptEvent::Advance(delta) => {
                self.advance(delta);
                return;
            }
            ScriptEvent::Dispose => self.controller.dispose(),
        }
        self.observe();
    }

    /// Extend the layout when `items` appends to the current list at the
    /// same size (pagination), rebuild it otherwise.
    fn relayout(&mut self, items: &[FeedItem], item_size: u32) {
        let current = self.controller.items();
        let appends = item_size == self.item_size
            && items.len() >= current.len()
            && current.iter().zip(items).all(|(old, new)| old.id() == new.id());

        if appends {
            for _ in self.layout.len()..items.len() {
                self.layout.push(item_size);
            }
        } else {
            self.layout = FeedLayout::uniform(items.len(), item_size);
            self.item_size = item_size;
        }
        debug!(items = items.len(), appended = appends, "Feed layout updated");
    }

    /// Step the clock through each pending prepare so completions land at
    /// their ready time.
    fn advance(&mut self, delta: Duration) {
        let target = self.clock.now() + delta;
        loop {
            let next = self.controller.coordinator().backend().next_ready_at();
            match next {
                Some(ready_at) if ready_at <= target => {
                    self.clock.set(ready_at);
                    for (ticket, outcome) in deliver_ready(&mut self.controller) {
                        self.observe();
                        match outcome {
                            CompletionOutcome::Bound(_) => {}
                            CompletionOutcome::Failed(error) => self.records.push(ReplayRecord::Error {
                                at_ms: self.now_ms(),
                                message: error.to_string(),
                            }),
                            CompletionOutcome::Stale => self.records.push(ReplayRecord::Stale {
                                at_ms: self.now_ms(),
                                ticket: ticket.value(),
                            }),
                        }
                    }
                }
                _ => break,
            }
        }
        self.clock.set(target);
        self.observe();
    }

    /// Record focus changes, resource commands and state changes since the
    /// last observation.
    fn observe(&mut self) {
        let at_ms = self.now_ms();

        let focus = self.controller.focused_id().cloned();
        if focus != self.seen_focus {
            self.records.push(ReplayRecord::Focus {
                at_ms,
                item: focus.as_ref().map(ToString::to_string),
            });
            self.seen_focus = focus;
        }

        for command in self.log.drain() {
            self.records.push(ReplayRecord::Command { at_ms, command });
        }

        let state = self.controller.coordinator().state();
        if state != self.seen_state {
            self.records.push(ReplayRecord::State {
                at_ms,
                state: state.to_string(),
            });
            self.seen_state = state;
        }
    }

    fn finish(mut self) -> Vec<ReplayRecord> {
        self.controller.dispose();
        self.observe();
        self.records
    }
}

/// Run `script` against a simulated backend and collect what happened.
///
/// Parse errors are reported in line order among the events. The
/// coordinator is disposed at the end, so every resource it bound shows up
/// as released.
pub fn run_script(script: &Script, options: &ReplayOptions) -> Vec<ReplayRecord> {
    let mut replay = Replay::new(options);
    let mut errors = script.errors.iter().peekable();

    for (line, event) in &script.events {
        while let Some(error) = errors.next_if(|error| error.line() < *line) {
            replay.records.push(ReplayRecord::ParseError {
                line: error.line(),
                message: error.to_string(),
            });
        }
        replay.apply(*line, event.clone());
    }
    for error in errors {
        replay.records.push(ReplayRecord::ParseError {
            line: error.line(),
            message: error.to_string(),
        });
    }

    replay.finish()
}

/// Write records as JSON lines.
pub fn write_records<W: Write>(records: &[ReplayRecord], mut out: W) -> std::io::Result<()> {
    for record in records {
        serde_json::to_writer(&mut out, record)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}
