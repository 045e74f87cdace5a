//! Terminal demo: a scrollable feed of cards driven by the playback
//! coordinator (impure shell).

pub mod constants;
mod feed_pane;
mod status_bar;
pub mod styles;

pub use styles::{ColorConfig, FeedStyles};

use crate::config::ResolvedConfig;
use crate::feed::{FeedController, FeedLayout, FocusMode};
use crate::integration::{deliver_ready, sim_controller};
use crate::model::{AppError, FeedItem, HostEvent, HostState, ItemId};
use crate::tracker::center_nearest;
use crate::playback::CompletionOutcome;
use crate::sim::{SimBackend, SimClock};
use constants::{STATUS_BAR_HEIGHT, TICK_INTERVAL};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Layout},
    Terminal,
};
use std::io::{self, Stdout};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors that can occur during TUI operations
#[derive(Debug, Error)]
pub enum TuiError {
    /// IO error during terminal operations
    #[error("Terminal IO error: {0}")]
    Io(#[from] io::Error),

    /// Application error
    #[error("Application error: {0}")]
    App(#[from] AppError),
}

/// Main TUI application
///
/// Generic over backend to support testing with TestBackend
pub struct TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    terminal: Terminal<B>,
    controller: FeedController<SimBackend>,
    layout: FeedLayout,
    clock: SimClock,
    started: Instant,
    scroll: u64,
    item_height: u16,
    viewport_rows: u16,
    styles: FeedStyles,
}

impl TuiApp<CrosstermBackend<Stdout>> {
    /// Create and initialize a new TUI application
    ///
    /// Sets up terminal in raw mode with alternate screen
    pub fn new(items: Vec<FeedItem>, config: &ResolvedConfig, styles: FeedStyles) -> Result<Self, TuiError> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self::with_terminal(terminal, items, config, styles))
    }

    /// Run the main event loop until the user quits.
    ///
    /// Wakes at least every [`TICK_INTERVAL`] to advance the clock and
    /// deliver prepare completions.
    pub fn run(&mut self) -> Result<(), TuiError> {
        self.draw()?;

        loop {
            if event::poll(TICK_INTERVAL)? {
                match event::read()? {
                    Event::Key(key) => {
                        if self.handle_key(key) {
                            self.controller.on_host_lifecycle(HostEvent::Destroyed);
                            return Ok(());
                        }
                    }
                    Event::Resize(_, height) => self.handle_resize(height),
                    Event::FocusLost => self.controller.on_host_lifecycle(HostEvent::Backgrounded),
                    Event::FocusGained => self.controller.on_host_lifecycle(HostEvent::Foregrounded),
                    _ => {}
                }
            }
            self.tick(self.started.elapsed());
            self.draw()?;
        }
    }
}

impl<B> TuiApp<B>
where
    B: ratatui::backend::Backend,
{
    /// Build the app on an existing terminal and compute the initial focus.
    pub fn with_terminal(
        terminal: Terminal<B>,
        items: Vec<FeedItem>,
        config: &ResolvedConfig,
        styles: FeedStyles,
    ) -> Self {
        let clock = SimClock::new();
        let host = if config.start_in_background {
            HostState::Background
        } else {
            HostState::Foreground
        };
        let item_height = config.item_height.max(1);
        let layout = FeedLayout::uniform(items.len(), u32::from(item_height));
        let controller = sim_controller(items, config.mode, &clock, config.prepare_delay, host);
        let viewport_rows = terminal
            .size()
            .map(|size| size.height.saturating_sub(STATUS_BAR_HEIGHT))
            .unwrap_or(0);

        let mut app = Self {
            terminal,
            controller,
            layout,
            clock,
            started: Instant::now(),
            scroll: 0,
            item_height,
            viewport_rows,
            styles,
        };
        info!(items = app.layout.len(), mode = %config.mode, "Starting feed demo");
        app.sync_viewport();
        app
    }

    /// The feed controller.
    pub fn controller(&self) -> &FeedController<SimBackend> {
        &self.controller
    }

    /// Current scroll offset in rows.
    pub fn scroll(&self) -> u64 {
        self.scroll
    }

    /// Terminal (for buffer inspection in tests).
    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    fn viewport_len(&self) -> u32 {
        u32::from(self.viewport_rows)
    }

    fn scroll_to(&mut self, scroll: i64) {
        let clamped = self.layout.clamp_scroll(scroll, self.viewport_len());
        if clamped != self.scroll {
            self.scroll = clamped;
            self.sync_viewport();
        }
    }

    fn scroll_by(&mut self, delta: i64) {
        let current = i64::try_from(self.scroll).unwrap_or(i64::MAX);
        self.scroll_to(current.saturating_add(delta));
    }

    fn sync_viewport(&mut self) {
        let snapshot = self.layout.snapshot(self.scroll, self.viewport_len());
        self.controller.on_viewport(snapshot);
    }

    /// Advance the virtual clock to `now` and deliver ready completions.
    pub fn tick(&mut self, now: Duration) {
        self.clock.set(now);
        for (ticket, outcome) in deliver_ready(&mut self.controller) {
            match outcome {
                CompletionOutcome::Bound(state) => debug!(%ticket, %state, "Resource bound"),
                CompletionOutcome::Failed(error) => warn!(%ticket, %error, "Prepare failed"),
                CompletionOutcome::Stale => debug!(%ticket, "Stale completion"),
            }
        }
    }

    fn select_centered(&mut self) {
        if self.controller.mode() != FocusMode::Reference {
            debug!("Selection ignored in autoplay mode");
            return;
        }
        let items = self.controller.items();
        let id: Option<ItemId> = self
            .controller
            .last_snapshot()
            .and_then(|snapshot| center_nearest(snapshot, items.len()))
            .and_then(|index| items.get(index))
            .map(|item| item.id().clone());
        if let Some(id) = id {
            if let Err(error) = self.controller.select(&id) {
                warn!(%error, "Selection failed");
            }
        }
    }

    fn toggle_host(&mut self) {
        let event = match self.controller.coordinator().host_state() {
            HostState::Foreground => HostEvent::Backgrounded,
            HostState::Background => HostEvent::Foregrounded,
        };
        self.controller.on_host_lifecycle(event);
    }

    /// Handle a key press. Returns `true` when the user quits.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.kind != KeyEventKind::Press {
            return false;
        }
        let page = i64::from(self.viewport_rows.max(1));

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return true,
            KeyCode::Char('j') | KeyCode::Down => self.scroll_by(1),
            KeyCode::Char('k') | KeyCode::Up => self.scroll_by(-1),
            KeyCode::PageDown | KeyCode::Char(' ') => self.scroll_by(page),
            KeyCode::PageUp => self.scroll_by(-page),
            KeyCode::Char('g') | KeyCode::Home => self.scroll_to(0),
            KeyCode::Char('G') | KeyCode::End => self.scroll_to(i64::MAX),
            KeyCode::Enter => self.select_centered(),
            KeyCode::Char('r') => self.controller.retry(),
            KeyCode::Char('b') => self.toggle_host(),
            _ => {}
        }
        false
    }

    fn handle_resize(&mut self, height: u16) {
        debug!(height, "Handling resize");
        self.viewport_rows = height.saturating_sub(STATUS_BAR_HEIGHT);
        self.scroll = self.layout.clamp_scroll(
            i64::try_from(self.scroll).unwrap_or(i64::MAX),
            self.viewport_len(),
        );
        self.sync_viewport();
    }

    /// Render the current frame.
    pub fn draw(&mut self) -> Result<(), TuiError> {
        let snapshot = self.controller.last_snapshot().cloned().unwrap_or_default();
        let controller = &self.controller;
        let styles = &self.styles;

        self.terminal.draw(|frame| {
            let [feed_area, status_area] =
                Layout::vertical([Constraint::Min(0), Constraint::Length(STATUS_BAR_HEIGHT)])
                    .areas(frame.area());
            feed_pane::render_feed(frame, feed_area, controller, &snapshot, styles);
            status_bar::render_status(frame, status_area, controller, styles);
        })?;
        Ok(())
    }

    /// Card height in rows.
    pub fn item_height(&self) -> u16 {
        self.item_height
    }
}

/// Run the interactive demo over `items`.
///
/// Note: Logging must be initialized by caller before calling this function.
pub fn run_demo(items: Vec<FeedItem>, config: &ResolvedConfig, styles: FeedStyles) -> Result<(), TuiError> {
    let mut app = TuiApp::new(items, config, styles)?;

    // Run the app and ensure cleanup happens even on error
    let result = app.run();
    drop(app);
    restore_terminal()?;

    result
}

/// Restore terminal to normal state
fn restore_terminal() -> Result<(), TuiError> {
    disable_raw_mode()?;
    io::stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

#[cfg(test)]
#[path = "view_tests.rs"]
mod tests;
