//! Feed controller: items + viewport tracker + playback coordinator.
//!
//! The controller owns the current item list and the focused id, and keeps
//! the focused id valid against that list. It forwards a focus to the
//! coordinator only when the focus actually changes, so a failed prepare is
//! not retried on every scroll frame; [`FeedController::retry`] re-sends it
//! explicitly.

use crate::model::{position_of, FeedItem, FocusError, HostEvent, ItemId, ViewportSnapshot};
use crate::playback::{CompletionOutcome, CoordinatorState, PlaybackBackend, PlaybackCoordinator, PrepareFailure, PrepareTicket};
use crate::tracker::{compute_focused_item, visible_area_contains};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// How the focused item is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FocusMode {
    /// Focus follows the viewport (autoplay by visibility).
    #[default]
    Autoplay,
    /// Focus is set by selecting an item and cleared when it scrolls away.
    Reference,
}

impl FocusMode {
    /// Lowercase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Autoplay => "autoplay",
            Self::Reference => "reference",
        }
    }
}

impl fmt::Display for FocusMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FocusMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "autoplay" => Ok(Self::Autoplay),
            "reference" => Ok(Self::Reference),
            other => Err(format!("unknown focus mode: {other}")),
        }
    }
}

/// Wires a feed's items and viewport to a [`PlaybackCoordinator`].
pub struct FeedController<B: PlaybackBackend> {
    items: Vec<FeedItem>,
    mode: FocusMode,
    focused: Option<ItemId>,
    last_snapshot: Option<ViewportSnapshot>,
    coordinator: PlaybackCoordinator<B>,
}

impl<B: PlaybackBackend> FeedController<B> {
    /// Create a controller over `items`.
    pub fn new(items: Vec<FeedItem>, mode: FocusMode, coordinator: PlaybackCoordinator<B>) -> Self {
        Self {
            items,
            mode,
            focused: None,
            last_snapshot: None,
            coordinator,
        }
    }

    /// Current items.
    pub fn items(&self) -> &[FeedItem] {
        &self.items
    }

    /// Focus mode.
    pub fn mode(&self) -> FocusMode {
        self.mode
    }

    /// Focused id, always present in [`items`](Self::items) when set.
    pub fn focused_id(&self) -> Option<&ItemId> {
        self.focused.as_ref()
    }

    /// Focused item.
    pub fn focused(&self) -> Option<&FeedItem> {
        let id = self.focused.as_ref()?;
        self.items.iter().find(|item| item.id() == id)
    }

    /// The coordinator.
    pub fn coordinator(&self) -> &PlaybackCoordinator<B> {
        &self.coordinator
    }

    /// Mutable access to the coordinator.
    pub fn coordinator_mut(&mut self) -> &mut PlaybackCoordinator<B> {
        &mut self.coordinator
    }

    /// Last viewport snapshot received.
    pub fn last_snapshot(&self) -> Option<&ViewportSnapshot> {
        self.last_snapshot.as_ref()
    }

    /// Whether the renderer should show the static thumbnail for `id`.
    pub fn shows_thumbnail(&self, id: &ItemId) -> bool {
        let loaded = matches!(
            self.coordinator.state(),
            CoordinatorState::Playing | CoordinatorState::ReadyPaused
        );
        !(loaded && self.coordinator.bound_item() == Some(id))
    }

    /// Handle a new viewport snapshot.
    pub fn on_viewport(&mut self, snapshot: ViewportSnapshot) {
        if snapshot.total_items() != self.items.len() {
            debug!(
                snapshot_items = snapshot.total_items(),
                items = self.items.len(),
                "Viewport snapshot disagrees with item count"
            );
        }

        match self.mode {
            FocusMode::Autoplay => {
                let next = compute_focused_item(&snapshot, &self.items).map(|item| item.id().clone());
                self.set_focus(next);
            }
            FocusMode::Reference => {
                let scrolled_away = self
                    .focused
                    .as_ref()
                    .is_some_and(|id| !visible_area_contains(&snapshot, &self.items, id));
                if scrolled_away {
                    info!(item = ?self.focused, "Selected item left the viewport");
                    self.set_focus(None);
                }
            }
        }

        self.last_snapshot = Some(snapshot);
    }

    /// Select `id` explicitly (tap to play).
    ///
    /// An unknown id is an [`FocusError::InvalidFocus`] and clears the focus.
    pub fn select(&mut self, id: &ItemId) -> Result<(), FocusError> {
        if position_of(&self.items, id).is_none() {
            let error = FocusError::InvalidFocus { id: id.clone() };
            warn!(%error, "Ignoring selection");
            self.set_focus(None);
            return Err(error);
        }
        self.set_focus(Some(id.clone()));
        Ok(())
    }

    /// Clear the focus.
    pub fn clear_selection(&mut self) {
        self.set_focus(None);
    }

    /// Re-send the current focus, retrying a failed prepare.
    pub fn retry(&mut self) {
        let item = self
            .focused
            .as_ref()
            .and_then(|id| self.items.iter().find(|item| item.id() == id));
        self.coordinator.on_focus_changed(item);
    }

    /// Replace the item list (refresh or pagination).
    ///
    /// A focused id missing from the new list is an invalid focus and is
    /// cleared. The focus is then re-evaluated against the last snapshot: in
    /// autoplay mode it is re-derived, in reference mode a selection whose
    /// new index is no longer visible is cleared.
    pub fn replace_items(&mut self, items: Vec<FeedItem>) {
        info!(count = items.len(), "Replacing feed items");
        self.items = items;

        if let Some(id) = self.focused.clone() {
            if position_of(&self.items, &id).is_none() {
                let error = FocusError::InvalidFocus { id };
                warn!(%error, "Clearing focus after item replacement");
                self.set_focus(None);
            }
        }

        if let Some(snapshot) = self.last_snapshot.take() {
            self.on_viewport(snapshot);
        }
    }

    /// Forward a host lifecycle event.
    ///
    /// `Destroyed` tears down like [`dispose`](Self::dispose).
    pub fn on_host_lifecycle(&mut self, event: HostEvent) {
        match event {
            HostEvent::Destroyed => self.dispose(),
            event => self.coordinator.on_host_lifecycle(event),
        }
    }

    /// Forward a prepare completion.
    pub fn on_prepare_complete(
        &mut self,
        ticket: PrepareTicket,
        result: Result<(), PrepareFailure>,
    ) -> CompletionOutcome {
        self.coordinator.on_prepare_complete(ticket, result)
    }

    /// Dispose the coordinator.
    pub fn dispose(&mut self) {
        self.focused = None;
        self.coordinator.dispose();
    }

    fn set_focus(&mut self, next: Option<ItemId>) {
        if next == self.focused {
            return;
        }
        info!(from = ?self.focused, to = ?next, "Focus changed");
        self.focused = next;

        let item = self
            .focused
            .as_ref()
            .and_then(|id| self.items.iter().find(|item| item.id() == id));
        self.coordinator.on_focus_changed(item);
    }
}

impl<B: PlaybackBackend> fmt::Debug for FeedController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedController")
            .field("items", &self.items.len())
            .field("mode", &self.mode)
            .field("focused", &self.focused)
            .field("coordinator", &self.coordinator)
            .finish()
    }
}

#[cfg(test)]
#[path = "controller_tests.rs"]
mod tests;
