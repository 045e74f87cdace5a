//! Status bar: mode, coordinator state, host state, last error, key hints.

use super::constants::KEY_HINTS;
use super::feed_pane::format_position;
use super::styles::FeedStyles;
use crate::feed::FeedController;
use crate::model::HostState;
use crate::playback::PlaybackBackend;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

/// Status text for the current controller state.
pub(crate) fn status_text<B: PlaybackBackend>(controller: &FeedController<B>) -> String {
    let coordinator = controller.coordinator();

    let mut playback = coordinator.state().to_string();
    if let Some(item) = coordinator.bound_item() {
        playback.push(' ');
        playback.push_str(item.as_str());
    }
    if let Some(position) = coordinator.position() {
        playback.push_str(" @ ");
        playback.push_str(&format_position(position));
    }

    let host = match coordinator.host_state() {
        HostState::Foreground => "foreground",
        HostState::Background => "background",
    };

    let mut text = format!("{} │ {playback} │ {host}", controller.mode());
    if let Some(error) = coordinator.last_error() {
        text.push_str(" │ ! ");
        text.push_str(&error.to_string());
    }
    text.push_str(" │ ");
    text.push_str(KEY_HINTS);
    text
}

/// Render the status bar into `area`.
pub(crate) fn render_status<B: PlaybackBackend>(
    frame: &mut Frame,
    area: Rect,
    controller: &FeedController<B>,
    styles: &FeedStyles,
) {
    let line = Line::styled(status_text(controller), styles.status);
    frame.render_widget(Paragraph::new(line).style(styles.status), area);
}
