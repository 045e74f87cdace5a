//! Feed pane: one card per item, `item_height` rows each.
//!
//! Card rows, top to bottom: title, media locator, playback or thumbnail
//! line, blank padding, separator. Short cards drop rows from the middle.
//! Cards scrolled partly out of the viewport are clipped row by row.

use super::constants::FOCUS_MARKER;
use super::styles::FeedStyles;
use crate::feed::FeedController;
use crate::model::{FeedItem, ViewportSnapshot};
use crate::playback::{CoordinatorState, PlaybackBackend};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use std::time::Duration;

/// `12.3s`.
pub(crate) fn format_position(position: Duration) -> String {
    format!("{:.1}s", position.as_secs_f64())
}

fn playback_line<B: PlaybackBackend>(
    controller: &FeedController<B>,
    item: &FeedItem,
    styles: &FeedStyles,
) -> Line<'static> {
    let coordinator = controller.coordinator();

    if !controller.shows_thumbnail(item.id()) {
        let label = match coordinator.state() {
            CoordinatorState::Playing => "playing",
            _ => "paused",
        };
        let position = coordinator.position().unwrap_or_default();
        return Line::styled(format!("  {label} {}", format_position(position)), styles.playing);
    }

    if coordinator.state() == CoordinatorState::Loading && coordinator.bound_item() == Some(item.id()) {
        return Line::styled("  loading", styles.muted);
    }

    if let Some(error) = coordinator.last_error().filter(|error| error.item() == item.id()) {
        return Line::styled(format!("  ! {error}"), styles.error);
    }

    match item.thumbnail() {
        Some(thumbnail) => Line::styled(format!("  [{thumbnail}]"), styles.muted),
        None => Line::styled("  [no thumbnail]", styles.muted),
    }
}

/// All rows of the card for `item`.
pub(crate) fn card_lines<B: PlaybackBackend>(
    controller: &FeedController<B>,
    item: &FeedItem,
    height: usize,
    width: u16,
    styles: &FeedStyles,
) -> Vec<Line<'static>> {
    let focused = controller.focused_id() == Some(item.id());
    let title = if focused {
        Line::from(Span::styled(format!("{FOCUS_MARKER} {}", item.id()), styles.focused))
    } else {
        Line::from(Span::styled(format!("  {}", item.id()), styles.title))
    };

    let mut body = vec![
        Line::styled(format!("  {}", item.media()), styles.muted),
        playback_line(controller, item, styles),
    ];
    let separator = Line::styled("─".repeat(usize::from(width)), styles.muted);

    let mut lines = Vec::with_capacity(height);
    match height {
        0 => {}
        1 => lines.push(title),
        _ => {
            lines.push(title);
            body.truncate(height - 2);
            lines.extend(body);
            lines.resize(height - 1, Line::default());
            lines.push(separator);
        }
    }
    lines
}

/// Rows visible in the viewport for `snapshot`, in screen order.
pub(crate) fn visible_lines<B: PlaybackBackend>(
    controller: &FeedController<B>,
    snapshot: &ViewportSnapshot,
    width: u16,
    styles: &FeedStyles,
) -> Vec<Line<'static>> {
    let viewport_end = i64::from(snapshot.viewport_end());
    let mut lines = Vec::new();

    for entry in snapshot.entries() {
        let Some(item) = controller.items().get(entry.index) else {
            continue;
        };
        let card = card_lines(controller, item, entry.size as usize, width, styles);
        for (row, line) in card.into_iter().enumerate() {
            let y = i64::from(entry.offset) + row as i64;
            if y >= 0 && y < viewport_end {
                lines.push(line);
            }
        }
    }
    lines
}

/// Render the feed pane into `area`.
pub(crate) fn render_feed<B: PlaybackBackend>(
    frame: &mut Frame,
    area: Rect,
    controller: &FeedController<B>,
    snapshot: &ViewportSnapshot,
    styles: &FeedStyles,
) {
    let lines = visible_lines(controller, snapshot, area.width, styles);
    frame.render_widget(Paragraph::new(lines), area);
}
