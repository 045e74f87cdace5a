//! Replay script parsing.
//!
//! A script is JSONL, one event per line, tagged by `"event"`:
//!
//! ```text
//! {"event":"items","items":[{"id":"a","media":"m/a"}],"item_size":300}
//! {"event":"viewport","start":0,"end":600,"entries":[{"index":0,"offset":0,"size":300}]}
//! {"event":"scroll","offset":150,"viewport":600}
//! {"event":"select","id":"a"}
//! {"event":"retry"}
//! {"event":"host","state":"backgrounded"}
//! {"event":"advance","ms":100}
//! {"event":"dispose"}
//! ```
//!
//! Blank lines are skipped. A malformed line yields a [`ScriptParseError`]
//! and parsing continues with the next line.

use crate::model::{FeedItem, HostEvent, ItemId, ScriptParseError, VisibleEntry};
use crate::source::{validate_items, RawFeedItem};
use serde::Deserialize;
use std::time::Duration;

/// Card size used when an `items` event gives none.
pub const DEFAULT_ITEM_SIZE: u32 = 300;

/// One parsed script event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptEvent {
    /// Replace the feed. `item_size` drives the layout used by `Scroll`.
    Items {
        /// New item list.
        items: Vec<FeedItem>,
        /// Uniform card size in pixels.
        item_size: u32,
    },
    /// A raw viewport snapshot.
    Viewport {
        /// Visible entries in index order.
        entries: Vec<VisibleEntry>,
        /// Viewport start.
        start: i32,
        /// Viewport end.
        end: i32,
        /// Item count the layout was computed for; defaults to the current
        /// feed length.
        total: Option<usize>,
    },
    /// Scroll the layout to `offset` with a viewport of `viewport` pixels.
    Scroll {
        /// Scroll offset, clamped to the content.
        offset: i64,
        /// Viewport length.
        viewport: u32,
    },
    /// Explicit selection.
    Select(ItemId),
    /// Re-send the current focus.
    Retry,
    /// Host lifecycle event.
    Host(HostEvent),
    /// Advance the virtual clock.
    Advance(Duration),
    /// Dispose the coordinator.
    Dispose,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum HostStateName {
    Foregrounded,
    Backgrounded,
    Destroyed,
}

impl From<HostStateName> for HostEvent {
    fn from(name: HostStateName) -> Self {
        match name {
            HostStateName::Foregrounded => HostEvent::Foregrounded,
            HostStateName::Backgrounded => HostEvent::Backgrounded,
            HostStateName::Destroyed => HostEvent::Destroyed,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    index: usize,
    offset: i32,
    size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum RawEvent {
    Items {
        items: Vec<RawFeedItem>,
        #[serde(default)]
        item_size: Option<u32>,
    },
    Viewport {
        start: i32,
        end: i32,
        #[serde(default)]
        entries: Vec<RawEntry>,
        #[serde(default)]
        total: Option<usize>,
    },
    Scroll {
        offset: i64,
        viewport: u32,
    },
    Select {
        id: String,
    },
    Retry,
    Host {
        state: HostStateName,
    },
    Advance {
        ms: u64,
    },
    Dispose,
}

/// Parse one script line. `Ok(None)` for blank lines.
///
/// ```
/// use feedplay::script::{parse_line, ScriptEvent};
/// use std::time::Duration;
///
/// let event = parse_line(r#"{"event":"advance","ms":250}"#, 1).unwrap();
/// assert_eq!(event, Some(ScriptEvent::Advance(Duration::from_millis(250))));
/// ```
pub fn parse_line(line: &str, line_number: usize) -> Result<Option<ScriptEvent>, ScriptParseError> {
    if line.trim().is_empty() {
        return Ok(None);
    }

    let raw: RawEvent = serde_json::from_str(line).map_err(|e| ScriptParseError::InvalidEvent {
        line: line_number,
        reason: e.to_string(),
    })?;
    let invalid = |reason: String| ScriptParseError::InvalidValue {
        line: line_number,
        reason,
    };

    let event = match raw {
        RawEvent::Items { items, item_size } => {
            let item_size = item_size.unwrap_or(DEFAULT_ITEM_SIZE);
            if item_size == 0 {
                return Err(invalid("item_size must be positive".to_string()));
            }
            let items = validate_items(items, |_| line_number).map_err(|e| invalid(e.to_string()))?;
            ScriptEvent::Items { items, item_size }
        }
        RawEvent::Viewport {
            start,
            end,
            entries,
            total,
        } => {
            if start > end {
                return Err(invalid(format!("viewport start {start} is after end {end}")));
            }
            let entries = entries
                .into_iter()
                .map(|entry| VisibleEntry::new(entry.index, entry.offset, entry.size))
                .collect();
            ScriptEvent::Viewport {
                entries,
                start,
                end,
                total,
            }
        }
        RawEvent::Scroll { offset, viewport } => ScriptEvent::Scroll { offset, viewport },
        RawEvent::Select { id } => ScriptEvent::Select(ItemId::new(id).map_err(|e| invalid(e.to_string()))?),
        RawEvent::Retry => ScriptEvent::Retry,
        RawEvent::Host { state } => ScriptEvent::Host(state.into()),
        RawEvent::Advance { ms } => ScriptEvent::Advance(Duration::from_millis(ms)),
        RawEvent::Dispose => ScriptEvent::Dispose,
    };
    Ok(Some(event))
}

/// A parsed script: events with their line numbers, plus every line that
/// failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Script {
    /// `(line, event)` pairs in file order.
    pub events: Vec<(usize, ScriptEvent)>,
    /// Lines that failed to parse.
    pub errors: Vec<ScriptParseError>,
}

/// Parse a whole script, collecting errors instead of stopping.
pub fn parse_script(text: &str) -> Script {
    let mut script = Script::default();
    for (index, line) in text.lines().enumerate() {
        let line_number = index + 1;
        match parse_line(line, line_number) {
            Ok(Some(event)) => script.events.push((line_number, event)),
            Ok(None) => {}
            Err(error) => script.errors.push(error),
        }
    }
    script
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_line_is_none() {
        assert_eq!(parse_line("   ", 4).unwrap(), None);
    }

    #[test]
    fn parses_items_with_default_size() {
        let event = parse_line(
            r#"{"event":"items","items":[{"id":"a","media":"m/a","resume_ms":500}]}"#,
            1,
        )
        .unwrap()
        .unwrap();

        let ScriptEvent::Items { items, item_size } = event else {
            panic!("expected items event, got {event:?}");
        };
        assert_eq!(item_size, DEFAULT_ITEM_SIZE);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].resume_offset(), Some(Duration::from_millis(500)));
    }

    #[test]
    fn parses_viewport() {
        let event = parse_line(
            r#"{"event":"viewport","start":50,"end":350,"entries":[{"index":1,"offset":100,"size":100}],"total":4}"#,
            2,
        )
        .unwrap();

        assert_eq!(
            event,
            Some(ScriptEvent::Viewport {
                entries: vec![VisibleEntry::new(1, 100, 100)],
                start: 50,
                end: 350,
                total: Some(4),
            })
        );
    }

    #[test]
    fn parses_host_states() {
        assert_eq!(
            parse_line(r#"{"event":"host","state":"backgrounded"}"#, 1).unwrap(),
            Some(ScriptEvent::Host(HostEvent::Backgrounded))
        );
        assert_eq!(
            parse_line(r#"{"event":"host","state":"destroyed"}"#, 1).unwrap(),
            Some(ScriptEvent::Host(HostEvent::Destroyed))
        );
    }

    #[test]
    fn parses_unit_events() {
        assert_eq!(parse_line(r#"{"event":"dispose"}"#, 1).unwrap(), Some(ScriptEvent::Dispose));
        assert_eq!(parse_line(r#"{"event":"retry"}"#, 1).unwrap(), Some(ScriptEvent::Retry));
    }

    #[test]
    fn unknown_event_is_invalid_event() {
        let err = parse_line(r#"{"event":"rewind"}"#, 7).unwrap_err();
        assert!(matches!(err, ScriptParseError::InvalidEvent { line: 7, .. }), "got {err:?}");
    }

    #[test]
    fn inverted_viewport_is_invalid_value() {
        let err = parse_line(r#"{"event":"viewport","start":10,"end":5}"#, 3).unwrap_err();
        assert!(matches!(err, ScriptParseError::InvalidValue { line: 3, .. }), "got {err:?}");
    }

    #[test]
    fn empty_select_id_is_invalid_value() {
        let err = parse_line(r#"{"event":"select","id":""}"#, 2).unwrap_err();
        assert_eq!(err.line(), 2);
        assert!(matches!(err, ScriptParseError::InvalidValue { .. }));
    }

    #[test]
    fn duplicate_items_are_invalid_value() {
        let err = parse_line(
            r#"{"event":"items","items":[{"id":"a","media":"m"},{"id":"a","media":"n"}]}"#,
            5,
        )
        .unwrap_err();
        assert!(matches!(err, ScriptParseError::InvalidValue { line: 5, .. }));
    }

    #[test]
    fn parse_script_keeps_going_after_errors() {
        let text = "{\"event\":\"advance\",\"ms\":10}\nnot json\n\n{\"event\":\"dispose\"}\n";
        let script = parse_script(text);

        assert_eq!(
            script.events,
            vec![
                (1, ScriptEvent::Advance(Duration::from_millis(10))),
                (4, ScriptEvent::Dispose),
            ]
        );
        assert_eq!(script.errors.len(), 1);
        assert_eq!(script.errors[0].line(), 2);
    }
}
