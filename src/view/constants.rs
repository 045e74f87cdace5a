//! Layout and timing constants for the terminal demo.

use std::time::Duration;

/// Height of the status bar in lines.
pub const STATUS_BAR_HEIGHT: u16 = 1;

/// Event poll timeout. The virtual clock advances and prepare completions
/// are delivered at least this often.
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);

/// Key hints shown at the end of the status bar.
pub const KEY_HINTS: &str = "j/k scroll  enter select  r retry  b background  q quit";

/// Marker in front of the focused card's title.
pub const FOCUS_MARKER: &str = "▶";
