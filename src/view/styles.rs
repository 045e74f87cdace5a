//! Card and status bar styling.

use ratatui::style::{Color, Modifier, Style};

// ===== ColorConfig =====

/// Configuration for color output.
///
/// Determines whether colors should be enabled or disabled based on:
/// - `--no-color` CLI flag
/// - `NO_COLOR` environment variable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorConfig {
    enabled: bool,
}

impl ColorConfig {
    /// Create a ColorConfig from CLI args and environment.
    ///
    /// Priority (first match wins):
    /// 1. `--no-color` flag (disables colors)
    /// 2. `NO_COLOR` env var (any value disables colors)
    /// 3. Default: colors enabled
    pub fn from_env_and_args(no_color_flag: bool) -> Self {
        let enabled = !no_color_flag && std::env::var("NO_COLOR").is_err();
        Self { enabled }
    }

    /// Check if colors are enabled.
    pub fn colors_enabled(self) -> bool {
        self.enabled
    }
}

// ===== FeedStyles =====

/// Styles for the feed pane and status bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeedStyles {
    /// Title row of the focused card.
    pub focused: Style,
    /// Title row of other cards.
    pub title: Style,
    /// Playback line of a loaded card.
    pub playing: Style,
    /// Thumbnail and secondary text.
    pub muted: Style,
    /// Playback errors.
    pub error: Style,
    /// Status bar.
    pub status: Style,
}

impl FeedStyles {
    /// Styles for the given color configuration. Without colors only
    /// modifiers remain.
    pub fn with_color_config(config: ColorConfig) -> Self {
        if config.colors_enabled() {
            Self {
                focused: Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                title: Style::default().add_modifier(Modifier::BOLD),
                playing: Style::default().fg(Color::Green),
                muted: Style::default().fg(Color::DarkGray),
                error: Style::default().fg(Color::Red),
                status: Style::default().fg(Color::Black).bg(Color::Gray),
            }
        } else {
            Self {
                focused: Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED),
                title: Style::default().add_modifier(Modifier::BOLD),
                playing: Style::default(),
                muted: Style::default(),
                error: Style::default(),
                status: Style::default().add_modifier(Modifier::REVERSED),
            }
        }
    }
}

impl Default for FeedStyles {
    fn default() -> Self {
        Self::with_color_config(ColorConfig::from_env_and_args(false))
    }
}
