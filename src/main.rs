//! feedplay - entry point

use clap::Parser;
use feedplay::config::CliOverrides;
use feedplay::feed::FocusMode;
use std::path::PathBuf;
use tracing::{info, warn};

/// Viewport-driven autoplay for a scrollable video feed
#[derive(Parser, Debug)]
#[command(name = "feedplay")]
#[command(version)]
#[command(about = "Viewport-driven autoplay and playback coordination for a scrollable video feed")]
pub struct Args {
    /// Feed file, a JSON array or JSONL (built-in demo feed if not provided)
    pub feed: Option<PathBuf>,

    /// Replay a JSONL event script headlessly and print what happened
    #[arg(long, value_name = "SCRIPT")]
    pub replay: Option<PathBuf>,

    /// How the focused item is chosen
    #[arg(long, value_enum)]
    pub mode: Option<FocusMode>,

    /// Virtual time each prepare takes, in milliseconds
    #[arg(long, value_name = "MS")]
    pub prepare_delay_ms: Option<u64>,

    /// Start with the host in the background
    #[arg(long)]
    pub background: bool,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Args {
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            mode: self.mode,
            prepare_delay_ms: self.prepare_delay_ms,
            background: self.background,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = feedplay::config::load_config_with_precedence(args.config.clone())?;
        let merged = feedplay::config::merge_config(config_file)?;
        let with_env = feedplay::config::apply_env_overrides(merged)?;
        feedplay::config::apply_cli_overrides(with_env, &args.overrides())
    };

    feedplay::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    match &args.replay {
        Some(script_path) => {
            // A script usually sends its own items; only load a feed if asked.
            let items = match &args.feed {
                Some(path) => feedplay::source::load_feed(Some(path.as_path()))?,
                None => Vec::new(),
            };
            let text = feedplay::source::read_file(script_path)?;
            let script = feedplay::script::parse_script(&text);
            for error in &script.errors {
                warn!(%error, "Skipping script line");
            }

            let options = feedplay::integration::ReplayOptions {
                mode: config.mode,
                prepare_delay: config.prepare_delay,
                start_in_background: config.start_in_background,
                items,
                item_size: feedplay::script::DEFAULT_ITEM_SIZE,
            };
            let records = feedplay::integration::run_script(&script, &options);
            info!(events = script.events.len(), records = records.len(), "Replay finished");
            feedplay::integration::write_records(&records, std::io::stdout().lock())?;
        }
        None => {
            let items = feedplay::source::load_feed(args.feed.as_deref())?;
            let styles = feedplay::view::FeedStyles::with_color_config(
                feedplay::view::ColorConfig::from_env_and_args(args.no_color),
            );
            feedplay::view::run_demo(items, &config, styles)?;
        }
    }

    Ok(())
}
