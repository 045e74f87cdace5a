//! Feed-level wiring: pixel layout and the focus/playback controller.

pub mod controller;
pub mod layout;
pub mod size_index;

pub use controller::{FeedController, FocusMode};
pub use layout::FeedLayout;
pub use size_index::SizeIndex;
