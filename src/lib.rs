//! feedplay
//!
//! Viewport-driven autoplay for a scrollable video feed: a pure tracker
//! picks the focused item from a viewport snapshot, and a playback
//! coordinator keeps exactly one media resource bound to that item.
//!
//! Pure core: [`model`], [`tracker`], [`playback`], [`feed`], [`script`].
//! Impure shell: [`source`], [`config`], [`logging`], [`view`]. The
//! [`sim`] backend and [`integration`] replay runner connect the two
//! without a real player or terminal.

pub mod config;
pub mod feed;
pub mod integration;
pub mod logging;
pub mod model;
pub mod playback;
pub mod script;
pub mod sim;
pub mod source;
pub mod tracker;
pub mod view;
