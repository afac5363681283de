//! Terminal User Interface module.
//!
//! The TUI is the rendering side of the sync layer: it draws whatever state
//! the `AppEvent`s have produced and turns key presses into synchronizer calls.
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - View rendering dispatch and overlays
//! - `helpers` - Task spawning and link opening
//! - `forms` - Login/register form widget
//! - `articles` - Article list widget
//! - `feeds` - Followed/discovery feed list widget
//! - `status` - Status bar widget
//! - `help` - Help overlay

mod articles;
mod events;
mod feeds;
mod forms;
mod help;
mod helpers;
mod input;
mod loop_runner;
mod render;
mod status;

// Re-export the public API
pub use loop_runner::{run, Action};
