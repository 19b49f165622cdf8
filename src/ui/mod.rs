//! Terminal User Interface module.
//!
//! - Main event loop (`run`)
//! - Input handling for the sidebar, card grid, search field and overlays
//! - Rendering of the search bar, categories, cards and results
//! - Background task event processing
//!
//! # Module Structure
//!
//! - `loop_runner` - Main event loop and terminal management
//! - `input` - Keyboard input handling
//! - `events` - Background task event processing
//! - `render` - Page layout
//! - `helpers` - Task spawning and link opening
//! - `cards` - Card grid widget
//! - `sidebar` - Category navigation widget
//! - `search` - Search bar and results panel
//! - `status` - Status bar widget
//! - `help` - Keybinding overlay
//! - `history` - Recently opened overlay

mod cards;
mod events;
mod help;
mod helpers;
mod history;
mod input;
mod loop_runner;
mod render;
mod search;
mod sidebar;
mod status;

pub use loop_runner::{run, Action};
