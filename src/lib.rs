//! sitenav: a terminal navigation page.
//!
//! Categorized bookmarks from a JSON catalog are shown as a card grid with
//! per-domain icons, instant search, a light/dark theme and a history of
//! opened links.
//!
//! - [`catalog`] - Catalog model and loading (file or HTTP, with fallback)
//! - [`icons`] - Icon resolution chain, loading and monograms
//! - [`search`] - In-memory search index and input debouncing
//! - [`storage`] - SQLite-backed key-value state (theme, click history)
//! - [`app`] / [`ui`] - Application state and the ratatui front end

pub mod app;
pub mod catalog;
pub mod config;
pub mod icons;
pub mod keybindings;
pub mod search;
pub mod storage;
pub mod theme;
pub mod ui;
pub mod util;
