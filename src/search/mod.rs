//! Local search over the loaded catalog.
//!
//! - [`SearchIndex`] - Flattened link records and substring matching
//! - [`Debouncer`] - Trailing-edge timer that collapses bursts of edits
//!   into a single search

mod debounce;
mod index;

pub use debounce::Debouncer;
pub use index::{SearchIndex, SearchOutcome, SearchRecord};
