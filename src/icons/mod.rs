//! Card icons.
//!
//! - [`IconResolver`] - URL → icon reference, cached per domain
//! - [`load_icon`] - Checks that a resolved reference actually loads
//! - [`monogram`] - First-letter badge for cards whose icon failed
//!
//! Resolution and loading are separate steps. A reference that fails to
//! load is never evicted from the resolver cache; the UI just draws the
//! monogram for that domain.

mod loader;
mod monogram;
mod resolver;

pub use loader::{load_icon, IconLoadError};
pub use monogram::{color_index, monogram, title_hash, Monogram, CARD_PALETTE, SEARCH_PALETTE};
pub use resolver::{CacheStats, IconKind, IconRef, IconResolver, DEFAULT_ICON, PRELOAD_CONCURRENCY};
