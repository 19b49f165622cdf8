//! Utility functions shared across the crate.
//!
//! - **URL handling**: domain-key extraction for the icon cache and search,
//!   and scheme checks before launching links in the browser
//! - **Text processing**: Unicode-aware width calculation, truncation and
//!   sanitizing of catalog labels
//!
//! # Examples
//!
//! ```
//! use sitenav::util::{domain_key, display_width, truncate_to_width};
//!
//! assert_eq!(domain_key("https://www.qq.com").as_deref(), Some("qq.com"));
//! assert_eq!(display_width("Hello 世界"), 10);
//! let card = truncate_to_width("A rather long bookmark title", 12);
//! assert_eq!(card, "A rather ...");
//! ```

mod text;
mod url_check;

pub use text::{display_width, sanitize_label, truncate_to_width};
pub use url_check::{domain_key, validate_url_for_open, UrlValidationError};

/// Maximum allowed search query length, enforced at input time.
pub const MAX_SEARCH_QUERY_LENGTH: usize = 256;
