//! Site catalog: the categories and links shown on the navigation page.
//!
//! - [`loader`] - Reads the catalog from a file or an http(s) URL and falls
//!   back to a small built-in catalog when that fails
//!
//! The catalog is read-only once loaded. The search index and the icon
//! resolver are both fed from it.

mod loader;

pub use loader::{load_catalog, CatalogError, CatalogOrigin, CatalogSource, LoadedCatalog};

use serde::{Deserialize, Serialize};

use crate::util::sanitize_label;

/// A single bookmark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub title: String,
    pub url: String,
}

impl Link {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
        }
    }
}

/// A named group of links, in display order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub links: Vec<Link>,
}

/// The root data document: `{ "categories": [ ... ] }`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Catalog {
    pub categories: Vec<Category>,
}

impl Catalog {
    /// Parse a catalog document and sanitize its labels for terminal display.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CatalogError> {
        let mut catalog: Catalog = serde_json::from_slice(bytes)?;
        for category in &mut catalog.categories {
            category.name = sanitize_label(&category.name).into_owned();
            for link in &mut category.links {
                link.title = sanitize_label(&link.title).into_owned();
            }
        }
        Ok(catalog)
    }

    /// Built-in catalog used when the data source cannot be loaded.
    pub fn fallback() -> Self {
        Self {
            categories: vec![
                Category {
                    name: "Common Sites".to_string(),
                    links: vec![
                        Link::new("Baidu", "https://www.baidu.com"),
                        Link::new("Tencent Video", "https://v.qq.com"),
                    ],
                },
                Category {
                    name: "Tools".to_string(),
                    links: vec![Link::new("GitHub", "https://github.com")],
                },
            ],
        }
    }

    /// True when there is nothing to show at all.
    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    /// Every link, in catalog order.
    pub fn links(&self) -> impl Iterator<Item = &Link> {
        self.categories.iter().flat_map(|c| c.links.iter())
    }

    pub fn link_count(&self) -> usize {
        self.categories.iter().map(|c| c.links.len()).sum()
    }

    /// Category indices in display order.
    ///
    /// The pinned category (first one whose name matches) comes first; the
    /// rest keep catalog order.
    pub fn display_order(&self, pinned: Option<&str>) -> Vec<usize> {
        let pinned_idx =
            pinned.and_then(|name| self.categories.iter().position(|c| c.name == name));

        let mut order = Vec::with_capacity(self.categories.len());
        order.extend(pinned_idx);
        order.extend((0..self.categories.len()).filter(|i| Some(*i) != pinned_idx));
        order
    }
}
