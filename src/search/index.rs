use crate::catalog::Catalog;
use crate::util::domain_key;

/// One searchable link, denormalized with its category and domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    pub title: String,
    pub url: String,
    pub category: String,
    /// Hostname with a leading `www.` stripped; empty for unparsable URLs.
    pub domain: String,
}

/// Result of a search.
///
/// `Inactive` and an empty `Matches` are different states: the first hides
/// the results panel, the second shows "no matching sites".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Inactive,
    Matches(Vec<SearchRecord>),
}

impl SearchOutcome {
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Matches(_))
    }

    pub fn results(&self) -> &[SearchRecord] {
        match self {
            Self::Inactive => &[],
            Self::Matches(records) => records,
        }
    }
}

struct Entry {
    record: SearchRecord,
    title_lower: String,
    category_lower: String,
}

impl Entry {
    fn matches(&self, needle: &str) -> bool {
        self.title_lower.contains(needle)
            || self.record.domain.contains(needle)
            || self.category_lower.contains(needle)
    }
}

/// Flat, catalog-ordered list of every link.
#[derive(Default)]
pub struct SearchIndex {
    entries: Vec<Entry>,
}

impl SearchIndex {
    pub fn build(catalog: &Catalog) -> Self {
        let mut index = Self::default();
        index.rebuild(catalog);
        index
    }

    /// Replace the indexed records with the links of `catalog`.
    pub fn rebuild(&mut self, catalog: &Catalog) {
        self.entries = catalog
            .categories
            .iter()
            .flat_map(|category| {
                category.links.iter().map(move |link| Entry {
                    title_lower: link.title.to_lowercase(),
                    category_lower: category.name.to_lowercase(),
                    record: SearchRecord {
                        title: link.title.clone(),
                        url: link.url.clone(),
                        category: category.name.clone(),
                        domain: domain_key(&link.url).unwrap_or_default(),
                    },
                })
            })
            .collect();
        tracing::debug!(records = self.entries.len(), "Search index rebuilt");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on title, domain or category.
    ///
    /// The query is trimmed first; an empty query means no search is active.
    /// Results keep catalog order.
    pub fn search(&self, query: &str) -> SearchOutcome {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return SearchOutcome::Inactive;
        }

        let needle = trimmed.to_lowercase();
        SearchOutcome::Matches(
            self.entries
                .iter()
                .filter(|entry| entry.matches(&needle))
                .map(|entry| entry.record.clone())
                .collect(),
        )
    }
}
