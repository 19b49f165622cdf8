use crate::catalog::{Catalog, CatalogOrigin, CatalogSource, Link, LoadedCatalog};
use crate::config::Config;
use crate::icons::{IconRef, IconResolver};
use crate::keybindings::KeybindingRegistry;
use crate::search::{Debouncer, SearchIndex, SearchOutcome, SearchRecord};
use crate::storage::{ClickRecord, Database};
use crate::theme::{StyleMap, ThemeVariant};
use crate::util::{domain_key, MAX_SEARCH_QUERY_LENGTH};
use anyhow::Result;
use ratatui::style::Style;
use reqwest::redirect::Policy;
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// How long a category stays highlighted after a jump.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_millis(400);

/// Status messages disappear after this long.
const STATUS_TTL: Duration = Duration::from_secs(3);

// ============================================================================
// HTTP Client Configuration
// ============================================================================

/// Create a custom redirect policy with loop detection and limited hops.
///
/// - Limits redirects to 3 hops maximum
/// - Detects redirect loops (same URL appearing twice in chain)
fn create_redirect_policy() -> Policy {
    Policy::custom(|attempt| {
        if attempt.previous().len() >= 3 {
            return attempt.error("Too many redirects (max 3)");
        }

        let url = attempt.url();
        for prev in attempt.previous() {
            if prev.as_str() == url.as_str() {
                return attempt.error("Redirect loop detected");
            }
        }

        tracing::debug!(
            from = %attempt.previous().last().map(|u| u.as_str()).unwrap_or("initial"),
            to = %url,
            hop = attempt.previous().len() + 1,
            "Following redirect"
        );

        attempt.follow()
    })
}

/// Shared HTTP client for the catalog fetch, icon probes and icon loads.
pub fn build_http_client() -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .redirect(create_redirect_policy())
        .pool_max_idle_per_host(2)
        .pool_idle_timeout(Duration::from_secs(30))
        .connect_timeout(Duration::from_secs(10))
        .timeout(Duration::from_secs(30))
        .user_agent(concat!("sitenav/", env!("CARGO_PKG_VERSION")))
        .build()?;
    Ok(client)
}

// ============================================================================
// State Enums
// ============================================================================

/// Catalog loading state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    /// Loaded, but there are no categories to show.
    Empty,
}

/// Which panel has focus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Cards,
    Results,
}

/// Per-domain icon state, as drawn on cards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IconState {
    Pending,
    Ready(IconRef),
    /// The resolved icon did not load; the card shows its monogram.
    Failed,
}

/// Card cursor: a position in the display order plus a link index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CardCursor {
    pub section: usize,
    pub index: usize,
}

// ============================================================================
// Events
// ============================================================================

/// Events from background tasks
pub enum AppEvent {
    /// Catalog load finished (possibly with the built-in fallback).
    CatalogLoaded {
        generation: u64,
        loaded: LoadedCatalog,
    },
    /// An icon was resolved and its load attempted.
    ///
    /// Fields:
    /// - `generation`: catalog generation the icon pass was started for
    /// - `domain`: domain key the icon belongs to
    /// - `result`: `Ok` if the icon loads, `Err` with the reason otherwise
    IconLoaded {
        generation: u64,
        domain: String,
        icon: IconRef,
        result: Result<(), String>,
    },
    /// The search input has been quiet for the debounce delay.
    SearchDebounceElapsed,
    /// The search was cleared (Esc or clear action).
    SearchCleared,
    /// The category highlight timer ran out.
    HighlightElapsed { generation: u64 },
    /// A background task panicked.
    ///
    /// Fields:
    /// - `task`: Name of the task that panicked (e.g., "catalog_load", "icon_pass")
    /// - `error`: The panic message extracted from the panic payload
    TaskPanicked { task: &'static str, error: String },
}

// ============================================================================
// Application State
// ============================================================================

/// Central application state
pub struct App {
    pub db: Database,
    pub http_client: reqwest::Client,
    pub icons: Arc<IconResolver>,
    pub catalog_source: CatalogSource,
    pub assets_dir: PathBuf,
    pub icon_timeout: Duration,

    // Theme
    pub theme_variant: ThemeVariant,
    pub theme: StyleMap,
    pub keybindings: KeybindingRegistry,

    // Catalog
    pub load_state: LoadState,
    pub catalog: Arc<Catalog>,
    /// Why the built-in catalog is shown, if it is.
    pub fallback_reason: Option<String>,
    /// Category indices, pinned category first.
    pub display_order: Vec<usize>,
    pub pinned_category: Option<String>,
    /// Bumped on every load; stale catalog and icon results are dropped.
    pub load_generation: u64,
    pub catalog_load_handle: Option<JoinHandle<()>>,
    pub icon_states: HashMap<String, IconState>,

    // Navigation
    pub focus: Focus,
    /// Sidebar cursor (position in `display_order`).
    pub selected_category: usize,
    pub cursor: CardCursor,
    /// Cards per row, updated by the renderer.
    pub cards_per_row: usize,
    /// First visible line of the card area, maintained by the renderer.
    pub card_scroll: usize,
    /// Section the renderer should scroll to the top on the next frame.
    pub scroll_to_section: Option<usize>,
    /// Section currently highlighted after a jump.
    pub highlight: Option<usize>,
    pub highlight_generation: u64,

    // Search
    pub search_index: SearchIndex,
    pub search_typing: bool,
    pub search_query: String,
    pub search_outcome: SearchOutcome,
    pub selected_result: usize,
    pub search_debouncer: Debouncer,
    pub search_suggestions: Vec<String>,

    // Overlays
    pub show_help: bool,
    pub help_scroll_offset: usize,
    /// Recently opened links; the overlay is visible while this is `Some`.
    pub history: Option<Vec<ClickRecord>>,
    pub history_selected: usize,

    pub status_message: Option<(Cow<'static, str>, Instant)>,
    pub needs_redraw: bool,
    pub spinner_frame: usize,
}

impl App {
    pub fn new(
        db: Database,
        config: &Config,
        catalog_source: CatalogSource,
        assets_dir: PathBuf,
    ) -> Result<Self> {
        let http_client = build_http_client()?;
        let icons = Arc::new(IconResolver::from_config(http_client.clone(), config));
        let theme_variant = ThemeVariant::from_str_name(&config.theme).unwrap_or_default();

        Ok(Self {
            db,
            http_client,
            icons,
            catalog_source,
            assets_dir,
            icon_timeout: Duration::from_secs(config.icon_timeout_secs.max(1)),
            theme_variant,
            theme: StyleMap::from_palette(&theme_variant.palette()),
            keybindings: KeybindingRegistry::new(),
            load_state: LoadState::Loading,
            catalog: Arc::new(Catalog::default()),
            fallback_reason: None,
            display_order: Vec::new(),
            pinned_category: config.pinned_category.clone(),
            load_generation: 0,
            catalog_load_handle: None,
            icon_states: HashMap::new(),
            focus: Focus::Cards,
            selected_category: 0,
            cursor: CardCursor::default(),
            cards_per_row: 4,
            card_scroll: 0,
            scroll_to_section: None,
            highlight: None,
            highlight_generation: 0,
            search_index: SearchIndex::default(),
            search_typing: false,
            search_query: String::new(),
            search_outcome: SearchOutcome::Inactive,
            selected_result: 0,
            search_debouncer: Debouncer::new(Duration::from_millis(config.search_debounce_ms)),
            search_suggestions: config.search_suggestions.clone(),
            show_help: false,
            help_scroll_offset: 0,
            history: None,
            history_selected: 0,
            status_message: None,
            needs_redraw: true,
            spinner_frame: 0,
        })
    }

    // ========================================================================
    // Theme
    // ========================================================================

    /// Resolve a semantic role name to its `Style`.
    pub fn style(&self, role: &str) -> Style {
        self.theme.resolve(role)
    }

    /// Switch to a different theme variant at runtime.
    pub fn set_theme(&mut self, variant: ThemeVariant) {
        self.theme_variant = variant;
        self.theme = StyleMap::from_palette(&variant.palette());
        self.needs_redraw = true;
    }

    /// Flip Light ↔ Dark. Returns the new variant so the caller can persist it.
    pub fn toggle_theme(&mut self) -> ThemeVariant {
        let next = self.theme_variant.next();
        self.set_theme(next);
        next
    }

    // ========================================================================
    // Catalog
    // ========================================================================

    /// Enter the loading state for a new catalog load. Returns its generation.
    pub fn begin_loading(&mut self) -> u64 {
        self.load_generation = self.load_generation.wrapping_add(1);
        self.load_state = LoadState::Loading;
        self.spinner_frame = 0;
        self.load_generation
    }

    /// Install a freshly loaded catalog and reset everything derived from it.
    ///
    /// Returns false (and changes nothing) for a stale generation.
    pub fn install_catalog(&mut self, generation: u64, loaded: LoadedCatalog) -> bool {
        if generation != self.load_generation {
            tracing::debug!(generation, current = self.load_generation, "Ignoring stale catalog load");
            return false;
        }

        self.fallback_reason = match loaded.origin {
            CatalogOrigin::Source => None,
            CatalogOrigin::Fallback { reason } => Some(reason),
        };
        self.catalog = Arc::new(loaded.catalog);
        self.display_order = self.catalog.display_order(self.pinned_category.as_deref());
        self.search_index.rebuild(&self.catalog);
        self.load_state = if self.catalog.is_empty() {
            LoadState::Empty
        } else {
            LoadState::Ready
        };

        self.icon_states = self
            .icon_targets()
            .into_iter()
            .map(|(domain, _)| (domain, IconState::Pending))
            .collect();

        self.selected_category = 0;
        self.cursor = CardCursor::default();
        self.cursor.section = self.first_non_empty_section().unwrap_or(0);
        self.card_scroll = 0;
        self.highlight = None;

        // Re-run an active search against the new records
        if self.search_outcome.is_active() {
            self.run_search();
        }
        true
    }

    /// One URL per distinct domain key, in catalog order.
    pub fn icon_targets(&self) -> Vec<(String, String)> {
        let mut seen = HashSet::new();
        self.catalog
            .links()
            .filter_map(|link| {
                let domain = domain_key(&link.url)?;
                seen.insert(domain.clone())
                    .then(|| (domain, link.url.clone()))
            })
            .collect()
    }

    /// Record the outcome of an icon load. Returns false for stale results.
    pub fn apply_icon_result(
        &mut self,
        generation: u64,
        domain: String,
        icon: IconRef,
        result: Result<(), String>,
    ) -> bool {
        if generation != self.load_generation {
            return false;
        }
        let state = match result {
            Ok(()) => IconState::Ready(icon),
            Err(e) => {
                tracing::debug!(domain = %domain, icon = %icon, error = %e, "Icon failed to load, using monogram");
                IconState::Failed
            }
        };
        self.icon_states.insert(domain, state);
        true
    }

    /// Icon state for a link. `None` means the URL has no domain; such links
    /// use the placeholder icon, which always loads.
    pub fn icon_state(&self, url: &str) -> Option<&IconState> {
        static PENDING: IconState = IconState::Pending;
        let domain = domain_key(url)?;
        Some(self.icon_states.get(&domain).unwrap_or(&PENDING))
    }

    // ========================================================================
    // Card and Sidebar Navigation
    // ========================================================================

    pub fn section_count(&self) -> usize {
        self.display_order.len()
    }

    /// Links of the category at display position `section`.
    pub fn section_links(&self, section: usize) -> &[Link] {
        self.display_order
            .get(section)
            .and_then(|&idx| self.catalog.categories.get(idx))
            .map(|c| c.links.as_slice())
            .unwrap_or(&[])
    }

    pub fn section_name(&self, section: usize) -> &str {
        self.display_order
            .get(section)
            .and_then(|&idx| self.catalog.categories.get(idx))
            .map(|c| c.name.as_str())
            .unwrap_or("")
    }

    /// True for the pinned category's display position.
    pub fn is_pinned(&self, section: usize) -> bool {
        self.pinned_category
            .as_deref()
            .is_some_and(|name| section == 0 && self.section_name(0) == name)
    }

    pub fn selected_link(&self) -> Option<&Link> {
        self.section_links(self.cursor.section).get(self.cursor.index)
    }

    fn first_non_empty_section(&self) -> Option<usize> {
        (0..self.section_count()).find(|&s| !self.section_links(s).is_empty())
    }

    fn next_non_empty_section(&self, from: usize) -> Option<usize> {
        (from + 1..self.section_count()).find(|&s| !self.section_links(s).is_empty())
    }

    fn prev_non_empty_section(&self, from: usize) -> Option<usize> {
        (0..from).rev().find(|&s| !self.section_links(s).is_empty())
    }

    pub fn nav_down(&mut self) {
        match self.focus {
            Focus::Sidebar => {
                if self.selected_category + 1 < self.section_count() {
                    self.selected_category += 1;
                }
            }
            Focus::Cards => self.card_down(),
            Focus::Results => {
                if self.selected_result + 1 < self.search_outcome.results().len() {
                    self.selected_result += 1;
                }
            }
        }
    }

    pub fn nav_up(&mut self) {
        match self.focus {
            Focus::Sidebar => self.selected_category = self.selected_category.saturating_sub(1),
            Focus::Cards => self.card_up(),
            Focus::Results => self.selected_result = self.selected_result.saturating_sub(1),
        }
    }

    /// Move down one row of cards, continuing into the next category at the
    /// same column (clamped).
    fn card_down(&mut self) {
        let per_row = self.cards_per_row.max(1);
        let len = self.section_links(self.cursor.section).len();
        let CardCursor { section, index } = self.cursor;

        if index + per_row < len {
            self.cursor.index = index + per_row;
        } else if (index / per_row) < len.saturating_sub(1) / per_row {
            // Partial last row below: land on its last card
            self.cursor.index = len - 1;
        } else if let Some(next) = self.next_non_empty_section(section) {
            let col = index % per_row;
            self.cursor = CardCursor {
                section: next,
                index: col.min(self.section_links(next).len() - 1),
            };
        }
    }

    /// Move up one row of cards, continuing into the previous category's
    /// last row at the same column (clamped).
    fn card_up(&mut self) {
        let per_row = self.cards_per_row.max(1);
        let CardCursor { section, index } = self.cursor;

        if index >= per_row {
            self.cursor.index = index - per_row;
        } else if let Some(prev) = self.prev_non_empty_section(section) {
            let prev_len = self.section_links(prev).len();
            let last_row_start = (prev_len - 1) / per_row * per_row;
            self.cursor = CardCursor {
                section: prev,
                index: (last_row_start + index % per_row).min(prev_len - 1),
            };
        }
    }

    pub fn nav_left(&mut self) {
        if self.focus != Focus::Cards {
            return;
        }
        if self.cursor.index > 0 {
            self.cursor.index -= 1;
        } else if let Some(prev) = self.prev_non_empty_section(self.cursor.section) {
            self.cursor = CardCursor {
                section: prev,
                index: self.section_links(prev).len() - 1,
            };
        }
    }

    pub fn nav_right(&mut self) {
        if self.focus != Focus::Cards {
            return;
        }
        if self.cursor.index + 1 < self.section_links(self.cursor.section).len() {
            self.cursor.index += 1;
        } else if let Some(next) = self.next_non_empty_section(self.cursor.section) {
            self.cursor = CardCursor {
                section: next,
                index: 0,
            };
        }
    }

    /// Jump to a category: move the card cursor to its first link, scroll it
    /// into view and highlight it. Returns the highlight generation to expire.
    pub fn jump_to_section(&mut self, section: usize) -> Option<u64> {
        if section >= self.section_count() {
            return None;
        }
        self.selected_category = section;
        if !self.section_links(section).is_empty() {
            self.cursor = CardCursor { section, index: 0 };
            self.focus = Focus::Cards;
        }
        self.scroll_to_section = Some(section);
        self.highlight = Some(section);
        self.highlight_generation = self.highlight_generation.wrapping_add(1);
        Some(self.highlight_generation)
    }

    pub fn next_section(&self) -> Option<usize> {
        let current = self.current_section();
        (current + 1 < self.section_count()).then_some(current + 1)
    }

    pub fn prev_section(&self) -> Option<usize> {
        self.current_section().checked_sub(1)
    }

    fn current_section(&self) -> usize {
        match self.focus {
            Focus::Sidebar => self.selected_category,
            _ => self.cursor.section,
        }
    }

    /// Clear the highlight if it still belongs to `generation`.
    pub fn expire_highlight(&mut self, generation: u64) -> bool {
        if generation == self.highlight_generation && self.highlight.is_some() {
            self.highlight = None;
            return true;
        }
        false
    }

    /// Tab order: sidebar → cards → results (when a search is showing).
    pub fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Sidebar => Focus::Cards,
            Focus::Cards if self.search_outcome.is_active() => Focus::Results,
            Focus::Cards | Focus::Results => Focus::Sidebar,
        };
        if self.focus == Focus::Sidebar {
            self.selected_category = self.cursor.section;
        }
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Append a character to the query. Returns false if the query is at
    /// its length limit.
    pub fn push_search_char(&mut self, c: char) -> bool {
        if self.search_query.chars().count() >= MAX_SEARCH_QUERY_LENGTH {
            return false;
        }
        self.search_query.push(c);
        true
    }

    /// Remove the last character. Returns false if the query was empty.
    pub fn pop_search_char(&mut self) -> bool {
        self.search_query.pop().is_some()
    }

    /// Run the current query against the index.
    pub fn run_search(&mut self) {
        self.search_outcome = self.search_index.search(&self.search_query);
        let count = self.search_outcome.results().len();
        self.selected_result = self.selected_result.min(count.saturating_sub(1));
        if !self.search_outcome.is_active() && self.focus == Focus::Results {
            self.focus = Focus::Cards;
        }
        tracing::debug!(query = %self.search_query, matches = count, "Search executed");
    }

    /// Search now and, if anything matched, move focus to the results.
    pub fn commit_search(&mut self) {
        self.search_typing = false;
        self.run_search();
        if !self.search_outcome.results().is_empty() {
            self.focus = Focus::Results;
            self.selected_result = 0;
        }
    }

    /// Empty the query and hide results. Returns true if there was anything
    /// to clear.
    pub fn clear_search(&mut self) -> bool {
        let had_state = self.search_typing
            || !self.search_query.is_empty()
            || self.search_outcome.is_active();
        self.search_typing = false;
        self.search_query.clear();
        self.search_outcome = SearchOutcome::Inactive;
        self.selected_result = 0;
        had_state
    }

    /// Listener side of a clear: give focus back to the cards.
    pub fn on_search_cleared(&mut self) {
        if self.focus == Focus::Results {
            self.focus = Focus::Cards;
        }
    }

    pub fn selected_result(&self) -> Option<&SearchRecord> {
        self.search_outcome.results().get(self.selected_result)
    }

    // ========================================================================
    // Links and History
    // ========================================================================

    /// The `(title, url)` the open action applies to in the current focus.
    pub fn open_target(&self) -> Option<(String, String)> {
        if let Some(history) = &self.history {
            return history
                .get(self.history_selected)
                .map(|c| (c.title.clone(), c.url.clone()));
        }
        match self.focus {
            Focus::Results => self.selected_result().map(|r| (r.title.clone(), r.url.clone())),
            Focus::Cards => self.selected_link().map(|l| (l.title.clone(), l.url.clone())),
            Focus::Sidebar => None,
        }
    }

    pub fn show_history(&mut self, clicks: Vec<ClickRecord>) {
        self.history = Some(clicks);
        self.history_selected = 0;
    }

    pub fn close_history(&mut self) {
        self.history = None;
        self.history_selected = 0;
    }

    // ========================================================================
    // Status Line
    // ========================================================================

    /// Set status message (will auto-expire after 3 seconds)
    pub fn set_status(&mut self, msg: impl Into<Cow<'static, str>>) {
        self.status_message = Some((msg.into(), Instant::now()));
    }

    /// Clear status message if expired. Returns true if a message was cleared.
    pub fn clear_expired_status(&mut self) -> bool {
        if let Some((_, time)) = &self.status_message {
            if time.elapsed() >= STATUS_TTL {
                self.status_message = None;
                return true;
            }
        }
        false
    }
}

// ============================================================================
// Resource Cleanup
// ============================================================================

impl Drop for App {
    fn drop(&mut self) {
        if let Some(handle) = self.catalog_load_handle.take() {
            handle.abort();
            tracing::debug!("Aborted catalog load task on App drop");
        }
        self.search_debouncer.cancel();
    }
}
