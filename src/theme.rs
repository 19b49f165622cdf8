//! Theme system for the TUI.
//!
//! Provides semantic color roles that map to ratatui `Style` values.
//! The `ThemeVariant` enum selects between Light and Dark palettes,
//! and `StyleMap` resolves role names to concrete styles.

use ratatui::style::{Color, Modifier, Style};
use std::collections::HashMap;

// ============================================================================
// Theme Variant
// ============================================================================

/// Available theme variants. Light is the default for a fresh install.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeVariant {
    #[default]
    Light,
    Dark,
}

impl ThemeVariant {
    /// Parse a variant name from a string (case-insensitive).
    pub fn from_str_name(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(Self::Dark),
            "light" => Some(Self::Light),
            _ => None,
        }
    }

    /// Build the `ColorPalette` for this variant.
    pub fn palette(self) -> ColorPalette {
        match self {
            Self::Dark => ColorPalette::dark(),
            Self::Light => ColorPalette::light(),
        }
    }

    /// Toggle: Light → Dark → Light.
    pub fn next(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    /// Human-readable name for status display.
    pub fn name(self) -> &'static str {
        match self {
            Self::Dark => "Dark",
            Self::Light => "Light",
        }
    }

    /// Value persisted under the `theme` storage key.
    pub fn storage_value(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    /// Glyph for the toggle indicator in the search bar.
    pub fn icon(self) -> &'static str {
        match self {
            Self::Dark => "☾",
            Self::Light => "☀",
        }
    }
}

// ============================================================================
// Color Palette: semantic roles to Style
// ============================================================================

/// A complete color palette mapping every semantic UI role to a `Style`.
#[derive(Debug, Clone)]
pub struct ColorPalette {
    /// Whole-screen base style; its background is the page color.
    pub page: Style,

    // -- Cards --
    pub card_normal: Style,
    pub card_selected: Style,
    pub card_pending: Style,
    pub card_ready: Style,
    pub card_domain: Style,

    // -- Categories --
    pub category_title: Style,
    pub category_pinned: Style,
    pub category_highlight: Style,

    // -- Navigation sidebar --
    pub nav_normal: Style,
    pub nav_selected: Style,

    // -- Search --
    pub search_input: Style,
    pub search_placeholder: Style,
    pub search_count: Style,
    pub search_empty: Style,
    pub search_suggestion: Style,

    // -- Chrome --
    pub status_bar: Style,
    pub status_error: Style,
    pub panel_border: Style,
    pub panel_border_focused: Style,
    pub overlay_title: Style,
    pub history_time: Style,
}

impl ColorPalette {
    fn light() -> Self {
        let base = Style::default().bg(Color::White).fg(Color::Black);
        Self {
            page: base,

            card_normal: base,
            card_selected: Style::default().bg(Color::Blue).fg(Color::White),
            card_pending: base.fg(Color::Gray),
            card_ready: base.fg(Color::Blue),
            card_domain: base.fg(Color::DarkGray),

            category_title: base.add_modifier(Modifier::BOLD),
            category_pinned: base.fg(Color::Magenta).add_modifier(Modifier::BOLD),
            category_highlight: Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            nav_normal: base,
            nav_selected: Style::default().bg(Color::Blue).fg(Color::White),

            search_input: base,
            search_placeholder: base.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            search_count: base.fg(Color::Blue).add_modifier(Modifier::BOLD),
            search_empty: base.fg(Color::DarkGray),
            search_suggestion: base.fg(Color::Blue).add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::Gray).fg(Color::Black),
            status_error: Style::default().bg(Color::Gray).fg(Color::Red),
            panel_border: base.fg(Color::DarkGray),
            panel_border_focused: base.fg(Color::Blue),
            overlay_title: base.add_modifier(Modifier::BOLD),
            history_time: base.fg(Color::DarkGray),
        }
    }

    fn dark() -> Self {
        let base = Style::default().bg(Color::Black).fg(Color::Gray);
        Self {
            page: base,

            card_normal: base,
            card_selected: Style::default().bg(Color::DarkGray).fg(Color::White),
            card_pending: base.fg(Color::DarkGray),
            card_ready: base.fg(Color::Cyan),
            card_domain: base.fg(Color::DarkGray),

            category_title: base.fg(Color::White).add_modifier(Modifier::BOLD),
            category_pinned: base.fg(Color::Yellow).add_modifier(Modifier::BOLD),
            category_highlight: Style::default()
                .bg(Color::Yellow)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),

            nav_normal: base,
            nav_selected: Style::default().bg(Color::DarkGray).fg(Color::White),

            search_input: base.fg(Color::White),
            search_placeholder: base.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            search_count: base.fg(Color::Cyan).add_modifier(Modifier::BOLD),
            search_empty: base.fg(Color::DarkGray),
            search_suggestion: base.fg(Color::Cyan).add_modifier(Modifier::UNDERLINED),

            status_bar: Style::default().bg(Color::DarkGray).fg(Color::White),
            status_error: Style::default().bg(Color::DarkGray).fg(Color::LightRed),
            panel_border: base.fg(Color::DarkGray),
            panel_border_focused: base.fg(Color::Cyan),
            overlay_title: base.fg(Color::White).add_modifier(Modifier::BOLD),
            history_time: base.fg(Color::DarkGray),
        }
    }
}

// ============================================================================
// Style Map: string-keyed lookup
// ============================================================================

/// String-keyed style lookup, built from a `ColorPalette`.
#[derive(Debug, Clone)]
pub struct StyleMap {
    map: HashMap<&'static str, Style>,
}

/// All semantic role names, in declaration order.
const ROLE_NAMES: [&str; 22] = [
    "page",
    "card_normal",
    "card_selected",
    "card_pending",
    "card_ready",
    "card_domain",
    "category_title",
    "category_pinned",
    "category_highlight",
    "nav_normal",
    "nav_selected",
    "search_input",
    "search_placeholder",
    "search_count",
    "search_empty",
    "search_suggestion",
    "status_bar",
    "status_error",
    "panel_border",
    "panel_border_focused",
    "overlay_title",
    "history_time",
];

impl StyleMap {
    pub fn from_palette(p: &ColorPalette) -> Self {
        let styles: [Style; 22] = [
            p.page,
            p.card_normal,
            p.card_selected,
            p.card_pending,
            p.card_ready,
            p.card_domain,
            p.category_title,
            p.category_pinned,
            p.category_highlight,
            p.nav_normal,
            p.nav_selected,
            p.search_input,
            p.search_placeholder,
            p.search_count,
            p.search_empty,
            p.search_suggestion,
            p.status_bar,
            p.status_error,
            p.panel_border,
            p.panel_border_focused,
            p.overlay_title,
            p.history_time,
        ];

        let mut map = HashMap::with_capacity(ROLE_NAMES.len());
        for (name, style) in ROLE_NAMES.iter().zip(styles.iter()) {
            map.insert(*name, *style);
        }

        Self { map }
    }

    /// Resolve a role name to its `Style`. Returns `Style::default()` for unknown roles.
    pub fn resolve(&self, role: &str) -> Style {
        self.map.get(role).copied().unwrap_or_default()
    }
}

// ============================================================================
// Tests
// ============================================================================
