//! Keybinding registry: maps actions to key events with config overrides.
//!
//! Context-aware: the same key can mean different things in the sidebar,
//! the card grid, the search results and the search field. Lookups fall
//! back to the `Global` context.
use crossterm::event::{KeyCode, KeyModifiers};
use std::collections::HashMap;

// ============================================================================
// Action Enum
// ============================================================================

/// All user-facing actions that can be triggered by keybindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Quit,
    NavDown,
    NavUp,
    NavLeft,
    NavRight,
    NextCategory,
    PrevCategory,
    CycleFocus,
    Back,
    Select,
    OpenInBrowser,
    EnterSearch,
    ClearSearch,
    CommitSearch,
    ToggleTheme,
    ShowHelp,
    ShowHistory,
    Reload,
}

impl Action {
    /// Human-readable description for the help screen.
    pub fn describe(self) -> &'static str {
        match self {
            Self::Quit => "Quit application",
            Self::NavDown => "Move down",
            Self::NavUp => "Move up",
            Self::NavLeft => "Move left",
            Self::NavRight => "Move right",
            Self::NextCategory => "Jump to next category",
            Self::PrevCategory => "Jump to previous category",
            Self::CycleFocus => "Cycle panel focus",
            Self::Back => "Go back / clear search",
            Self::Select => "Open link / jump to category",
            Self::OpenInBrowser => "Open in browser",
            Self::EnterSearch => "Search sites",
            Self::ClearSearch => "Clear search",
            Self::CommitSearch => "Search now and browse results",
            Self::ToggleTheme => "Toggle light/dark theme",
            Self::ShowHelp => "Show help",
            Self::ShowHistory => "Show recently opened",
            Self::Reload => "Reload site list",
        }
    }
}

// ============================================================================
// Context Enum
// ============================================================================

/// Dispatch context: determines which bindings are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Global,
    Sidebar,
    Cards,
    Results,
    Search,
}

impl Context {
    /// Heading used on the help screen.
    pub fn label(self) -> &'static str {
        match self {
            Self::Global => "Global",
            Self::Sidebar => "Categories",
            Self::Cards => "Sites",
            Self::Results => "Search Results",
            Self::Search => "Search Field",
        }
    }
}

// ============================================================================
// Key Specification
// ============================================================================

/// A key event: code + modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeySpec {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeySpec {
    pub const fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub const fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub const fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }
}

/// Parse a key string from config into a KeySpec.
///
/// Supported formats:
/// - Single char: "q", "j", "/"
/// - Named keys: "Enter", "Esc", "Tab", "Up", "Down", "Backspace"
/// - Modifier combos: "Ctrl+d", "Ctrl+u"
/// - Function keys: "F1" through "F12"
fn parse_key_string(s: &str) -> Option<KeySpec> {
    let s = s.trim();

    if let Some(rest) = s.strip_prefix("Ctrl+") {
        let mut chars = rest.trim().chars();
        return match (chars.next(), chars.next()) {
            (Some(c), None) => Some(KeySpec::ctrl(c)),
            _ => None,
        };
    }

    match s.to_lowercase().as_str() {
        "enter" | "return" => return Some(KeySpec::plain(KeyCode::Enter)),
        "esc" | "escape" => return Some(KeySpec::plain(KeyCode::Esc)),
        "tab" => return Some(KeySpec::plain(KeyCode::Tab)),
        "up" => return Some(KeySpec::plain(KeyCode::Up)),
        "down" => return Some(KeySpec::plain(KeyCode::Down)),
        "left" => return Some(KeySpec::plain(KeyCode::Left)),
        "right" => return Some(KeySpec::plain(KeyCode::Right)),
        "backspace" => return Some(KeySpec::plain(KeyCode::Backspace)),
        "space" => return Some(KeySpec::plain(KeyCode::Char(' '))),
        _ => {}
    }

    if let Some(num) = s.strip_prefix(['F', 'f']) {
        if let Ok(n) = num.parse::<u8>() {
            if (1..=12).contains(&n) {
                return Some(KeySpec::plain(KeyCode::F(n)));
            }
        }
    }

    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(KeySpec::plain(KeyCode::Char(c))),
        _ => None,
    }
}

/// Format a KeySpec as a human-readable string for the help screen.
fn format_key(key: &KeySpec) -> String {
    let modifier = if key.modifiers.contains(KeyModifiers::CONTROL) {
        "Ctrl+"
    } else {
        ""
    };

    let key_name = match key.code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        _ => "?".to_string(),
    };

    format!("{}{}", modifier, key_name)
}

// ============================================================================
// Keybinding Registry
// ============================================================================

/// Registry of keybindings, supporting default bindings and config overrides.
pub struct KeybindingRegistry {
    /// Primary lookup: (Context, KeySpec) -> Action
    lookup: HashMap<(Context, KeySpec), Action>,
    /// All bindings for help screen enumeration
    bindings: Vec<(Context, KeySpec, Action)>,
}

impl KeybindingRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            lookup: HashMap::new(),
            bindings: Vec::new(),
        };
        registry.register_defaults();
        registry
    }

    fn bind(&mut self, context: Context, key: KeySpec, action: Action) {
        self.lookup.insert((context, key), action);
        self.bindings.push((context, key, action));
    }

    fn register_defaults(&mut self) {
        use KeyCode::{Char, Down, Enter, Esc, Left, Right, Tab, Up};

        // === Global ===
        self.bind(Context::Global, KeySpec::plain(Char('q')), Action::Quit);
        self.bind(Context::Global, KeySpec::ctrl('c'), Action::Quit);

        self.bind(Context::Global, KeySpec::plain(Char('j')), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Down), Action::NavDown);
        self.bind(Context::Global, KeySpec::plain(Char('k')), Action::NavUp);
        self.bind(Context::Global, KeySpec::plain(Up), Action::NavUp);
        self.bind(Context::Global, KeySpec::plain(Tab), Action::CycleFocus);
        self.bind(Context::Global, KeySpec::plain(Esc), Action::Back);
        self.bind(Context::Global, KeySpec::plain(Enter), Action::Select);
        self.bind(
            Context::Global,
            KeySpec::plain(Char('o')),
            Action::OpenInBrowser,
        );

        self.bind(Context::Global, KeySpec::plain(Char(']')), Action::NextCategory);
        self.bind(Context::Global, KeySpec::plain(Char('[')), Action::PrevCategory);

        self.bind(Context::Global, KeySpec::plain(Char('/')), Action::EnterSearch);
        self.bind(Context::Global, KeySpec::plain(Char('t')), Action::ToggleTheme);
        self.bind(Context::Global, KeySpec::plain(Char('?')), Action::ShowHelp);
        self.bind(Context::Global, KeySpec::plain(Char('H')), Action::ShowHistory);
        self.bind(Context::Global, KeySpec::plain(Char('r')), Action::Reload);

        // === Card grid ===
        self.bind(Context::Cards, KeySpec::plain(Char('h')), Action::NavLeft);
        self.bind(Context::Cards, KeySpec::plain(Left), Action::NavLeft);
        self.bind(Context::Cards, KeySpec::plain(Char('l')), Action::NavRight);
        self.bind(Context::Cards, KeySpec::plain(Right), Action::NavRight);

        // === Search results ===
        self.bind(Context::Results, KeySpec::plain(Esc), Action::ClearSearch);

        // === Search field ===
        self.bind(Context::Search, KeySpec::plain(Esc), Action::ClearSearch);
        self.bind(Context::Search, KeySpec::plain(Enter), Action::CommitSearch);
    }

    /// Apply user overrides from config keybindings map.
    ///
    /// Keys in the map are action names (e.g., "quit", "toggle_theme").
    /// Values are key strings (e.g., "q", "Ctrl+d", "F5").
    ///
    /// Returns a list of warnings for unrecognized action names or unparseable keys.
    pub fn apply_overrides(&mut self, overrides: &HashMap<String, String>) -> Vec<String> {
        let mut warnings = Vec::new();

        for (action_name, key_str) in overrides {
            let Some(action) = parse_action_name(action_name) else {
                warnings.push(format!("Unknown action '{}', ignoring", action_name));
                continue;
            };

            let Some(key) = parse_key_string(key_str) else {
                warnings.push(format!(
                    "Cannot parse key '{}' for action '{}', ignoring",
                    key_str, action_name
                ));
                continue;
            };

            // Re-bind in every context the action was bound in
            let mut contexts_for_action: Vec<Context> = self
                .bindings
                .iter()
                .filter(|(_, _, a)| *a == action)
                .map(|(c, _, _)| *c)
                .collect();
            contexts_for_action.dedup();

            self.lookup.retain(|_, a| *a != action);
            self.bindings.retain(|(_, _, a)| *a != action);

            for ctx in contexts_for_action {
                self.bind(ctx, key, action);
            }

            tracing::info!(
                action = %action_name,
                key = %key_str,
                "Applied keybinding override"
            );
        }

        warnings
    }

    /// Look up the action for a given key in a given context.
    ///
    /// Tries the specific context first, then falls back to Global.
    pub fn action_for_key(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        let key = KeySpec::new(code, modifiers);

        if let Some(&action) = self.lookup.get(&(context, key)) {
            return Some(action);
        }

        if context != Context::Global {
            if let Some(&action) = self.lookup.get(&(Context::Global, key)) {
                return Some(action);
            }
        }

        None
    }

    /// Look up only the bindings of one context, without Global fallback.
    ///
    /// The search field uses this so printable keys reach the query.
    pub fn action_in_context(
        &self,
        code: KeyCode,
        modifiers: KeyModifiers,
        context: Context,
    ) -> Option<Action> {
        self.lookup
            .get(&(context, KeySpec::new(code, modifiers)))
            .copied()
    }

    /// Get all bindings for the help screen.
    ///
    /// Returns (context, key_display_string, action, description) tuples.
    pub fn all_bindings(&self) -> Vec<(Context, String, Action, &'static str)> {
        self.bindings
            .iter()
            .map(|(ctx, key, action)| (*ctx, format_key(key), *action, action.describe()))
            .collect()
    }
}

impl Default for KeybindingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse an action name string (from config) into an Action enum.
fn parse_action_name(name: &str) -> Option<Action> {
    match name.to_lowercase().as_str() {
        "quit" => Some(Action::Quit),
        "nav_down" | "down" => Some(Action::NavDown),
        "nav_up" | "up" => Some(Action::NavUp),
        "nav_left" | "left" => Some(Action::NavLeft),
        "nav_right" | "right" => Some(Action::NavRight),
        "next_category" => Some(Action::NextCategory),
        "prev_category" | "previous_category" => Some(Action::PrevCategory),
        "cycle_focus" | "tab" => Some(Action::CycleFocus),
        "back" => Some(Action::Back),
        "select" | "enter" => Some(Action::Select),
        "open_in_browser" | "open" => Some(Action::OpenInBrowser),
        "enter_search" | "search" => Some(Action::EnterSearch),
        "clear_search" => Some(Action::ClearSearch),
        "commit_search" => Some(Action::CommitSearch),
        "toggle_theme" | "theme" => Some(Action::ToggleTheme),
        "show_help" | "help" => Some(Action::ShowHelp),
        "show_history" | "history" => Some(Action::ShowHistory),
        "reload" => Some(Action::Reload),
        _ => None,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_registry_has_quit() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('q'), KeyModifiers::NONE, Context::Global),
            Some(Action::Quit)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('c'), KeyModifiers::CONTROL, Context::Cards),
            Some(Action::Quit)
        );
    }

    #[test]
    fn test_cards_context_adds_horizontal_movement() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Cards),
            Some(Action::NavRight)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Left, KeyModifiers::NONE, Context::Cards),
            Some(Action::NavLeft)
        );
        // Not bound outside the grid
        assert_eq!(
            reg.action_for_key(KeyCode::Char('l'), KeyModifiers::NONE, Context::Sidebar),
            None
        );
    }

    #[test]
    fn test_context_falls_back_to_global() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Char('t'), KeyModifiers::NONE, Context::Sidebar),
            Some(Action::ToggleTheme)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Enter, KeyModifiers::NONE, Context::Results),
            Some(Action::Select)
        );
    }

    #[test]
    fn test_esc_clears_search_in_results() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Results),
            Some(Action::ClearSearch)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Cards),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_search_context_has_no_global_fallback() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_in_context(KeyCode::Enter, KeyModifiers::NONE, Context::Search),
            Some(Action::CommitSearch)
        );
        assert_eq!(
            reg.action_in_context(KeyCode::Esc, KeyModifiers::NONE, Context::Search),
            Some(Action::ClearSearch)
        );
        // 'q' must be typed into the query, not quit
        assert_eq!(
            reg.action_in_context(KeyCode::Char('q'), KeyModifiers::NONE, Context::Search),
            None
        );
    }

    #[test]
    fn test_unknown_key_returns_none() {
        let reg = KeybindingRegistry::new();
        assert_eq!(
            reg.action_for_key(KeyCode::F(12), KeyModifiers::NONE, Context::Global),
            None
        );
    }

    #[test]
    fn test_apply_overrides_valid() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("toggle_theme".to_string(), "F2".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert!(warnings.is_empty());

        assert_eq!(
            reg.action_for_key(KeyCode::Char('t'), KeyModifiers::NONE, Context::Global),
            None
        );
        assert_eq!(
            reg.action_for_key(KeyCode::F(2), KeyModifiers::NONE, Context::Cards),
            Some(Action::ToggleTheme)
        );
    }

    #[test]
    fn test_override_preserves_contexts() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("clear_search".to_string(), "Ctrl+x".to_string());
        assert!(reg.apply_overrides(&overrides).is_empty());

        assert_eq!(
            reg.action_in_context(KeyCode::Char('x'), KeyModifiers::CONTROL, Context::Search),
            Some(Action::ClearSearch)
        );
        assert_eq!(
            reg.action_for_key(KeyCode::Char('x'), KeyModifiers::CONTROL, Context::Results),
            Some(Action::ClearSearch)
        );
        // Esc in results falls back to Global Back once the override moves it
        assert_eq!(
            reg.action_for_key(KeyCode::Esc, KeyModifiers::NONE, Context::Results),
            Some(Action::Back)
        );
    }

    #[test]
    fn test_override_of_multi_key_action_binds_once_per_context() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("nav_down".to_string(), "n".to_string());
        reg.apply_overrides(&overrides);

        let count = reg
            .all_bindings()
            .iter()
            .filter(|(_, _, a, _)| *a == Action::NavDown)
            .count();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_apply_overrides_unknown_action() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("subscribe".to_string(), "q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Unknown action"));
    }

    #[test]
    fn test_apply_overrides_bad_key() {
        let mut reg = KeybindingRegistry::new();
        let mut overrides = HashMap::new();
        overrides.insert("quit".to_string(), "Ctrl+Alt+Shift+Q".to_string());

        let warnings = reg.apply_overrides(&overrides);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Cannot parse key"));
    }

    #[test]
    fn test_parse_key_string_formats() {
        assert_eq!(parse_key_string("Enter"), Some(KeySpec::plain(KeyCode::Enter)));
        assert_eq!(parse_key_string("esc"), Some(KeySpec::plain(KeyCode::Esc)));
        assert_eq!(parse_key_string("space"), Some(KeySpec::plain(KeyCode::Char(' '))));
        assert_eq!(parse_key_string("F1"), Some(KeySpec::plain(KeyCode::F(1))));
        assert_eq!(parse_key_string("F13"), None);
        assert_eq!(parse_key_string("Ctrl+d"), Some(KeySpec::ctrl('d')));
        assert_eq!(parse_key_string("/"), Some(KeySpec::plain(KeyCode::Char('/'))));
        assert_eq!(parse_key_string("主"), Some(KeySpec::plain(KeyCode::Char('主'))));
        assert_eq!(parse_key_string("abc"), None);
    }

    #[test]
    fn test_format_key_display() {
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Char('q'))), "q");
        assert_eq!(format_key(&KeySpec::ctrl('c')), "Ctrl+c");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::Enter)), "Enter");
        assert_eq!(format_key(&KeySpec::plain(KeyCode::F(5))), "F5");
    }

    #[test]
    fn test_every_action_has_a_default_binding() {
        let reg = KeybindingRegistry::new();
        let bound: Vec<Action> = reg.all_bindings().iter().map(|b| b.2).collect();
        for action in [
            Action::Quit,
            Action::NavLeft,
            Action::NextCategory,
            Action::ClearSearch,
            Action::CommitSearch,
            Action::ShowHistory,
            Action::Reload,
        ] {
            assert!(bound.contains(&action), "{action:?} unbound");
        }
    }
}
