//! Input handling for the TUI.
//!
//! This module processes keyboard input and dispatches to the appropriate
//! handler based on overlays, the search field and the focused panel.

use crate::app::{App, AppEvent, Focus};
use crate::keybindings::{Action as KbAction, Context as KbContext};
use crate::util::MAX_SEARCH_QUERY_LENGTH;
use anyhow::Result;
use crossterm::event::{KeyCode, KeyModifiers};
use tokio::sync::mpsc;

use super::helpers::{
    open_link, schedule_highlight_expiry, schedule_search, spawn_catalog_load,
};
use super::Action;

/// Map the current focus panel to a keybinding context for context-specific lookups.
fn focus_to_context(focus: Focus) -> KbContext {
    match focus {
        Focus::Sidebar => KbContext::Sidebar,
        Focus::Cards => KbContext::Cards,
        Focus::Results => KbContext::Results,
    }
}

/// Main input dispatch function.
///
/// Overlays capture all keys while visible; then the search field while
/// typing; then the focused panel.
pub(super) async fn handle_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    if app.show_help {
        return Ok(handle_help_input(app, code));
    }

    if app.history.is_some() {
        return Ok(handle_history_input(app, code));
    }

    if app.search_typing {
        return Ok(handle_search_input(app, code, modifiers, event_tx));
    }

    handle_browse_input(app, code, modifiers, event_tx).await
}

/// Handle input while the help overlay is visible.
///
/// Captures all keys: j/k/Up/Down scroll, Esc/q/? dismiss.
fn handle_help_input(app: &mut App, code: KeyCode) -> Action {
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
            app.show_help = false;
            app.help_scroll_offset = 0;
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_add(1);
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.help_scroll_offset = app.help_scroll_offset.saturating_sub(1);
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the click history overlay is visible.
fn handle_history_input(app: &mut App, code: KeyCode) -> Action {
    let len = app.history.as_ref().map_or(0, Vec::len);
    match code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('H') => app.close_history(),
        KeyCode::Char('j') | KeyCode::Down => {
            if app.history_selected + 1 < len {
                app.history_selected += 1;
            }
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.history_selected = app.history_selected.saturating_sub(1);
        }
        KeyCode::Enter | KeyCode::Char('o') => {
            if let Some((title, url)) = app.open_target() {
                app.close_history();
                open_link(app, title, url);
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Handle input while the search field has the cursor.
///
/// Only Search-context bindings apply, so printable keys reach the query.
fn handle_search_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Action {
    match app.keybindings.action_in_context(code, modifiers, KbContext::Search) {
        Some(KbAction::ClearSearch) => {
            clear_search(app, event_tx);
            return Action::Continue;
        }
        Some(KbAction::CommitSearch) => {
            // Explicit commit supersedes the pending debounce
            app.search_debouncer.cancel();
            app.commit_search();
            return Action::Continue;
        }
        _ => {}
    }

    match code {
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => return Action::Quit,
        KeyCode::Backspace => {
            if app.pop_search_char() {
                schedule_search(app, event_tx);
            }
        }
        KeyCode::Char(c) if !modifiers.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            if app.push_search_char(c) {
                schedule_search(app, event_tx);
            } else {
                app.set_status(format!(
                    "Search query at max length ({} chars)",
                    MAX_SEARCH_QUERY_LENGTH
                ));
            }
        }
        _ => {}
    }
    Action::Continue
}

/// Empty the search and notify listeners.
fn clear_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if app.clear_search() {
        if let Err(e) = event_tx.try_send(AppEvent::SearchCleared) {
            tracing::warn!(error = %e, event = "SearchCleared", "Channel send failed");
        }
    }
}

/// Handle input while browsing the sidebar, card grid or results list.
async fn handle_browse_input(
    app: &mut App,
    code: KeyCode,
    modifiers: KeyModifiers,
    event_tx: &mpsc::Sender<AppEvent>,
) -> Result<Action> {
    let context = focus_to_context(app.focus);
    let action = app.keybindings.action_for_key(code, modifiers, context);

    match action {
        Some(KbAction::Quit) => return Ok(Action::Quit),
        Some(KbAction::NavDown) => app.nav_down(),
        Some(KbAction::NavUp) => app.nav_up(),
        Some(KbAction::NavLeft) => app.nav_left(),
        Some(KbAction::NavRight) => app.nav_right(),
        Some(KbAction::CycleFocus) => app.cycle_focus(),
        Some(KbAction::NextCategory) => {
            if let Some(section) = app.next_section() {
                jump_to(app, section, event_tx);
            }
        }
        Some(KbAction::PrevCategory) => {
            if let Some(section) = app.prev_section() {
                jump_to(app, section, event_tx);
            }
        }
        Some(KbAction::Select) => match app.focus {
            Focus::Sidebar => jump_to(app, app.selected_category, event_tx),
            Focus::Cards | Focus::Results => {
                if let Some((title, url)) = app.open_target() {
                    open_link(app, title, url);
                }
            }
        },
        Some(KbAction::OpenInBrowser) => {
            if let Some((title, url)) = app.open_target() {
                open_link(app, title, url);
            }
        }
        Some(KbAction::EnterSearch) => {
            app.search_typing = true;
        }
        Some(KbAction::ClearSearch) => clear_search(app, event_tx),
        Some(KbAction::Back) => {
            if app.search_outcome.is_active() {
                clear_search(app, event_tx);
            } else if app.focus == Focus::Sidebar {
                app.focus = Focus::Cards;
            }
        }
        Some(KbAction::ToggleTheme) => {
            let variant = app.toggle_theme();
            // A failed write only costs persistence across restarts
            if let Err(e) = app.db.store_theme(variant.storage_value()).await {
                tracing::warn!(error = %e, "Failed to store theme");
            }
            app.set_status(format!("Theme: {}", variant.name()));
        }
        Some(KbAction::ShowHelp) => {
            app.show_help = true;
            app.help_scroll_offset = 0;
        }
        Some(KbAction::ShowHistory) => {
            let clicks = app.db.recent_clicks().await?;
            app.show_history(clicks);
        }
        Some(KbAction::Reload) => {
            app.set_status("Reloading...");
            spawn_catalog_load(app, event_tx);
        }
        Some(KbAction::CommitSearch) | None => {}
    }
    Ok(Action::Continue)
}

fn jump_to(app: &mut App, section: usize, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(generation) = app.jump_to_section(section) {
        schedule_highlight_expiry(generation, event_tx);
    }
}
