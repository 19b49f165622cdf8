//! Render functions for the TUI.
//!
//! This module lays out the page: search bar on top, category sidebar and
//! card grid below, the results panel while a search is active, and the
//! status bar. Overlays are drawn last.

use crate::app::App;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    widgets::{Block, Paragraph},
    Frame,
};

use super::{cards, help, history, search, sidebar, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 60;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Sidebar width in columns.
const SIDEBAR_WIDTH: u16 = 22;

/// Main render dispatch function.
///
/// Handles terminal size validation before rendering.
pub(super) fn render(f: &mut Frame, app: &mut App) {
    let area = f.area();

    // Guard against zero-width/height to prevent panics
    if area.width < 1 || area.height < 1 {
        return;
    }

    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    }

    f.render_widget(Block::default().style(app.style("page")), area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    search::render_bar(f, app, chunks[0]);
    render_main_panels(f, app, chunks[1]);
    status::render(f, app, chunks[2]);

    if app.history.is_some() {
        history::render(f, app);
    }

    // Render help overlay on top of everything when active
    if app.show_help {
        help::render(f, app);
    }
}

/// Sidebar on the left; results panel (when searching) above the cards.
fn render_main_panels(f: &mut Frame, app: &mut App, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(0)])
        .split(area);

    sidebar::render(f, app, columns[0]);

    if app.search_outcome.is_active() {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(results_height(app, columns[1].height)),
                Constraint::Min(0),
            ])
            .split(columns[1]);
        search::render_results(f, app, rows[0]);
        cards::render(f, app, rows[1]);
    } else {
        cards::render(f, app, columns[1]);
    }
}

/// Results panel height: its contents plus borders, capped at half the area.
fn results_height(app: &App, available: u16) -> u16 {
    let wanted = app.search_outcome.results().len().max(3) + 2;
    let cap = usize::from(available / 2).max(5);
    wanted.min(cap) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::IconState;
    use crate::catalog::{Catalog, CatalogOrigin, CatalogSource, LoadedCatalog};
    use crate::config::Config;
    use crate::storage::Database;
    use ratatui::{backend::TestBackend, Terminal};
    use std::path::PathBuf;

    async fn test_app() -> App {
        let db = Database::open(":memory:").await.unwrap();
        App::new(
            db,
            &Config::default(),
            CatalogSource::File(PathBuf::from("/nonexistent/site.json")),
            PathBuf::from("/nonexistent"),
        )
        .unwrap()
    }

    fn install_fallback(app: &mut App) {
        let generation = app.begin_loading();
        app.install_catalog(
            generation,
            LoadedCatalog {
                catalog: Catalog::fallback(),
                origin: CatalogOrigin::Source,
            },
        );
    }

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| render(f, app)).unwrap();
        let buf = terminal.backend().buffer();
        let area = buf.area;
        (0..area.height)
            .map(|y| {
                (0..area.width)
                    .map(|x| buf[(x, y)].symbol())
                    .collect::<String>()
                    .trim_end()
                    .to_string()
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[tokio::test]
    async fn test_too_small_terminal() {
        let mut app = test_app().await;
        let screen = draw(&mut app, 40, 8);
        assert!(screen.contains("Terminal too small"));
    }

    #[tokio::test]
    async fn test_loading_state() {
        let mut app = test_app().await;
        app.begin_loading();
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("Loading links..."));
        assert!(screen.contains("Press / to search sites"));
    }

    #[tokio::test]
    async fn test_empty_catalog_shows_no_data() {
        let mut app = test_app().await;
        let generation = app.begin_loading();
        app.install_catalog(
            generation,
            LoadedCatalog {
                catalog: Catalog::default(),
                origin: CatalogOrigin::Source,
            },
        );
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("No data"));
    }

    #[tokio::test]
    async fn test_cards_and_sidebar() {
        let mut app = test_app().await;
        install_fallback(&mut app);
        let screen = draw(&mut app, 100, 30);

        assert!(screen.contains("Common Sites"));
        assert!(screen.contains("Tencent Video"));
        assert!(screen.contains("github.com"));
        assert_eq!(app.cards_per_row, cards::cards_per_row(100 - SIDEBAR_WIDTH - 2));
    }

    #[tokio::test]
    async fn test_failed_icon_shows_monogram() {
        let mut app = test_app().await;
        install_fallback(&mut app);
        app.icon_states
            .insert("github.com".to_string(), IconState::Failed);
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains(" G  GitHub"));
    }

    #[tokio::test]
    async fn test_results_panel_and_suggestions() {
        let mut app = test_app().await;
        install_fallback(&mut app);

        app.search_query = "github".to_string();
        app.run_search();
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("Search results (1)"));

        app.search_query = "nothing-here".to_string();
        app.run_search();
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("Search results (0)"));
        assert!(screen.contains("No matching sites for \"nothing-here\""));
        assert!(screen.contains("Try: Baidu"));
    }

    #[tokio::test]
    async fn test_help_overlay_lists_contexts() {
        let mut app = test_app().await;
        install_fallback(&mut app);
        app.show_help = true;
        let screen = draw(&mut app, 100, 40);
        assert!(screen.contains("-- Global --"));
        assert!(screen.contains("Toggle light/dark theme"));
    }

    #[tokio::test]
    async fn test_theme_indicator() {
        let mut app = test_app().await;
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("Light"));
        app.toggle_theme();
        let screen = draw(&mut app, 100, 30);
        assert!(screen.contains("Dark"));
    }
}
