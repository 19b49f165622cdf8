//! Application event handling.
//!
//! This module processes background task completion events: catalog loads,
//! icon results, the search debounce and highlight timers.

use crate::app::{App, AppEvent, LoadState};
use tokio::sync::mpsc;

use super::helpers::spawn_icon_pass;

/// Handle application events from background tasks.
pub(super) async fn handle_app_event(
    app: &mut App,
    event: AppEvent,
    event_tx: &mpsc::Sender<AppEvent>,
) {
    match event {
        AppEvent::CatalogLoaded { generation, loaded } => {
            if !app.install_catalog(generation, loaded) {
                return;
            }
            app.catalog_load_handle = None;

            if let Some(reason) = &app.fallback_reason {
                app.set_status(format!("Using built-in links ({})", reason));
            } else if app.load_state == LoadState::Ready {
                tracing::info!(
                    categories = app.catalog.categories.len(),
                    links = app.catalog.link_count(),
                    "Catalog ready"
                );
            }
            spawn_icon_pass(app, event_tx);
        }
        AppEvent::IconLoaded {
            generation,
            domain,
            icon,
            result,
        } => {
            if !app.apply_icon_result(generation, domain, icon, result) {
                tracing::trace!(generation, "Ignoring icon result for replaced catalog");
            }
        }
        AppEvent::SearchDebounceElapsed => {
            // Reads the query as it is now; a cleared query stays inactive
            app.run_search();
        }
        AppEvent::SearchCleared => {
            tracing::debug!("Search cleared");
            app.on_search_cleared();
        }
        AppEvent::HighlightElapsed { generation } => {
            app.expire_highlight(generation);
        }
        AppEvent::TaskPanicked { task, error } => {
            tracing::error!(task, error, "Background task panicked");
            app.set_status(format!("Internal error in {} task", task));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{Focus, IconState};
    use crate::catalog::{Catalog, CatalogOrigin, CatalogSource, LoadedCatalog};
    use crate::config::Config;
    use crate::icons::IconRef;
    use crate::search::SearchOutcome;
    use crate::storage::Database;
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

    fn fallback_loaded(reason: &str) -> LoadedCatalog {
        LoadedCatalog {
            catalog: Catalog::fallback(),
            origin: CatalogOrigin::Fallback {
                reason: reason.to_string(),
            },
        }
    }

    #[tokio::test]
    async fn test_catalog_loaded_installs_and_reports_fallback() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        let generation = app.begin_loading();

        handle_app_event(
            &mut app,
            AppEvent::CatalogLoaded {
                generation,
                loaded: fallback_loaded("file not found"),
            },
            &tx,
        )
        .await;

        assert_eq!(app.load_state, LoadState::Ready);
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert!(msg.contains("built-in"));
        assert_eq!(app.icon_targets().len(), 3);
    }

    #[tokio::test]
    async fn test_stale_catalog_event_ignored() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        let stale = app.begin_loading();
        app.begin_loading();

        handle_app_event(
            &mut app,
            AppEvent::CatalogLoaded {
                generation: stale,
                loaded: fallback_loaded("x"),
            },
            &tx,
        )
        .await;

        assert_eq!(app.load_state, LoadState::Loading);
        assert!(app.status_message.is_none());
    }

    #[tokio::test]
    async fn test_icon_loaded_event() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        let generation = app.begin_loading();
        app.install_catalog(generation, fallback_loaded("x"));

        handle_app_event(
            &mut app,
            AppEvent::IconLoaded {
                generation,
                domain: "github.com".to_string(),
                icon: IconRef::new("https://favicon.im/github.com"),
                result: Ok(()),
            },
            &tx,
        )
        .await;

        assert_eq!(
            app.icon_state("https://github.com"),
            Some(&IconState::Ready(IconRef::new("https://favicon.im/github.com")))
        );
    }

    #[tokio::test]
    async fn test_debounce_after_clear_stays_inactive() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        let generation = app.begin_loading();
        app.install_catalog(generation, fallback_loaded("x"));

        app.search_query = "git".to_string();
        app.clear_search();
        handle_app_event(&mut app, AppEvent::SearchDebounceElapsed, &tx).await;

        assert_eq!(app.search_outcome, SearchOutcome::Inactive);
    }

    #[tokio::test]
    async fn test_search_cleared_returns_focus_to_cards() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        app.focus = Focus::Results;
        handle_app_event(&mut app, AppEvent::SearchCleared, &tx).await;
        assert_eq!(app.focus, Focus::Cards);
    }

    #[tokio::test]
    async fn test_task_panicked_sets_status() {
        let mut app = test_app().await;
        let (tx, _rx) = mpsc::channel(32);
        handle_app_event(
            &mut app,
            AppEvent::TaskPanicked {
                task: "icon_pass",
                error: "boom".to_string(),
            },
            &tx,
        )
        .await;
        let (msg, _) = app.status_message.as_ref().unwrap();
        assert_eq!(msg, "Internal error in icon_pass task");
    }
}
