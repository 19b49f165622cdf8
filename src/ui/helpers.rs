//! Helper functions for UI operations.
//!
//! Background task spawning (catalog load, icon pass, timers) and link
//! opening, shared by the input and event handlers.

use crate::app::{App, AppEvent, HIGHLIGHT_DURATION};
use crate::catalog::load_catalog;
use crate::icons::{load_icon, PRELOAD_CONCURRENCY};
use crate::util::validate_url_for_open;
use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wraps a future to catch panics and convert them to errors.
///
/// Instead of a spawned task silently disappearing (caught by Tokio's
/// runtime but not handled), panics are converted to `Err(String)`
/// containing the panic message.
///
/// # Returns
///
/// - `Ok(result)` if the future completes normally
/// - `Err(panic_message)` if the future panics
pub(super) async fn catch_task_panic<F, T>(future: F) -> Result<T, String>
where
    F: std::future::Future<Output = T>,
{
    AssertUnwindSafe(future)
        .catch_unwind()
        .await
        .map_err(|panic| {
            if let Some(s) = panic.downcast_ref::<&'static str>() {
                s.to_string()
            } else if let Some(s) = panic.downcast_ref::<String>() {
                s.clone()
            } else {
                format!("Unknown panic: {:?}", (*panic).type_id())
            }
        })
}

/// Report a panicked task to the event loop.
async fn report_panic(tx: &mpsc::Sender<AppEvent>, task: &'static str, error: String) {
    tracing::error!(task, error = %error, "Background task panicked");
    let _ = tx.send(AppEvent::TaskPanicked { task, error }).await;
}

/// Start (or restart) loading the catalog.
///
/// Aborts an in-flight load, bumps the load generation and spawns the
/// fetch. The result arrives as `AppEvent::CatalogLoaded`.
pub(super) fn spawn_catalog_load(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    if let Some(handle) = app.catalog_load_handle.take() {
        handle.abort();
        tracing::debug!("Aborted previous catalog load task");
    }

    let generation = app.begin_loading();
    let client = app.http_client.clone();
    let source = app.catalog_source.clone();
    let tx = event_tx.clone();

    tracing::info!(source = %source, generation, "Loading catalog");

    app.catalog_load_handle = Some(tokio::spawn(async move {
        match catch_task_panic(load_catalog(&client, &source)).await {
            Ok(loaded) => {
                if let Err(e) = tx.send(AppEvent::CatalogLoaded { generation, loaded }).await {
                    tracing::warn!(error = %e, event = "CatalogLoaded", "Channel send failed (receiver dropped)");
                }
            }
            Err(panic_msg) => report_panic(&tx, "catalog_load", panic_msg).await,
        }
    }));
}

/// Resolve and load one icon per distinct domain of the current catalog.
///
/// Each finished domain is reported as `AppEvent::IconLoaded`, tagged with
/// the catalog generation so results for a replaced catalog are dropped.
/// Results come back in completion order.
pub(super) fn spawn_icon_pass(app: &App, event_tx: &mpsc::Sender<AppEvent>) {
    let targets = app.icon_targets();
    if targets.is_empty() {
        return;
    }

    let generation = app.load_generation;
    let resolver = Arc::clone(&app.icons);
    let client = app.http_client.clone();
    let assets_dir = app.assets_dir.clone();
    let timeout = app.icon_timeout;
    let tx = event_tx.clone();

    tracing::debug!(domains = targets.len(), generation, "Starting icon pass");

    tokio::spawn(async move {
        let tx_panic = tx.clone();
        let pass = stream::iter(targets).for_each_concurrent(PRELOAD_CONCURRENCY, |(domain, url)| {
            let resolver = Arc::clone(&resolver);
            let client = client.clone();
            let assets_dir = assets_dir.clone();
            let tx = tx.clone();
            async move {
                let icon = resolver.resolve(&url).await;
                let result = load_icon(&client, &icon, &assets_dir, timeout)
                    .await
                    .map_err(|e| e.to_string());
                let event = AppEvent::IconLoaded {
                    generation,
                    domain,
                    icon,
                    result,
                };
                if tx.send(event).await.is_err() {
                    tracing::debug!("Icon result dropped (receiver closed)");
                }
            }
        });

        if let Err(panic_msg) = catch_task_panic(pass).await {
            report_panic(&tx_panic, "icon_pass", panic_msg).await;
        }
    });
}

/// (Re)start the search debounce timer.
pub(super) fn schedule_search(app: &mut App, event_tx: &mpsc::Sender<AppEvent>) {
    let tx = event_tx.clone();
    app.search_debouncer.schedule(async move {
        let _ = tx.send(AppEvent::SearchDebounceElapsed).await;
    });
}

/// Expire a category highlight after [`HIGHLIGHT_DURATION`].
pub(super) fn schedule_highlight_expiry(generation: u64, event_tx: &mpsc::Sender<AppEvent>) {
    let tx = event_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(HIGHLIGHT_DURATION).await;
        let _ = tx.send(AppEvent::HighlightElapsed { generation }).await;
    });
}

/// Open a link in the system browser and record the click.
///
/// The click is written in the background; a storage failure is logged and
/// never blocks navigation.
pub(super) fn open_link(app: &mut App, title: String, url: String) {
    // Validate before open::that() so only http(s) reaches the OS launcher
    if let Err(e) = validate_url_for_open(&url) {
        app.set_status(e.to_string());
        return;
    }
    if let Err(e) = open::that(&url) {
        app.set_status(format!("Failed to open browser: {}", e));
        return;
    }

    app.set_status(format!("Opening {}...", title));
    tracing::info!(title = %title, url = %url, "Opened link");

    let db = app.db.clone();
    tokio::spawn(async move {
        match catch_task_panic(db.track_click(&title, &url)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => tracing::warn!(error = %e, url = %url, "Failed to record click"),
            Err(panic_msg) => tracing::error!(task = "track_click", error = %panic_msg, "Background task panicked"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_catch_task_panic_passes_value_through() {
        let result = catch_task_panic(async { 42 }).await;
        assert_eq!(result, Ok(42));
    }

    #[tokio::test]
    async fn test_catch_task_panic_str_message() {
        let result: Result<(), String> = catch_task_panic(async { panic!("boom") }).await;
        assert_eq!(result, Err("boom".to_string()));
    }

    #[tokio::test]
    async fn test_catch_task_panic_formatted_message() {
        let n = 3;
        let result: Result<(), String> =
            catch_task_panic(async move { panic!("failed after {} tries", n) }).await;
        assert_eq!(result, Err("failed after 3 tries".to_string()));
    }
}
