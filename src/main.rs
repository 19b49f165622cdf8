use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;

use sitenav::app::{build_http_client, App, AppEvent};
use sitenav::catalog::{load_catalog, CatalogOrigin, CatalogSource, LoadedCatalog};
use sitenav::config::Config;
use sitenav::icons::IconResolver;
use sitenav::search::SearchIndex;
use sitenav::storage::{Database, DatabaseError};
use sitenav::theme::ThemeVariant;
use sitenav::ui;
use sitenav::util::domain_key;

/// Get the config directory path (~/.config/sitenav/)
fn get_config_dir() -> Result<PathBuf> {
    let home = std::env::var("HOME").context("HOME environment variable not set")?;
    let config_dir = PathBuf::from(home).join(".config").join("sitenav");
    Ok(config_dir)
}

#[derive(Parser, Debug)]
#[command(
    name = "sitenav",
    about = "Terminal navigation page: categorized sites with icons, search and themes"
)]
struct Args {
    /// Catalog to load: a JSON file path or an http(s) URL (overrides config)
    #[arg(long, value_name = "SOURCE")]
    data: Option<String>,

    /// Config file (default: ~/.config/sitenav/config.toml)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the sites matching QUERY and exit
    #[arg(long, value_name = "QUERY")]
    search: Option<String>,

    /// Print recently opened sites and exit
    #[arg(long)]
    history: bool,

    /// Resolve the icon of every site, print the result and exit
    #[arg(long)]
    icons: bool,

    /// Forget the stored theme and click history
    #[arg(long)]
    reset_state: bool,
}

/// Send logs to a file in the config directory; the terminal belongs to the UI.
fn init_logging(config_dir: &Path) -> Result<()> {
    let log_path = config_dir.join("sitenav.log");
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("sitenav=info")),
        )
        .with_writer(std::sync::Mutex::new(log_file))
        .with_ansi(false)
        .init();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config_dir = get_config_dir()?;
    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir).context("Failed to create config directory")?;
    }

    // Set directory permissions on Unix (user-only access)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        match std::fs::metadata(&config_dir) {
            Ok(metadata) => {
                let mut perms = metadata.permissions();
                perms.set_mode(0o700);
                if let Err(e) = std::fs::set_permissions(&config_dir, perms) {
                    eprintln!(
                        "Warning: failed to set {} permissions to 0700: {}",
                        config_dir.display(),
                        e
                    );
                }
            }
            Err(e) => {
                eprintln!(
                    "Warning: failed to read {} metadata: {}",
                    config_dir.display(),
                    e
                );
            }
        }
    }

    init_logging(&config_dir)?;

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| config_dir.join("config.toml"));
    let config = match Config::load(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {}", e);
            eprintln!("Using default configuration.");
            tracing::warn!(error = %e, "Falling back to default configuration");
            Config::default()
        }
    };

    let catalog_source = match &args.data {
        Some(raw) => CatalogSource::parse(raw, &std::env::current_dir()?),
        None => CatalogSource::parse(&config.data_source, &config_dir),
    };
    let assets_dir = config.assets_dir_or(&config_dir);

    // Open database
    let db_path = config_dir.join("state.db");
    let db_path_str = db_path
        .to_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid UTF-8 in database path"))?;
    let db = match Database::open(db_path_str).await {
        Ok(db) => db,
        Err(DatabaseError::InstanceLocked) => {
            eprintln!(
                "Error: Another instance of sitenav appears to be running. Please close it and try again."
            );
            std::process::exit(1);
        }
        Err(e) => {
            return Err(anyhow::anyhow!("Failed to open database: {}", e));
        }
    };

    if args.reset_state {
        db.reset_state().await.context("Failed to reset state")?;
        println!("Stored theme and click history cleared.");
        tracing::info!("Stored state reset");
    }

    if args.history {
        return print_history(&db).await;
    }

    if let Some(query) = &args.search {
        return print_search(&catalog_source, query).await;
    }

    if args.icons {
        return print_icons(&catalog_source, &config).await;
    }

    // Create app state
    let mut app = App::new(db.clone(), &config, catalog_source, assets_dir)
        .context("Failed to create application")?;

    for warning in app.keybindings.apply_overrides(&config.keybindings) {
        tracing::warn!("{}", warning);
    }

    // Stored theme wins over the configured one
    match db.stored_theme().await {
        Ok(Some(stored)) => match ThemeVariant::from_str_name(&stored) {
            Some(variant) => app.set_theme(variant),
            None => tracing::warn!(value = %stored, "Ignoring unknown stored theme"),
        },
        Ok(None) => {}
        Err(e) => tracing::warn!(error = %e, "Failed to read stored theme"),
    }

    let (event_tx, event_rx) = mpsc::channel::<AppEvent>(64);

    ui::run(&mut app, event_tx, event_rx).await?;

    println!("Goodbye!");
    Ok(())
}

async fn fetch_catalog(source: &CatalogSource) -> Result<LoadedCatalog> {
    let client = build_http_client()?;
    let loaded = load_catalog(&client, source).await;
    if let CatalogOrigin::Fallback { reason } = &loaded.origin {
        eprintln!("Warning: using built-in links ({})", reason);
    }
    Ok(loaded)
}

async fn print_search(source: &CatalogSource, query: &str) -> Result<()> {
    let loaded = fetch_catalog(source).await?;
    let index = SearchIndex::build(&loaded.catalog);
    let outcome = index.search(query);

    if !outcome.is_active() {
        println!("Empty query; nothing to search.");
        return Ok(());
    }

    let results = outcome.results();
    println!("{} result(s) for \"{}\"", results.len(), query.trim());
    for record in results {
        println!("  {}  [{}]  {}", record.title, record.category, record.url);
    }
    Ok(())
}

async fn print_history(db: &Database) -> Result<()> {
    let clicks = db.recent_clicks().await?;
    if clicks.is_empty() {
        println!("Nothing opened yet.");
        return Ok(());
    }
    for click in clicks {
        let when = chrono::DateTime::from_timestamp_millis(click.timestamp)
            .map(|t| {
                t.with_timezone(&chrono::Local)
                    .format("%Y-%m-%d %H:%M")
                    .to_string()
            })
            .unwrap_or_else(|| "?".to_string());
        println!("{}  {}  {}", when, click.title, click.url);
    }
    Ok(())
}

async fn print_icons(source: &CatalogSource, config: &Config) -> Result<()> {
    let loaded = fetch_catalog(source).await?;
    let client = build_http_client()?;
    let resolver = Arc::new(IconResolver::from_config(client, config));

    let urls: Vec<String> = loaded.catalog.links().map(|l| l.url.clone()).collect();
    resolver
        .preload(urls)
        .await
        .context("Icon preload task failed")?;

    let mut seen = HashSet::new();
    for link in loaded.catalog.links() {
        // Links without a domain are never cached
        let Some(domain) = domain_key(&link.url) else {
            println!("{} (unparsable URL) -> default icon", link.title);
            continue;
        };
        if !seen.insert(domain.clone()) {
            continue;
        }
        match resolver.cached(&link.url) {
            Some(icon) if icon.is_placeholder() => println!("{} -> default icon", domain),
            Some(icon) => println!("{} -> {}", domain, icon),
            None => println!("{} -> (not resolved)", domain),
        }
    }

    let stats = resolver.cache_stats();
    println!(
        "{} domain(s) cached, {} local icon mapping(s)",
        stats.cached, stats.local_icons
    );
    Ok(())
}
