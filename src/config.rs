//! Configuration file parser for ~/.config/sitenav/config.toml.
//!
//! The config file is optional; a missing file yields `Config::default()`.
//! Unknown keys are accepted by serde but logged as potential typos.
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// A remote favicon service: a display name and a URL template in which
/// `{domain}` is replaced by the domain key.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IconServiceConfig {
    pub name: String,
    pub template: String,
}

impl IconServiceConfig {
    fn new(name: &str, template: &str) -> Self {
        Self {
            name: name.to_string(),
            template: template.to_string(),
        }
    }
}

/// Default remote icon services, tried in order.
pub fn default_icon_services() -> Vec<IconServiceConfig> {
    vec![
        IconServiceConfig::new("favicon.im", "https://favicon.im/{domain}"),
        IconServiceConfig::new("faviconkit", "https://faviconkit.com/{domain}/64"),
    ]
}

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Theme used when no theme has been stored yet ("light" or "dark").
    pub theme: String,

    /// Catalog source: a path (relative paths resolve against the config
    /// directory) or an http(s) URL.
    pub data_source: String,

    /// Category shown first and highlighted, if present in the catalog.
    pub pinned_category: Option<String>,

    /// Quiet period before a search runs, in milliseconds.
    pub search_debounce_ms: u64,

    /// Remote favicon services, in priority order.
    pub icon_services: Vec<IconServiceConfig>,

    /// Extra domain → local icon path entries, merged over the built-in table.
    pub local_icons: HashMap<String, String>,

    /// Directory local icon paths resolve against. Defaults to the config directory.
    pub assets_dir: Option<PathBuf>,

    /// Timeout for icon service probes and icon loads, in seconds.
    pub icon_timeout_secs: u64,

    /// Keywords suggested when a search finds nothing.
    pub search_suggestions: Vec<String>,

    /// Custom keybinding overrides. Keys are action names, values are key strings.
    pub keybindings: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: "light".to_string(),
            data_source: "site.json".to_string(),
            pinned_category: Some("Life Helper".to_string()),
            search_debounce_ms: 300,
            icon_services: default_icon_services(),
            local_icons: HashMap::new(),
            assets_dir: None,
            icon_timeout_secs: 5,
            search_suggestions: [
                "Baidu", "Video", "Music", "Map", "Delivery", "News", "TV", "Shopping", "Search",
                "AI",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            keybindings: HashMap::new(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 10] = [
        "theme",
        "data_source",
        "pinned_category",
        "search_debounce_ms",
        "icon_services",
        "local_icons",
        "assets_dir",
        "icon_timeout_secs",
        "search_suggestions",
        "keybindings",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            theme = %config.theme,
            data_source = %config.data_source,
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Directory that local icon paths resolve against.
    pub fn assets_dir_or(&self, config_dir: &Path) -> PathBuf {
        match &self.assets_dir {
            Some(dir) if dir.is_absolute() => dir.clone(),
            Some(dir) => config_dir.join(dir),
            None => config_dir.to_path_buf(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
