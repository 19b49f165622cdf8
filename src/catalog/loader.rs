use std::fmt;
use std::path::{Path, PathBuf};

use futures::StreamExt;
use thiserror::Error;
use url::Url;

use super::Catalog;

/// Maximum catalog document size (10 MB), for files and HTTP bodies alike.
const MAX_CATALOG_SIZE: usize = 10 * 1024 * 1024;

/// Errors that can occur while reading a catalog document.
///
/// None of these reach the user directly: [`load_catalog`] logs them and
/// substitutes [`Catalog::fallback`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Reading the catalog file failed (missing, unreadable)
    #[error("Failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    /// Network-level error (DNS, connection, TLS, timeout)
    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),
    /// HTTP response with non-2xx status code
    #[error("HTTP error: status {0}")]
    HttpStatus(u16),
    /// Document exceeded the 10MB size limit
    #[error("Catalog too large")]
    TooLarge,
    /// Document is not a valid catalog
    #[error("Malformed catalog: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Where the catalog is read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    File(PathBuf),
    Remote(Url),
}

impl CatalogSource {
    /// Interpret a `--data` / `data_source` value.
    ///
    /// `http://` and `https://` values are fetched; anything else is a file
    /// path, resolved against `base_dir` when relative.
    pub fn parse(raw: &str, base_dir: &Path) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            if let Ok(url) = Url::parse(trimmed) {
                return Self::Remote(url);
            }
        }

        let path = PathBuf::from(trimmed);
        if path.is_absolute() {
            Self::File(path)
        } else {
            Self::File(base_dir.join(path))
        }
    }
}

impl fmt::Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// How the catalog in a [`LoadedCatalog`] was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogOrigin {
    Source,
    Fallback { reason: String },
}

#[derive(Debug, Clone)]
pub struct LoadedCatalog {
    pub catalog: Catalog,
    pub origin: CatalogOrigin,
}

impl LoadedCatalog {
    pub fn is_fallback(&self) -> bool {
        matches!(self.origin, CatalogOrigin::Fallback { .. })
    }
}

/// Load the catalog, falling back to the built-in one on any failure.
///
/// Never fails. A document that parses but has no categories is returned
/// as-is so the UI can offer a manual reload.
pub async fn load_catalog(client: &reqwest::Client, source: &CatalogSource) -> LoadedCatalog {
    match read_catalog(client, source).await {
        Ok(catalog) => {
            tracing::info!(
                source = %source,
                categories = catalog.categories.len(),
                links = catalog.link_count(),
                "Loaded catalog"
            );
            LoadedCatalog {
                catalog,
                origin: CatalogOrigin::Source,
            }
        }
        Err(e) => {
            tracing::warn!(source = %source, error = %e, "Catalog load failed, using built-in catalog");
            LoadedCatalog {
                catalog: Catalog::fallback(),
                origin: CatalogOrigin::Fallback {
                    reason: e.to_string(),
                },
            }
        }
    }
}

async fn read_catalog(
    client: &reqwest::Client,
    source: &CatalogSource,
) -> Result<Catalog, CatalogError> {
    let bytes = match source {
        CatalogSource::File(path) => read_file_limited(path).await?,
        CatalogSource::Remote(url) => fetch_limited(client, url).await?,
    };
    Catalog::from_json(&bytes)
}

async fn read_file_limited(path: &Path) -> Result<Vec<u8>, CatalogError> {
    let meta = tokio::fs::metadata(path).await?;
    if meta.len() > MAX_CATALOG_SIZE as u64 {
        return Err(CatalogError::TooLarge);
    }
    Ok(tokio::fs::read(path).await?)
}

async fn fetch_limited(client: &reqwest::Client, url: &Url) -> Result<Vec<u8>, CatalogError> {
    let response = client.get(url.clone()).send().await?;

    let status = response.status();
    if !status.is_success() {
        return Err(CatalogError::HttpStatus(status.as_u16()));
    }

    read_limited_bytes(response, MAX_CATALOG_SIZE).await
}

async fn read_limited_bytes(
    response: reqwest::Response,
    limit: usize,
) -> Result<Vec<u8>, CatalogError> {
    if let Some(len) = response.content_length() {
        if len > limit as u64 {
            return Err(CatalogError::TooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(CatalogError::TooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}
