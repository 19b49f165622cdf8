use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::task::JoinHandle;
use url::Url;

use crate::config::{Config, IconServiceConfig};
use crate::util::domain_key;

/// Placeholder returned when nothing better can be resolved: a 48x48 grey
/// "window" glyph as an SVG data URI.
pub const DEFAULT_ICON: &str = "data:image/svg+xml;base64,PHN2ZyB3aWR0aD0iNDgiIGhlaWdodD0iNDgiIHZpZXdCb3g9IjAgMCA0OCA0OCIgZmlsbD0ibm9uZSIgeG1sbnM9Imh0dHA6Ly93d3cudzMub3JnLzIwMDAvc3ZnIj4KPHJlY3Qgd2lkdGg9IjQ4IiBoZWlnaHQ9IjQ4IiByeD0iOCIgZmlsbD0iI2YwZjBmMCIvPgo8cGF0aCBkPSJNMTIgMTZIMzZWMzJIMTJWMTZaIiBzdHJva2U9IiM2NjY2NjYiIHN0cm9rZS13aWR0aD0iMiIvPgo8cGF0aCBkPSJNMTYgMTJWMjAiIHN0cm9rZT0iIzY2NjY2NiIgc3Ryb2tlLXdpZHRoPSIyIi8+CjxwYXRoIGQ9Ik0yMCAxMlYyMCIgc3Ryb2tlPSIjNjY2NjY2IiBzdHJva2Utd2lkdGg9IjIiLz4KPC9zdmc+";

/// Placeholder in service templates that receives the domain key.
const DOMAIN_PLACEHOLDER: &str = "{domain}";

/// Maximum simultaneous resolutions during [`IconResolver::preload`] and
/// the interactive icon pass.
pub const PRELOAD_CONCURRENCY: usize = 8;

/// Bundled icons for well-known domains, relative to the assets directory.
const BUILTIN_LOCAL_ICONS: [(&str, &str); 9] = [
    ("baidu.com", "assets/icons/baidu.png"),
    ("bing.com", "assets/icons/bing.png"),
    ("qq.com", "assets/icons/qq.png"),
    ("bilibili.com", "assets/icons/bilibili.png"),
    ("iqiyi.com", "assets/icons/iqiyi.png"),
    ("youku.com", "assets/icons/youku.png"),
    ("163.com", "assets/icons/netease.png"),
    ("kuaishou.com", "assets/icons/kuaishou.png"),
    ("douyin.com", "assets/icons/douyin.png"),
];

/// What kind of image source an [`IconRef`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconKind {
    DataUri,
    Remote,
    Local,
}

/// A string usable as an image source.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconRef(String);

impl IconRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn placeholder() -> Self {
        Self(DEFAULT_ICON.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn kind(&self) -> IconKind {
        let lower = self.0.get(..8).unwrap_or(&self.0).to_ascii_lowercase();
        if lower.starts_with("data:") {
            IconKind::DataUri
        } else if lower.starts_with("http://") || lower.starts_with("https://") {
            IconKind::Remote
        } else {
            IconKind::Local
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.0 == DEFAULT_ICON
    }
}

impl fmt::Display for IconRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Snapshot of resolver bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub cached: usize,
    pub local_icons: usize,
}

/// Resolves a link URL to an icon reference.
///
/// Resolution order: cache, static table, remote services, the site's own
/// `/favicon.ico`, the placeholder. Results are cached per domain key for
/// the life of the resolver.
///
/// Remote services are probed with a HEAD request whose status is not
/// inspected: any completed request accepts the formatted URL. Whether the
/// image actually loads is decided later by [`super::load_icon`].
pub struct IconResolver {
    client: reqwest::Client,
    services: Vec<IconServiceConfig>,
    local_icons: HashMap<String, String>,
    cache: Mutex<HashMap<String, IconRef>>,
    probe_timeout: Duration,
}

impl IconResolver {
    /// Create a resolver. `extra_local_icons` is merged over the built-in
    /// table; keys are normalized to lowercase.
    pub fn new(
        client: reqwest::Client,
        services: Vec<IconServiceConfig>,
        extra_local_icons: &HashMap<String, String>,
        probe_timeout: Duration,
    ) -> Self {
        let mut local_icons: HashMap<String, String> = BUILTIN_LOCAL_ICONS
            .iter()
            .map(|(domain, path)| (domain.to_string(), path.to_string()))
            .collect();
        for (domain, path) in extra_local_icons {
            local_icons.insert(domain.trim().to_ascii_lowercase(), path.clone());
        }

        Self {
            client,
            services,
            local_icons,
            cache: Mutex::new(HashMap::new()),
            probe_timeout,
        }
    }

    pub fn from_config(client: reqwest::Client, config: &Config) -> Self {
        Self::new(
            client,
            config.icon_services.clone(),
            &config.local_icons,
            Duration::from_secs(config.icon_timeout_secs.max(1)),
        )
    }

    /// Resolve the icon for a link URL. Never fails.
    pub async fn resolve(&self, url: &str) -> IconRef {
        let Some(domain) = domain_key(url) else {
            tracing::debug!(url = %url, "Unparsable link URL, using placeholder icon");
            return IconRef::placeholder();
        };

        let hit = self.lock_cache().get(&domain).cloned();
        if let Some(hit) = hit {
            return hit;
        }

        if let Some(path) = self.local_icons.get(&domain) {
            return self.store(domain, IconRef::new(path.clone()));
        }

        let icon = match self.probe_services(&domain).await {
            Some(icon) => icon,
            None => favicon_fallback(url),
        };
        self.store(domain, icon)
    }

    /// Resolve every URL in the background, bounded to a few at a time.
    ///
    /// The returned handle may be dropped; the task keeps running.
    pub fn preload(self: &Arc<Self>, urls: Vec<String>) -> JoinHandle<()> {
        let resolver = Arc::clone(self);
        tokio::spawn(async move {
            let total = urls.len();
            stream::iter(urls)
                .for_each_concurrent(PRELOAD_CONCURRENCY, |url| {
                    let resolver = Arc::clone(&resolver);
                    async move {
                        let icon = resolver.resolve(&url).await;
                        tracing::trace!(url = %url, icon = %icon, "Preloaded icon");
                    }
                })
                .await;
            tracing::debug!(total, "Icon preload finished");
        })
    }

    /// Look up a cached icon without resolving.
    pub fn cached(&self, url: &str) -> Option<IconRef> {
        let domain = domain_key(url)?;
        self.lock_cache().get(&domain).cloned()
    }

    pub fn clear_cache(&self) {
        self.lock_cache().clear();
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            cached: self.lock_cache().len(),
            local_icons: self.local_icons.len(),
        }
    }

    async fn probe_services(&self, domain: &str) -> Option<IconRef> {
        for service in &self.services {
            let formatted = service.template.replace(DOMAIN_PLACEHOLDER, domain);
            let Ok(icon_url) = Url::parse(&formatted) else {
                tracing::warn!(service = %service.name, template = %service.template, "Icon service template does not form a URL");
                continue;
            };

            match self
                .client
                .head(icon_url)
                .timeout(self.probe_timeout)
                .send()
                .await
            {
                Ok(response) => {
                    tracing::debug!(
                        service = %service.name,
                        domain = %domain,
                        status = response.status().as_u16(),
                        "Icon service answered"
                    );
                    return Some(IconRef::new(formatted));
                }
                Err(e) => {
                    tracing::debug!(service = %service.name, domain = %domain, error = %e, "Icon service failed, trying next");
                }
            }
        }
        None
    }

    /// Insert unless another resolution got there first; return the stored value.
    fn store(&self, domain: String, icon: IconRef) -> IconRef {
        self.lock_cache().entry(domain).or_insert(icon).clone()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, HashMap<String, IconRef>> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// `{scheme}://{host}/favicon.ico` for the original URL, host kept as-is.
fn favicon_fallback(url: &str) -> IconRef {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) if !host.is_empty() => {
                IconRef::new(format!("{}://{}/favicon.ico", parsed.scheme(), host))
            }
            _ => IconRef::placeholder(),
        },
        Err(_) => IconRef::placeholder(),
    }
}
