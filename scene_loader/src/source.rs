use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use dashmap::DashMap;

use crate::error::{Result, SceneLoaderError};

/// Fetches the raw bytes behind a manifest, MTL or OBJ location.
pub trait AssetFetcher: Send + Sync + 'static {
    fn fetch(&self, location: &str) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

pub fn is_http(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolves `reference` (a texture named inside an MTL file) against the
/// directory of `base_location`. Absolute and URL references are kept.
pub fn resolve_relative(base_location: &str, reference: &str) -> String {
    if is_http(reference) || reference.starts_with('/') {
        return reference.to_string();
    }
    match base_location.rfind('/') {
        Some(idx) => format!("{}/{}", &base_location[..idx], reference),
        None => reference.to_string(),
    }
}

/// Turns a site location (`/models/a.json`, `models/a.json`) into a path
/// relative to an asset root. `..`, drive prefixes and empty locations are
/// rejected.
pub fn sanitize_relative(location: &str) -> Result<PathBuf> {
    let trimmed = location.trim().trim_start_matches('/');
    let mut relative = PathBuf::new();

    for component in Path::new(trimmed).components() {
        match component {
            Component::Normal(part) => relative.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(SceneLoaderError::InvalidLocation(location.to_string()));
            }
        }
    }

    if relative.as_os_str().is_empty() {
        return Err(SceneLoaderError::InvalidLocation(location.to_string()));
    }
    Ok(relative)
}

/// Reads assets below a root directory, the way the site's web server maps
/// request paths onto `public/`.
#[derive(Debug, Clone)]
pub struct FsFetcher {
    root: PathBuf,
}

impl FsFetcher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, location: &str) -> Result<PathBuf> {
        Ok(self.root.join(sanitize_relative(location)?))
    }
}

impl AssetFetcher for FsFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let path = self.resolve(location)?;
        tokio::fs::read(&path).await.map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                SceneLoaderError::NotFound(location.to_string())
            } else {
                SceneLoaderError::Io {
                    location: location.to_string(),
                    source,
                }
            }
        })
    }
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration, base_url: Option<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("scene-loader/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SceneLoaderError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.map(|url| url.trim_end_matches('/').to_string()),
        })
    }

    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    pub fn url_for(&self, location: &str) -> Result<String> {
        if is_http(location) {
            return Ok(location.to_string());
        }
        match &self.base_url {
            Some(base) => Ok(format!("{}/{}", base, location.trim_start_matches('/'))),
            None => Err(SceneLoaderError::InvalidLocation(format!(
                "{} (no base URL configured)",
                location
            ))),
        }
    }
}

impl AssetFetcher for HttpFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let url = self.url_for(location)?;
        log::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| SceneLoaderError::Http {
                location: location.to_string(),
                source,
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(SceneLoaderError::NotFound(location.to_string()));
        }
        if !status.is_success() {
            return Err(SceneLoaderError::HttpStatus {
                location: location.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|source| SceneLoaderError::Http {
                location: location.to_string(),
                source,
            })?;
        Ok(bytes.to_vec())
    }
}

/// Sends `http://` and `https://` locations over HTTP. Other locations go to
/// the filesystem root, or are joined onto the HTTP base URL when no root is
/// configured.
#[derive(Debug, Clone, Default)]
pub struct RoutedFetcher {
    fs: Option<FsFetcher>,
    http: Option<HttpFetcher>,
}

impl RoutedFetcher {
    pub fn new(fs: Option<FsFetcher>, http: Option<HttpFetcher>) -> Self {
        Self { fs, http }
    }

    pub fn filesystem(root: impl Into<PathBuf>) -> Self {
        Self::new(Some(FsFetcher::new(root)), None)
    }

    pub fn has_filesystem(&self) -> bool {
        self.fs.is_some()
    }
}

impl AssetFetcher for RoutedFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        match (&self.fs, &self.http) {
            (Some(fs), _) if !is_http(location) => fs.fetch(location).await,
            (_, Some(http)) => http.fetch(location).await,
            (None, None) => Err(SceneLoaderError::InvalidLocation(format!(
                "{} (no asset root or HTTP client configured)",
                location
            ))),
            (Some(_), None) => Err(SceneLoaderError::InvalidLocation(format!(
                "{} (HTTP fetching is not configured)",
                location
            ))),
        }
    }
}

/// Serves assets from memory. Locations are matched without their leading
/// `/`. Every fetch is recorded so callers can inspect request order.
#[derive(Clone, Default)]
pub struct InMemoryFetcher {
    assets: Arc<DashMap<String, Vec<u8>>>,
    delays: Arc<DashMap<String, Duration>>,
    requests: Arc<StdMutex<Vec<String>>>,
}

impl InMemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, location: &str, bytes: impl Into<Vec<u8>>) {
        self.assets.insert(memory_key(location), bytes.into());
    }

    /// Makes every fetch of `location` wait before answering.
    pub fn delay(&self, location: &str, delay: Duration) {
        self.delays.insert(memory_key(location), delay);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }
}

impl AssetFetcher for InMemoryFetcher {
    async fn fetch(&self, location: &str) -> Result<Vec<u8>> {
        let key = memory_key(location);
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(key.clone());
        }

        let delay = self.delays.get(&key).map(|entry| *entry.value());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        self.assets
            .get(&key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SceneLoaderError::NotFound(location.to_string()))
    }
}

fn memory_key(location: &str) -> String {
    location.trim().trim_start_matches('/').to_string()
}
