use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use manifest::ManifestList;

use crate::assembly::SceneJob;
use crate::error::{Result, SceneLoaderError};
use crate::materials::LoaderProfile;
use crate::source::{FsFetcher, HttpFetcher, RoutedFetcher};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub assets: AssetsConfig,
    pub http: HttpConfig,
    pub server: ServerConfig,
    pub scene: SceneConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    pub root: PathBuf,
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub building_manifests: Vec<String>,
    pub dome_manifests: Vec<String>,
    pub start_hour: Option<f64>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("website/public"),
            base_url: None,
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_ms: 10_000 }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl LoaderConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SceneLoaderError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: LoaderConfig = toml::from_str(&content).map_err(|e| {
            SceneLoaderError::Config(format!("Failed to parse config file: {}", e))
        })?;

        Ok(config)
    }

    /// Overrides file values with `SCENE_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(root) = std::env::var("SCENE_ASSET_ROOT") {
            self.assets.root = PathBuf::from(root);
        }
        if let Ok(base_url) = std::env::var("SCENE_BASE_URL") {
            self.assets.base_url = Some(base_url).filter(|url| !url.trim().is_empty());
        }
        if let Ok(host) = std::env::var("SCENE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("SCENE_SERVER_PORT") {
            self.server.port = port.parse().map_err(|_| {
                SceneLoaderError::Config(format!("Invalid SCENE_SERVER_PORT: {}", port))
            })?;
        }
        if let Ok(timeout) = std::env::var("SCENE_HTTP_TIMEOUT_MS") {
            self.http.timeout_ms = timeout.parse().map_err(|_| {
                SceneLoaderError::Config(format!("Invalid SCENE_HTTP_TIMEOUT_MS: {}", timeout))
            })?;
        }
        Ok(())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http.timeout_ms)
    }

    /// The configured building and dome chains. Empty chains are skipped.
    pub fn jobs(&self) -> Result<Vec<SceneJob>> {
        let mut jobs = Vec::new();
        if !self.scene.building_manifests.is_empty() {
            jobs.push(SceneJob::new(
                "buildings",
                LoaderProfile::Building,
                ManifestList::from_locations(&self.scene.building_manifests)?,
            ));
        }
        if !self.scene.dome_manifests.is_empty() {
            jobs.push(SceneJob::new(
                "dome",
                LoaderProfile::Skybox,
                ManifestList::from_locations(&self.scene.dome_manifests)?,
            ));
        }
        Ok(jobs)
    }

    /// With a base URL every site location is fetched over HTTP; otherwise
    /// site locations are read below the asset root. Full URLs always use
    /// HTTP.
    pub fn fetcher(&self) -> Result<RoutedFetcher> {
        let http = HttpFetcher::new(self.http_timeout(), self.assets.base_url.clone())?;
        let fs = match self.assets.base_url {
            Some(_) => None,
            None => Some(FsFetcher::new(self.assets.root.clone())),
        };
        Ok(RoutedFetcher::new(fs, Some(http)))
    }
}
