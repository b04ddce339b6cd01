//! Sequential manifest loading with concurrent model loads inside each
//! manifest.
//!
//! Manifests are processed strictly in list order. Every descriptor of a
//! manifest is validated before the first model of that manifest is
//! requested; the models are then loaded concurrently and the manifest is
//! done when all of them are attached. The first failure aborts the whole
//! run: loads of the current manifest that are still in flight are dropped
//! and later manifests are never fetched. Nodes attached before the failure
//! stay in the scene.

use std::time::Instant;

use chrono::{DateTime, Utc};
use futures_util::future::try_join_all;
use manifest::{Manifest, ManifestList};
use serde::Serialize;

use crate::error::Result;
use crate::loader::ModelLoader;
use crate::scene::{NodeId, Scene};
use crate::source::AssetFetcher;

#[derive(Debug, Clone, Serialize)]
pub struct ManifestReport {
    pub location: String,
    pub models: usize,
    pub node_ids: Vec<NodeId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub manifests: Vec<ManifestReport>,
    pub total_models: usize,
    pub elapsed_ms: u64,
    pub finished_at: DateTime<Utc>,
}

impl LoadReport {
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.manifests
            .iter()
            .flat_map(|report| report.node_ids.iter().copied())
    }
}

/// Fetches and validates one manifest.
pub async fn fetch_manifest<F: AssetFetcher>(fetcher: &F, location: &str) -> Result<Manifest> {
    let bytes = fetcher.fetch(location).await?;
    let manifest = Manifest::from_slice(&bytes, location)?;
    Ok(manifest)
}

/// Loads every model of one manifest into `scene`.
pub async fn load_manifest<F: AssetFetcher>(
    location: &str,
    scene: &Scene,
    loader: &ModelLoader<F>,
) -> Result<ManifestReport> {
    let manifest = fetch_manifest(loader.fetcher(), location)
        .await
        .inspect_err(|err| log::error!("Error loading JSON file '{}': {}", location, err))?;

    let loads = manifest
        .models
        .iter()
        .map(|descriptor| loader.load_model(descriptor, scene));
    let node_ids = try_join_all(loads).await?;

    log::info!("Loaded {} models from {}", node_ids.len(), location);
    Ok(ManifestReport {
        location: location.to_string(),
        models: node_ids.len(),
        node_ids,
    })
}

/// Loads `manifests` in order. Resolves once every model of every manifest
/// is attached, or with the first error encountered.
pub async fn load_manifests<F: AssetFetcher>(
    manifests: &ManifestList,
    scene: &Scene,
    loader: &ModelLoader<F>,
) -> Result<LoadReport> {
    let started = Instant::now();
    let mut reports = Vec::with_capacity(manifests.len());

    for location in manifests.iter() {
        let report = load_manifest(location, scene, loader).await?;
        reports.push(report);
    }

    let total_models = reports.iter().map(|report| report.models).sum();
    log::info!("All models loaded");

    Ok(LoadReport {
        manifests: reports,
        total_models,
        elapsed_ms: started.elapsed().as_millis() as u64,
        finished_at: Utc::now(),
    })
}
