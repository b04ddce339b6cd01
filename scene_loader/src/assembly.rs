use std::sync::Arc;

use futures_util::future::join_all;
use manifest::ManifestList;
use serde::Serialize;

use crate::daylight::apply_daylight;
use crate::loader::ModelLoader;
use crate::materials::LoaderProfile;
use crate::pipeline::{load_manifests, LoadReport};
use crate::scene::Scene;
use crate::source::AssetFetcher;

/// A named manifest chain loaded through one profile.
#[derive(Debug, Clone)]
pub struct SceneJob {
    pub label: String,
    pub profile: LoaderProfile,
    pub manifests: ManifestList,
}

impl SceneJob {
    pub fn new(label: impl Into<String>, profile: LoaderProfile, manifests: ManifestList) -> Self {
        Self {
            label: label.into(),
            profile,
            manifests,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobOutcome {
    pub label: String,
    pub profile: LoaderProfile,
    pub report: Option<LoadReport>,
    pub error: Option<String>,
}

impl JobOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Runs every job concurrently against the same scene. Jobs are independent:
/// one failing does not stop the others. After a successful skybox job the
/// daylight opacity for `daylight_hour` is applied to the light layer.
pub async fn assemble<F: AssetFetcher>(
    scene: &Scene,
    fetcher: Arc<F>,
    jobs: Vec<SceneJob>,
    daylight_hour: Option<f64>,
) -> Vec<JobOutcome> {
    let runs = jobs.into_iter().map(|job| {
        let loader = ModelLoader::new(fetcher.clone(), job.profile);
        async move {
            log::info!("Loading {} scene '{}': {}", job.profile.label(), job.label, job.manifests);
            let result = load_manifests(&job.manifests, scene, &loader).await;

            if result.is_ok() && job.profile == LoaderProfile::Skybox {
                if let Some(hour) = daylight_hour {
                    if let Err(err) = apply_daylight(scene, hour) {
                        log::warn!("Could not apply daylight for '{}': {}", job.label, err);
                    }
                }
            }

            match result {
                Ok(report) => JobOutcome {
                    label: job.label,
                    profile: job.profile,
                    report: Some(report),
                    error: None,
                },
                Err(err) => {
                    log::error!("Scene '{}' failed: {}", job.label, err);
                    JobOutcome {
                        label: job.label,
                        profile: job.profile,
                        report: None,
                        error: Some(err.to_string()),
                    }
                }
            }
        }
    });

    join_all(runs).await
}
