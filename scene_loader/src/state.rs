use std::sync::Arc;

use tokio::sync::RwLock;

use crate::assembly::JobOutcome;
use crate::scene::Scene;
use crate::source::FsFetcher;

/// Shared application state for the asset server.
#[derive(Clone)]
pub struct SceneState {
    pub scene: Scene,
    pub assets: FsFetcher,
    outcomes: Arc<RwLock<Vec<JobOutcome>>>,
}

impl SceneState {
    pub fn new(scene: Scene, assets: FsFetcher) -> Self {
        Self {
            scene,
            assets,
            outcomes: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn record_outcomes(&self, outcomes: Vec<JobOutcome>) {
        *self.outcomes.write().await = outcomes;
    }

    pub async fn outcomes(&self) -> Vec<JobOutcome> {
        self.outcomes.read().await.clone()
    }
}
