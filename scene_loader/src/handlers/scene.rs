use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{assembly::JobOutcome, error::Result, scene::SceneSummary, state::SceneState};

#[derive(Debug, Serialize)]
pub struct SceneStatusResponse {
    pub summary: SceneSummary,
    pub jobs: Vec<JobOutcome>,
}

#[get("/scene")]
pub async fn scene_status(state: web::Data<SceneState>) -> Result<HttpResponse> {
    let response = SceneStatusResponse {
        summary: state.scene.summary(),
        jobs: state.outcomes().await,
    };

    Ok(HttpResponse::Ok().json(response))
}
