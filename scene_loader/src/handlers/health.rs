use actix_web::{get, web, HttpResponse};
use serde::Serialize;

use crate::{error::Result, state::SceneState};

#[derive(Debug, Serialize)]
pub struct HealthCheckResponse {
    pub status: String,
    pub asset_root: String,
    pub nodes: usize,
}

#[get("/health")]
pub async fn health_check(state: web::Data<SceneState>) -> Result<HttpResponse> {
    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        asset_root: state.assets.root().display().to_string(),
        nodes: state.scene.len(),
    };

    Ok(HttpResponse::Ok().json(response))
}
