use actix_web::{get, web, HttpResponse};

use crate::{error::Result, source::AssetFetcher, state::SceneState};

/// Content type served for an asset, by file extension.
pub fn content_type_for(location: &str) -> &'static str {
    let extension = location
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "json" => "application/json",
        "obj" | "mtl" | "txt" => "text/plain; charset=utf-8",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "html" => "text/html; charset=utf-8",
        "js" => "text/javascript",
        "css" => "text/css",
        _ => "application/octet-stream",
    }
}

#[get("/assets/{path:.*}")]
pub async fn serve_asset(
    path: web::Path<String>,
    state: web::Data<SceneState>,
) -> Result<HttpResponse> {
    let location = path.into_inner();
    let bytes = state.assets.fetch(&location).await?;

    log::debug!("Serving asset {} ({} bytes)", location, bytes.len());

    Ok(HttpResponse::Ok()
        .content_type(content_type_for(&location))
        .body(bytes))
}
