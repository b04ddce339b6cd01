use std::sync::Arc;

use actix_web::{middleware as actix_middleware, web, App, HttpServer};

use scene_loader::assemble;
use scene_loader::config::LoaderConfig;
use scene_loader::handlers;
use scene_loader::scene::Scene;
use scene_loader::source::FsFetcher;
use scene_loader::state::SceneState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Try the current directory first, then scene_loader/
    if dotenvy::dotenv().is_err() {
        dotenvy::from_filename("scene_loader/.env").ok();
    }

    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    log::info!("Starting scene server...");
    log::info!("Manifest format version: {}", manifest::format_version());

    let config_path = std::env::var("SCENE_CONFIG_PATH")
        .unwrap_or_else(|_| "scene_loader/config/scene.toml".to_string());

    let mut config = LoaderConfig::load_from_file(&config_path).unwrap_or_else(|e| {
        log::warn!(
            "Failed to load scene config from '{}': {}. Falling back to default config.",
            config_path,
            e
        );
        LoaderConfig::default()
    });

    if let Err(e) = config.apply_env_overrides() {
        eprintln!("{}", e);
        std::process::exit(1);
    }

    log::info!("Serving assets from {}", config.assets.root.display());

    let scene = Scene::new();
    let state = SceneState::new(scene.clone(), FsFetcher::new(config.assets.root.clone()));

    match (config.jobs(), config.fetcher()) {
        (Ok(jobs), Ok(fetcher)) => {
            let outcomes = assemble(&scene, Arc::new(fetcher), jobs, config.scene.start_hour).await;
            let failed = outcomes.iter().filter(|o| !o.is_success()).count();
            if failed > 0 {
                log::warn!("{} of {} scene jobs failed", failed, outcomes.len());
            }
            log::info!("Scene ready with {} nodes", scene.len());
            state.record_outcomes(outcomes).await;
        }
        (Err(e), _) | (_, Err(e)) => {
            log::error!("Scene jobs not started: {}", e);
        }
    }

    let server_host = config.server.host.clone();
    let server_port = config.server.port;

    log::info!("Starting HTTP server at {}:{}...", server_host, server_port);

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(actix_middleware::Logger::default())
            .wrap(actix_middleware::Compress::default())
            .service(handlers::health_check)
            .service(handlers::scene_status)
            .service(handlers::serve_asset)
    })
    .bind((server_host, server_port))?
    .run()
    .await
}
