use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use manifest::ManifestList;
use scene_loader::config::LoaderConfig;
use scene_loader::{assemble, LoaderProfile, Scene, SceneJob};

#[derive(Debug, Clone)]
struct CliConfig {
    config_path: Option<PathBuf>,
    root: Option<PathBuf>,
    base_url: Option<String>,
    profile: LoaderProfile,
    hour: Option<f64>,
    json: bool,
    manifests: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let cli = parse_args()?;

    let mut config = match &cli.config_path {
        Some(path) => LoaderConfig::load_from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => LoaderConfig::default(),
    };
    config.apply_env_overrides()?;

    if let Some(root) = cli.root.clone() {
        config.assets.root = root;
    }
    if let Some(base_url) = cli.base_url.clone() {
        config.assets.base_url = Some(base_url);
    }
    if cli.hour.is_some() {
        config.scene.start_hour = cli.hour;
    }

    let jobs = match &cli.manifests {
        Some(raw) => {
            let manifests = ManifestList::parse(raw).context("invalid manifest list")?;
            vec![SceneJob::new(cli.profile.label(), cli.profile, manifests)]
        }
        None => config.jobs()?,
    };
    if jobs.is_empty() {
        bail!("no manifests given and none configured\nUse --help to see the options.");
    }

    let fetcher = Arc::new(config.fetcher()?);
    let scene = Scene::new();
    let outcomes = assemble(&scene, fetcher, jobs, config.scene.start_hour).await;

    if cli.json {
        let body = serde_json::json!({
            "summary": scene.summary(),
            "jobs": outcomes,
        });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        for outcome in &outcomes {
            match (&outcome.report, &outcome.error) {
                (Some(report), _) => println!(
                    "[load-scene] {}: {} models from {} manifests in {} ms",
                    outcome.label,
                    report.total_models,
                    report.manifests.len(),
                    report.elapsed_ms
                ),
                (None, Some(error)) => println!("[load-scene] {}: FAILED: {}", outcome.label, error),
                (None, None) => {}
            }
        }
        let summary = scene.summary();
        println!(
            "[load-scene] scene: {} nodes, {} meshes, {} triangles",
            summary.nodes, summary.meshes, summary.triangles
        );
    }

    if let Some(failed) = outcomes.iter().find(|o| !o.is_success()) {
        bail!(
            "scene '{}' failed to load: {}",
            failed.label,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    Ok(())
}

fn parse_args() -> anyhow::Result<CliConfig> {
    let mut cfg = CliConfig {
        config_path: None,
        root: None,
        base_url: None,
        profile: LoaderProfile::Building,
        hour: None,
        json: false,
        manifests: None,
    };

    let mut args = std::env::args().skip(1).peekable();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => cfg.config_path = Some(PathBuf::from(next_arg_value(&mut args, &arg)?)),
            "--root" => cfg.root = Some(PathBuf::from(next_arg_value(&mut args, &arg)?)),
            "--base-url" => cfg.base_url = Some(next_arg_value(&mut args, &arg)?),
            "--skybox" => cfg.profile = LoaderProfile::Skybox,
            "--hour" => {
                let value = next_arg_value(&mut args, &arg)?;
                cfg.hour = Some(
                    value
                        .parse::<f64>()
                        .with_context(|| format!("invalid --hour: {}", value))?,
                );
            }
            "--json" => cfg.json = true,
            "--help" | "-h" => {
                print_help();
                std::process::exit(0);
            }
            other if other.starts_with("--") => {
                bail!("unknown argument: {}\nUse --help to see the options.", other);
            }
            other => {
                if cfg.manifests.is_some() {
                    bail!("manifests given twice: {}", other);
                }
                cfg.manifests = Some(other.to_string());
            }
        }
    }

    Ok(cfg)
}

fn next_arg_value<I>(args: &mut std::iter::Peekable<I>, flag: &str) -> anyhow::Result<String>
where
    I: Iterator<Item = String>,
{
    match args.next() {
        Some(value) if !value.starts_with("--") => Ok(value),
        _ => bail!("missing value for {}", flag),
    }
}

fn print_help() {
    println!(
        "load-scene [--config FILE] [--root DIR] [--base-url URL] [--skybox] [--hour H] [--json] MANIFESTS

MANIFESTS   comma separated manifest locations, e.g. /models/scenes/a.json,/models/scenes/b.json
            (defaults to the chains in the config file)

--config    TOML config file
--root      asset root directory (default website/public)
--base-url  fetch relative locations over HTTP from this URL
--skybox    load through the dome profile instead of the building profile
--hour      hour of day for the light layer (0-24)
--json      print the scene summary and load reports as JSON"
    );
}
