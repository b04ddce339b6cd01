use std::sync::Arc;
use std::time::Duration;

use manifest::{ManifestError, ManifestList};
use scene_loader::pipeline::{load_manifest, load_manifests};
use scene_loader::{
    InMemoryFetcher, LoaderProfile, ModelLoader, NodeGroup, Scene, SceneLoaderError,
};

const MTL: &str = "newmtl Stone\nKd 0.5 0.5 0.5\n";
const OBJ: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl Stone\nf 1 2 3\n";

fn add_model(fetcher: &InMemoryFetcher, name: &str) {
    fetcher.insert(&format!("/models/{name}.obj"), OBJ);
    fetcher.insert(&format!("/models/{name}.mtl"), MTL);
}

fn manifest_json(names: &[&str]) -> String {
    let models: Vec<String> = names
        .iter()
        .map(|name| {
            format!(
                r#"{{"path": "/models/{name}.obj", "mtlPath": "/models/{name}.mtl"}}"#
            )
        })
        .collect();
    format!(r#"{{"models": [{}]}}"#, models.join(","))
}

fn position(requests: &[String], location: &str) -> usize {
    requests
        .iter()
        .position(|r| r == location)
        .unwrap_or_else(|| panic!("{location} was never requested: {requests:?}"))
}

fn building_loader(fetcher: &Arc<InMemoryFetcher>) -> ModelLoader<InMemoryFetcher> {
    ModelLoader::new(fetcher.clone(), LoaderProfile::Building)
}

#[tokio::test]
async fn test_manifests_load_in_order() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    for name in ["a1", "a2", "b1"] {
        add_model(&fetcher, name);
    }
    fetcher.insert("/scenes/a.json", manifest_json(&["a1", "a2"]));
    fetcher.insert("/scenes/b.json", manifest_json(&["b1"]));
    fetcher.delay("/models/a2.obj", Duration::from_millis(50));

    let scene = Scene::new();
    let list = ManifestList::parse("/scenes/a.json, /scenes/b.json").unwrap();
    let report = load_manifests(&list, &scene, &building_loader(&fetcher))
        .await
        .unwrap();

    assert_eq!(report.total_models, 3);
    assert_eq!(report.manifests[0].location, "/scenes/a.json");
    assert_eq!(report.manifests[0].models, 2);
    assert_eq!(report.manifests[1].models, 1);
    assert_eq!(scene.len(), 3);

    let requests = fetcher.requests();
    assert!(position(&requests, "models/a2.obj") < position(&requests, "scenes/b.json"));

    let ids: Vec<_> = report.node_ids().collect();
    assert_eq!(ids.len(), 3);
    assert_eq!(scene.nodes().last().unwrap().id, ids[2]);
}

#[tokio::test]
async fn test_models_of_one_manifest_load_concurrently() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    add_model(&fetcher, "slow");
    add_model(&fetcher, "fast");
    fetcher.insert("/scenes/a.json", manifest_json(&["slow", "fast"]));
    fetcher.delay("/models/slow.mtl", Duration::from_millis(100));

    let scene = Scene::new();
    let report = load_manifest("/scenes/a.json", &scene, &building_loader(&fetcher))
        .await
        .unwrap();

    let requests = fetcher.requests();
    assert!(position(&requests, "models/fast.obj") < position(&requests, "models/slow.obj"));

    // Report keeps manifest order even though "fast" finished first.
    let first = scene.get(report.node_ids[0]).unwrap();
    assert_eq!(first.name, "slow");
}

#[tokio::test]
async fn test_first_failure_stops_later_manifests() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    add_model(&fetcher, "ok");
    add_model(&fetcher, "b1");
    fetcher.insert("/scenes/a.json", manifest_json(&["ok", "missing"]));
    fetcher.insert("/scenes/b.json", manifest_json(&["b1"]));

    let scene = Scene::new();
    let list = ManifestList::parse("/scenes/a.json,/scenes/b.json").unwrap();
    let err = load_manifests(&list, &scene, &building_loader(&fetcher))
        .await
        .unwrap_err();

    assert!(matches!(err, SceneLoaderError::NotFound(ref l) if l == "/models/missing.mtl"));
    assert!(!fetcher.requests().contains(&"scenes/b.json".to_string()));
    assert!(scene.nodes_in(NodeGroup::Building).len() <= 1);
}

#[tokio::test]
async fn test_failure_cancels_in_flight_loads() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    add_model(&fetcher, "slow");
    fetcher.insert("/scenes/a.json", manifest_json(&["slow", "missing"]));
    fetcher.delay("/models/slow.obj", Duration::from_millis(100));

    let scene = Scene::new();
    let result = load_manifest("/scenes/a.json", &scene, &building_loader(&fetcher)).await;
    assert!(result.is_err());

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(scene.is_empty());
}

#[tokio::test]
async fn test_invalid_manifest_is_rejected_before_any_model_loads() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    add_model(&fetcher, "ok");
    fetcher.insert(
        "/scenes/a.json",
        r#"{"models": [{"path": "/models/ok.obj", "mtlPath": "/models/ok.mtl"}, {"path": 3}]}"#,
    );

    let scene = Scene::new();
    let err = load_manifest("/scenes/a.json", &scene, &building_loader(&fetcher))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        SceneLoaderError::Manifest(ManifestError::Descriptor { index: 1, .. })
    ));
    assert_eq!(fetcher.requests(), vec!["scenes/a.json"]);
    assert!(scene.is_empty());
}

#[tokio::test]
async fn test_missing_models_key_message() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.insert("/scenes/a.json", r#"{"objects": []}"#);

    let err = load_manifest("/scenes/a.json", &Scene::new(), &building_loader(&fetcher))
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Invalid JSON format or missing data in file /scenes/a.json"
    );
}

#[tokio::test]
async fn test_empty_manifest_loads_nothing() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    fetcher.insert("/scenes/empty.json", r#"{"models": []}"#);

    let scene = Scene::new();
    let list = ManifestList::parse("/scenes/empty.json").unwrap();
    let report = load_manifests(&list, &scene, &building_loader(&fetcher))
        .await
        .unwrap();

    assert_eq!(report.total_models, 0);
    assert_eq!(report.manifests.len(), 1);
    assert!(scene.is_empty());
}

#[tokio::test]
async fn test_skybox_manifest_registers_light_layer() {
    let fetcher = Arc::new(InMemoryFetcher::new());
    add_model(&fetcher, "sky");
    add_model(&fetcher, "lights");
    fetcher.insert(
        "/dome/dome.json",
        r#"{"models": [
            {"path": "/models/sky.obj", "mtlPath": "/models/sky.mtl", "renderOrder": 1},
            {"path": "/models/lights.obj", "mtlPath": "/models/lights.mtl", "isLights": true}
        ]}"#,
    );

    let scene = Scene::new();
    let loader = ModelLoader::new(fetcher.clone(), LoaderProfile::Skybox);
    let list = ManifestList::parse("/dome/dome.json").unwrap();
    load_manifests(&list, &scene, &loader).await.unwrap();

    assert_eq!(scene.dome_objects().len(), 1);
    assert_eq!(scene.dome_objects()[0].render_order, 1);
    let lights = scene.get(scene.lights().unwrap()).unwrap();
    assert_eq!(lights.name, "lights");
    assert!(lights.materials.iter().all(|m| !m.depth_write));
}
