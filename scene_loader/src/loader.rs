use std::collections::HashMap;
use std::sync::Arc;

use manifest::ModelDescriptor;
use uuid::Uuid;
use wavefront::{parse_mtl, parse_obj, ObjModel};

use crate::error::{Result, SceneLoaderError};
use crate::materials::{LoaderProfile, SceneMaterial};
use crate::scene::{NodeGroup, NodeId, Scene, SceneMesh, SceneNode};
use crate::source::AssetFetcher;
use crate::transform::Transform;

const DEFAULT_MATERIAL: &str = "default";

/// Loads one OBJ+MTL pair per call and attaches the result to a scene.
pub struct ModelLoader<F> {
    fetcher: Arc<F>,
    profile: LoaderProfile,
}

impl<F> Clone for ModelLoader<F> {
    fn clone(&self) -> Self {
        Self {
            fetcher: self.fetcher.clone(),
            profile: self.profile,
        }
    }
}

impl<F: AssetFetcher> ModelLoader<F> {
    pub fn new(fetcher: Arc<F>, profile: LoaderProfile) -> Self {
        Self { fetcher, profile }
    }

    pub fn profile(&self) -> LoaderProfile {
        self.profile
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Fetches the MTL, then the OBJ, binds meshes to materials and adds
    /// the node to `scene`. Nothing is attached when any step fails.
    pub async fn load_model(&self, descriptor: &ModelDescriptor, scene: &Scene) -> Result<NodeId> {
        let materials = self
            .load_materials(descriptor)
            .await
            .inspect_err(|err| log_failure("MTL", &descriptor.mtl_path, err))?;

        let model = self
            .load_geometry(&descriptor.path)
            .await
            .inspect_err(|err| log_failure("OBJ", &descriptor.path, err))?;

        let node = self.build_node(descriptor, materials, model);
        log::debug!(
            "Loaded {} model '{}' ({} meshes, {} triangles)",
            self.profile.label(),
            descriptor.path,
            node.meshes.len(),
            node.triangle_count()
        );
        Ok(scene.add(node))
    }

    async fn load_materials(&self, descriptor: &ModelDescriptor) -> Result<Vec<SceneMaterial>> {
        let location = descriptor.mtl_path.as_str();
        let bytes = self.fetcher.fetch(location).await?;
        let text = String::from_utf8_lossy(&bytes);

        let library = parse_mtl(&text).map_err(|source| SceneLoaderError::MtlParse {
            location: location.to_string(),
            source,
        })?;
        if library.is_empty() {
            return Err(SceneLoaderError::InvalidMaterials {
                location: location.to_string(),
            });
        }

        Ok(library
            .iter()
            .map(|mtl| {
                let mut material = SceneMaterial::from_mtl(mtl, location);
                self.profile.apply(&mut material, descriptor);
                material
            })
            .collect())
    }

    async fn load_geometry(&self, location: &str) -> Result<ObjModel> {
        let bytes = self.fetcher.fetch(location).await?;
        let owned_location = location.to_string();

        tokio::task::spawn_blocking(move || {
            let text = String::from_utf8_lossy(&bytes);
            parse_obj(&text).map_err(|source| SceneLoaderError::ObjParse {
                location: owned_location,
                source,
            })
        })
        .await
        .map_err(|e| SceneLoaderError::Internal(format!("OBJ parser task failed: {}", e)))?
    }

    fn build_node(
        &self,
        descriptor: &ModelDescriptor,
        mut materials: Vec<SceneMaterial>,
        model: ObjModel,
    ) -> SceneNode {
        let mut slots: HashMap<String, usize> = materials
            .iter()
            .enumerate()
            .map(|(idx, material)| (material.name.clone(), idx))
            .collect();

        let mut meshes = Vec::with_capacity(model.meshes.len());
        for mut mesh in model.meshes {
            let name = mesh.material.as_deref().unwrap_or(DEFAULT_MATERIAL);
            let material = match slots.get(name) {
                Some(idx) => *idx,
                None => {
                    if mesh.material.is_some() {
                        log::warn!(
                            "Material '{}' used by '{}' is not defined in '{}', using default",
                            name,
                            descriptor.path,
                            descriptor.mtl_path
                        );
                    }
                    materials.push(SceneMaterial::fallback(name));
                    slots.insert(name.to_string(), materials.len() - 1);
                    materials.len() - 1
                }
            };

            if self.profile.reverses_normals() {
                mesh.reverse_normals();
            }
            meshes.push(SceneMesh { mesh, material });
        }

        for material in &mut materials {
            self.profile.apply_mesh_overrides(material, descriptor);
        }

        let (group, render_order) = match self.profile {
            LoaderProfile::Building => (NodeGroup::Building, 0),
            LoaderProfile::Skybox if descriptor.is_lights() => {
                (NodeGroup::Lights, descriptor.render_order())
            }
            LoaderProfile::Skybox => (NodeGroup::Dome, descriptor.render_order()),
        };

        SceneNode {
            id: Uuid::new_v4(),
            name: node_name(&descriptor.path),
            source: descriptor.path.clone(),
            transform: Transform::from_descriptor(descriptor),
            meshes,
            materials,
            group,
            render_order,
            frustum_culled: true,
        }
    }
}

fn log_failure(kind: &str, location: &str, err: &SceneLoaderError) {
    match err {
        SceneLoaderError::MtlParse { .. }
        | SceneLoaderError::InvalidMaterials { .. }
        | SceneLoaderError::ObjParse { .. } => log::error!("{}", err),
        _ => log::error!("Error loading {} '{}': {}", kind, location, err),
    }
}

/// File stem of a location: `/models/dome/sky.obj` -> `sky`.
fn node_name(location: &str) -> String {
    let file = location.rsplit('/').next().unwrap_or(location);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem.to_string(),
        _ => file.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::InMemoryFetcher;
    use manifest::MaterialSide;

    const TRIANGLE_MTL: &str = "newmtl Red\nKd 1 0 0\nmap_Kd red.png\n";
    const TRIANGLE_OBJ: &str = "\
o Tri
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
usemtl Red
f 1//1 2//1 3//1
";

    fn fetcher_with(obj: &str, mtl: &str) -> Arc<InMemoryFetcher> {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("/models/tri.obj", obj);
        fetcher.insert("/models/tri.mtl", mtl);
        Arc::new(fetcher)
    }

    #[test]
    fn node_names_come_from_file_stems() {
        assert_eq!(node_name("/models/dome/sky.obj"), "sky");
        assert_eq!(node_name("house"), "house");
        assert_eq!(node_name("/models/.hidden"), ".hidden");
    }

    #[tokio::test]
    async fn building_model_is_attached_with_bound_material() {
        let loader = ModelLoader::new(
            fetcher_with(TRIANGLE_OBJ, TRIANGLE_MTL),
            LoaderProfile::Building,
        );
        let scene = Scene::new();
        let mut descriptor = ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl");
        descriptor.position = Some([1.0, 2.0, 3.0]);

        let id = loader.load_model(&descriptor, &scene).await.unwrap();
        let node = scene.get(id).unwrap();

        assert_eq!(node.name, "tri");
        assert_eq!(node.group, NodeGroup::Building);
        assert_eq!(node.meshes.len(), 1);
        let material = node.material_for(&node.meshes[0]).unwrap();
        assert_eq!(material.name, "Red");
        assert_eq!(material.side, MaterialSide::Double);
        assert_eq!(material.alpha_test, 0.5);
        assert_eq!(node.transform.translation.to_array(), [1.0, 2.0, 3.0]);
    }

    #[tokio::test]
    async fn skybox_model_reverses_normals_and_joins_lights() {
        let loader = ModelLoader::new(
            fetcher_with(TRIANGLE_OBJ, TRIANGLE_MTL),
            LoaderProfile::Skybox,
        );
        let scene = Scene::new();
        let mut descriptor = ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl");
        descriptor.is_lights = Some(true);
        descriptor.render_order = Some(3);
        descriptor.opacity = Some(0.4);

        let id = loader.load_model(&descriptor, &scene).await.unwrap();
        let node = scene.get(id).unwrap();

        assert_eq!(node.group, NodeGroup::Lights);
        assert_eq!(scene.lights(), Some(id));
        assert_eq!(node.render_order, 3);
        assert!(node.frustum_culled);
        assert_eq!(node.meshes[0].mesh.normals[0], [0.0, 0.0, -1.0]);
        let material = &node.materials[0];
        assert!(material.transparent);
        assert!(!material.depth_write);
        assert_eq!(material.opacity, 0.4);
    }

    #[tokio::test]
    async fn unknown_material_gets_fallback() {
        let obj = TRIANGLE_OBJ.replace("usemtl Red", "usemtl Missing");
        let loader = ModelLoader::new(fetcher_with(&obj, TRIANGLE_MTL), LoaderProfile::Building);
        let scene = Scene::new();

        let id = loader
            .load_model(
                &ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl"),
                &scene,
            )
            .await
            .unwrap();
        let node = scene.get(id).unwrap();
        let material = node.material_for(&node.meshes[0]).unwrap();
        assert_eq!(material.name, "Missing");
        assert_eq!(material.side, MaterialSide::Front);
        assert_eq!(node.materials.len(), 2);
    }

    #[tokio::test]
    async fn empty_material_library_is_rejected() {
        let loader = ModelLoader::new(
            fetcher_with(TRIANGLE_OBJ, "# nothing here\n"),
            LoaderProfile::Building,
        );
        let scene = Scene::new();
        let err = loader
            .load_model(
                &ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl"),
                &scene,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, SceneLoaderError::InvalidMaterials { .. }));
        assert!(scene.is_empty());
    }

    #[tokio::test]
    async fn missing_obj_is_not_attached() {
        let fetcher = InMemoryFetcher::new();
        fetcher.insert("/models/tri.mtl", TRIANGLE_MTL);
        let loader = ModelLoader::new(Arc::new(fetcher), LoaderProfile::Building);
        let scene = Scene::new();

        let err = loader
            .load_model(
                &ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl"),
                &scene,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, SceneLoaderError::NotFound(_)));
        assert!(scene.is_empty());
    }

    #[tokio::test]
    async fn bad_obj_index_reports_location() {
        let obj = "v 0 0 0\nf 1 2 3\n";
        let loader = ModelLoader::new(fetcher_with(obj, TRIANGLE_MTL), LoaderProfile::Building);
        let err = loader
            .load_model(
                &ModelDescriptor::new("/models/tri.obj", "/models/tri.mtl"),
                &Scene::new(),
            )
            .await
            .unwrap_err();

        assert!(err
            .to_string()
            .starts_with("Error loading OBJ '/models/tri.obj'"));
    }
}
