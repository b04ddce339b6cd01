use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex as StdMutex, PoisonError};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use wavefront::{Bounds, ObjMesh};

use crate::materials::SceneMaterial;
use crate::transform::Transform;

pub type NodeId = Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeGroup {
    Building,
    Dome,
    Lights,
}

/// A mesh plus the index of its material in the owning node.
#[derive(Debug, Clone)]
pub struct SceneMesh {
    pub mesh: ObjMesh,
    pub material: usize,
}

/// One loaded model: everything a single OBJ+MTL pair produced.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub id: NodeId,
    pub name: String,
    /// OBJ location the node was loaded from.
    pub source: String,
    pub transform: Transform,
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    pub group: NodeGroup,
    pub render_order: i32,
    pub frustum_culled: bool,
}

impl SceneNode {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.triangle_count()).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.mesh.vertex_count()).sum()
    }

    /// Bounds in model space, before the node transform.
    pub fn local_bounds(&self) -> Option<Bounds> {
        self.meshes
            .iter()
            .filter_map(|m| m.mesh.bounds())
            .reduce(Bounds::union)
    }

    pub fn material_for(&self, mesh: &SceneMesh) -> Option<&SceneMaterial> {
        self.materials.get(mesh.material)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SceneSummary {
    pub nodes: usize,
    pub buildings: usize,
    pub dome_objects: usize,
    pub has_lights: bool,
    pub meshes: usize,
    pub triangles: usize,
    pub vertices: usize,
}

struct StoredNode {
    order: u64,
    node: Arc<SceneNode>,
}

/// Shared scene graph. Clones share the same nodes, so concurrent model
/// loads can all attach to one scene.
#[derive(Clone, Default)]
pub struct Scene {
    nodes: Arc<DashMap<NodeId, StoredNode>>,
    sequence: Arc<AtomicU64>,
    lights: Arc<StdMutex<Option<NodeId>>>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attaches a node and returns its id. A `Lights` node becomes the
    /// scene's light layer, replacing any earlier one.
    pub fn add(&self, node: SceneNode) -> NodeId {
        let id = node.id;
        if node.group == NodeGroup::Lights {
            // sequence and light layer advance under one lock
            let mut lights = self.lights.lock().unwrap_or_else(PoisonError::into_inner);
            self.insert(node);
            *lights = Some(id);
        } else {
            self.insert(node);
        }
        id
    }

    fn insert(&self, node: SceneNode) {
        let order = self.sequence.fetch_add(1, Ordering::SeqCst);
        self.nodes.insert(
            node.id,
            StoredNode {
                order,
                node: Arc::new(node),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, id: NodeId) -> Option<Arc<SceneNode>> {
        self.nodes.get(&id).map(|entry| entry.node.clone())
    }

    /// All nodes in the order they were attached.
    pub fn nodes(&self) -> Vec<Arc<SceneNode>> {
        let mut ordered: Vec<(u64, Arc<SceneNode>)> = self
            .nodes
            .iter()
            .map(|entry| (entry.order, entry.node.clone()))
            .collect();
        ordered.sort_by_key(|(order, _)| *order);
        ordered.into_iter().map(|(_, node)| node).collect()
    }

    pub fn nodes_in(&self, group: NodeGroup) -> Vec<Arc<SceneNode>> {
        self.nodes()
            .into_iter()
            .filter(|node| node.group == group)
            .collect()
    }

    /// Skybox nodes other than the light layer.
    pub fn dome_objects(&self) -> Vec<Arc<SceneNode>> {
        self.nodes_in(NodeGroup::Dome)
    }

    pub fn lights(&self) -> Option<NodeId> {
        self.lights.lock().map(|guard| *guard).unwrap_or_default()
    }

    pub fn set_lights(&self, id: NodeId) {
        if let Ok(mut guard) = self.lights.lock() {
            *guard = Some(id);
        }
    }

    /// Sets the opacity of every material of a node. Returns false when the
    /// node does not exist.
    pub fn set_node_opacity(&self, id: NodeId, opacity: f32) -> bool {
        match self.nodes.get_mut(&id) {
            Some(mut entry) => {
                let node = Arc::make_mut(&mut entry.node);
                for material in &mut node.materials {
                    material.transparent = true;
                    material.opacity = opacity;
                }
                true
            }
            None => false,
        }
    }

    pub fn node_opacity(&self, id: NodeId) -> Option<f32> {
        self.get(id)
            .and_then(|node| node.materials.first().map(|m| m.opacity))
    }

    pub fn summary(&self) -> SceneSummary {
        let nodes = self.nodes();
        SceneSummary {
            nodes: nodes.len(),
            buildings: nodes
                .iter()
                .filter(|n| n.group == NodeGroup::Building)
                .count(),
            dome_objects: nodes.iter().filter(|n| n.group == NodeGroup::Dome).count(),
            has_lights: self.lights().is_some(),
            meshes: nodes.iter().map(|n| n.meshes.len()).sum(),
            triangles: nodes.iter().map(|n| n.triangle_count()).sum(),
            vertices: nodes.iter().map(|n| n.vertex_count()).sum(),
        }
    }
}
