/// Axis-aligned bounds of a set of positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Bounds {
    pub fn size(&self) -> [f32; 3] {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }

    pub fn union(self, other: Bounds) -> Bounds {
        Bounds {
            min: [
                self.min[0].min(other.min[0]),
                self.min[1].min(other.min[1]),
                self.min[2].min(other.min[2]),
            ],
            max: [
                self.max[0].max(other.max[0]),
                self.max[1].max(other.max[1]),
                self.max[2].max(other.max[2]),
            ],
        }
    }
}

/// Indexed triangle mesh produced from one object/group + material run of
/// an OBJ file.
///
/// `normals` and `uvs` are either empty or exactly as long as `positions`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjMesh {
    pub name: String,
    pub material: Option<String>,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl ObjMesh {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn bounds(&self) -> Option<Bounds> {
        let first = *self.positions.first()?;
        let init = Bounds {
            min: first,
            max: first,
        };
        Some(self.positions.iter().fold(init, |acc, p| {
            acc.union(Bounds { min: *p, max: *p })
        }))
    }

    /// Flips the mesh inside out: every normal is negated and every triangle's
    /// winding is reversed by swapping its first and third index.
    pub fn reverse_normals(&mut self) {
        for n in &mut self.normals {
            *n = [-n[0], -n[1], -n[2]];
        }
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(0, 2);
        }
    }

    /// Computes smooth vertex normals from the triangle faces. Used for
    /// meshes whose OBJ source carried no `vn` data.
    pub fn compute_vertex_normals(&mut self) {
        self.normals = self.smooth_normals();
    }

    /// Replaces the normals of `vertices` with smooth face normals and keeps
    /// every other normal as it is.
    pub fn fill_vertex_normals(&mut self, vertices: &[u32]) {
        let smooth = self.smooth_normals();
        self.normals.resize(self.positions.len(), [0.0, 0.0, 0.0]);
        for &v in vertices {
            if let Some(normal) = smooth.get(v as usize) {
                self.normals[v as usize] = *normal;
            }
        }
    }

    fn smooth_normals(&self) -> Vec<[f32; 3]> {
        let mut normals = vec![[0.0f32; 3]; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (pa, pb, pc) = (self.positions[a], self.positions[b], self.positions[c]);
            let e1 = sub(pb, pa);
            let e2 = sub(pc, pa);
            let face = cross(e1, e2);
            for &i in &[a, b, c] {
                normals[i][0] += face[0];
                normals[i][1] += face[1];
                normals[i][2] += face[2];
            }
        }

        for n in &mut normals {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            if len > f32::EPSILON {
                *n = [n[0] / len, n[1] / len, n[2] / len];
            }
        }

        normals
    }
}

fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> ObjMesh {
        ObjMesh {
            name: "quad".to_string(),
            material: None,
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            uvs: Vec::new(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }

    #[test]
    fn reverse_normals_flips_normals_and_winding() {
        let mut mesh = quad();
        mesh.reverse_normals();

        assert!(mesh.normals.iter().all(|n| *n == [0.0, 0.0, -1.0]));
        assert_eq!(mesh.indices, vec![2, 1, 0, 3, 2, 0]);
    }

    #[test]
    fn computed_normals_follow_winding() {
        let mut mesh = quad();
        mesh.normals.clear();
        mesh.compute_vertex_normals();
        for n in &mesh.normals {
            assert!((n[2] - 1.0).abs() < 1e-6);
        }
    }

    #[test]
    fn bounds_cover_every_position() {
        let mut mesh = quad();
        mesh.positions.push([-2.0, 0.5, 3.0]);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, [-2.0, 0.0, 0.0]);
        assert_eq!(bounds.max, [1.0, 1.0, 3.0]);
        assert_eq!(bounds.size(), [3.0, 1.0, 3.0]);

        assert!(ObjMesh::default().bounds().is_none());
    }
}
