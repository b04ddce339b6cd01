use std::collections::HashMap;

use crate::error::{Result, WavefrontError};
use crate::mesh::ObjMesh;

/// Parsed OBJ file: one mesh per object/group + material run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjModel {
    pub meshes: Vec<ObjMesh>,
    /// File names referenced by `mtllib`, in order of appearance.
    pub material_libraries: Vec<String>,
}

impl ObjModel {
    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(ObjMesh::triangle_count).sum()
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(ObjMesh::vertex_count).sum()
    }

    /// Distinct material names used by the meshes, in first-use order.
    pub fn material_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for name in self.meshes.iter().filter_map(|m| m.material.as_deref()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct VertexKey {
    position: usize,
    uv: Option<usize>,
    normal: Option<usize>,
}

struct MeshBuilder {
    mesh: ObjMesh,
    lookup: HashMap<VertexKey, u32>,
    /// Vertices whose face entry had no normal index.
    missing_normals: Vec<u32>,
}

impl MeshBuilder {
    fn new(name: String, material: Option<String>) -> Self {
        Self {
            mesh: ObjMesh {
                name,
                material,
                ..ObjMesh::default()
            },
            lookup: HashMap::new(),
            missing_normals: Vec::new(),
        }
    }

    fn vertex(&mut self, key: VertexKey, data: &VertexData) -> u32 {
        if let Some(&index) = self.lookup.get(&key) {
            return index;
        }

        let index = self.mesh.positions.len() as u32;
        self.mesh.positions.push(data.positions[key.position]);
        self.mesh
            .uvs
            .push(key.uv.map(|i| data.uvs[i]).unwrap_or([0.0, 0.0]));
        match key.normal {
            Some(i) => self.mesh.normals.push(data.normals[i]),
            None => {
                self.missing_normals.push(index);
                self.mesh.normals.push([0.0, 0.0, 0.0]);
            }
        }
        self.lookup.insert(key, index);
        index
    }

    fn finish(mut self, has_uvs: bool) -> ObjMesh {
        if !has_uvs {
            self.mesh.uvs.clear();
        }
        if self.missing_normals.len() == self.mesh.positions.len() {
            self.mesh.compute_vertex_normals();
        } else if !self.missing_normals.is_empty() {
            self.mesh.fill_vertex_normals(&self.missing_normals);
        }
        self.mesh
    }
}

#[derive(Default)]
struct VertexData {
    positions: Vec<[f32; 3]>,
    uvs: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
}

/// Parses the text of an OBJ file.
///
/// Polygons are fan-triangulated. Vertices are de-duplicated per mesh on
/// their (position, uv, normal) triple; meshes without `vn` data get smooth
/// normals computed from their faces.
pub fn parse_obj(text: &str) -> Result<ObjModel> {
    let mut data = VertexData::default();
    let mut model = ObjModel::default();

    let mut object_name = String::new();
    let mut material: Option<String> = None;
    let mut builder = MeshBuilder::new(String::new(), None);

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        let mut it = s.split_whitespace();
        let tag = it.next().unwrap_or("");
        let args: Vec<&str> = it.collect();

        match tag {
            "v" => data.positions.push(parse_floats::<3>(line, tag, &args, 3)?),
            "vt" => data.uvs.push(parse_floats::<2>(line, tag, &args, 1)?),
            "vn" => data.normals.push(parse_floats::<3>(line, tag, &args, 3)?),
            "f" => {
                if args.len() < 3 {
                    return Err(WavefrontError::syntax(line, "face needs at least three vertices"));
                }
                let keys = args
                    .iter()
                    .map(|token| parse_face_vertex(line, token, &data))
                    .collect::<Result<Vec<_>>>()?;

                let first = builder.vertex(keys[0], &data);
                for pair in keys[1..].windows(2) {
                    let b = builder.vertex(pair[0], &data);
                    let c = builder.vertex(pair[1], &data);
                    builder.mesh.indices.extend_from_slice(&[first, b, c]);
                }
            }
            "o" | "g" => {
                object_name = args.join(" ");
                builder = rotate(builder, &mut model, &object_name, &material, &data);
            }
            "usemtl" => {
                material = (!args.is_empty()).then(|| args.join(" "));
                builder = rotate(builder, &mut model, &object_name, &material, &data);
            }
            "mtllib" => model
                .material_libraries
                .extend(args.iter().map(|s| s.to_string())),
            _ => {}
        }
    }

    if !builder.mesh.is_empty() {
        model.meshes.push(builder.finish(!data.uvs.is_empty()));
    }

    Ok(model)
}

/// Closes the current mesh (if it received any face) and starts a new one
/// for the given object name and material. An empty pending mesh is simply
/// renamed so that `o` followed by `usemtl` yields a single mesh.
fn rotate(
    builder: MeshBuilder,
    model: &mut ObjModel,
    name: &str,
    material: &Option<String>,
    data: &VertexData,
) -> MeshBuilder {
    if builder.mesh.is_empty() {
        return MeshBuilder::new(name.to_string(), material.clone());
    }
    model.meshes.push(builder.finish(!data.uvs.is_empty()));
    MeshBuilder::new(name.to_string(), material.clone())
}

fn parse_floats<const N: usize>(
    line: usize,
    tag: &str,
    args: &[&str],
    required: usize,
) -> Result<[f32; N]> {
    if args.len() < required {
        return Err(WavefrontError::syntax(
            line,
            format!("`{tag}` expects at least {required} values"),
        ));
    }
    let mut out = [0.0f32; N];
    for (slot, token) in out.iter_mut().zip(args) {
        *slot = token
            .parse()
            .map_err(|_| WavefrontError::syntax(line, format!("invalid number `{token}`")))?;
    }
    Ok(out)
}

fn parse_face_vertex(line: usize, token: &str, data: &VertexData) -> Result<VertexKey> {
    let mut parts = token.split('/');
    let position = parts
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| WavefrontError::syntax(line, format!("face vertex `{token}` has no position")))?;
    let position = resolve_index(line, "position", position, data.positions.len())?;

    let uv = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(line, "texture", s, data.uvs.len())?),
        _ => None,
    };
    let normal = match parts.next() {
        Some(s) if !s.is_empty() => Some(resolve_index(line, "normal", s, data.normals.len())?),
        _ => None,
    };

    Ok(VertexKey {
        position,
        uv,
        normal,
    })
}

/// OBJ indices are 1-based; negative values count back from the last
/// element defined so far.
fn resolve_index(line: usize, kind: &'static str, token: &str, len: usize) -> Result<usize> {
    let index: i64 = token
        .parse()
        .map_err(|_| WavefrontError::syntax(line, format!("invalid {kind} index `{token}`")))?;

    let resolved = if index > 0 {
        index - 1
    } else {
        len as i64 + index
    };

    if index == 0 || resolved < 0 || resolved >= len as i64 {
        return Err(WavefrontError::IndexOutOfRange {
            line,
            kind,
            index,
            len,
        });
    }
    Ok(resolved as usize)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CUBE_FACE: &str = "
mtllib tower.mtl
o Tower
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vt 1 0
vt 1 1
vt 0 1
vn 0 0 1
usemtl Brick
f 1/1/1 2/2/1 3/3/1 4/4/1
";

    #[test]
    fn quad_is_fan_triangulated() {
        let model = parse_obj(CUBE_FACE).unwrap();
        assert_eq!(model.material_libraries, vec!["tower.mtl"]);
        assert_eq!(model.meshes.len(), 1);

        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "Tower");
        assert_eq!(mesh.material.as_deref(), Some("Brick"));
        assert_eq!(mesh.vertex_count(), 4);
        assert_eq!(mesh.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(mesh.uvs.len(), 4);
    }

    #[test]
    fn negative_indices_are_relative() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf -3 -2 -1\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.meshes[0].positions[2], [0.0, 1.0, 0.0]);
        assert!(model.meshes[0].uvs.is_empty());
    }

    #[test]
    fn missing_normals_are_computed() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        let model = parse_obj(text).unwrap();
        let normals = &model.meshes[0].normals;
        assert_eq!(normals.len(), 3);
        assert!(normals.iter().all(|n| (n[2] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn supplied_normals_survive_faces_without_normals() {
        let text = "\
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
vn 0 1 0
f 1//1 2//1 3//1
f 2 4 3
";
        let mesh = &parse_obj(text).unwrap().meshes[0];
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.normals[0], [0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals[1], [0.0, 1.0, 0.0]);
        assert_eq!(mesh.normals[2], [0.0, 1.0, 0.0]);
        // second face gets its computed face normal
        assert!(mesh.normals[3..]
            .iter()
            .all(|n| (n[2] - 1.0).abs() < 1e-6));
    }

    #[test]
    fn material_switch_splits_meshes() {
        let text = "
v 0 0 0
v 1 0 0
v 0 1 0
v 1 1 0
o Roof
usemtl Tile
f 1 2 3
usemtl Metal
f 2 4 3
usemtl Tile
f 1 3 2
";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.meshes.len(), 3);
        assert!(model.meshes.iter().all(|m| m.name == "Roof"));
        assert_eq!(model.material_names(), vec!["Tile", "Metal"]);
        assert_eq!(model.triangle_count(), 3);
    }

    #[test]
    fn shared_vertices_are_deduplicated() {
        let text = "v 0 0 0\nv 1 0 0\nv 0 1 0\nv 1 1 0\nf 1 2 3\nf 2 4 3\n";
        let model = parse_obj(text).unwrap();
        assert_eq!(model.meshes[0].vertex_count(), 4);
        assert_eq!(model.meshes[0].indices.len(), 6);
    }

    #[test]
    fn out_of_range_index_reports_line() {
        let err = parse_obj("v 0 0 0\nv 1 0 0\nf 1 2 3\n").unwrap_err();
        assert_eq!(
            err,
            WavefrontError::IndexOutOfRange {
                line: 3,
                kind: "position",
                index: 3,
                len: 2
            }
        );
    }

    #[test]
    fn zero_index_is_invalid() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 0 1 2\n").is_err());
    }

    #[test]
    fn malformed_vertex_is_a_syntax_error() {
        let err = parse_obj("v 0 zero 0\n").unwrap_err();
        assert!(matches!(err, WavefrontError::Syntax { line: 1, .. }));
    }

    #[test]
    fn degenerate_face_is_rejected() {
        assert!(parse_obj("v 0 0 0\nv 1 0 0\nf 1 2\n").is_err());
    }
}
