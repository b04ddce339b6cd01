use crate::color::Color;
use crate::error::{Result, WavefrontError};

/// One `newmtl` block of a material library.
#[derive(Debug, Clone, PartialEq)]
pub struct MtlMaterial {
    pub name: String,
    pub ambient: Color,
    pub diffuse: Color,
    pub specular: Color,
    pub emissive: Color,
    pub shininess: f32,
    /// `d`, or `1 - Tr` when only `Tr` is given.
    pub dissolve: f32,
    pub illumination: Option<u32>,
    pub diffuse_map: Option<String>,
    pub alpha_map: Option<String>,
    pub emissive_map: Option<String>,
    pub bump_map: Option<String>,
}

impl MtlMaterial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ambient: Color::BLACK,
            diffuse: Color::WHITE,
            specular: Color::BLACK,
            emissive: Color::BLACK,
            shininess: 30.0,
            dissolve: 1.0,
            illumination: None,
            diffuse_map: None,
            alpha_map: None,
            emissive_map: None,
            bump_map: None,
        }
    }

    /// Texture references in this material, in `map_Kd`, `map_d`, `map_Ke`,
    /// `bump` order.
    pub fn texture_refs(&self) -> impl Iterator<Item = &str> {
        [
            &self.diffuse_map,
            &self.alpha_map,
            &self.emissive_map,
            &self.bump_map,
        ]
        .into_iter()
        .filter_map(|t| t.as_deref())
    }
}

/// Materials of one `.mtl` file in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MaterialLibrary {
    materials: Vec<MtlMaterial>,
}

impl MaterialLibrary {
    pub fn get(&self, name: &str) -> Option<&MtlMaterial> {
        self.materials.iter().find(|m| m.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &MtlMaterial> {
        self.materials.iter()
    }

    pub fn len(&self) -> usize {
        self.materials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.materials.is_empty()
    }

    pub fn into_materials(self) -> Vec<MtlMaterial> {
        self.materials
    }
}

/// Parses the text of an MTL file.
///
/// A later `newmtl` with an already used name replaces the earlier block.
pub fn parse_mtl(text: &str) -> Result<MaterialLibrary> {
    let mut materials: Vec<MtlMaterial> = Vec::new();
    let mut current: Option<MtlMaterial> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line = idx + 1;
        let s = raw.trim();
        if s.is_empty() || s.starts_with('#') {
            continue;
        }

        let mut it = s.split_whitespace();
        let tag = it.next().unwrap_or("");
        let rest: Vec<&str> = it.collect();

        if tag == "newmtl" {
            if let Some(done) = current.take() {
                push_material(&mut materials, done);
            }
            let name = rest.join(" ");
            if name.is_empty() {
                return Err(WavefrontError::syntax(line, "`newmtl` without a name"));
            }
            current = Some(MtlMaterial::new(name));
            continue;
        }

        let known = matches!(
            tag,
            "Ka" | "Kd" | "Ks" | "Ke" | "Ns" | "d" | "Tr" | "illum" | "map_Kd" | "map_d"
                | "map_Ke" | "map_Bump" | "map_bump" | "bump"
        );
        if !known {
            continue;
        }

        let material = current
            .as_mut()
            .ok_or_else(|| WavefrontError::NoActiveMaterial {
                line,
                statement: tag.to_string(),
            })?;

        match tag {
            "Ka" => material.ambient = parse_color(line, &rest)?,
            "Kd" => material.diffuse = parse_color(line, &rest)?,
            "Ks" => material.specular = parse_color(line, &rest)?,
            "Ke" => material.emissive = parse_color(line, &rest)?,
            "Ns" => material.shininess = parse_scalar(line, tag, &rest)?,
            "d" => material.dissolve = parse_scalar(line, tag, &rest)?,
            "Tr" => material.dissolve = 1.0 - parse_scalar(line, tag, &rest)?,
            "illum" => {
                let value = rest
                    .first()
                    .and_then(|t| t.parse::<u32>().ok())
                    .ok_or_else(|| WavefrontError::syntax(line, "`illum` expects an integer"))?;
                material.illumination = Some(value);
            }
            "map_Kd" => material.diffuse_map = Some(map_file(line, tag, &rest)?),
            "map_d" => material.alpha_map = Some(map_file(line, tag, &rest)?),
            "map_Ke" => material.emissive_map = Some(map_file(line, tag, &rest)?),
            _ => material.bump_map = Some(map_file(line, tag, &rest)?),
        }
    }

    if let Some(done) = current.take() {
        push_material(&mut materials, done);
    }

    Ok(MaterialLibrary { materials })
}

fn push_material(materials: &mut Vec<MtlMaterial>, material: MtlMaterial) {
    if let Some(existing) = materials.iter_mut().find(|m| m.name == material.name) {
        *existing = material;
    } else {
        materials.push(material);
    }
}

fn parse_color(line: usize, args: &[&str]) -> Result<Color> {
    // `Kd spectral ...` and `Kd xyz ...` are not supported
    if args.len() < 3 {
        return Err(WavefrontError::syntax(line, "colour expects three components"));
    }
    let mut rgb = [0.0f32; 3];
    for (slot, token) in rgb.iter_mut().zip(args) {
        *slot = token
            .parse()
            .map_err(|_| WavefrontError::syntax(line, format!("invalid colour component `{token}`")))?;
    }
    Ok(Color::from(rgb))
}

fn parse_scalar(line: usize, tag: &str, args: &[&str]) -> Result<f32> {
    let token = args
        .first()
        .ok_or_else(|| WavefrontError::syntax(line, format!("`{tag}` expects a value")))?;
    token
        .parse()
        .map_err(|_| WavefrontError::syntax(line, format!("invalid `{tag}` value `{token}`")))
}

/// Map statements may carry options (`-s 1 1 1`, `-bm 0.5`); the file name is
/// the last token.
fn map_file(line: usize, tag: &str, args: &[&str]) -> Result<String> {
    args.last()
        .map(|s| s.to_string())
        .ok_or_else(|| WavefrontError::syntax(line, format!("`{tag}` without a file name")))
}
