use serde::{Deserialize, Serialize};

/// Which faces of a mesh are drawn.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MaterialSide {
    Front,
    Back,
    #[default]
    Double,
}

impl MaterialSide {
    /// Maps a manifest side name. Anything that is not `FrontSide` or
    /// `BackSide` is double sided.
    pub fn from_name(name: &str) -> Self {
        match name {
            "FrontSide" => MaterialSide::Front,
            "BackSide" => MaterialSide::Back,
            _ => MaterialSide::Double,
        }
    }
}

/// Blend mode requested for skybox materials.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Blending {
    None,
    #[default]
    Normal,
    Additive,
    Subtractive,
    Multiply,
    Custom,
}

impl Blending {
    /// Maps a manifest blending name (`"AdditiveBlending"`, ...). Unknown
    /// names fall back to [`Blending::Normal`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "NoBlending" => Blending::None,
            "NormalBlending" => Blending::Normal,
            "AdditiveBlending" => Blending::Additive,
            "SubtractiveBlending" => Blending::Subtractive,
            "MultiplyBlending" => Blending::Multiply,
            "CustomBlending" => Blending::Custom,
            _ => Blending::Normal,
        }
    }
}

/// One entry of a manifest's `models` array.
///
/// Only `path` and `mtlPath` are required. Visual flags are kept as they
/// appear in the document; the accessor methods resolve their defaults.
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModelDescriptor {
    pub path: String,
    pub mtl_path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<[f32; 3]>,
    /// Euler angles in radians, applied in XYZ order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<[f32; 3]>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale: Option<[f32; 3]>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transparent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub side: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_write: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alpha_map_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_map_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emissive_intensity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blending: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_lights: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_order: Option<i32>,
}

const DEFAULT_EMISSIVE_COLOR: &str = "#000000";

impl ModelDescriptor {
    pub fn new(path: impl Into<String>, mtl_path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            mtl_path: mtl_path.into(),
            ..Self::default()
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.transparent.unwrap_or(false)
    }

    pub fn is_lights(&self) -> bool {
        self.is_lights.unwrap_or(false)
    }

    pub fn side(&self) -> MaterialSide {
        self.side
            .as_deref()
            .map(MaterialSide::from_name)
            .unwrap_or_default()
    }

    /// Depth writes stay enabled unless the manifest explicitly disables them.
    pub fn depth_write(&self) -> bool {
        self.depth_write != Some(false)
    }

    /// Missing or zero opacity means fully opaque.
    pub fn opacity(&self) -> f32 {
        non_zero_or(self.opacity, 1.0)
    }

    pub fn emissive_intensity(&self) -> f32 {
        non_zero_or(self.emissive_intensity, 1.0)
    }

    pub fn emissive_color(&self) -> &str {
        match self.emissive_color.as_deref() {
            Some(color) if !color.is_empty() => color,
            _ => DEFAULT_EMISSIVE_COLOR,
        }
    }

    pub fn blending(&self) -> Blending {
        self.blending
            .as_deref()
            .map(Blending::from_name)
            .unwrap_or_default()
    }

    pub fn render_order(&self) -> i32 {
        self.render_order.unwrap_or(0)
    }
}

fn non_zero_or(value: Option<f32>, fallback: f32) -> f32 {
    match value {
        Some(v) if v != 0.0 && !v.is_nan() => v,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_camel_case_keys() {
        let json = r#"{
            "path": "models/tower.obj",
            "mtlPath": "models/tower.mtl",
            "position": [1.0, 2.0, 3.0],
            "depthWrite": false,
            "renderOrder": 4,
            "isLights": true
        }"#;

        let descriptor: ModelDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(descriptor.mtl_path, "models/tower.mtl");
        assert_eq!(descriptor.position, Some([1.0, 2.0, 3.0]));
        assert!(!descriptor.depth_write());
        assert_eq!(descriptor.render_order(), 4);
        assert!(descriptor.is_lights());
    }

    #[test]
    fn defaults_resolve_like_the_site() {
        let descriptor = ModelDescriptor::new("a.obj", "a.mtl");
        assert_eq!(descriptor.side(), MaterialSide::Double);
        assert!(descriptor.depth_write());
        assert!(!descriptor.is_transparent());
        assert_eq!(descriptor.opacity(), 1.0);
        assert_eq!(descriptor.emissive_intensity(), 1.0);
        assert_eq!(descriptor.emissive_color(), "#000000");
        assert_eq!(descriptor.blending(), Blending::Normal);
        assert_eq!(descriptor.render_order(), 0);
    }

    #[test]
    fn zero_opacity_means_opaque() {
        let mut descriptor = ModelDescriptor::new("a.obj", "a.mtl");
        descriptor.opacity = Some(0.0);
        assert_eq!(descriptor.opacity(), 1.0);

        descriptor.opacity = Some(0.25);
        assert_eq!(descriptor.opacity(), 0.25);
    }

    #[test]
    fn unknown_side_is_double_sided() {
        assert_eq!(MaterialSide::from_name("BackSide"), MaterialSide::Back);
        assert_eq!(MaterialSide::from_name("FrontSide"), MaterialSide::Front);
        assert_eq!(MaterialSide::from_name("backside"), MaterialSide::Double);
    }

    #[test]
    fn blending_names() {
        assert_eq!(Blending::from_name("AdditiveBlending"), Blending::Additive);
        assert_eq!(Blending::from_name("NoBlending"), Blending::None);
        assert_eq!(Blending::from_name("Glow"), Blending::Normal);
    }

    #[test]
    fn short_transform_array_is_rejected() {
        let json = r#"{ "path": "a.obj", "mtlPath": "a.mtl", "scale": [1.0, 2.0] }"#;
        assert!(serde_json::from_str::<ModelDescriptor>(json).is_err());
    }
}
