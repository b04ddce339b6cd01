//! Material descriptions attached to scene nodes and the two loader
//! profiles that post-process them.
//!
//! The profiles mirror what the site's building and dome loaders do to the
//! materials they receive from an MTL file before the mesh is added to the
//! scene.

use manifest::{Blending, MaterialSide, ModelDescriptor};
use serde::{Deserialize, Serialize};
use wavefront::{Color, MtlMaterial};

use crate::source::resolve_relative;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFilter {
    Nearest,
    Linear,
    LinearMipmapLinear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextureFormat {
    Rgb,
    Rgba,
}

impl TextureFormat {
    /// JPEG images decode without alpha; everything else is treated as RGBA.
    pub fn from_location(location: &str) -> Self {
        let lower = location.to_ascii_lowercase();
        if lower.ends_with(".jpg") || lower.ends_with(".jpeg") {
            TextureFormat::Rgb
        } else {
            TextureFormat::Rgba
        }
    }
}

/// A texture reference plus how it should be sampled.
#[derive(Debug, Clone, PartialEq)]
pub struct TextureBinding {
    pub location: String,
    pub format: TextureFormat,
    pub mag_filter: TextureFilter,
    pub min_filter: TextureFilter,
    pub anisotropy: u8,
}

impl TextureBinding {
    pub fn new(location: impl Into<String>) -> Self {
        let location = location.into();
        Self {
            format: TextureFormat::from_location(&location),
            location,
            mag_filter: TextureFilter::Linear,
            min_filter: TextureFilter::LinearMipmapLinear,
            anisotropy: 1,
        }
    }

    pub fn with_filters(mut self, mag: TextureFilter, min: TextureFilter) -> Self {
        self.mag_filter = mag;
        self.min_filter = min;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneMaterial {
    pub name: String,
    pub color: Color,
    pub emissive: Color,
    pub emissive_intensity: f32,
    pub side: MaterialSide,
    pub transparent: bool,
    pub opacity: f32,
    pub depth_write: bool,
    pub alpha_test: f32,
    pub blending: Blending,
    pub map: Option<TextureBinding>,
    pub alpha_map: Option<TextureBinding>,
    pub emissive_map: Option<TextureBinding>,
}

impl SceneMaterial {
    /// Material used for meshes whose `usemtl` name is not in the library.
    pub fn fallback(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            color: Color::WHITE,
            emissive: Color::BLACK,
            emissive_intensity: 1.0,
            side: MaterialSide::Front,
            transparent: false,
            opacity: 1.0,
            depth_write: true,
            alpha_test: 0.0,
            blending: Blending::Normal,
            map: None,
            alpha_map: None,
            emissive_map: None,
        }
    }

    /// Converts an MTL block. Texture names are resolved next to the MTL file.
    pub fn from_mtl(material: &MtlMaterial, mtl_location: &str) -> Self {
        let texture = |name: &Option<String>| {
            name.as_deref()
                .map(|n| TextureBinding::new(resolve_relative(mtl_location, n)))
        };

        Self {
            color: material.diffuse,
            emissive: material.emissive,
            transparent: material.dissolve < 1.0,
            opacity: material.dissolve,
            map: texture(&material.diffuse_map),
            alpha_map: texture(&material.alpha_map),
            emissive_map: texture(&material.emissive_map),
            ..Self::fallback(material.name.clone())
        }
    }
}

/// Which loader a manifest is fed through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderProfile {
    Building,
    Skybox,
}

const BUILDING_ALPHA_TEST: f32 = 0.5;

impl LoaderProfile {
    /// Applies the per-material rules of this profile.
    pub fn apply(self, material: &mut SceneMaterial, descriptor: &ModelDescriptor) {
        match self {
            LoaderProfile::Building => apply_building(material, descriptor),
            LoaderProfile::Skybox => apply_skybox(material, descriptor),
        }
    }

    /// Rules applied again to every mesh's material once the OBJ is loaded,
    /// including fallback materials that never went through [`apply`].
    ///
    /// [`apply`]: LoaderProfile::apply
    pub fn apply_mesh_overrides(self, material: &mut SceneMaterial, descriptor: &ModelDescriptor) {
        if self == LoaderProfile::Skybox {
            material.transparent = true;
            material.opacity = descriptor.opacity();
            material.depth_write = false;
        }
    }

    pub fn reverses_normals(self) -> bool {
        self == LoaderProfile::Skybox
    }

    pub fn label(self) -> &'static str {
        match self {
            LoaderProfile::Building => "building",
            LoaderProfile::Skybox => "dome",
        }
    }
}

fn apply_building(material: &mut SceneMaterial, descriptor: &ModelDescriptor) {
    if descriptor.is_transparent() {
        material.transparent = true;
    }
    material.side = descriptor.side();
    if !descriptor.depth_write() {
        material.depth_write = false;
    }

    if let Some(map) = material.map.as_mut() {
        map.anisotropy = 0;
        map.mag_filter = TextureFilter::Nearest;
        map.min_filter = TextureFilter::Nearest;
        if map.format == TextureFormat::Rgba {
            material.alpha_test = BUILDING_ALPHA_TEST;
        }
    }

    if let Some(alpha_map) = material.alpha_map.as_mut() {
        alpha_map.mag_filter = TextureFilter::Nearest;
        alpha_map.min_filter = TextureFilter::Nearest;
    }
}

fn apply_skybox(material: &mut SceneMaterial, descriptor: &ModelDescriptor) {
    material.side = MaterialSide::Front;
    material.transparent = true;
    material.opacity = descriptor.opacity();
    material.depth_write = false;

    if let Some(map) = material.map.as_mut() {
        map.mag_filter = TextureFilter::Nearest;
        map.min_filter = TextureFilter::LinearMipmapLinear;
    }

    if let Some(path) = descriptor.alpha_map_path.as_deref() {
        material.alpha_map = Some(
            TextureBinding::new(path)
                .with_filters(TextureFilter::Nearest, TextureFilter::LinearMipmapLinear),
        );
    }

    if let Some(path) = descriptor.emissive_map_path.as_deref() {
        material.emissive_map = Some(
            TextureBinding::new(path)
                .with_filters(TextureFilter::Nearest, TextureFilter::LinearMipmapLinear),
        );
        let hex = descriptor.emissive_color();
        material.emissive = Color::from_hex(hex).unwrap_or_else(|| {
            log::warn!(
                "Invalid emissive colour '{}' for '{}', using black",
                hex,
                descriptor.path
            );
            Color::BLACK
        });
        material.emissive_intensity = descriptor.emissive_intensity();
    }

    material.blending = descriptor.blending();
}
