//! Scene manifest model shared by the loader crates.
//!
//! A manifest is a JSON document with a `models` array. Every entry is a
//! [`ModelDescriptor`] naming an OBJ mesh, its MTL material library and an
//! optional placement in the scene.

pub mod descriptor;
pub mod document;
pub mod error;
pub mod list;

pub use descriptor::{Blending, MaterialSide, ModelDescriptor};
pub use document::Manifest;
pub use error::ManifestError;
pub use list::ManifestList;

/// Returns the manifest crate version string.
pub fn format_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_matches_pkg() {
        assert_eq!(format_version(), env!("CARGO_PKG_VERSION"));
    }
}
