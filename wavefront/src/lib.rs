//! Wavefront OBJ/MTL readers used by the scene loader.
//!
//! Both parsers work on text that has already been fetched, so they do not
//! care whether the bytes came from disk or over HTTP. Statements the scene
//! loader has no use for (`s`, `l`, `p`, `Ni`, ...) are skipped.

pub mod color;
pub mod error;
pub mod mesh;
pub mod mtl;
pub mod obj;

pub use color::Color;
pub use error::{Result, WavefrontError};
pub use mesh::{Bounds, ObjMesh};
pub use mtl::{parse_mtl, MaterialLibrary, MtlMaterial};
pub use obj::{parse_obj, ObjModel};
