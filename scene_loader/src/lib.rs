// Library exports for testing and reuse

pub mod assembly;
pub mod config;
pub mod daylight;
pub mod error;
pub mod handlers;
pub mod loader;
pub mod materials;
pub mod pipeline;
pub mod scene;
pub mod source;
pub mod state;
pub mod transform;

pub use assembly::{assemble, JobOutcome, SceneJob};
pub use config::LoaderConfig;
pub use error::{Result, SceneLoaderError};
pub use loader::ModelLoader;
pub use materials::LoaderProfile;
pub use pipeline::{load_manifests, LoadReport, ManifestReport};
pub use scene::{NodeGroup, NodeId, Scene, SceneNode};
pub use source::{AssetFetcher, FsFetcher, HttpFetcher, InMemoryFetcher, RoutedFetcher};
