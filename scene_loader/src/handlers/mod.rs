pub mod assets;
pub mod health;
pub mod scene;

pub use assets::{content_type_for, serve_asset};
pub use health::health_check;
pub use scene::scene_status;
