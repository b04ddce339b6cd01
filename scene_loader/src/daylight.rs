use std::f64::consts::TAU;

use crate::error::{Result, SceneLoaderError};
use crate::scene::Scene;

/// Opacity of the light layer at `hour` (0..24, fractional). Full at
/// midnight, zero at noon.
pub fn light_opacity(hour: f64) -> Result<f32> {
    if !hour.is_finite() {
        return Err(SceneLoaderError::InvalidTime(hour));
    }
    Ok(((hour / 24.0 * TAU).cos() * 0.5 + 0.5) as f32)
}

/// Applies [`light_opacity`] to the scene's light layer and returns the
/// opacity used. Without a light layer nothing changes and 1.0 is returned.
pub fn apply_daylight(scene: &Scene, hour: f64) -> Result<f32> {
    let opacity = light_opacity(hour)?;

    let Some(lights) = scene.lights() else {
        log::warn!("No light layer in scene, skipping daylight at hour {}", hour);
        return Ok(1.0);
    };

    scene.set_node_opacity(lights, opacity);
    log::debug!("Light layer opacity set to {:.3} for hour {}", opacity, hour);
    Ok(opacity)
}
