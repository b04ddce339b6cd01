use glam::{EulerRot, Mat4, Quat, Vec3};
use manifest::ModelDescriptor;

/// Placement of a node: translation, Euler XYZ rotation in radians, scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Takes whichever of position/rotation/scale the descriptor sets and
    /// leaves the rest at identity.
    pub fn from_descriptor(descriptor: &ModelDescriptor) -> Self {
        let identity = Self::default();
        Self {
            translation: descriptor
                .position
                .map(Vec3::from)
                .unwrap_or(identity.translation),
            rotation: descriptor
                .rotation
                .map(Vec3::from)
                .unwrap_or(identity.rotation),
            scale: descriptor.scale.map(Vec3::from).unwrap_or(identity.scale),
        }
    }

    /// Rotation as a quaternion. Non-finite angles collapse to identity.
    pub fn rotation_quat(&self) -> Quat {
        let rotation = Quat::from_euler(
            EulerRot::XYZ,
            self.rotation.x,
            self.rotation.y,
            self.rotation.z,
        );
        if rotation.is_finite() {
            rotation.normalize()
        } else {
            Quat::IDENTITY
        }
    }

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation_quat(), self.translation)
    }

    pub fn transform_point(&self, point: [f32; 3]) -> [f32; 3] {
        self.matrix().transform_point3(Vec3::from(point)).to_array()
    }
}
