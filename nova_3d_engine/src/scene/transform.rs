/// Transform - translation / rotation / scale of a scene object
///
/// Rotation uses Tait-Bryan angles with the Y-X-Z convention: reading the
/// composed matrix right to left, rotation is applied Z first, then X, then
/// Y (extrinsic), matching the intrinsic Y-X'-Z'' reading left to right.

use glam::{EulerRot, Mat3, Mat4, Vec3};

/// Affine transform of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub scale: Vec3,
    /// Tait-Bryan angles in radians (Y-X-Z order)
    pub rotation: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            scale: Vec3::ONE,
            rotation: Vec3::ZERO,
        }
    }
}

impl Transform {
    /// Composed affine matrix: translate * Ry * Rx * Rz * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation)
            * Mat4::from_euler(
                EulerRot::YXZ,
                self.rotation.y,
                self.rotation.x,
                self.rotation.z,
            )
            * Mat4::from_scale(self.scale)
    }

    /// Normal matrix: rotation * inverse scale
    ///
    /// Equals the inverse transpose of the upper-left 3x3 of `matrix()`,
    /// computed directly instead of inverting.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_euler(
            EulerRot::YXZ,
            self.rotation.y,
            self.rotation.x,
            self.rotation.z,
        ) * Mat3::from_diagonal(self.scale.recip())
    }
}

#[cfg(test)]
#[path = "transform_tests.rs"]
mod tests;
