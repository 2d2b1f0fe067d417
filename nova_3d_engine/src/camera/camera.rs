/// Camera - projection and view matrices for the frame uniforms
///
/// Left-handed, depth range 0..1 (the presentation backend's clip space),
/// world Y pointing down by convention of the default `UP` vector. The
/// inverse view is kept alongside the view so lighting can read the camera
/// world position without a per-frame matrix inversion.

use glam::{EulerRot, Mat3, Mat4, Vec3, Vec4};

/// Default up vector (world Y points down)
const UP: Vec3 = Vec3::new(0.0, -1.0, 0.0);

/// Camera with projection, view, and inverse-view matrices
#[derive(Debug, Clone)]
pub struct Camera {
    projection: Mat4,
    view: Mat4,
    inverse_view: Mat4,
}

impl Camera {
    pub fn new() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
        }
    }

    /// Orthographic projection over the given box, depth 0..1
    pub fn set_orthographic_projection(
        &mut self,
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Mat4::orthographic_lh(left, right, bottom, top, near, far);
    }

    /// Perspective projection, depth 0..1
    ///
    /// # Arguments
    ///
    /// * `fov_y` - Vertical field of view in radians
    /// * `aspect` - Surface width / height
    pub fn set_perspective_projection(&mut self, fov_y: f32, aspect: f32, near: f32, far: f32) {
        debug_assert!(aspect > 0.0 && aspect.is_finite());
        self.projection = Mat4::perspective_lh(fov_y, aspect, near, far);
    }

    /// Look along `direction` from `position`
    pub fn set_view_direction(&mut self, position: Vec3, direction: Vec3, up: Vec3) {
        // Orthonormal basis: w forward, u right, v down (Y-down world).
        let w = direction.normalize();
        let u = w.cross(up).normalize();
        let v = w.cross(u);

        self.view = Mat4::from_cols(
            Vec4::new(u.x, v.x, w.x, 0.0),
            Vec4::new(u.y, v.y, w.y, 0.0),
            Vec4::new(u.z, v.z, w.z, 0.0),
            Vec4::new(-u.dot(position), -v.dot(position), -w.dot(position), 1.0),
        );
        self.inverse_view = Mat4::from_cols(
            u.extend(0.0),
            v.extend(0.0),
            w.extend(0.0),
            position.extend(1.0),
        );
    }

    /// Look at `target` from `position`
    pub fn set_view_target(&mut self, position: Vec3, target: Vec3, up: Vec3) {
        self.set_view_direction(position, target - position, up);
    }

    /// View from a position and Tait-Bryan Y-X-Z rotation (radians)
    pub fn set_view_yxz(&mut self, position: Vec3, rotation: Vec3) {
        let rot = Mat3::from_euler(EulerRot::YXZ, rotation.y, rotation.x, rotation.z);
        self.view = Mat4::from_mat3(rot.transpose()) * Mat4::from_translation(-position);
        self.inverse_view = Mat4::from_translation(position) * Mat4::from_mat3(rot);
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn view(&self) -> &Mat4 {
        &self.view
    }

    pub fn inverse_view(&self) -> &Mat4 {
        &self.inverse_view
    }

    /// Camera world position (translation column of the inverse view)
    pub fn position(&self) -> Vec3 {
        self.inverse_view.w_axis.truncate()
    }

    /// The default up vector for this world orientation
    pub fn default_up() -> Vec3 {
        UP
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "camera_tests.rs"]
mod tests;
