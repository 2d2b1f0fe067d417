/// Global per-frame uniforms - the POD block written into a frame slot's
/// uniform buffer once per frame and read by all render systems that frame.
///
/// Layout follows std140: light array entries are two vec4s, the light count
/// sits after the array, padded to a 16-byte multiple. The struct is written
/// into the mapped buffer as raw bytes, so field order here IS the shader
/// layout.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3, Vec4};

/// Fixed capacity of the per-frame point light array
pub const MAX_POINT_LIGHTS: usize = 10;

/// One active point light, GPU layout
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct PointLightUniform {
    /// World position; w unused
    pub position: [f32; 4],
    /// Light color; w carries the intensity
    pub color: [f32; 4],
}

impl PointLightUniform {
    pub fn new(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            position: position.extend(1.0).to_array(),
            color: color.extend(intensity).to_array(),
        }
    }
}

/// Global frame uniforms (camera matrices, ambient term, active lights)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct GlobalUniforms {
    pub projection: Mat4,
    pub view: Mat4,
    /// Inverse view, used by lighting for the camera world position
    pub inverse_view: Mat4,
    /// Ambient light color; w carries the ambient intensity
    pub ambient_light_color: [f32; 4],
    pub point_lights: [PointLightUniform; MAX_POINT_LIGHTS],
    /// Number of entries of `point_lights` actually in use
    pub num_lights: u32,
    pub _padding: [u32; 3],
}

impl Default for GlobalUniforms {
    fn default() -> Self {
        Self {
            projection: Mat4::IDENTITY,
            view: Mat4::IDENTITY,
            inverse_view: Mat4::IDENTITY,
            ambient_light_color: Vec4::new(1.0, 1.0, 1.0, 0.02).to_array(),
            point_lights: [PointLightUniform::zeroed(); MAX_POINT_LIGHTS],
            num_lights: 0,
            _padding: [0; 3],
        }
    }
}

#[cfg(test)]
#[path = "global_uniforms_tests.rs"]
mod tests;
