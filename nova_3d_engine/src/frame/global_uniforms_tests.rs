//! Unit tests for the global uniform block layout

use glam::{Mat4, Vec3};
use crate::frame::{GlobalUniforms, PointLightUniform, MAX_POINT_LIGHTS};

#[test]
fn test_struct_sizes_match_std140_layout() {
    // 3 mat4 + 1 vec4 + 10 lights of 2 vec4 + uint count padded to 16.
    assert_eq!(std::mem::size_of::<PointLightUniform>(), 32);
    assert_eq!(
        std::mem::size_of::<GlobalUniforms>(),
        3 * 64 + 16 + MAX_POINT_LIGHTS * 32 + 16
    );
}

#[test]
fn test_field_offsets_are_sequential() {
    let uniforms = GlobalUniforms::default();
    let base = &uniforms as *const _ as usize;
    assert_eq!(&uniforms.projection as *const _ as usize - base, 0);
    assert_eq!(&uniforms.view as *const _ as usize - base, 64);
    assert_eq!(&uniforms.inverse_view as *const _ as usize - base, 128);
    assert_eq!(&uniforms.ambient_light_color as *const _ as usize - base, 192);
    assert_eq!(&uniforms.point_lights as *const _ as usize - base, 208);
    assert_eq!(&uniforms.num_lights as *const _ as usize - base, 528);
}

#[test]
fn test_default_values() {
    let uniforms = GlobalUniforms::default();
    assert_eq!(uniforms.projection, Mat4::IDENTITY);
    assert_eq!(uniforms.view, Mat4::IDENTITY);
    assert_eq!(uniforms.inverse_view, Mat4::IDENTITY);
    assert_eq!(uniforms.ambient_light_color, [1.0, 1.0, 1.0, 0.02]);
    assert_eq!(uniforms.num_lights, 0);
}

#[test]
fn test_point_light_uniform_packing() {
    let light = PointLightUniform::new(
        Vec3::new(1.0, -2.0, 3.0),
        Vec3::new(0.5, 0.25, 1.0),
        4.0,
    );
    assert_eq!(light.position, [1.0, -2.0, 3.0, 1.0]);
    assert_eq!(light.color, [0.5, 0.25, 1.0, 4.0]);
}

#[test]
fn test_bytes_of_round_trip() {
    let mut uniforms = GlobalUniforms::default();
    uniforms.num_lights = 3;
    uniforms.point_lights[2] = PointLightUniform::new(Vec3::X, Vec3::Y, 2.0);

    let bytes = bytemuck::bytes_of(&uniforms).to_vec();
    let restored: GlobalUniforms = *bytemuck::from_bytes(&bytes);
    assert_eq!(restored, uniforms);
}
