//! Unit tests for the camera

use glam::{Mat4, Vec3, Vec4};
use crate::camera::Camera;

fn assert_vec4_eq(a: Vec4, b: Vec4) {
    assert!(a.abs_diff_eq(b, 1e-4), "vectors differ: {:?} vs {:?}", a, b);
}

#[test]
fn test_new_is_identity() {
    let camera = Camera::new();
    assert_eq!(*camera.projection(), Mat4::IDENTITY);
    assert_eq!(*camera.view(), Mat4::IDENTITY);
    assert_eq!(*camera.inverse_view(), Mat4::IDENTITY);
    assert_eq!(camera.position(), Vec3::ZERO);
}

#[test]
fn test_perspective_maps_depth_zero_to_one() {
    let mut camera = Camera::new();
    camera.set_perspective_projection(std::f32::consts::FRAC_PI_2, 1.0, 0.1, 100.0);
    let p = camera.projection();

    let near = *p * Vec4::new(0.0, 0.0, 0.1, 1.0);
    assert!((near.z / near.w).abs() < 1e-5);
    let far = *p * Vec4::new(0.0, 0.0, 100.0, 1.0);
    assert!(((far.z / far.w) - 1.0).abs() < 1e-4);
}

#[test]
fn test_orthographic_maps_box_to_clip() {
    let mut camera = Camera::new();
    camera.set_orthographic_projection(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
    let p = camera.projection();

    // Y-down world: the top edge (y = -1) lands at clip +1.
    assert_vec4_eq(*p * Vec4::new(-2.0, -1.0, 0.0, 1.0), Vec4::new(-1.0, 1.0, 0.0, 1.0));
    assert_vec4_eq(*p * Vec4::new(2.0, 1.0, 10.0, 1.0), Vec4::new(1.0, -1.0, 1.0, 1.0));
}

#[test]
fn test_view_direction_moves_world_to_camera_space() {
    let mut camera = Camera::new();
    let position = Vec3::new(0.0, 0.0, -5.0);
    camera.set_view_direction(position, Vec3::Z, Camera::default_up());

    // The camera position maps to the view-space origin.
    let origin = *camera.view() * position.extend(1.0);
    assert_vec4_eq(origin, Vec4::new(0.0, 0.0, 0.0, 1.0));

    // A point straight ahead lands on the positive view-space Z axis.
    let ahead = *camera.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert_vec4_eq(ahead, Vec4::new(0.0, 0.0, 5.0, 1.0));
}

#[test]
fn test_view_target_matches_view_direction() {
    let position = Vec3::new(1.0, 2.0, 3.0);
    let target = Vec3::new(4.0, 0.0, -2.0);

    let mut by_target = Camera::new();
    by_target.set_view_target(position, target, Camera::default_up());
    let mut by_direction = Camera::new();
    by_direction.set_view_direction(position, target - position, Camera::default_up());

    assert!(by_target.view().abs_diff_eq(*by_direction.view(), 1e-6));
}

#[test]
fn test_inverse_view_is_the_inverse() {
    let mut camera = Camera::new();
    camera.set_view_yxz(Vec3::new(1.0, -2.0, 4.0), Vec3::new(0.3, 1.2, -0.4));
    let product = *camera.view() * *camera.inverse_view();
    assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));

    camera.set_view_direction(Vec3::new(-3.0, 0.5, 2.0), Vec3::new(1.0, 0.2, -0.7), Camera::default_up());
    let product = *camera.view() * *camera.inverse_view();
    assert!(product.abs_diff_eq(Mat4::IDENTITY, 1e-5));
}

#[test]
fn test_position_reads_inverse_view_translation() {
    let mut camera = Camera::new();
    let position = Vec3::new(7.0, -1.0, 2.5);
    camera.set_view_yxz(position, Vec3::new(0.1, 0.2, 0.3));
    assert!(camera.position().abs_diff_eq(position, 1e-5));
}

#[test]
fn test_view_yxz_zero_rotation_is_pure_translation() {
    let mut camera = Camera::new();
    camera.set_view_yxz(Vec3::new(0.0, 0.0, -10.0), Vec3::ZERO);
    let p = *camera.view() * Vec4::new(0.0, 0.0, 0.0, 1.0);
    assert_vec4_eq(p, Vec4::new(0.0, 0.0, 10.0, 1.0));
}
