//! Unit tests for the point light system

use std::sync::{Arc, Mutex};
use glam::Vec3;
use serial_test::serial;

use crate::camera::Camera;
use crate::frame::{FrameInfo, GlobalUniforms, MAX_POINT_LIGHTS};
use crate::graphics_device::mock_graphics_device::{
    MockCommandList, MockBindingGroup, MockPipeline, MockRenderPass, MockFramebuffer,
};
use crate::graphics_device::{
    CommandList, BindingGroup, Pipeline, RenderPass, Framebuffer,
};
use crate::log::{Logger, LogEntry};
use crate::nova3d::Engine;
use crate::scene::Scene;
use crate::systems::{PointLightSystem, PointLightPushConstants};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn system() -> PointLightSystem {
    let pipeline: Arc<dyn Pipeline> = Arc::new(MockPipeline);
    PointLightSystem::new(pipeline)
}

fn recording_command_list() -> MockCommandList {
    let mut cmd = MockCommandList::new();
    cmd.begin().unwrap();
    let pass: Arc<dyn RenderPass> = Arc::new(MockRenderPass);
    let fb: Arc<dyn Framebuffer> = Arc::new(MockFramebuffer);
    cmd.begin_render_pass(&pass, &fb, &[]).unwrap();
    cmd
}

fn render(scene: &Scene, cmd: &mut MockCommandList) {
    let binding_group: Arc<dyn BindingGroup> = Arc::new(MockBindingGroup);
    let camera = Camera::new();
    let mut frame = FrameInfo {
        frame_index: 0,
        frame_time: 1.0 / 60.0,
        command_list: cmd,
        global_binding_group: &binding_group,
        camera: &camera,
        scene,
    };
    system().render(&mut frame).unwrap();
}

struct WarningCounter {
    warnings: Arc<Mutex<usize>>,
}

impl Logger for WarningCounter {
    fn log(&self, entry: &LogEntry) {
        if entry.severity >= crate::log::LogSeverity::Warn {
            *self.warnings.lock().unwrap() += 1;
        }
    }
}

// ============================================================================
// UPDATE
// ============================================================================

#[test]
fn test_update_fills_lights_in_id_order() {
    let mut scene = Scene::new();
    let first = scene.create_point_light(1.0, 0.1, Vec3::new(1.0, 0.0, 0.0));
    let second = scene.create_point_light(2.0, 0.2, Vec3::new(0.0, 1.0, 0.0));
    scene.object_mut(first).unwrap().transform.translation = Vec3::new(-1.0, 0.0, 0.0);
    scene.object_mut(second).unwrap().transform.translation = Vec3::new(1.0, 0.0, 0.0);
    // A mesh-less, light-less object must not contribute.
    scene.create_object();

    let mut uniforms = GlobalUniforms::default();
    system().update(&scene, &mut uniforms);

    assert_eq!(uniforms.num_lights, 2);
    assert_eq!(uniforms.point_lights[0].position, [-1.0, 0.0, 0.0, 1.0]);
    assert_eq!(uniforms.point_lights[0].color, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(uniforms.point_lights[1].position, [1.0, 0.0, 0.0, 1.0]);
    assert_eq!(uniforms.point_lights[1].color, [0.0, 1.0, 0.0, 2.0]);
}

#[test]
fn test_update_with_no_lights_zeroes_count() {
    let mut scene = Scene::new();
    scene.create_object();

    let mut uniforms = GlobalUniforms::default();
    uniforms.num_lights = 5;
    system().update(&scene, &mut uniforms);
    assert_eq!(uniforms.num_lights, 0);
}

#[test]
#[serial]
fn test_update_clamps_to_capacity_and_warns() {
    let warnings = Arc::new(Mutex::new(0));
    Engine::set_logger(WarningCounter {
        warnings: warnings.clone(),
    });

    let mut scene = Scene::new();
    for _ in 0..MAX_POINT_LIGHTS + 2 {
        scene.create_point_light(1.0, 0.1, Vec3::ONE);
    }

    let mut uniforms = GlobalUniforms::default();
    system().update(&scene, &mut uniforms);
    assert_eq!(uniforms.num_lights, MAX_POINT_LIGHTS as u32);
    assert_eq!(*warnings.lock().unwrap(), 1);

    Engine::reset_logger();
}

// ============================================================================
// RENDER
// ============================================================================

#[test]
fn test_render_skips_empty_scene_entirely() {
    let scene = Scene::new();
    let mut cmd = recording_command_list();
    render(&scene, &mut cmd);

    // Not even a pipeline bind when there is nothing to draw.
    let commands = cmd.commands.lock().unwrap();
    assert_eq!(commands.len(), 2);
}

#[test]
fn test_render_draws_one_billboard_per_light() {
    let mut scene = Scene::new();
    scene.create_point_light(1.0, 0.1, Vec3::ONE);
    scene.create_point_light(0.5, 0.2, Vec3::X);

    let mut cmd = recording_command_list();
    render(&scene, &mut cmd);

    let push_size = std::mem::size_of::<PointLightPushConstants>();
    let commands = cmd.commands.lock().unwrap();
    assert_eq!(
        commands[2..],
        [
            "bind_pipeline".to_string(),
            "bind_binding_group(0)".to_string(),
            format!("push_constants(0, {} bytes)", push_size),
            "draw(6, 0)".to_string(),
            format!("push_constants(0, {} bytes)", push_size),
            "draw(6, 0)".to_string(),
        ]
    );
}

#[test]
fn test_push_constant_block_size() {
    assert_eq!(std::mem::size_of::<PointLightPushConstants>(), 48);
}
