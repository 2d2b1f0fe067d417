//! Unit tests for the mesh render system

use std::sync::{Arc, Mutex};
use glam::Vec3;

use crate::camera::Camera;
use crate::error::Error;
use crate::frame::FrameInfo;
use crate::graphics_device::mock_graphics_device::{
    MockGraphicsDevice, MockCommandList, MockBindingGroup, MockPipeline, MockRenderPass,
    MockFramebuffer,
};
use crate::graphics_device::{
    GraphicsDevice, CommandList, BindingGroup, Pipeline, RenderPass, Framebuffer,
};
use crate::resource::{Mesh, MeshKey, MeshRegistry, Vertex};
use crate::scene::Scene;
use crate::systems::{MeshRenderSystem, MeshPushConstants};

// ============================================================================
// TEST HELPERS
// ============================================================================

fn triangle() -> Vec<Vertex> {
    let v = |x: f32, y: f32| Vertex {
        position: [x, y, 0.0],
        color: [1.0, 1.0, 1.0],
        normal: [0.0, 0.0, 1.0],
        uv: [0.0, 0.0],
    };
    vec![v(0.0, -0.5), v(0.5, 0.5), v(-0.5, 0.5)]
}

struct TestRig {
    registry: MeshRegistry,
    scene: Scene,
    camera: Camera,
    system: MeshRenderSystem,
    binding_group: Arc<dyn BindingGroup>,
    mesh_key: MeshKey,
}

fn setup() -> TestRig {
    let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(MockGraphicsDevice::new()));
    let mut registry = MeshRegistry::new();
    let mesh_key = registry.insert(Mesh::new(&device, &triangle(), None).unwrap());

    let pipeline: Arc<dyn Pipeline> = Arc::new(MockPipeline);
    TestRig {
        registry,
        scene: Scene::new(),
        camera: Camera::new(),
        system: MeshRenderSystem::new(pipeline),
        binding_group: Arc::new(MockBindingGroup),
        mesh_key,
    }
}

fn recording_command_list() -> MockCommandList {
    let mut cmd = MockCommandList::new();
    cmd.begin().unwrap();
    let pass: Arc<dyn RenderPass> = Arc::new(MockRenderPass);
    let fb: Arc<dyn Framebuffer> = Arc::new(MockFramebuffer);
    cmd.begin_render_pass(&pass, &fb, &[]).unwrap();
    cmd
}

fn render(rig: &mut TestRig, cmd: &mut MockCommandList) -> crate::error::Result<()> {
    let mut frame = FrameInfo {
        frame_index: 0,
        frame_time: 1.0 / 60.0,
        command_list: cmd,
        global_binding_group: &rig.binding_group,
        camera: &rig.camera,
        scene: &rig.scene,
    };
    rig.system.render(&mut frame, &rig.registry)
}

// ============================================================================
// RENDERING
// ============================================================================

#[test]
fn test_empty_scene_binds_pipeline_only() {
    let mut rig = setup();
    let mut cmd = recording_command_list();
    render(&mut rig, &mut cmd).unwrap();

    let commands = cmd.commands.lock().unwrap();
    assert_eq!(
        commands[2..],
        ["bind_pipeline".to_string(), "bind_binding_group(0)".to_string()]
    );
}

#[test]
fn test_draws_only_meshed_objects() {
    let mut rig = setup();
    let meshed = rig.scene.create_object();
    rig.scene.object_mut(meshed).unwrap().mesh = Some(rig.mesh_key);
    // Light-only object: no mesh, must be skipped.
    rig.scene.create_point_light(1.0, 0.1, Vec3::ONE);

    let mut cmd = recording_command_list();
    render(&mut rig, &mut cmd).unwrap();

    let push_size = std::mem::size_of::<MeshPushConstants>();
    let commands = cmd.commands.lock().unwrap();
    assert_eq!(
        commands[2..],
        [
            "bind_pipeline".to_string(),
            "bind_binding_group(0)".to_string(),
            format!("push_constants(0, {} bytes)", push_size),
            "bind_vertex_buffer(0)".to_string(),
            "draw(3, 0)".to_string(),
        ]
    );
}

#[test]
fn test_objects_drawn_in_id_order() {
    let mut rig = setup();
    // Many objects so hash-map iteration order would almost surely differ.
    let mut ids = Vec::new();
    for _ in 0..8 {
        let id = rig.scene.create_object();
        rig.scene.object_mut(id).unwrap().mesh = Some(rig.mesh_key);
        ids.push(id);
    }

    let mut cmd = recording_command_list();
    render(&mut rig, &mut cmd).unwrap();

    let commands = cmd.commands.lock().unwrap();
    let draws = commands.iter().filter(|c| c.starts_with("draw")).count();
    assert_eq!(draws, 8);
    // One push + bind + draw triple per object, recorded back to back.
    assert_eq!(commands.len(), 2 + 2 + 8 * 3);
}

#[test]
fn test_dangling_mesh_key_is_invalid_resource() {
    let mut rig = setup();
    let id = rig.scene.create_object();
    rig.scene.object_mut(id).unwrap().mesh = Some(rig.mesh_key);
    rig.registry.remove(rig.mesh_key);

    let mut cmd = recording_command_list();
    match render(&mut rig, &mut cmd) {
        Err(Error::InvalidResource(message)) => {
            assert!(message.contains("no longer in the registry"));
        }
        other => panic!("expected InvalidResource, got {:?}", other),
    }
}

#[test]
fn test_push_constants_are_transform_sized() {
    // The push block must fit the common 128-byte device limit.
    assert_eq!(std::mem::size_of::<MeshPushConstants>(), 128);
}
