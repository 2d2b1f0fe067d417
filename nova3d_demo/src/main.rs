//! Nova3D demo - spinning cube with orbiting point lights
//!
//! Opens a window, creates the Vulkan device and swapchain, and drives the
//! frame orchestrator from the winit event loop. Shaders are loaded as
//! precompiled SPIR-V from the `shaders/` directory (see
//! `shaders/compile.sh`).

use std::f32::consts::TAU;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use nova_3d_engine::glam::{Mat3, Vec3};
use nova_3d_engine::nova3d::camera::Camera;
use nova_3d_engine::nova3d::render::{
    Extent2D, FrameInfo, FrameOrchestrator, FrameResourceSet, GlobalUniforms, GraphicsDevice,
    MeshPushConstants, MeshRenderSystem, PointLightPushConstants, PointLightSystem,
    RendererConfig, SurfaceExtentProvider,
};
use nova_3d_engine::nova3d::resource::{Mesh, MeshRegistry, Vertex};
use nova_3d_engine::nova3d::scene::{ObjectId, Scene};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::{engine_error, engine_info};
use nova_3d_engine_renderer_vulkan::{PipelineDesc, VertexInput, VulkanDevice};

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

const LOG_SOURCE: &str = "nova3d::demo";

const WINDOW_WIDTH: u32 = 1024;
const WINDOW_HEIGHT: u32 = 768;

// ============================================================================
// SHADER LOADING
// ============================================================================

/// Load a precompiled SPIR-V shader from the demo's `shaders/` directory
fn load_shader(name: &str) -> Result<Vec<u8>> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("shaders")
        .join(name);
    std::fs::read(&path).map_err(|e| {
        Error::InitializationFailed(format!(
            "Failed to read shader '{}': {} (run shaders/compile.sh first)",
            path.display(),
            e
        ))
    })
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// Unit cube centered on the origin, one color per face
fn cube_mesh(device: &Arc<Mutex<dyn GraphicsDevice>>) -> Result<Mesh> {
    // (normal, face color); Y is down in world space, so -Y is the top face
    let faces: [(Vec3, Vec3); 6] = [
        (Vec3::new(-1.0, 0.0, 0.0), Vec3::new(0.9, 0.9, 0.9)),
        (Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.8, 0.8, 0.1)),
        (Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.9, 0.6, 0.1)),
        (Vec3::new(0.0, 1.0, 0.0), Vec3::new(0.8, 0.1, 0.1)),
        (Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.1, 0.1, 0.8)),
        (Vec3::new(0.0, 0.0, -1.0), Vec3::new(0.1, 0.8, 0.1)),
    ];

    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);

    for (normal, color) in faces {
        let u = if normal.x.abs() > 0.5 {
            Vec3::Y
        } else {
            Vec3::X
        };
        let v = normal.cross(u);
        let base = vertices.len() as u32;

        let corners = [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)];
        let uvs = [(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)];
        for ((cu, cv), (s, t)) in corners.into_iter().zip(uvs) {
            let position = normal * 0.5 + u * cu + v * cv;
            vertices.push(Vertex {
                position: position.to_array(),
                color: color.to_array(),
                normal: normal.to_array(),
                uv: [s, t],
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
    }

    Mesh::new(device, &vertices, Some(&indices))
}

// ============================================================================
// EXTENT PROVIDER
// ============================================================================

/// Reports the window's current framebuffer size to the orchestrator
struct WindowExtentProvider {
    window: Arc<Window>,
}

impl SurfaceExtentProvider for WindowExtentProvider {
    fn surface_extent(&mut self) -> Extent2D {
        let size = self.window.inner_size();
        Extent2D::new(size.width, size.height)
    }

    fn wait_events(&mut self) {
        // The winit event loop runs on this thread, so real event waiting
        // is not available here. Sleep briefly and re-poll the size.
        std::thread::sleep(Duration::from_millis(16));
    }
}

// ============================================================================
// DEMO STATE
// ============================================================================

/// Everything created once the window exists
///
/// Field order matters for teardown: GPU resources (uniform buffers,
/// pipelines, meshes) drop before the orchestrator releases the device, and
/// the device drops before the window it rendered to.
struct DemoState {
    frame_resources: FrameResourceSet,
    mesh_system: MeshRenderSystem,
    light_system: PointLightSystem,
    registry: MeshRegistry,
    scene: Scene,
    camera: Camera,
    cube_id: ObjectId,
    last_frame: Instant,
    orchestrator: FrameOrchestrator,
    window: Arc<Window>,
}

impl DemoState {
    fn new(window: Arc<Window>) -> Result<Self> {
        let size = window.inner_size();

        let config = RendererConfig {
            app_name: "Nova3D Demo".to_string(),
            vsync: true,
            frames_in_flight: 2,
        };

        // Pipelines need the concrete VulkanDevice and the swapchain's
        // render pass, so both are created before the device is boxed
        // behind the GraphicsDevice trait.
        let mut vulkan_device = VulkanDevice::new(window.as_ref(), config)?;
        let swapchain =
            vulkan_device.create_swapchain(&window, Extent2D::new(size.width, size.height))?;
        let render_pass = swapchain.render_pass();

        let mesh_pipeline = vulkan_device.create_pipeline(
            &PipelineDesc {
                vertex_spirv: &load_shader("simple.vert.spv")?,
                fragment_spirv: &load_shader("simple.frag.spv")?,
                vertex_input: VertexInput::Mesh,
                push_constant_size: std::mem::size_of::<MeshPushConstants>() as u32,
                alpha_blend: false,
            },
            &render_pass,
        )?;
        let light_pipeline = vulkan_device.create_pipeline(
            &PipelineDesc {
                vertex_spirv: &load_shader("point_light.vert.spv")?,
                fragment_spirv: &load_shader("point_light.frag.spv")?,
                vertex_input: VertexInput::None,
                push_constant_size: std::mem::size_of::<PointLightPushConstants>() as u32,
                alpha_blend: true,
            },
            &render_pass,
        )?;

        let device: Arc<Mutex<dyn GraphicsDevice>> = Arc::new(Mutex::new(vulkan_device));

        let frame_resources = FrameResourceSet::new(&device, swapchain.max_frames_in_flight())?;

        let mut registry = MeshRegistry::new();
        let cube_key = registry.insert(cube_mesh(&device)?);

        let mut scene = Scene::new();

        let cube_id = scene.create_object();
        if let Some(object) = scene.object_mut(cube_id) {
            object.mesh = Some(cube_key);
        }

        let floor_id = scene.create_object();
        if let Some(object) = scene.object_mut(floor_id) {
            object.mesh = Some(cube_key);
            object.transform.translation = Vec3::new(0.0, 1.0, 0.0);
            object.transform.scale = Vec3::new(5.0, 0.1, 5.0);
        }

        let light_colors = [
            Vec3::new(1.0, 0.1, 0.1),
            Vec3::new(0.1, 0.1, 1.0),
            Vec3::new(0.1, 1.0, 0.1),
            Vec3::new(1.0, 1.0, 0.1),
            Vec3::new(0.1, 1.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        ];
        for (i, color) in light_colors.into_iter().enumerate() {
            let id = scene.create_point_light(0.6, 0.1, color);
            if let Some(object) = scene.object_mut(id) {
                let angle = i as f32 * TAU / light_colors.len() as f32;
                object.transform.translation =
                    Mat3::from_rotation_y(angle) * Vec3::new(-1.5, -1.0, -1.5);
            }
        }

        let extent_provider = Box::new(WindowExtentProvider {
            window: window.clone(),
        });
        let orchestrator = FrameOrchestrator::new(device, swapchain, extent_provider)?;

        engine_info!(
            LOG_SOURCE,
            "Demo initialized ({} objects, {} frames in flight)",
            scene.len(),
            orchestrator.max_frames_in_flight()
        );

        Ok(Self {
            frame_resources,
            mesh_system: MeshRenderSystem::new(mesh_pipeline),
            light_system: PointLightSystem::new(light_pipeline),
            registry,
            scene,
            camera: Camera::new(),
            cube_id,
            last_frame: Instant::now(),
            orchestrator,
            window,
        })
    }

    /// Animate the scene: spin the cube, orbit the lights around it
    fn update(&mut self, dt: f32) {
        if let Some(cube) = self.scene.object_mut(self.cube_id) {
            cube.transform.rotation.y += 0.6 * dt;
            cube.transform.rotation.x += 0.3 * dt;
        }

        let orbit = Mat3::from_rotation_y(0.5 * dt);
        for object in self.scene.objects_mut() {
            if object.point_light.is_some() {
                object.transform.translation = orbit * object.transform.translation;
            }
        }
    }

    /// Record and present one frame
    fn draw(&mut self) -> Result<()> {
        let now = Instant::now();
        // Clamp so a debugger pause does not fling the animation
        let dt = (now - self.last_frame).as_secs_f32().min(0.25);
        self.last_frame = now;

        self.update(dt);

        self.camera.set_perspective_projection(
            50.0_f32.to_radians(),
            self.orchestrator.aspect_ratio(),
            0.1,
            100.0,
        );
        self.camera.set_view_target(
            Vec3::new(-2.0, -2.0, -3.5),
            Vec3::ZERO,
            Camera::default_up(),
        );

        // A skipped frame after swapchain recreation is not an error
        let Some(frame) = self.orchestrator.begin_frame()? else {
            return Ok(());
        };

        let mut uniforms = GlobalUniforms::default();
        uniforms.projection = *self.camera.projection();
        uniforms.view = *self.camera.view();
        uniforms.inverse_view = *self.camera.inverse_view();
        self.light_system.update(&self.scene, &mut uniforms);
        self.frame_resources
            .write_global_uniforms(frame.frame_index(), &uniforms)?;

        self.orchestrator.begin_swapchain_render_pass(&frame)?;
        {
            let global_binding_group = self.frame_resources.binding_group(frame.frame_index())?;
            let command_list = self.orchestrator.command_list(&frame);
            let mut frame_info = FrameInfo {
                frame_index: frame.frame_index(),
                frame_time: dt,
                command_list,
                global_binding_group,
                camera: &self.camera,
                scene: &self.scene,
            };
            self.mesh_system.render(&mut frame_info, &self.registry)?;
            self.light_system.render(&mut frame_info)?;
        }
        self.orchestrator.end_swapchain_render_pass(&frame)?;
        self.orchestrator.end_frame(&frame)
    }
}

// ============================================================================
// WINIT APPLICATION
// ============================================================================

#[derive(Default)]
struct DemoApp {
    state: Option<DemoState>,
}

impl ApplicationHandler for DemoApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("Nova3D Demo")
            .with_inner_size(LogicalSize::new(WINDOW_WIDTH, WINDOW_HEIGHT));
        let window = match event_loop.create_window(attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                engine_error!(LOG_SOURCE, "Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        match DemoState::new(window) {
            Ok(state) => self.state = Some(state),
            Err(e) => {
                engine_error!(LOG_SOURCE, "Failed to initialize renderer: {}", e);
                event_loop.exit();
            }
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if window_id != state.window.id() {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                state.orchestrator.notify_resized();
            }
            WindowEvent::RedrawRequested => {
                if let Err(e) = state.draw() {
                    engine_error!(LOG_SOURCE, "Frame failed: {}", e);
                    event_loop.exit();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = self.state.as_ref() {
            state.window.request_redraw();
        }
    }
}

fn main() -> std::process::ExitCode {
    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            engine_error!(LOG_SOURCE, "Failed to create event loop: {}", e);
            return std::process::ExitCode::FAILURE;
        }
    };
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = DemoApp::default();
    if let Err(e) = event_loop.run_app(&mut app) {
        engine_error!(LOG_SOURCE, "Event loop error: {}", e);
        return std::process::ExitCode::FAILURE;
    }
    std::process::ExitCode::SUCCESS
}
