/// GraphicsDevice trait - factory for GPU resources
///
/// The device context owns the logical GPU handle, its queues, and the
/// command/descriptor pools. Backends (Vulkan, ...) implement this trait;
/// the rest of the engine only sees trait objects.

use std::sync::Arc;
use winit::window::Window;
use crate::error::Result;
use crate::graphics_device::{
    Swapchain, CommandList, Buffer, BufferDesc, BindingGroup, Extent2D,
};

/// Configuration passed at device creation
#[derive(Debug, Clone)]
pub struct RendererConfig {
    /// Application name reported to the driver
    pub app_name: String,
    /// Prefer a vsync (FIFO) present mode
    pub vsync: bool,
    /// Number of frame slots the application wants in flight
    pub frames_in_flight: u32,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Nova3D Application".to_string(),
            vsync: true,
            frames_in_flight: 2,
        }
    }
}

/// GPU device context and resource factory
pub trait GraphicsDevice: Send + Sync {
    /// Create a swapchain for the given window surface
    ///
    /// Fails with `Error::SurfaceLost` when `extent` is degenerate; callers
    /// poll the window until a non-zero extent is observed (minimized
    /// window) before calling.
    fn create_swapchain(
        &mut self,
        window: &Window,
        extent: Extent2D,
    ) -> Result<Box<dyn Swapchain>>;

    /// Create a command list with its own pool
    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>>;

    /// Create a buffer, optionally filled with initial data
    ///
    /// Vertex/index buffers are device-local and require `initial_data`,
    /// which is transferred through a staging buffer and a one-shot
    /// submission. Uniform buffers are host-visible, persistently mapped,
    /// and created empty.
    fn create_buffer(
        &mut self,
        desc: BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>>;

    /// Create a binding group for the fixed per-frame layout
    ///
    /// Binding 0 = `uniform_buffer`, visible to all graphics stages.
    /// Descriptor exhaustion surfaces as `Error::OutOfMemory`.
    fn create_frame_binding_group(
        &mut self,
        uniform_buffer: &Arc<dyn Buffer>,
    ) -> Result<Arc<dyn BindingGroup>>;

    /// Block until the GPU is idle
    ///
    /// Coarse synchronization used around swapchain recreation; per-frame
    /// work relies on the slot fences instead.
    fn wait_idle(&self) -> Result<()>;
}
