/// Framebuffer - Vulkan implementation of the Framebuffer trait
///
/// Wraps a VkFramebuffer grouping one swapchain color attachment and the
/// shared depth attachment. Created by the swapchain, reused every frame the
/// corresponding image is acquired.

use nova_3d_engine::nova3d::render::Framebuffer as RendererFramebuffer;
use ash::vk;

/// Vulkan framebuffer implementation
pub struct Framebuffer {
    /// Vulkan framebuffer handle
    pub(crate) framebuffer: vk::Framebuffer,
    /// Width in pixels
    pub(crate) width: u32,
    /// Height in pixels
    pub(crate) height: u32,
    /// Vulkan device (for cleanup)
    device: ash::Device,
}

impl Framebuffer {
    pub(crate) fn new(
        framebuffer: vk::Framebuffer,
        width: u32,
        height: u32,
        device: ash::Device,
    ) -> Self {
        Self { framebuffer, width, height, device }
    }
}

impl RendererFramebuffer for Framebuffer {}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
