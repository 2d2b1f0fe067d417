/*!
# Nova 3D Engine - Vulkan Renderer Backend

Vulkan implementation of the Nova 3D graphics device traits, built on the
Ash bindings and gpu-allocator for memory management.

Create a [`VulkanDevice`] for a window, then drive rendering through the
engine's `GraphicsDevice`/`Swapchain`/`CommandList` traits. Pipelines are
backend-specific and created through [`VulkanDevice::create_pipeline`].

Enable the `vulkan-validation` feature to load the Khronos validation layer
and route its messages to stderr.
*/

// Vulkan implementation modules
mod vulkan_context;
mod vulkan_device;
mod vulkan_swapchain;
mod vulkan_command_list;
mod vulkan_buffer;
mod vulkan_binding_group;
mod vulkan_pipeline;
mod vulkan_render_pass;
mod vulkan_frame_buffer;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan_device::VulkanDevice;
pub use vulkan_pipeline::{PipelineDesc, VertexInput};
