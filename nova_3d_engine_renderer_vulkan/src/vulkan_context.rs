/// GpuContext - shared GPU resources for all Vulkan objects
///
/// One context per device, shared (via `Arc`) by every GPU resource so
/// buffers and command lists do not each carry device/allocator/queue
/// references of their own.

use ash::vk;
use gpu_allocator::vulkan::Allocator;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};

/// Shared GPU context for all Vulkan resources.
///
/// Note: device and instance destruction is handled by `VulkanDevice::drop()`
/// to avoid issues with drop ordering; this struct's Drop intentionally does
/// nothing.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator (shared, requires mutex for thread safety)
    /// Wrapped in ManuallyDrop so it is dropped BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Graphics queue for command submission
    pub graphics_queue: vk::Queue,

    /// Graphics queue family index
    pub graphics_queue_family: u32,

    /// Reusable command pool for one-shot staging uploads
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    /// Alignment unit for flushing non-coherent mapped memory
    pub non_coherent_atom_size: u64,

    /// Vulkan instance (kept for reference, destroyed by VulkanDevice)
    #[allow(dead_code)]
    instance: ash::Instance,

    /// Debug utils loader (validation builds only)
    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_utils_loader: Option<ash::ext::debug_utils::Instance>,

    /// Debug messenger handle (validation builds only)
    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
}

impl GpuContext {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        device: ash::Device,
        allocator: Arc<Mutex<Allocator>>,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        upload_command_pool: vk::CommandPool,
        non_coherent_atom_size: u64,
        instance: ash::Instance,
        #[cfg(feature = "vulkan-validation")]
        debug_utils_loader: Option<ash::ext::debug_utils::Instance>,
        #[cfg(feature = "vulkan-validation")]
        debug_messenger: Option<vk::DebugUtilsMessengerEXT>,
    ) -> Self {
        Self {
            device,
            allocator: ManuallyDrop::new(allocator),
            graphics_queue,
            graphics_queue_family,
            upload_command_pool: Mutex::new(upload_command_pool),
            non_coherent_atom_size,
            instance,
            #[cfg(feature = "vulkan-validation")]
            debug_utils_loader,
            #[cfg(feature = "vulkan-validation")]
            debug_messenger,
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // Device and instance destruction is handled by VulkanDevice::drop()
        // to keep the teardown order explicit. This Drop intentionally does
        // nothing.
    }
}
