/// BindingGroup - Vulkan implementation of the BindingGroup trait

use nova_3d_engine::nova3d::render::BindingGroup as RendererBindingGroup;
use ash::vk;

/// Vulkan binding group implementation
///
/// Wraps a VkDescriptorSet handle. The descriptor set itself is managed by
/// the descriptor pool and freed when the pool is destroyed. Immutable after
/// creation; create a new BindingGroup to point at other resources.
pub struct BindingGroup {
    /// Vulkan descriptor set handle
    pub(crate) descriptor_set: vk::DescriptorSet,
}

impl RendererBindingGroup for BindingGroup {}

impl Drop for BindingGroup {
    fn drop(&mut self) {
        // Descriptor sets are freed with their pool; nothing to do here.
    }
}
