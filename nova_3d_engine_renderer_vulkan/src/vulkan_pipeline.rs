/// Pipeline - Vulkan implementation of the Pipeline trait

use nova_3d_engine::nova3d::render::Pipeline as RendererPipeline;
use ash::vk;

/// Vertex input consumed by a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInput {
    /// The engine's standard mesh vertex (position, color, normal, uv)
    Mesh,
    /// No vertex buffers; the vertex shader generates geometry itself
    /// (light billboards)
    None,
}

/// Description of a graphics pipeline to create
pub struct PipelineDesc<'a> {
    /// SPIR-V code of the vertex shader
    pub vertex_spirv: &'a [u8],
    /// SPIR-V code of the fragment shader
    pub fragment_spirv: &'a [u8],
    /// Vertex input layout
    pub vertex_input: VertexInput,
    /// Size in bytes of the push-constant block (0 = none); visible to all
    /// graphics stages
    pub push_constant_size: u32,
    /// Enable standard alpha blending on the color attachment
    pub alpha_blend: bool,
}

/// Vulkan pipeline implementation
pub struct Pipeline {
    /// Vulkan graphics pipeline
    pub(crate) pipeline: vk::Pipeline,
    /// Pipeline layout (accessed internally for descriptor sets and push
    /// constants)
    pub(crate) pipeline_layout: vk::PipelineLayout,
    /// Vulkan device (for cleanup)
    pub(crate) device: ash::Device,
}

impl RendererPipeline for Pipeline {}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            self.device.destroy_pipeline(self.pipeline, None);
            self.device.destroy_pipeline_layout(self.pipeline_layout, None);
        }
    }
}
