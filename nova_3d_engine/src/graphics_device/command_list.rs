/// CommandList trait - for recording rendering commands

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{
    RenderPass, Framebuffer, Pipeline, Buffer, BindingGroup,
};

bitflags::bitflags! {
    /// Shader stages that can access a resource or push-constant range
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX   = 0b0001;
        const FRAGMENT = 0b0010;
        const ALL_GRAPHICS = Self::VERTEX.bits() | Self::FRAGMENT.bits();
    }
}

/// Index element width for indexed draws
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

/// Command list for recording rendering commands
///
/// Commands are recorded between `begin`/`end` and later submitted to the GPU
/// together with a presentation request via `Swapchain::submit_and_present`.
pub trait CommandList: Send + Sync {
    /// Begin recording commands
    ///
    /// Resets any previously recorded content. The frame orchestrator only
    /// calls this after the slot's in-flight fence has been waited, so the
    /// GPU is guaranteed to be done with the previous recording.
    fn begin(&mut self) -> Result<()>;

    /// End recording commands
    fn end(&mut self) -> Result<()>;

    /// Begin a render pass
    ///
    /// # Arguments
    ///
    /// * `render_pass` - The render pass to begin
    /// * `framebuffer` - The framebuffer containing color and depth attachments
    /// * `clear_values` - Clear values for attachments, in attachment order
    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RenderPass>,
        framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()>;

    /// End the current render pass
    fn end_render_pass(&mut self) -> Result<()>;

    /// Set the viewport
    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;

    /// Set the scissor rectangle
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    /// Bind a graphics pipeline
    fn bind_pipeline(&mut self, pipeline: &Arc<dyn Pipeline>) -> Result<()>;

    /// Bind a binding group to a pipeline set slot
    ///
    /// # Arguments
    ///
    /// * `pipeline` - Pipeline to bind the group to (needed to extract the layout)
    /// * `set_index` - Set index (0 = per-frame globals)
    /// * `binding_group` - The binding group to bind
    fn bind_binding_group(
        &mut self,
        pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        binding_group: &Arc<dyn BindingGroup>,
    ) -> Result<()>;

    /// Push constants to the pipeline
    ///
    /// # Arguments
    ///
    /// * `stages` - Shader stages that will access the push constants
    /// * `offset` - Offset in bytes into the push constant range
    /// * `data` - Data to push (small, per-draw; typically at most 128 bytes)
    fn push_constants(&mut self, stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()>;

    /// Bind a vertex buffer
    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()>;

    /// Bind an index buffer
    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn Buffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()>;

    /// Draw vertices
    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()>;

    /// Draw indexed vertices
    ///
    /// # Arguments
    ///
    /// * `index_count` - Number of indices to draw
    /// * `first_index` - Index of first index
    /// * `vertex_offset` - Value added to the vertex index before indexing into the vertex buffer
    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()>;
}

/// Viewport dimensions and depth range
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

/// 2D rectangle
#[derive(Debug, Clone, Copy)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

/// Clear value for an attachment
#[derive(Debug, Clone, Copy)]
pub enum ClearValue {
    /// Color clear value (RGBA)
    Color([f32; 4]),
    /// Depth/stencil clear value
    DepthStencil { depth: f32, stencil: u32 },
}
