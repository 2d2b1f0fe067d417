/// CommandList - Vulkan implementation of the CommandList trait

use nova_3d_engine::nova3d::{Result, Error};
use nova_3d_engine::nova3d::render::{
    CommandList as RendererCommandList,
    RenderPass as RendererRenderPass,
    Framebuffer as RendererFramebuffer,
    Pipeline as RendererPipeline,
    Buffer as RendererBuffer,
    BindingGroup as RendererBindingGroup,
    Viewport, Rect2D, ClearValue, ShaderStageFlags, IndexType,
};
use nova_3d_engine::engine_error;
use ash::vk;
use std::sync::Arc;

use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_buffer::Buffer;
use crate::vulkan_binding_group::BindingGroup;

/// Vulkan command list implementation
///
/// Each list owns its own command pool so resetting one list never disturbs
/// another. The pool is created with RESET_COMMAND_BUFFER; `begin` resets the
/// buffer for re-recording. The frame orchestrator guarantees the slot fence
/// has been waited before `begin`, so the GPU is done with the old recording.
pub struct CommandList {
    /// Vulkan device
    device: ash::Device,
    /// Command pool for allocating command buffers
    command_pool: vk::CommandPool,
    /// Command buffer for recording
    command_buffer: vk::CommandBuffer,
    /// Whether the command list is currently recording
    is_recording: bool,
    /// Whether we're inside a render pass
    in_render_pass: bool,
    /// Currently bound pipeline layout (for push constants)
    bound_pipeline_layout: Option<vk::PipelineLayout>,
}

impl CommandList {
    /// Create a new command list with its own pool
    pub fn new(device: ash::Device, graphics_queue_family: u32) -> Result<Self> {
        unsafe {
            let command_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_queue_family)
                .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

            let command_pool = device.create_command_pool(&command_pool_create_info, None)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to create command pool: {:?}", e);
                    Error::BackendError(format!("Failed to create command pool: {:?}", e))
                })?;

            let command_buffer_allocate_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let command_buffers = device.allocate_command_buffers(&command_buffer_allocate_info)
                .map_err(|e| {
                    engine_error!("nova3d::vulkan", "Failed to allocate command buffer: {:?}", e);
                    Error::BackendError(format!("Failed to allocate command buffers: {:?}", e))
                })?;

            Ok(Self {
                device,
                command_pool,
                command_buffer: command_buffers[0],
                is_recording: false,
                in_render_pass: false,
                bound_pipeline_layout: None,
            })
        }
    }

    /// Get the underlying Vulkan command buffer
    pub fn command_buffer(&self) -> vk::CommandBuffer {
        self.command_buffer
    }
}

fn stage_flags_to_vk(stages: ShaderStageFlags) -> vk::ShaderStageFlags {
    let mut flags = vk::ShaderStageFlags::empty();
    if stages.contains(ShaderStageFlags::VERTEX) {
        flags |= vk::ShaderStageFlags::VERTEX;
    }
    if stages.contains(ShaderStageFlags::FRAGMENT) {
        flags |= vk::ShaderStageFlags::FRAGMENT;
    }
    flags
}

fn index_type_to_vk(index_type: IndexType) -> vk::IndexType {
    match index_type {
        IndexType::U16 => vk::IndexType::UINT16,
        IndexType::U32 => vk::IndexType::UINT32,
    }
}

fn clear_value_to_vk(clear_value: &ClearValue) -> vk::ClearValue {
    match clear_value {
        ClearValue::Color(color) => vk::ClearValue {
            color: vk::ClearColorValue { float32: *color },
        },
        ClearValue::DepthStencil { depth, stencil } => vk::ClearValue {
            depth_stencil: vk::ClearDepthStencilValue {
                depth: *depth,
                stencil: *stencil,
            },
        },
    }
}

impl RendererCommandList for CommandList {
    fn begin(&mut self) -> Result<()> {
        if self.is_recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }

        unsafe {
            self.device
                .reset_command_buffer(
                    self.command_buffer,
                    vk::CommandBufferResetFlags::empty(),
                )
                .map_err(|e| Error::BackendError(format!("Failed to reset command buffer: {:?}", e)))?;

            let begin_info = vk::CommandBufferBeginInfo::default()
                .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

            self.device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| Error::BackendError(format!("Failed to begin command buffer: {:?}", e)))?;

            self.is_recording = true;
            self.in_render_pass = false;
            self.bound_pipeline_layout = None;

            Ok(())
        }
    }

    fn end(&mut self) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        if self.in_render_pass {
            return Err(Error::BackendError("Render pass not ended before ending command list".to_string()));
        }

        unsafe {
            self.device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| Error::BackendError(format!("Failed to end command buffer: {:?}", e)))?;

            self.is_recording = false;

            Ok(())
        }
    }

    fn begin_render_pass(
        &mut self,
        render_pass: &Arc<dyn RendererRenderPass>,
        framebuffer: &Arc<dyn RendererFramebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        if self.in_render_pass {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }

        unsafe {
            // Downcast to Vulkan types
            let vk_render_pass = render_pass.as_ref() as *const dyn RendererRenderPass as *const RenderPass;
            let vk_render_pass = &*vk_render_pass;

            let vk_framebuffer = framebuffer.as_ref() as *const dyn RendererFramebuffer as *const Framebuffer;
            let vk_framebuffer = &*vk_framebuffer;

            let vk_clear_values: Vec<vk::ClearValue> =
                clear_values.iter().map(clear_value_to_vk).collect();

            let render_pass_info = vk::RenderPassBeginInfo::default()
                .render_pass(vk_render_pass.render_pass)
                .framebuffer(vk_framebuffer.framebuffer)
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent: vk::Extent2D {
                        width: vk_framebuffer.width,
                        height: vk_framebuffer.height,
                    },
                })
                .clear_values(&vk_clear_values);

            self.device.cmd_begin_render_pass(
                self.command_buffer,
                &render_pass_info,
                vk::SubpassContents::INLINE,
            );

            self.in_render_pass = true;

            Ok(())
        }
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.device.cmd_end_render_pass(self.command_buffer);
            self.in_render_pass = false;

            Ok(())
        }
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            let vk_viewport = vk::Viewport::default()
                .x(viewport.x)
                .y(viewport.y)
                .width(viewport.width)
                .height(viewport.height)
                .min_depth(viewport.min_depth)
                .max_depth(viewport.max_depth);

            self.device.cmd_set_viewport(self.command_buffer, 0, &[vk_viewport]);

            Ok(())
        }
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            let vk_scissor = vk::Rect2D::default()
                .offset(vk::Offset2D { x: scissor.x, y: scissor.y })
                .extent(vk::Extent2D { width: scissor.width, height: scissor.height });

            self.device.cmd_set_scissor(self.command_buffer, 0, &[vk_scissor]);

            Ok(())
        }
    }

    fn bind_pipeline(&mut self, pipeline: &Arc<dyn RendererPipeline>) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            // Downcast to Vulkan type
            let vk_pipeline = pipeline.as_ref() as *const dyn RendererPipeline as *const Pipeline;
            let vk_pipeline = &*vk_pipeline;

            self.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline,
            );

            // Save pipeline layout for push constants
            self.bound_pipeline_layout = Some(vk_pipeline.pipeline_layout);

            Ok(())
        }
    }

    fn bind_binding_group(
        &mut self,
        pipeline: &Arc<dyn RendererPipeline>,
        set_index: u32,
        binding_group: &Arc<dyn RendererBindingGroup>,
    ) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            // Downcast pipeline to extract the layout
            let vk_pipeline = pipeline.as_ref() as *const dyn RendererPipeline as *const Pipeline;
            let vk_pipeline = &*vk_pipeline;

            let vk_group = binding_group.as_ref() as *const dyn RendererBindingGroup as *const BindingGroup;
            let vk_group = &*vk_group;

            self.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                vk_pipeline.pipeline_layout,
                set_index,
                &[vk_group.descriptor_set],
                &[], // dynamic_offsets
            );

            Ok(())
        }
    }

    fn push_constants(&mut self, stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        let layout = self.bound_pipeline_layout.ok_or_else(|| {
            Error::BackendError("No pipeline bound for push constants".to_string())
        })?;

        unsafe {
            self.device.cmd_push_constants(
                self.command_buffer,
                layout,
                stage_flags_to_vk(stages),
                offset,
                data,
            );

            Ok(())
        }
    }

    fn bind_vertex_buffer(&mut self, buffer: &Arc<dyn RendererBuffer>, offset: u64) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            // Downcast to Vulkan type
            let vk_buffer = buffer.as_ref() as *const dyn RendererBuffer as *const Buffer;
            let vk_buffer = &*vk_buffer;

            self.device.cmd_bind_vertex_buffers(
                self.command_buffer,
                0,
                &[vk_buffer.buffer],
                &[offset],
            );

            Ok(())
        }
    }

    fn bind_index_buffer(
        &mut self,
        buffer: &Arc<dyn RendererBuffer>,
        offset: u64,
        index_type: IndexType,
    ) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        unsafe {
            // Downcast to Vulkan type
            let vk_buffer = buffer.as_ref() as *const dyn RendererBuffer as *const Buffer;
            let vk_buffer = &*vk_buffer;

            self.device.cmd_bind_index_buffer(
                self.command_buffer,
                vk_buffer.buffer,
                offset,
                index_type_to_vk(index_type),
            );

            Ok(())
        }
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.device.cmd_draw(
                self.command_buffer,
                vertex_count,
                1, // instance_count
                first_vertex,
                0, // first_instance
            );

            Ok(())
        }
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        if !self.is_recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }

        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }

        unsafe {
            self.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                1, // instance_count
                first_index,
                vertex_offset,
                0, // first_instance
            );

            Ok(())
        }
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        unsafe {
            // Command buffer is freed automatically with its pool
            self.device.destroy_command_pool(self.command_pool, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_command_list_tests.rs"]
mod tests;
