/// VulkanDevice - Vulkan implementation of the GraphicsDevice trait

use nova_3d_engine::nova3d::{Result, Error};
use nova_3d_engine::nova3d::render::{
    GraphicsDevice as RendererGraphicsDevice,
    Swapchain as RendererSwapchain,
    CommandList as RendererCommandList,
    RenderPass as RendererRenderPass,
    Pipeline as RendererPipeline,
    Buffer as RendererBuffer,
    BindingGroup as RendererBindingGroup,
    BufferDesc, BufferUsage, Extent2D, RendererConfig,
};
use ash::vk;
use std::ffi::CString;
use std::mem::ManuallyDrop;
use std::sync::{Arc, Mutex};
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::window::Window;
use nova_3d_engine::{engine_info, engine_error, engine_bail, engine_err};

use crate::vulkan_buffer::Buffer;
use crate::vulkan_binding_group::BindingGroup;
use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_pipeline::{Pipeline, PipelineDesc, VertexInput};
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_swapchain::Swapchain;

const LOG_SOURCE: &str = "nova3d::vulkan";

/// Stride and attribute offsets of the engine's mesh vertex
/// (position, color, normal: 3 x f32 each; uv: 2 x f32)
const MESH_VERTEX_STRIDE: u32 = 44;
const MESH_VERTEX_OFFSETS: [u32; 4] = [0, 12, 24, 36];

/// Vulkan device implementation
///
/// Central object for creating swapchains, command lists, buffers and
/// binding groups. Owns the instance, logical device, allocator and the
/// descriptor pools; per-frame synchronization lives in the swapchain.
pub struct VulkanDevice {
    /// Vulkan entry (needed for surface creation)
    entry: ash::Entry,
    /// Vulkan instance
    instance: ash::Instance,
    /// Physical device
    physical_device: vk::PhysicalDevice,
    /// Logical device (also stored in GpuContext)
    device: ash::Device,

    /// Graphics queue family index
    graphics_queue_family: u32,
    /// Present queue (may be same as graphics)
    present_queue: vk::Queue,
    #[allow(dead_code)]
    present_queue_family: u32,

    /// GPU memory allocator reference (also stored in GpuContext)
    allocator: ManuallyDrop<Arc<Mutex<Allocator>>>,

    /// Descriptor pools for binding group allocation (grows when exhausted)
    descriptor_pools: Mutex<Vec<vk::DescriptorPool>>,

    /// Fixed per-frame descriptor set layout: binding 0 = uniform buffer,
    /// visible to all graphics stages
    frame_set_layout: vk::DescriptorSetLayout,

    /// Configuration the device was created with
    config: RendererConfig,

    /// Shared GPU context handed to every resource
    gpu_context: Arc<GpuContext>,
}

impl VulkanDevice {
    /// Create a descriptor pool with fixed capacity.
    /// Called during init and when the current pool is exhausted.
    fn create_descriptor_pool(device: &ash::Device) -> Result<vk::DescriptorPool> {
        let pool_sizes = [vk::DescriptorPoolSize {
            ty: vk::DescriptorType::UNIFORM_BUFFER,
            descriptor_count: 1024,
        }];
        let info = vk::DescriptorPoolCreateInfo::default()
            .pool_sizes(&pool_sizes)
            .max_sets(1024);

        unsafe {
            device.create_descriptor_pool(&info, None).map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create descriptor pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create descriptor pool: {:?}", e))
            })
        }
    }

    pub fn new<W: HasDisplayHandle + HasWindowHandle>(
        window: &W,
        config: RendererConfig,
    ) -> Result<Self> {
        unsafe {
            let entry = ash::Entry::load().map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to load Vulkan library: {:?}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
            })?;

            let app_name = CString::new(config.app_name.as_str())
                .unwrap_or_else(|_| CString::new("Nova3D Application").unwrap());

            let app_info = vk::ApplicationInfo::default()
                .application_name(&app_name)
                .application_version(vk::make_api_version(0, 1, 0, 0))
                .engine_name(c"Nova3D")
                .engine_version(vk::make_api_version(0, 0, 1, 0))
                .api_version(vk::API_VERSION_1_3);

            let display_handle = window.display_handle().map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to get display handle: {}", e);
                Error::InitializationFailed(format!("Failed to get display handle: {}", e))
            })?;
            #[allow(unused_mut)]
            let mut extension_names =
                ash_window::enumerate_required_extensions(display_handle.as_raw())
                    .map_err(|e| {
                        engine_error!(LOG_SOURCE, "Failed to get required extensions: {}", e);
                        Error::InitializationFailed(format!("Failed to get required extensions: {}", e))
                    })?
                    .to_vec();

            #[cfg(feature = "vulkan-validation")]
            extension_names.push(ash::ext::debug_utils::NAME.as_ptr());

            #[cfg(feature = "vulkan-validation")]
            let layer_names = vec![c"VK_LAYER_KHRONOS_validation".as_ptr()];
            #[cfg(not(feature = "vulkan-validation"))]
            let layer_names: Vec<*const std::os::raw::c_char> = vec![];

            let create_info = vk::InstanceCreateInfo::default()
                .application_info(&app_info)
                .enabled_layer_names(&layer_names)
                .enabled_extension_names(&extension_names);

            let instance = entry.create_instance(&create_info, None).map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create Vulkan instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })?;

            // Setup debug messenger (validation builds only)
            #[cfg(feature = "vulkan-validation")]
            let (debug_utils_loader, debug_messenger) = {
                let debug_utils = ash::ext::debug_utils::Instance::new(&entry, &instance);

                let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
                    .message_severity(
                        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR
                            | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING,
                    )
                    .message_type(
                        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                            | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                            | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
                    )
                    .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

                let messenger = debug_utils
                    .create_debug_utils_messenger(&debug_info, None)
                    .map_err(|e| {
                        engine_error!(LOG_SOURCE, "Failed to create debug messenger: {:?}", e);
                        Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
                    })?;

                (Some(debug_utils), Some(messenger))
            };

            // Temporary surface for queue family selection
            let window_handle = window.window_handle().map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to get window handle: {}", e);
                Error::InitializationFailed(format!("Failed to get window handle: {}", e))
            })?;
            let surface = ash_window::create_surface(
                &entry,
                &instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

            let physical_devices = instance.enumerate_physical_devices().map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to enumerate physical devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
            })?;

            let physical_device = physical_devices.into_iter().next().ok_or_else(|| {
                engine_error!(LOG_SOURCE, "No Vulkan-capable GPU found");
                Error::InitializationFailed("No Vulkan-capable GPU found".to_string())
            })?;

            let queue_families =
                instance.get_physical_device_queue_family_properties(physical_device);

            let graphics_family_index = queue_families
                .iter()
                .enumerate()
                .find(|(_, qf)| qf.queue_flags.contains(vk::QueueFlags::GRAPHICS))
                .map(|(i, _)| i as u32)
                .ok_or_else(|| {
                    engine_error!(LOG_SOURCE, "No graphics queue family found");
                    Error::InitializationFailed("No graphics queue family found".to_string())
                })?;

            let present_family_index = (0..queue_families.len() as u32)
                .find(|&i| {
                    surface_loader
                        .get_physical_device_surface_support(physical_device, i, surface)
                        .unwrap_or(false)
                })
                .ok_or_else(|| {
                    engine_error!(LOG_SOURCE, "No present queue family found");
                    Error::InitializationFailed("No present queue family found".to_string())
                })?;

            // Destroy temporary surface
            surface_loader.destroy_surface(surface, None);

            let queue_priorities = [1.0];
            let queue_create_infos = if graphics_family_index == present_family_index {
                vec![vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(graphics_family_index)
                    .queue_priorities(&queue_priorities)]
            } else {
                vec![
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(graphics_family_index)
                        .queue_priorities(&queue_priorities),
                    vk::DeviceQueueCreateInfo::default()
                        .queue_family_index(present_family_index)
                        .queue_priorities(&queue_priorities),
                ]
            };

            let device_extension_names = vec![ash::khr::swapchain::NAME.as_ptr()];

            let device_features = vk::PhysicalDeviceFeatures::default();

            let device_create_info = vk::DeviceCreateInfo::default()
                .queue_create_infos(&queue_create_infos)
                .enabled_extension_names(&device_extension_names)
                .enabled_features(&device_features);

            let device = instance
                .create_device(physical_device, &device_create_info, None)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to create logical device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?;

            let graphics_queue = device.get_device_queue(graphics_family_index, 0);
            let present_queue = device.get_device_queue(present_family_index, 0);

            let properties = instance.get_physical_device_properties(physical_device);
            let non_coherent_atom_size = properties.limits.non_coherent_atom_size.max(1);

            let allocator = Allocator::new(&AllocatorCreateDesc {
                instance: instance.clone(),
                device: device.clone(),
                physical_device,
                debug_settings: Default::default(),
                buffer_device_address: false,
                allocation_sizes: Default::default(),
            })
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create GPU allocator: {:?}", e);
                Error::InitializationFailed(format!("Failed to create allocator: {:?}", e))
            })?;

            let descriptor_pool = Self::create_descriptor_pool(&device)?;

            // Fixed per-frame descriptor set layout: binding 0 = uniform
            // buffer, visible to all graphics stages
            let layout_bindings = [vk::DescriptorSetLayoutBinding::default()
                .binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT)];

            let layout_create = vk::DescriptorSetLayoutCreateInfo::default()
                .bindings(&layout_bindings);

            let frame_set_layout = device
                .create_descriptor_set_layout(&layout_create, None)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to create frame descriptor set layout: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create descriptor set layout: {:?}", e))
                })?;

            // Upload command pool (TRANSIENT + RESET for reusable one-shot uploads)
            let upload_pool_create_info = vk::CommandPoolCreateInfo::default()
                .queue_family_index(graphics_family_index)
                .flags(
                    vk::CommandPoolCreateFlags::TRANSIENT
                        | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
                );

            let upload_command_pool = device
                .create_command_pool(&upload_pool_create_info, None)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to create upload command pool: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create upload command pool: {:?}", e))
                })?;

            let allocator_arc = Arc::new(Mutex::new(allocator));
            let gpu_context = Arc::new(GpuContext::new(
                device.clone(),
                Arc::clone(&allocator_arc),
                graphics_queue,
                graphics_family_index,
                upload_command_pool,
                non_coherent_atom_size,
                instance.clone(),
                #[cfg(feature = "vulkan-validation")]
                debug_utils_loader,
                #[cfg(feature = "vulkan-validation")]
                debug_messenger,
            ));

            engine_info!(
                LOG_SOURCE,
                "Vulkan device created ({}, {} frames in flight)",
                config.app_name,
                config.frames_in_flight
            );

            Ok(Self {
                entry,
                instance,
                physical_device,
                device,
                graphics_queue_family: graphics_family_index,
                present_queue,
                present_queue_family: present_family_index,
                allocator: ManuallyDrop::new(allocator_arc),
                descriptor_pools: Mutex::new(vec![descriptor_pool]),
                frame_set_layout,
                config,
                gpu_context,
            })
        }
    }

    /// Create a graphics pipeline compatible with the given render pass
    ///
    /// Viewport and scissor are dynamic; depth testing uses LESS with the
    /// depth range written by the camera projections.
    pub fn create_pipeline(
        &mut self,
        desc: &PipelineDesc,
        render_pass: &Arc<dyn RendererRenderPass>,
    ) -> Result<Arc<dyn RendererPipeline>> {
        unsafe {
            let vertex_module = self.create_shader_module(desc.vertex_spirv)?;
            let fragment_module = match self.create_shader_module(desc.fragment_spirv) {
                Ok(m) => m,
                Err(e) => {
                    self.device.destroy_shader_module(vertex_module, None);
                    return Err(e);
                }
            };

            let result = self.build_pipeline(desc, render_pass, vertex_module, fragment_module);

            // Shader modules are only needed during pipeline creation
            self.device.destroy_shader_module(vertex_module, None);
            self.device.destroy_shader_module(fragment_module, None);

            result
        }
    }

    unsafe fn create_shader_module(&self, code: &[u8]) -> Result<vk::ShaderModule> {
        if code.len() % 4 != 0 {
            engine_bail!(LOG_SOURCE, "Shader code not 4-byte aligned (size: {} bytes)", code.len());
        }

        let code_u32 = std::slice::from_raw_parts(code.as_ptr() as *const u32, code.len() / 4);

        let create_info = vk::ShaderModuleCreateInfo::default().code(code_u32);

        self.device
            .create_shader_module(&create_info, None)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create shader module: {:?}", e))
    }

    unsafe fn build_pipeline(
        &self,
        desc: &PipelineDesc,
        render_pass: &Arc<dyn RendererRenderPass>,
        vertex_module: vk::ShaderModule,
        fragment_module: vk::ShaderModule,
    ) -> Result<Arc<dyn RendererPipeline>> {
        // Downcast to the Vulkan render pass
        let vk_render_pass = render_pass.as_ref() as *const dyn RendererRenderPass as *const RenderPass;
        let vk_render_pass = &*vk_render_pass;

        let entry_point = c"main";

        let shader_stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::VERTEX)
                .module(vertex_module)
                .name(entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(vk::ShaderStageFlags::FRAGMENT)
                .module(fragment_module)
                .name(entry_point),
        ];

        let vertex_bindings: Vec<vk::VertexInputBindingDescription>;
        let vertex_attributes: Vec<vk::VertexInputAttributeDescription>;
        match desc.vertex_input {
            VertexInput::Mesh => {
                vertex_bindings = vec![vk::VertexInputBindingDescription {
                    binding: 0,
                    stride: MESH_VERTEX_STRIDE,
                    input_rate: vk::VertexInputRate::VERTEX,
                }];
                vertex_attributes = vec![
                    vk::VertexInputAttributeDescription {
                        location: 0,
                        binding: 0,
                        format: vk::Format::R32G32B32_SFLOAT,
                        offset: MESH_VERTEX_OFFSETS[0],
                    },
                    vk::VertexInputAttributeDescription {
                        location: 1,
                        binding: 0,
                        format: vk::Format::R32G32B32_SFLOAT,
                        offset: MESH_VERTEX_OFFSETS[1],
                    },
                    vk::VertexInputAttributeDescription {
                        location: 2,
                        binding: 0,
                        format: vk::Format::R32G32B32_SFLOAT,
                        offset: MESH_VERTEX_OFFSETS[2],
                    },
                    vk::VertexInputAttributeDescription {
                        location: 3,
                        binding: 0,
                        format: vk::Format::R32G32_SFLOAT,
                        offset: MESH_VERTEX_OFFSETS[3],
                    },
                ];
            }
            VertexInput::None => {
                vertex_bindings = Vec::new();
                vertex_attributes = Vec::new();
            }
        }

        let vertex_input_state = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly_state = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
            .primitive_restart_enable(false);

        // Viewport state (dynamic)
        let viewports = [vk::Viewport::default()];
        let scissors = [vk::Rect2D::default()];
        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewports(&viewports)
            .scissors(&scissors);

        let rasterization_state = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(vk::PolygonMode::FILL)
            .line_width(1.0)
            .cull_mode(vk::CullModeFlags::NONE)
            .front_face(vk::FrontFace::COUNTER_CLOCKWISE)
            .depth_bias_enable(false);

        let depth_stencil_state = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(true)
            .depth_write_enable(true)
            .depth_compare_op(vk::CompareOp::LESS)
            .depth_bounds_test_enable(false)
            .stencil_test_enable(false);

        let multisample_state = vk::PipelineMultisampleStateCreateInfo::default()
            .sample_shading_enable(false)
            .rasterization_samples(vk::SampleCountFlags::TYPE_1);

        let color_blend_attachment = {
            let mut attachment = vk::PipelineColorBlendAttachmentState::default()
                .color_write_mask(vk::ColorComponentFlags::RGBA)
                .blend_enable(desc.alpha_blend);
            if desc.alpha_blend {
                attachment = attachment
                    .src_color_blend_factor(vk::BlendFactor::SRC_ALPHA)
                    .dst_color_blend_factor(vk::BlendFactor::ONE_MINUS_SRC_ALPHA)
                    .color_blend_op(vk::BlendOp::ADD)
                    .src_alpha_blend_factor(vk::BlendFactor::ONE)
                    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
                    .alpha_blend_op(vk::BlendOp::ADD);
            }
            attachment
        };

        let color_blend_state = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(std::slice::from_ref(&color_blend_attachment));

        let dynamic_states = [vk::DynamicState::VIEWPORT, vk::DynamicState::SCISSOR];
        let dynamic_state =
            vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let set_layouts = [self.frame_set_layout];
        let push_constant_ranges = [vk::PushConstantRange {
            stage_flags: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            offset: 0,
            size: desc.push_constant_size,
        }];

        let mut layout_create_info =
            vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        if desc.push_constant_size > 0 {
            layout_create_info = layout_create_info.push_constant_ranges(&push_constant_ranges);
        }

        let layout = self
            .device
            .create_pipeline_layout(&layout_create_info, None)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create pipeline layout: {:?}", e))?;

        let pipeline_create_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&shader_stages)
            .vertex_input_state(&vertex_input_state)
            .input_assembly_state(&input_assembly_state)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization_state)
            .depth_stencil_state(&depth_stencil_state)
            .multisample_state(&multisample_state)
            .color_blend_state(&color_blend_state)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(vk_render_pass.render_pass)
            .subpass(0);

        let pipelines = self
            .device
            .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_create_info], None)
            .map_err(|e| {
                self.device.destroy_pipeline_layout(layout, None);
                engine_err!(LOG_SOURCE, "Failed to create graphics pipeline: {:?}", e.1)
            })?;

        Ok(Arc::new(Pipeline {
            pipeline: pipelines[0],
            pipeline_layout: layout,
            device: self.device.clone(),
        }))
    }

    /// Copy `data` into a device-local buffer through a staging buffer and a
    /// one-shot submission on the graphics queue.
    unsafe fn upload_to_device_local(&self, dst: vk::Buffer, data: &[u8]) -> Result<()> {
        let staging_create_info = vk::BufferCreateInfo::default()
            .size(data.len() as u64)
            .usage(vk::BufferUsageFlags::TRANSFER_SRC)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let staging_buffer = self
            .device
            .create_buffer(&staging_create_info, None)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create staging buffer: {:?}", e))?;

        let requirements = self.device.get_buffer_memory_requirements(staging_buffer);

        let staging_allocation = {
            let mut allocator = self
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("allocator mutex poisoned".to_string()))?;
            allocator
                .allocate(&AllocationCreateDesc {
                    name: "staging_buffer",
                    requirements,
                    location: MemoryLocation::CpuToGpu,
                    linear: true,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|_e| {
                    engine_error!(LOG_SOURCE, "Out of GPU memory for staging buffer ({} bytes)", data.len());
                    Error::OutOfMemory
                })?
        };

        self.device
            .bind_buffer_memory(staging_buffer, staging_allocation.memory(), staging_allocation.offset())
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to bind staging buffer memory: {:?}", e))?;

        if let Some(mapped) = staging_allocation.mapped_ptr() {
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped.as_ptr() as *mut u8, data.len());
        } else {
            return Err(Error::BackendError("staging buffer is not mapped".to_string()));
        }

        // One-shot copy on the upload command pool
        let upload_pool = self
            .gpu_context
            .upload_command_pool
            .lock()
            .map_err(|_| Error::BackendError("upload command pool mutex poisoned".to_string()))?;

        let allocate_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*upload_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);

        let command_buffers = self
            .device
            .allocate_command_buffers(&allocate_info)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to allocate upload command buffer: {:?}", e))?;
        let command_buffer = command_buffers[0];

        let begin_info = vk::CommandBufferBeginInfo::default()
            .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);

        self.device
            .begin_command_buffer(command_buffer, &begin_info)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to begin upload command buffer: {:?}", e))?;

        let region = vk::BufferCopy::default().size(data.len() as u64);
        self.device
            .cmd_copy_buffer(command_buffer, staging_buffer, dst, &[region]);

        self.device
            .end_command_buffer(command_buffer)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to end upload command buffer: {:?}", e))?;

        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

        self.device
            .queue_submit(self.gpu_context.graphics_queue, &[submit_info], vk::Fence::null())
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to submit upload: {:?}", e))?;

        // Uploads happen at load time; waiting the queue idle keeps the path
        // simple and lets the staging buffer be freed immediately.
        self.device
            .queue_wait_idle(self.gpu_context.graphics_queue)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait for upload: {:?}", e))?;

        self.device.free_command_buffers(*upload_pool, &command_buffers);
        drop(upload_pool);

        {
            let mut allocator = self
                .allocator
                .lock()
                .map_err(|_| Error::BackendError("allocator mutex poisoned".to_string()))?;
            let _ = allocator.free(staging_allocation);
        }
        self.device.destroy_buffer(staging_buffer, None);

        Ok(())
    }
}

impl RendererGraphicsDevice for VulkanDevice {
    fn create_swapchain(
        &mut self,
        window: &Window,
        extent: Extent2D,
    ) -> Result<Box<dyn RendererSwapchain>> {
        unsafe {
            let display_handle = window.display_handle().map_err(|e| {
                engine_err!(LOG_SOURCE, "Failed to get display handle: {}", e)
            })?;
            let window_handle = window.window_handle().map_err(|e| {
                engine_err!(LOG_SOURCE, "Failed to get window handle: {}", e)
            })?;

            let surface = ash_window::create_surface(
                &self.entry,
                &self.instance,
                display_handle.as_raw(),
                window_handle.as_raw(),
                None,
            )
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create surface: {:?}", e);
                Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
            })?;

            let surface_loader = ash::khr::surface::Instance::new(&self.entry, &self.instance);

            let swapchain = Swapchain::new(
                Arc::clone(&self.gpu_context),
                &self.instance,
                self.physical_device,
                surface,
                surface_loader,
                self.present_queue,
                extent,
                self.config.vsync,
                self.config.frames_in_flight,
            )?;

            Ok(Box::new(swapchain))
        }
    }

    fn create_command_list(&mut self) -> Result<Box<dyn RendererCommandList>> {
        let command_list = CommandList::new(self.device.clone(), self.graphics_queue_family)?;
        Ok(Box::new(command_list))
    }

    fn create_buffer(
        &mut self,
        desc: BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<Arc<dyn RendererBuffer>> {
        unsafe {
            let (usage_flags, location) = match desc.usage {
                BufferUsage::Vertex => (
                    vk::BufferUsageFlags::VERTEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
                    MemoryLocation::GpuOnly,
                ),
                BufferUsage::Index => (
                    vk::BufferUsageFlags::INDEX_BUFFER | vk::BufferUsageFlags::TRANSFER_DST,
                    MemoryLocation::GpuOnly,
                ),
                BufferUsage::Uniform => {
                    (vk::BufferUsageFlags::UNIFORM_BUFFER, MemoryLocation::CpuToGpu)
                }
            };

            if location == MemoryLocation::GpuOnly && initial_data.is_none() {
                return Err(Error::InvalidResource(format!(
                    "device-local buffer ({:?}) requires initial data",
                    desc.usage
                )));
            }

            let buffer_create_info = vk::BufferCreateInfo::default()
                .size(desc.size)
                .usage(usage_flags)
                .sharing_mode(vk::SharingMode::EXCLUSIVE);

            let buffer = self
                .device
                .create_buffer(&buffer_create_info, None)
                .map_err(|e| {
                    engine_err!(LOG_SOURCE, "Failed to create buffer of size {} bytes: {:?}", desc.size, e)
                })?;

            let requirements = self.device.get_buffer_memory_requirements(buffer);

            let allocation = {
                let mut allocator = self
                    .allocator
                    .lock()
                    .map_err(|_| Error::BackendError("allocator mutex poisoned".to_string()))?;
                allocator
                    .allocate(&AllocationCreateDesc {
                        name: "buffer",
                        requirements,
                        location,
                        linear: true,
                        allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                    })
                    .map_err(|_e| {
                        let size_mb = requirements.size as f64 / (1024.0 * 1024.0);
                        engine_error!(LOG_SOURCE, "Out of GPU memory for buffer (required: {:.2} MB)", size_mb);
                        Error::OutOfMemory
                    })?
            };

            self.device
                .bind_buffer_memory(buffer, allocation.memory(), allocation.offset())
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to bind buffer memory: {:?}", e))?;

            if let Some(data) = initial_data {
                match location {
                    MemoryLocation::GpuOnly => {
                        self.upload_to_device_local(buffer, data)?;
                    }
                    _ => {
                        if let Some(mapped) = allocation.mapped_ptr() {
                            std::ptr::copy_nonoverlapping(
                                data.as_ptr(),
                                mapped.as_ptr() as *mut u8,
                                data.len(),
                            );
                        }
                    }
                }
            }

            Ok(Arc::new(Buffer::new(
                Arc::clone(&self.gpu_context),
                buffer,
                allocation,
                desc.size,
                desc.usage,
            )))
        }
    }

    fn create_frame_binding_group(
        &mut self,
        uniform_buffer: &Arc<dyn RendererBuffer>,
    ) -> Result<Arc<dyn RendererBindingGroup>> {
        unsafe {
            let layouts = [self.frame_set_layout];

            // Allocate from the newest pool, growing when exhausted
            let descriptor_sets = {
                let mut pools = self
                    .descriptor_pools
                    .lock()
                    .map_err(|_| Error::BackendError("descriptor pool mutex poisoned".to_string()))?;
                let current_pool = *pools.last().expect("descriptor pool list is never empty");
                let allocate_info = vk::DescriptorSetAllocateInfo::default()
                    .descriptor_pool(current_pool)
                    .set_layouts(&layouts);

                match self.device.allocate_descriptor_sets(&allocate_info) {
                    Ok(sets) => sets,
                    Err(vk::Result::ERROR_OUT_OF_POOL_MEMORY)
                    | Err(vk::Result::ERROR_FRAGMENTED_POOL) => {
                        let new_pool = Self::create_descriptor_pool(&self.device)?;
                        pools.push(new_pool);
                        engine_info!(
                            LOG_SOURCE,
                            "Descriptor pool exhausted, created new pool (total: {})",
                            pools.len()
                        );
                        let retry_info = vk::DescriptorSetAllocateInfo::default()
                            .descriptor_pool(new_pool)
                            .set_layouts(&layouts);
                        self.device.allocate_descriptor_sets(&retry_info).map_err(|e| {
                            engine_error!(
                                LOG_SOURCE,
                                "Failed to allocate descriptor set after pool growth: {:?}",
                                e
                            );
                            Error::OutOfMemory
                        })?
                    }
                    Err(e) => {
                        engine_error!(LOG_SOURCE, "Failed to allocate descriptor set: {:?}", e);
                        return Err(Error::OutOfMemory);
                    }
                }
            };

            let descriptor_set = descriptor_sets[0];

            // Downcast the uniform buffer and point binding 0 at it
            let vk_buffer = uniform_buffer.as_ref() as *const dyn RendererBuffer as *const Buffer;
            let vk_buffer = &*vk_buffer;

            let buffer_info = vk::DescriptorBufferInfo::default()
                .buffer(vk_buffer.buffer)
                .offset(0)
                .range(vk::WHOLE_SIZE);

            let writes = [vk::WriteDescriptorSet::default()
                .dst_set(descriptor_set)
                .dst_binding(0)
                .dst_array_element(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(std::slice::from_ref(&buffer_info))];

            self.device.update_descriptor_sets(&writes, &[]);

            Ok(Arc::new(BindingGroup { descriptor_set }))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device
                .device_wait_idle()
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait idle: {:?}", e))
        }
    }
}

impl Drop for VulkanDevice {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Destroy VulkanDevice-owned Vulkan objects
            self.device.destroy_descriptor_set_layout(self.frame_set_layout, None);
            if let Ok(pools) = self.descriptor_pools.get_mut() {
                for &pool in pools.iter() {
                    self.device.destroy_descriptor_pool(pool, None);
                }
            }

            // 2. Destroy upload command pool from GpuContext
            if let Ok(mut pool) = self.gpu_context.upload_command_pool.lock() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 3. Drop allocator: free VkDeviceMemory pages BEFORE destroying
            //    the device. First drop VulkanDevice's Arc, then GpuContext's
            //    ManuallyDrop Arc.
            ManuallyDrop::drop(&mut self.allocator);
            if let Some(ctx) = Arc::get_mut(&mut self.gpu_context) {
                ManuallyDrop::drop(&mut ctx.allocator);
            }

            // 4. Destroy debug messenger BEFORE device and instance
            #[cfg(feature = "vulkan-validation")]
            if let (Some(debug_utils), Some(messenger)) = (
                &self.gpu_context.debug_utils_loader,
                &self.gpu_context.debug_messenger,
            ) {
                debug_utils.destroy_debug_utils_messenger(*messenger, None);
            }

            // 5. Destroy device and instance
            self.device.destroy_device(None);
            self.instance.destroy_instance(None);
        }
    }
}
