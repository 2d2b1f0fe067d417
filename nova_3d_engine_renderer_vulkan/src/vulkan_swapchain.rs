/// Swapchain - Vulkan implementation of the Swapchain trait
///
/// Owns the presentable images, the shared depth buffer, the render pass all
/// swapchain framebuffers are compatible with, and the fences/semaphores that
/// pace the CPU against the GPU. Stale-surface conditions map to
/// `AcquireResult`/`PresentResult` variants; recreation is always driven by
/// the caller.

use nova_3d_engine::nova3d::{Result, Error};
use nova_3d_engine::nova3d::render::{
    Swapchain as RendererSwapchain,
    CommandList as RendererCommandList,
    RenderPass as RendererRenderPass,
    Framebuffer as RendererFramebuffer,
    AcquireResult, PresentResult, Extent2D,
};
use nova_3d_engine::{engine_error, engine_err, engine_info};
use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme};
use gpu_allocator::MemoryLocation;
use std::sync::Arc;

use crate::vulkan_command_list::CommandList as VulkanCommandList;
use crate::vulkan_context::GpuContext;
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_render_pass::RenderPass;

const LOG_SOURCE: &str = "nova3d::vulkan";

/// Vulkan swapchain implementation
pub struct Swapchain {
    /// Shared GPU context
    context: Arc<GpuContext>,
    /// Physical device for capabilities queries
    physical_device: vk::PhysicalDevice,

    /// Present queue
    present_queue: vk::Queue,

    /// Surface (owned; destroyed on Drop)
    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,

    /// Swapchain
    swapchain: vk::SwapchainKHR,
    swapchain_loader: ash::khr::swapchain::Device,
    swapchain_images: Vec<vk::Image>,
    swapchain_image_views: Vec<vk::ImageView>,
    surface_format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    swapchain_extent: vk::Extent2D,

    /// Depth buffer shared by all framebuffers
    depth_format: vk::Format,
    depth_image: vk::Image,
    depth_image_view: vk::ImageView,
    depth_allocation: Option<Allocation>,

    /// Render pass all framebuffers are compatible with (survives recreation;
    /// format drift is rejected instead of rebuilding it)
    render_pass: Arc<RenderPass>,

    /// One framebuffer per swapchain image
    framebuffers: Vec<Arc<Framebuffer>>,

    /// One semaphore per frame slot (for acquire)
    image_available_semaphores: Vec<vk::Semaphore>,
    /// One semaphore per swapchain image (for present)
    render_finished_semaphores: Vec<vk::Semaphore>,
    /// One fence per frame slot, created signaled so the first wait passes
    in_flight_fences: Vec<vk::Fence>,
    /// Fence of the slot that last used each image (null = never used)
    images_in_flight: Vec<vk::Fence>,

    /// Current frame slot
    current_frame: usize,
    /// Number of frame slots
    max_frames_in_flight: usize,
}

// ============================================================================
// PURE SELECTION HELPERS
// ============================================================================

/// Pick the surface format, preferring sRGB swapchain output
pub(crate) fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> vk::SurfaceFormatKHR {
    *formats
        .iter()
        .find(|f| {
            (f.format == vk::Format::B8G8R8A8_SRGB || f.format == vk::Format::R8G8B8A8_SRGB)
                && f.color_space == vk::ColorSpaceKHR::SRGB_NONLINEAR
        })
        .unwrap_or(&formats[0])
}

/// Pick the present mode: FIFO for vsync (always available), otherwise
/// MAILBOX when supported, falling back to IMMEDIATE, then FIFO
pub(crate) fn choose_present_mode(modes: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {
    if vsync {
        return vk::PresentModeKHR::FIFO;
    }
    if modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else if modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
        vk::PresentModeKHR::IMMEDIATE
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Resolve the swapchain extent from the surface capabilities
///
/// When the platform pins the extent (current_extent != u32::MAX) that value
/// wins; otherwise the requested extent is clamped to the supported range.
pub(crate) fn clamp_extent(
    requested: Extent2D,
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: requested.width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: requested.height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}

/// Number of swapchain images to request: one more than the minimum, capped
/// by the maximum when the platform has one
pub(crate) fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let count = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        count.min(capabilities.max_image_count)
    } else {
        count
    }
}

/// Pick a supported depth format, preferring 32-bit float depth
fn find_depth_format(
    instance: &ash::Instance,
    physical_device: vk::PhysicalDevice,
) -> Result<vk::Format> {
    let candidates = [
        vk::Format::D32_SFLOAT,
        vk::Format::D32_SFLOAT_S8_UINT,
        vk::Format::D24_UNORM_S8_UINT,
    ];

    for &format in &candidates {
        let props = unsafe {
            instance.get_physical_device_format_properties(physical_device, format)
        };
        if props
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
        {
            return Ok(format);
        }
    }

    Err(engine_err!(LOG_SOURCE, "No supported depth format found"))
}

impl Swapchain {
    /// Create a new swapchain for an existing surface
    ///
    /// Takes ownership of `surface`; it is destroyed when the swapchain is
    /// dropped.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        context: Arc<GpuContext>,
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        surface_loader: ash::khr::surface::Instance,
        present_queue: vk::Queue,
        extent: Extent2D,
        vsync: bool,
        frames_in_flight: u32,
    ) -> Result<Self> {
        if extent.is_degenerate() {
            return Err(Error::SurfaceLost(format!(
                "cannot create swapchain for degenerate extent {}x{}",
                extent.width, extent.height
            )));
        }

        let (capabilities, surface_format, present_mode) = unsafe {
            let capabilities = surface_loader
                .get_physical_device_surface_capabilities(physical_device, surface)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let formats = surface_loader
                .get_physical_device_surface_formats(physical_device, surface)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to query surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            let present_modes = surface_loader
                .get_physical_device_surface_present_modes(physical_device, surface)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to query present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;

            (
                capabilities,
                choose_surface_format(&formats),
                choose_present_mode(&present_modes, vsync),
            )
        };

        let swapchain_extent = clamp_extent(extent, &capabilities);
        let depth_format = find_depth_format(instance, physical_device)?;

        let swapchain_loader = ash::khr::swapchain::Device::new(instance, &context.device);

        let (swapchain, swapchain_images, swapchain_image_views) = create_chain(
            &context,
            &swapchain_loader,
            surface,
            surface_format,
            present_mode,
            swapchain_extent,
            &capabilities,
            vk::SwapchainKHR::null(),
        )?;

        let render_pass = Arc::new(create_render_pass(
            &context.device,
            surface_format.format,
            depth_format,
        )?);

        let (depth_image, depth_image_view, depth_allocation) =
            create_depth_resources(&context, depth_format, swapchain_extent)?;

        let framebuffers = create_framebuffers(
            &context.device,
            render_pass.render_pass,
            &swapchain_image_views,
            depth_image_view,
            swapchain_extent,
        )?;

        let image_count = swapchain_images.len();
        let max_frames_in_flight = frames_in_flight as usize;

        let (image_available_semaphores, render_finished_semaphores, in_flight_fences) =
            create_sync_objects(&context.device, max_frames_in_flight, image_count)?;

        engine_info!(
            LOG_SOURCE,
            "Swapchain created: {}x{}, {} images, {} frames in flight, format {:?}",
            swapchain_extent.width,
            swapchain_extent.height,
            image_count,
            max_frames_in_flight,
            surface_format.format
        );

        Ok(Self {
            context,
            physical_device,
            present_queue,
            surface,
            surface_loader,
            swapchain,
            swapchain_loader,
            swapchain_images,
            swapchain_image_views,
            surface_format,
            present_mode,
            swapchain_extent,
            depth_format,
            depth_image,
            depth_image_view,
            depth_allocation: Some(depth_allocation),
            render_pass,
            framebuffers,
            image_available_semaphores,
            render_finished_semaphores,
            in_flight_fences,
            images_in_flight: vec![vk::Fence::null(); image_count],
            current_frame: 0,
            max_frames_in_flight,
        })
    }

    fn destroy_chain_resources(&mut self) {
        unsafe {
            self.framebuffers.clear();

            self.context.device.destroy_image_view(self.depth_image_view, None);
            if let Some(allocation) = self.depth_allocation.take() {
                if let Ok(mut allocator) = self.context.allocator.lock() {
                    let _ = allocator.free(allocation);
                }
            }
            self.context.device.destroy_image(self.depth_image, None);

            for &image_view in &self.swapchain_image_views {
                self.context.device.destroy_image_view(image_view, None);
            }
            self.swapchain_image_views.clear();
        }
    }
}

impl RendererSwapchain for Swapchain {
    fn acquire_next_image(&mut self) -> Result<AcquireResult> {
        unsafe {
            // Slot fence backpressure: block until the GPU is done with the
            // submission that last used this frame slot.
            let fence = self.in_flight_fences[self.current_frame];
            self.context
                .device
                .wait_for_fences(&[fence], true, u64::MAX)
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait for in-flight fence: {:?}", e))?;

            let acquired = self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                self.image_available_semaphores[self.current_frame],
                vk::Fence::null(),
            );

            let (image_index, suboptimal) = match acquired {
                Ok(pair) => pair,
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => return Ok(AcquireResult::OutOfDate),
                Err(e) => {
                    return Err(engine_err!(LOG_SOURCE, "Failed to acquire next swapchain image: {:?}", e))
                }
            };

            // If another slot still has this image in flight, wait it out too
            // (possible when image count < 2 * frames in flight).
            let image_fence = self.images_in_flight[image_index as usize];
            if image_fence != vk::Fence::null() && image_fence != fence {
                self.context
                    .device
                    .wait_for_fences(&[image_fence], true, u64::MAX)
                    .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait for image fence: {:?}", e))?;
            }
            self.images_in_flight[image_index as usize] = fence;

            if suboptimal {
                Ok(AcquireResult::Suboptimal(image_index))
            } else {
                Ok(AcquireResult::Acquired(image_index))
            }
        }
    }

    fn submit_and_present(
        &mut self,
        command_list: &dyn RendererCommandList,
        image_index: u32,
    ) -> Result<PresentResult> {
        unsafe {
            // Downcast to access the Vulkan command buffer
            let vk_cmd = command_list as *const dyn RendererCommandList as *const VulkanCommandList;
            let vk_cmd = &*vk_cmd;

            let fence = self.in_flight_fences[self.current_frame];
            self.context
                .device
                .reset_fences(&[fence])
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to reset in-flight fence: {:?}", e))?;

            let wait_semaphores = [self.image_available_semaphores[self.current_frame]];
            let wait_stages = [vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT];
            let signal_semaphores = [self.render_finished_semaphores[image_index as usize]];
            let command_buffers = [vk_cmd.command_buffer()];

            let submit_info = vk::SubmitInfo::default()
                .wait_semaphores(&wait_semaphores)
                .wait_dst_stage_mask(&wait_stages)
                .command_buffers(&command_buffers)
                .signal_semaphores(&signal_semaphores);

            self.context
                .device
                .queue_submit(self.context.graphics_queue, &[submit_info], fence)
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to submit command buffer: {:?}", e))?;

            let swapchains = [self.swapchain];
            let image_indices = [image_index];

            let present_info = vk::PresentInfoKHR::default()
                .wait_semaphores(&signal_semaphores)
                .swapchains(&swapchains)
                .image_indices(&image_indices);

            let present_result = self
                .swapchain_loader
                .queue_present(self.present_queue, &present_info);

            // The slot advances even when presentation reports staleness: the
            // submission itself went through and the slot fence will signal.
            self.current_frame = (self.current_frame + 1) % self.max_frames_in_flight;

            match present_result {
                Ok(false) => Ok(PresentResult::Presented),
                Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentResult::Suboptimal),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentResult::OutOfDate),
                Err(e) => Err(engine_err!(LOG_SOURCE, "Failed to present swapchain image: {:?}", e)),
            }
        }
    }

    fn recreate(&mut self, extent: Extent2D) -> Result<()> {
        if extent.is_degenerate() {
            return Err(Error::SurfaceLost(format!(
                "cannot recreate swapchain for degenerate extent {}x{}",
                extent.width, extent.height
            )));
        }

        unsafe {
            self.context
                .device
                .device_wait_idle()
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to wait idle before swapchain recreate: {:?}", e))?;

            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to get surface capabilities during swapchain recreate: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.physical_device, self.surface)
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to query surface formats during swapchain recreate: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            // Pipelines and the render pass were built against the original
            // formats. A different preferred format after recreation cannot be
            // absorbed here.
            let new_format = choose_surface_format(&formats);
            if new_format.format != self.surface_format.format
                || new_format.color_space != self.surface_format.color_space
            {
                return Err(Error::FormatDrift(format!(
                    "surface format changed during recreation: {:?}/{:?} -> {:?}/{:?}",
                    self.surface_format.format,
                    self.surface_format.color_space,
                    new_format.format,
                    new_format.color_space
                )));
            }

            let swapchain_extent = clamp_extent(extent, &capabilities);

            self.destroy_chain_resources();

            let old_swapchain = self.swapchain;
            let (swapchain, swapchain_images, swapchain_image_views) = create_chain(
                &self.context,
                &self.swapchain_loader,
                self.surface,
                self.surface_format,
                self.present_mode,
                swapchain_extent,
                &capabilities,
                old_swapchain,
            )?;

            self.swapchain_loader.destroy_swapchain(old_swapchain, None);

            self.swapchain = swapchain;
            self.swapchain_extent = swapchain_extent;

            let (depth_image, depth_image_view, depth_allocation) =
                create_depth_resources(&self.context, self.depth_format, swapchain_extent)?;
            self.depth_image = depth_image;
            self.depth_image_view = depth_image_view;
            self.depth_allocation = Some(depth_allocation);

            self.framebuffers = create_framebuffers(
                &self.context.device,
                self.render_pass.render_pass,
                &swapchain_image_views,
                depth_image_view,
                swapchain_extent,
            )?;

            // Per-image semaphores and fence table track the image count,
            // which may have changed.
            if swapchain_images.len() != self.swapchain_images.len() {
                for &semaphore in &self.render_finished_semaphores {
                    self.context.device.destroy_semaphore(semaphore, None);
                }
                self.render_finished_semaphores.clear();

                let semaphore_create_info = vk::SemaphoreCreateInfo::default();
                for _ in 0..swapchain_images.len() {
                    self.render_finished_semaphores.push(
                        self.context
                            .device
                            .create_semaphore(&semaphore_create_info, None)
                            .map_err(|e| {
                                engine_err!(LOG_SOURCE, "Failed to create render-finished semaphore: {:?}", e)
                            })?,
                    );
                }
            }
            self.images_in_flight = vec![vk::Fence::null(); swapchain_images.len()];

            self.swapchain_images = swapchain_images;
            self.swapchain_image_views = swapchain_image_views;

            engine_info!(
                LOG_SOURCE,
                "Swapchain recreated: {}x{}, {} images",
                swapchain_extent.width,
                swapchain_extent.height,
                self.swapchain_images.len()
            );

            Ok(())
        }
    }

    fn image_count(&self) -> usize {
        self.swapchain_images.len()
    }

    fn max_frames_in_flight(&self) -> usize {
        self.max_frames_in_flight
    }

    fn extent(&self) -> Extent2D {
        Extent2D::new(self.swapchain_extent.width, self.swapchain_extent.height)
    }

    fn render_pass(&self) -> Arc<dyn RendererRenderPass> {
        self.render_pass.clone()
    }

    fn framebuffer(&self, image_index: u32) -> Result<Arc<dyn RendererFramebuffer>> {
        match self.framebuffers.get(image_index as usize) {
            Some(fb) => Ok(fb.clone() as Arc<dyn RendererFramebuffer>),
            None => Err(Error::InvalidResource(format!(
                "framebuffer index {} out of range (count: {})",
                image_index,
                self.framebuffers.len()
            ))),
        }
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();

            for &semaphore in &self.image_available_semaphores {
                self.context.device.destroy_semaphore(semaphore, None);
            }
            for &semaphore in &self.render_finished_semaphores {
                self.context.device.destroy_semaphore(semaphore, None);
            }
            for &fence in &self.in_flight_fences {
                self.context.device.destroy_fence(fence, None);
            }

            self.destroy_chain_resources();

            self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}

// ============================================================================
// CONSTRUCTION HELPERS
// ============================================================================

#[allow(clippy::too_many_arguments)]
fn create_chain(
    context: &GpuContext,
    swapchain_loader: &ash::khr::swapchain::Device,
    surface: vk::SurfaceKHR,
    surface_format: vk::SurfaceFormatKHR,
    present_mode: vk::PresentModeKHR,
    extent: vk::Extent2D,
    capabilities: &vk::SurfaceCapabilitiesKHR,
    old_swapchain: vk::SwapchainKHR,
) -> Result<(vk::SwapchainKHR, Vec<vk::Image>, Vec<vk::ImageView>)> {
    unsafe {
        let swapchain_create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(surface)
            .min_image_count(choose_image_count(capabilities))
            .image_format(surface_format.format)
            .image_color_space(surface_format.color_space)
            .image_extent(extent)
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
            .pre_transform(capabilities.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode)
            .clipped(true)
            .old_swapchain(old_swapchain);

        let swapchain = swapchain_loader
            .create_swapchain(&swapchain_create_info, None)
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create swapchain: {:?}", e);
                Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
            })?;

        let swapchain_images = swapchain_loader
            .get_swapchain_images(swapchain)
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to get swapchain images: {:?}", e);
                Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
            })?;

        let swapchain_image_views: Vec<vk::ImageView> = swapchain_images
            .iter()
            .map(|&image| {
                let create_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(surface_format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });
                context.device.create_image_view(&create_info, None)
            })
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create swapchain image views: {:?}", e);
                Error::InitializationFailed(format!("Failed to create image views: {:?}", e))
            })?;

        Ok((swapchain, swapchain_images, swapchain_image_views))
    }
}

fn create_render_pass(
    device: &ash::Device,
    color_format: vk::Format,
    depth_format: vk::Format,
) -> Result<RenderPass> {
    unsafe {
        let attachments = [
            vk::AttachmentDescription::default()
                .format(color_format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::STORE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::PRESENT_SRC_KHR),
            vk::AttachmentDescription::default()
                .format(depth_format)
                .samples(vk::SampleCountFlags::TYPE_1)
                .load_op(vk::AttachmentLoadOp::CLEAR)
                .store_op(vk::AttachmentStoreOp::DONT_CARE)
                .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
                .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
                .initial_layout(vk::ImageLayout::UNDEFINED)
                .final_layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL),
        ];

        let color_refs = [vk::AttachmentReference::default()
            .attachment(0)
            .layout(vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL)];
        let depth_ref = vk::AttachmentReference::default()
            .attachment(1)
            .layout(vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL);

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)];

        let dependencies = [vk::SubpassDependency::default()
            .src_subpass(vk::SUBPASS_EXTERNAL)
            .dst_subpass(0)
            .src_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .src_access_mask(vk::AccessFlags::empty())
            .dst_stage_mask(
                vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT
                    | vk::PipelineStageFlags::EARLY_FRAGMENT_TESTS,
            )
            .dst_access_mask(
                vk::AccessFlags::COLOR_ATTACHMENT_WRITE
                    | vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE,
            )];

        let render_pass_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = device
            .create_render_pass(&render_pass_info, None)
            .map_err(|e| {
                engine_error!(LOG_SOURCE, "Failed to create render pass: {:?}", e);
                Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
            })?;

        Ok(RenderPass {
            render_pass,
            device: device.clone(),
        })
    }
}

fn create_depth_resources(
    context: &GpuContext,
    depth_format: vk::Format,
    extent: vk::Extent2D,
) -> Result<(vk::Image, vk::ImageView, Allocation)> {
    unsafe {
        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .extent(vk::Extent3D {
                width: extent.width,
                height: extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .format(depth_format)
            .tiling(vk::ImageTiling::OPTIMAL)
            .initial_layout(vk::ImageLayout::UNDEFINED)
            .usage(vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT)
            .samples(vk::SampleCountFlags::TYPE_1)
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let depth_image = context
            .device
            .create_image(&image_info, None)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create depth image: {:?}", e))?;

        let requirements = context.device.get_image_memory_requirements(depth_image);

        let allocation = {
            let mut allocator = context.allocator.lock().map_err(|_| {
                Error::BackendError("allocator mutex poisoned".to_string())
            })?;
            allocator
                .allocate(&AllocationCreateDesc {
                    name: "depth_buffer",
                    requirements,
                    location: MemoryLocation::GpuOnly,
                    linear: false,
                    allocation_scheme: AllocationScheme::GpuAllocatorManaged,
                })
                .map_err(|e| {
                    engine_error!(LOG_SOURCE, "Failed to allocate depth buffer memory: {:?}", e);
                    Error::OutOfMemory
                })?
        };

        context
            .device
            .bind_image_memory(depth_image, allocation.memory(), allocation.offset())
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to bind depth image memory: {:?}", e))?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(depth_image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(depth_format)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::DEPTH,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let depth_image_view = context
            .device
            .create_image_view(&view_info, None)
            .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create depth image view: {:?}", e))?;

        Ok((depth_image, depth_image_view, allocation))
    }
}

fn create_framebuffers(
    device: &ash::Device,
    render_pass: vk::RenderPass,
    image_views: &[vk::ImageView],
    depth_image_view: vk::ImageView,
    extent: vk::Extent2D,
) -> Result<Vec<Arc<Framebuffer>>> {
    let mut framebuffers = Vec::with_capacity(image_views.len());

    for &image_view in image_views {
        let attachments = [image_view, depth_image_view];
        let framebuffer_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass)
            .attachments(&attachments)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe {
            device
                .create_framebuffer(&framebuffer_info, None)
                .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create framebuffer: {:?}", e))?
        };

        framebuffers.push(Arc::new(Framebuffer::new(
            framebuffer,
            extent.width,
            extent.height,
            device.clone(),
        )));
    }

    Ok(framebuffers)
}

fn create_sync_objects(
    device: &ash::Device,
    max_frames_in_flight: usize,
    image_count: usize,
) -> Result<(Vec<vk::Semaphore>, Vec<vk::Semaphore>, Vec<vk::Fence>)> {
    unsafe {
        let semaphore_create_info = vk::SemaphoreCreateInfo::default();
        // Signaled so the first wait on each slot passes immediately
        let fence_create_info =
            vk::FenceCreateInfo::default().flags(vk::FenceCreateFlags::SIGNALED);

        let mut image_available_semaphores = Vec::with_capacity(max_frames_in_flight);
        let mut render_finished_semaphores = Vec::with_capacity(image_count);
        let mut in_flight_fences = Vec::with_capacity(max_frames_in_flight);

        for _ in 0..max_frames_in_flight {
            image_available_semaphores.push(
                device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| {
                        engine_err!(LOG_SOURCE, "Failed to create image-available semaphore: {:?}", e)
                    })?,
            );
            in_flight_fences.push(
                device
                    .create_fence(&fence_create_info, None)
                    .map_err(|e| engine_err!(LOG_SOURCE, "Failed to create in-flight fence: {:?}", e))?,
            );
        }

        for _ in 0..image_count {
            render_finished_semaphores.push(
                device
                    .create_semaphore(&semaphore_create_info, None)
                    .map_err(|e| {
                        engine_err!(LOG_SOURCE, "Failed to create render-finished semaphore: {:?}", e)
                    })?,
            );
        }

        Ok((
            image_available_semaphores,
            render_finished_semaphores,
            in_flight_fences,
        ))
    }
}

#[cfg(test)]
#[path = "vulkan_swapchain_tests.rs"]
mod tests;
