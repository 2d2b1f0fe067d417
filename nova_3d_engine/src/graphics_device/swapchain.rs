/// Swapchain trait - the ring of presentable images and its synchronization
///
/// The swapchain owns the presentable images, their views, the depth buffer,
/// one framebuffer per image, and the fences/semaphores that order CPU and
/// GPU work. It is replaced wholesale on resize or staleness, never mutated
/// in place.

use std::sync::Arc;
use crate::error::Result;
use crate::graphics_device::{CommandList, RenderPass, Framebuffer};

/// Surface extent in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// True when either dimension is zero (minimized window)
    pub fn is_degenerate(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Outcome of acquiring the next presentable image
///
/// `OutOfDate` and `Suboptimal` are stale-surface signals, not errors: the
/// caller recreates the chain (mandatory for `OutOfDate`, opportunistic for
/// `Suboptimal`). Device-loss-class failures come back as `Err` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireResult {
    /// Image acquired; index into the swapchain image array
    Acquired(u32),
    /// Image acquired but the chain no longer matches the surface exactly
    Suboptimal(u32),
    /// The chain is unusable; it must be recreated before the next acquire
    OutOfDate,
}

/// Outcome of submitting and presenting a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentResult {
    Presented,
    Suboptimal,
    OutOfDate,
}

/// Source of the current surface extent, polled during swapchain recreation
///
/// While the window is minimized the extent is 0x0 and no chain can be
/// created; the orchestrator polls this provider, calling `wait_events`
/// between zero-extent polls, until a usable extent is observed.
pub trait SurfaceExtentProvider {
    /// Current surface extent in pixels
    fn surface_extent(&mut self) -> Extent2D;

    /// Block until the surface may have changed (default: no-op)
    fn wait_events(&mut self) {}
}

/// Presentation swapchain
pub trait Swapchain: Send + Sync {
    /// Acquire the next presentable image
    ///
    /// Waits on the current frame slot's in-flight fence first (the
    /// backpressure that bounds the CPU to `max_frames_in_flight` frames
    /// ahead of the GPU), then requests the next image from the present
    /// engine. Never auto-recreates on `OutOfDate`; that is the caller's
    /// responsibility (avoids recursive teardown races).
    fn acquire_next_image(&mut self) -> Result<AcquireResult>;

    /// Submit recorded commands and present the image
    ///
    /// The submission waits on "image available", signals "render finished",
    /// and signals the slot's in-flight fence; presentation of `image_index`
    /// is requested right after. Advances the internal frame-slot counter.
    fn submit_and_present(
        &mut self,
        command_list: &dyn CommandList,
        image_index: u32,
    ) -> Result<PresentResult>;

    /// Recreate the chain for a new surface extent
    ///
    /// The old chain's handle is passed to the platform as a reuse hint.
    /// Fails with `Error::SurfaceLost` if `extent` is degenerate and with
    /// `Error::FormatDrift` if the new chain's color or depth format differs
    /// from the old one (dependent pipelines were built against the old
    /// formats; drift is fatal upstream).
    fn recreate(&mut self, extent: Extent2D) -> Result<()>;

    /// Number of presentable images in the chain
    fn image_count(&self) -> usize;

    /// Number of frame slots (max frames in flight)
    fn max_frames_in_flight(&self) -> usize;

    /// Current surface extent
    fn extent(&self) -> Extent2D;

    /// The render pass all swapchain framebuffers are compatible with
    fn render_pass(&self) -> Arc<dyn RenderPass>;

    /// Framebuffer for the given image index
    fn framebuffer(&self, image_index: u32) -> Result<Arc<dyn Framebuffer>>;
}
