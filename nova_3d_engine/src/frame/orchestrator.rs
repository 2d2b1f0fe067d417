/// FrameOrchestrator - the frame lifecycle state machine
///
/// Sequences begin-frame/end-frame against the swapchain, tracks which of
/// the N frame slots is active, triggers swapchain recreation on staleness
/// or resize, and hands out the current command list through a validated
/// frame token.
///
/// State machine: Idle <-> FrameInProgress. Stale-surface signals
/// (OutOfDate/Suboptimal) are recovered by recreating the chain; calling the
/// API out of order is a programming error and panics.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Swapchain, CommandList, SurfaceExtentProvider,
    AcquireResult, PresentResult, Extent2D, ClearValue, Viewport, Rect2D,
};

const LOG_SOURCE: &str = "nova3d::FrameOrchestrator";

/// Background clear color for the swapchain render pass
const CLEAR_COLOR: [f32; 4] = [0.01, 0.01, 0.01, 1.0];

/// Token for the frame currently in progress
///
/// Minted by each successful [`FrameOrchestrator::begin_frame`]; every
/// render-pass and end-frame call validates it against the frame in
/// progress. Using a token from an earlier frame is an invariant violation
/// and panics; this is the guard against cross-frame command list misuse.
#[derive(Debug, Clone, Copy)]
pub struct ActiveFrame {
    frame_index: usize,
    image_index: u32,
    serial: u64,
}

impl ActiveFrame {
    /// Index of the frame slot in use (0..max_frames_in_flight)
    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    /// Index of the acquired swapchain image
    ///
    /// NOT the same counter as the frame index: the present engine picks
    /// image indices, the orchestrator cycles slot indices; the two
    /// desynchronize freely.
    pub fn image_index(&self) -> u32 {
        self.image_index
    }
}

/// Frame lifecycle orchestrator
pub struct FrameOrchestrator {
    // Declaration order is teardown order: the swapchain and command lists
    // must be released before a possibly-last device reference.
    swapchain: Box<dyn Swapchain>,
    /// One command list per frame slot, selected by `current_frame_index`
    command_lists: Vec<Box<dyn CommandList>>,
    extent_provider: Box<dyn SurfaceExtentProvider>,
    device: Arc<Mutex<dyn GraphicsDevice>>,
    current_frame_index: usize,
    frame_serial: u64,
    frame_in_progress: bool,
    /// Window resize reported since the last handled recreation
    resize_pending: bool,
}

impl FrameOrchestrator {
    /// Create the orchestrator and its per-slot command lists
    pub fn new(
        device: Arc<Mutex<dyn GraphicsDevice>>,
        swapchain: Box<dyn Swapchain>,
        extent_provider: Box<dyn SurfaceExtentProvider>,
    ) -> Result<Self> {
        let slot_count = swapchain.max_frames_in_flight();
        let command_lists = Self::allocate_command_lists(&device, slot_count)?;

        crate::engine_debug!(
            LOG_SOURCE,
            "Created with {} frame slots, {} swapchain images",
            slot_count,
            swapchain.image_count()
        );

        Ok(Self {
            device,
            swapchain,
            extent_provider,
            command_lists,
            current_frame_index: 0,
            frame_serial: 0,
            frame_in_progress: false,
            resize_pending: false,
        })
    }

    fn allocate_command_lists(
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        count: usize,
    ) -> Result<Vec<Box<dyn CommandList>>> {
        let mut device = device
            .lock()
            .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))?;
        let mut lists = Vec::with_capacity(count);
        for _ in 0..count {
            lists.push(device.create_command_list()?);
        }
        Ok(lists)
    }

    /// Begin a frame
    ///
    /// Returns `Ok(None)` when the surface was stale and the chain was
    /// recreated instead; the caller skips this tick, it is not an error.
    /// Device-loss-class acquire failures propagate as `Err`.
    ///
    /// # Panics
    ///
    /// Panics if a frame is already in progress.
    pub fn begin_frame(&mut self) -> Result<Option<ActiveFrame>> {
        assert!(
            !self.frame_in_progress,
            "begin_frame called while a frame is already in progress"
        );

        let image_index = match self.swapchain.acquire_next_image()? {
            AcquireResult::OutOfDate => {
                crate::engine_debug!(LOG_SOURCE, "Swapchain out of date on acquire, recreating");
                self.recreate_swapchain()?;
                return Ok(None);
            }
            // Suboptimal at acquire is still usable this tick; recreation can
            // wait for end_frame or the next out-of-date signal.
            AcquireResult::Acquired(image) | AcquireResult::Suboptimal(image) => image,
        };

        self.frame_serial += 1;
        self.frame_in_progress = true;

        let slot = self.current_frame_index;
        self.command_lists[slot].begin()?;

        Ok(Some(ActiveFrame {
            frame_index: slot,
            image_index,
            serial: self.frame_serial,
        }))
    }

    /// Access the command list of the frame in progress
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `frame` is from an earlier frame.
    pub fn command_list(&mut self, frame: &ActiveFrame) -> &mut dyn CommandList {
        self.validate_token(frame);
        self.command_lists[self.current_frame_index].as_mut()
    }

    /// Begin the swapchain render pass on the current command list
    ///
    /// Clears color and depth and sets the full-surface viewport and scissor
    /// (no viewport state persists across frames).
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `frame` is from an earlier frame.
    pub fn begin_swapchain_render_pass(&mut self, frame: &ActiveFrame) -> Result<()> {
        self.validate_token(frame);

        let render_pass = self.swapchain.render_pass();
        let framebuffer = self.swapchain.framebuffer(frame.image_index)?;
        let extent = self.swapchain.extent();

        let cmd = self.command_lists[self.current_frame_index].as_mut();
        cmd.begin_render_pass(
            &render_pass,
            &framebuffer,
            &[
                ClearValue::Color(CLEAR_COLOR),
                ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            ],
        )?;
        cmd.set_viewport(Viewport {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        })?;
        cmd.set_scissor(Rect2D {
            x: 0,
            y: 0,
            width: extent.width,
            height: extent.height,
        })?;
        Ok(())
    }

    /// End the swapchain render pass on the current command list
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `frame` is from an earlier frame.
    pub fn end_swapchain_render_pass(&mut self, frame: &ActiveFrame) -> Result<()> {
        self.validate_token(frame);
        self.command_lists[self.current_frame_index].end_render_pass()
    }

    /// End the frame: submit, present, and advance the frame slot
    ///
    /// Recreation triggered here (stale present result or a pending resize)
    /// is deferred until after the submission, never preempting it. The
    /// frame-slot index advances `(current + 1) mod N` unconditionally on
    /// success.
    ///
    /// # Panics
    ///
    /// Panics if no frame is in progress or `frame` is from an earlier frame.
    pub fn end_frame(&mut self, frame: &ActiveFrame) -> Result<()> {
        self.validate_token(frame);

        let slot = self.current_frame_index;
        self.command_lists[slot].end()?;
        let present = self
            .swapchain
            .submit_and_present(self.command_lists[slot].as_ref(), frame.image_index)?;

        self.frame_in_progress = false;

        let stale = matches!(present, PresentResult::OutOfDate | PresentResult::Suboptimal);
        if stale || self.resize_pending {
            // Consume the resize flag exactly once per handled resize.
            self.resize_pending = false;
            self.recreate_swapchain()?;
        }

        self.current_frame_index =
            (self.current_frame_index + 1) % self.swapchain.max_frames_in_flight();
        Ok(())
    }

    /// Record that the surface was resized; handled at the next `end_frame`
    pub fn notify_resized(&mut self) {
        self.resize_pending = true;
    }

    /// True while a frame is between begin_frame and end_frame
    pub fn frame_in_progress(&self) -> bool {
        self.frame_in_progress
    }

    /// Index of the frame slot the next begin_frame will use
    pub fn current_frame_index(&self) -> usize {
        self.current_frame_index
    }

    /// Number of frame slots
    pub fn max_frames_in_flight(&self) -> usize {
        self.swapchain.max_frames_in_flight()
    }

    /// Current surface width / height ratio
    pub fn aspect_ratio(&self) -> f32 {
        let extent = self.swapchain.extent();
        extent.width as f32 / extent.height as f32
    }

    /// Current swapchain extent
    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    fn validate_token(&self, frame: &ActiveFrame) {
        assert!(
            self.frame_in_progress,
            "no frame in progress; call begin_frame first"
        );
        assert!(
            frame.serial == self.frame_serial,
            "frame token does not match the frame in progress (stale command buffer?)"
        );
    }

    /// Rebuild the swapchain from the current surface extent
    ///
    /// Polls the extent provider until a usable extent is observed (the
    /// window may be minimized), waits for the GPU to go idle, then
    /// recreates. The per-slot command lists are reallocated only when the
    /// image count changed.
    fn recreate_swapchain(&mut self) -> Result<()> {
        let extent = loop {
            let extent = self.extent_provider.surface_extent();
            if !extent.is_degenerate() {
                break extent;
            }
            self.extent_provider.wait_events();
        };

        // Coarse sync: recreation is rare, a full idle wait is acceptable
        // for the resources not covered by the per-slot fences.
        {
            let device = self
                .device
                .lock()
                .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))?;
            device.wait_idle()?;
        }

        let old_image_count = self.swapchain.image_count();
        self.swapchain.recreate(extent)?;

        if self.swapchain.image_count() != old_image_count {
            self.command_lists =
                Self::allocate_command_lists(&self.device, self.swapchain.max_frames_in_flight())?;
        }

        crate::engine_debug!(
            LOG_SOURCE,
            "Swapchain recreated: {}x{}, {} images",
            extent.width,
            extent.height,
            self.swapchain.image_count()
        );
        Ok(())
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
