/// Mock graphics device - records commands as strings for GPU-free tests
///
/// Every mock pushes the name of each call (with the parameters that matter
/// for ordering assertions) into a shared event log, so tests can assert
/// exact command sequences without a GPU. The mock swapchain additionally
/// scripts acquire/present outcomes and models the per-slot fence: a fence
/// wait is only recorded when the slot actually has an outstanding
/// submission, which is what the frame-pacing tests observe.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use winit::window::Window;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Swapchain, CommandList, Buffer, BufferDesc, BufferUsage,
    BindingGroup, Pipeline, RenderPass, Framebuffer, Extent2D,
    AcquireResult, PresentResult, SurfaceExtentProvider,
    Viewport, Rect2D, ClearValue, IndexType, ShaderStageFlags,
};

// ===== MOCK COMMAND LIST =====

/// Mock command list recording command names into a shared log
pub struct MockCommandList {
    /// Recorded command names, shared so tests can inspect after moving the box
    pub commands: Arc<Mutex<Vec<String>>>,
    recording: bool,
    in_render_pass: bool,
}

impl MockCommandList {
    pub fn new() -> Self {
        Self {
            commands: Arc::new(Mutex::new(Vec::new())),
            recording: false,
            in_render_pass: false,
        }
    }

    fn push(&self, command: impl Into<String>) {
        self.commands.lock().unwrap().push(command.into());
    }
}

impl CommandList for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if self.recording {
            return Err(Error::BackendError("Command list already recording".to_string()));
        }
        self.commands.lock().unwrap().clear();
        self.recording = true;
        self.in_render_pass = false;
        self.push("begin");
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        if !self.recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }
        if self.in_render_pass {
            return Err(Error::BackendError("Render pass not ended".to_string()));
        }
        self.recording = false;
        self.push("end");
        Ok(())
    }

    fn begin_render_pass(
        &mut self,
        _render_pass: &Arc<dyn RenderPass>,
        _framebuffer: &Arc<dyn Framebuffer>,
        clear_values: &[ClearValue],
    ) -> Result<()> {
        if !self.recording {
            return Err(Error::BackendError("Command list not recording".to_string()));
        }
        if self.in_render_pass {
            return Err(Error::BackendError("Already inside a render pass".to_string()));
        }
        self.in_render_pass = true;
        self.push(format!("begin_render_pass({} clears)", clear_values.len()));
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }
        self.in_render_pass = false;
        self.push("end_render_pass");
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.push(format!("set_viewport({}x{})", viewport.width, viewport.height));
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.push(format!("set_scissor({}x{})", scissor.width, scissor.height));
        Ok(())
    }

    fn bind_pipeline(&mut self, _pipeline: &Arc<dyn Pipeline>) -> Result<()> {
        self.push("bind_pipeline");
        Ok(())
    }

    fn bind_binding_group(
        &mut self,
        _pipeline: &Arc<dyn Pipeline>,
        set_index: u32,
        _binding_group: &Arc<dyn BindingGroup>,
    ) -> Result<()> {
        self.push(format!("bind_binding_group({})", set_index));
        Ok(())
    }

    fn push_constants(&mut self, _stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()> {
        self.push(format!("push_constants({}, {} bytes)", offset, data.len()));
        Ok(())
    }

    fn bind_vertex_buffer(&mut self, _buffer: &Arc<dyn Buffer>, offset: u64) -> Result<()> {
        self.push(format!("bind_vertex_buffer({})", offset));
        Ok(())
    }

    fn bind_index_buffer(
        &mut self,
        _buffer: &Arc<dyn Buffer>,
        offset: u64,
        _index_type: IndexType,
    ) -> Result<()> {
        self.push(format!("bind_index_buffer({})", offset));
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, first_vertex: u32) -> Result<()> {
        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }
        self.push(format!("draw({}, {})", vertex_count, first_vertex));
        Ok(())
    }

    fn draw_indexed(&mut self, index_count: u32, first_index: u32, vertex_offset: i32) -> Result<()> {
        if !self.in_render_pass {
            return Err(Error::BackendError("Not inside a render pass".to_string()));
        }
        self.push(format!("draw_indexed({}, {}, {})", index_count, first_index, vertex_offset));
        Ok(())
    }
}

// ===== MOCK BUFFER =====

/// Mock buffer with readable backing storage for round-trip assertions
pub struct MockBuffer {
    pub data: Mutex<Vec<u8>>,
    pub flushes: Mutex<Vec<(u64, u64)>>,
    usage: BufferUsage,
}

impl MockBuffer {
    pub fn new(size: u64, usage: BufferUsage) -> Self {
        Self {
            data: Mutex::new(vec![0u8; size as usize]),
            flushes: Mutex::new(Vec::new()),
            usage,
        }
    }

    /// Read back the backing bytes (what a mapped pointer would show)
    pub fn read_back(&self, offset: u64, size: u64) -> Vec<u8> {
        let data = self.data.lock().unwrap();
        data[offset as usize..(offset + size) as usize].to_vec()
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.lock().unwrap().len()
    }
}

impl Buffer for MockBuffer {
    fn update(&self, offset: u64, bytes: &[u8]) -> Result<()> {
        if self.usage != BufferUsage::Uniform {
            return Err(Error::InvalidResource(
                "update requires a host-visible uniform buffer".to_string(),
            ));
        }
        let mut data = self.data.lock().unwrap();
        let end = offset as usize + bytes.len();
        if end > data.len() {
            return Err(Error::InvalidResource(format!(
                "update of {} bytes at offset {} overflows buffer of {} bytes",
                bytes.len(),
                offset,
                data.len()
            )));
        }
        data[offset as usize..end].copy_from_slice(bytes);
        Ok(())
    }

    fn flush(&self, offset: u64, size: u64) -> Result<()> {
        self.flushes.lock().unwrap().push((offset, size));
        Ok(())
    }

    fn size(&self) -> u64 {
        self.data.lock().unwrap().len() as u64
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

// ===== MOCK MARKER RESOURCES =====

pub struct MockBindingGroup;
impl BindingGroup for MockBindingGroup {}

pub struct MockPipeline;
impl Pipeline for MockPipeline {}

pub struct MockRenderPass;
impl RenderPass for MockRenderPass {}

pub struct MockFramebuffer;
impl Framebuffer for MockFramebuffer {}

// ===== MOCK SWAPCHAIN =====

/// Shared, inspectable state of a [`MockSwapchain`]
pub struct MockSwapchainState {
    /// Ordered event log: wait_fence(slot), submit(slot, image), present(image), recreate(WxH)
    pub events: Vec<String>,
    /// Scripted acquire outcomes; round-robin `Acquired` once exhausted
    pub acquire_script: VecDeque<AcquireResult>,
    /// Scripted present outcomes; `Presented` once exhausted
    pub present_script: VecDeque<PresentResult>,
    /// When set, the next recreate fails with `Error::FormatDrift`
    pub drift_on_recreate: bool,
    /// When set, the next recreate changes the image count to this value
    pub image_count_after_recreate: Option<usize>,
}

impl MockSwapchainState {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            drift_on_recreate: false,
            image_count_after_recreate: None,
        }
    }
}

/// Mock swapchain with scripted outcomes and fence modeling
pub struct MockSwapchain {
    state: Arc<Mutex<MockSwapchainState>>,
    frames_in_flight: usize,
    image_count: usize,
    extent: Extent2D,
    current_slot: usize,
    next_image: u32,
    /// Slots with an outstanding submission; a real fence wait would block
    submitted: Vec<bool>,
}

impl MockSwapchain {
    pub fn new(frames_in_flight: usize, image_count: usize, extent: Extent2D) -> Self {
        assert!(frames_in_flight >= 1);
        Self {
            state: Arc::new(Mutex::new(MockSwapchainState::new())),
            frames_in_flight,
            image_count,
            extent,
            current_slot: 0,
            next_image: 0,
            submitted: vec![false; frames_in_flight],
        }
    }

    /// Handle for scripting outcomes and inspecting the event log
    pub fn state(&self) -> Arc<Mutex<MockSwapchainState>> {
        self.state.clone()
    }
}

impl Swapchain for MockSwapchain {
    fn acquire_next_image(&mut self) -> Result<AcquireResult> {
        let mut state = self.state.lock().unwrap();

        // A real chain waits the slot's in-flight fence before reuse; only a
        // slot with an outstanding submission actually blocks.
        if self.submitted[self.current_slot] {
            state.events.push(format!("wait_fence({})", self.current_slot));
            self.submitted[self.current_slot] = false;
        }

        let result = state.acquire_script.pop_front().unwrap_or_else(|| {
            let image = self.next_image;
            AcquireResult::Acquired(image)
        });
        if let AcquireResult::Acquired(image) | AcquireResult::Suboptimal(image) = result {
            state.events.push(format!("acquire({})", image));
            self.next_image = (image + 1) % self.image_count as u32;
        } else {
            state.events.push("acquire(out_of_date)".to_string());
        }
        Ok(result)
    }

    fn submit_and_present(
        &mut self,
        _command_list: &dyn CommandList,
        image_index: u32,
    ) -> Result<PresentResult> {
        let mut state = self.state.lock().unwrap();
        state
            .events
            .push(format!("submit({}, {})", self.current_slot, image_index));
        state.events.push(format!("present({})", image_index));
        self.submitted[self.current_slot] = true;
        self.current_slot = (self.current_slot + 1) % self.frames_in_flight;
        Ok(state.present_script.pop_front().unwrap_or(PresentResult::Presented))
    }

    fn recreate(&mut self, extent: Extent2D) -> Result<()> {
        if extent.is_degenerate() {
            return Err(Error::SurfaceLost(format!(
                "cannot recreate swapchain with extent {}x{}",
                extent.width, extent.height
            )));
        }
        let mut state = self.state.lock().unwrap();
        if state.drift_on_recreate {
            return Err(Error::FormatDrift(
                "swapchain color format changed after recreation".to_string(),
            ));
        }
        if let Some(count) = state.image_count_after_recreate.take() {
            self.image_count = count;
        }
        state
            .events
            .push(format!("recreate({}x{})", extent.width, extent.height));
        self.extent = extent;
        self.next_image = 0;
        Ok(())
    }

    fn image_count(&self) -> usize {
        self.image_count
    }

    fn max_frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn render_pass(&self) -> Arc<dyn RenderPass> {
        Arc::new(MockRenderPass)
    }

    fn framebuffer(&self, image_index: u32) -> Result<Arc<dyn Framebuffer>> {
        if image_index as usize >= self.image_count {
            return Err(Error::InvalidResource(format!(
                "image index {} out of range ({} images)",
                image_index, self.image_count
            )));
        }
        Ok(Arc::new(MockFramebuffer))
    }
}

// ===== MOCK EXTENT PROVIDER =====

/// Extent provider with a scripted sequence of polls
pub struct MockExtentProvider {
    script: VecDeque<Extent2D>,
    fallback: Extent2D,
    /// Number of times the extent was polled
    pub polls: Arc<Mutex<usize>>,
    /// Number of times the provider blocked waiting for events
    pub waits: Arc<Mutex<usize>>,
}

impl MockExtentProvider {
    pub fn new(script: Vec<Extent2D>, fallback: Extent2D) -> Self {
        Self {
            script: script.into(),
            fallback,
            polls: Arc::new(Mutex::new(0)),
            waits: Arc::new(Mutex::new(0)),
        }
    }
}

impl SurfaceExtentProvider for MockExtentProvider {
    fn surface_extent(&mut self) -> Extent2D {
        *self.polls.lock().unwrap() += 1;
        self.script.pop_front().unwrap_or(self.fallback)
    }

    fn wait_events(&mut self) {
        *self.waits.lock().unwrap() += 1;
    }
}

// ===== MOCK GRAPHICS DEVICE =====

/// Shared, inspectable state of a [`MockGraphicsDevice`]
pub struct MockDeviceState {
    /// Ordered event log: create_command_list, create_buffer(...), wait_idle, ...
    pub events: Vec<String>,
    /// Command logs of every command list created, in creation order
    pub command_lists: Vec<Arc<Mutex<Vec<String>>>>,
    /// Every buffer created, in creation order
    pub buffers: Vec<Arc<MockBuffer>>,
    /// When set, binding-group creation fails with `Error::OutOfMemory`
    pub exhaust_binding_groups: bool,
}

/// Mock device context
pub struct MockGraphicsDevice {
    state: Arc<Mutex<MockDeviceState>>,
}

impl MockGraphicsDevice {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockDeviceState {
                events: Vec::new(),
                command_lists: Vec::new(),
                buffers: Vec::new(),
                exhaust_binding_groups: false,
            })),
        }
    }

    pub fn state(&self) -> Arc<Mutex<MockDeviceState>> {
        self.state.clone()
    }
}

impl GraphicsDevice for MockGraphicsDevice {
    fn create_swapchain(
        &mut self,
        _window: &Window,
        _extent: Extent2D,
    ) -> Result<Box<dyn Swapchain>> {
        // Tests construct MockSwapchain directly; there is no window here.
        Err(Error::InitializationFailed(
            "MockGraphicsDevice has no presentation surface".to_string(),
        ))
    }

    fn create_command_list(&mut self) -> Result<Box<dyn CommandList>> {
        let list = MockCommandList::new();
        let mut state = self.state.lock().unwrap();
        state.events.push("create_command_list".to_string());
        state.command_lists.push(list.commands.clone());
        Ok(Box::new(list))
    }

    fn create_buffer(
        &mut self,
        desc: BufferDesc,
        initial_data: Option<&[u8]>,
    ) -> Result<Arc<dyn Buffer>> {
        let buffer = Arc::new(MockBuffer::new(desc.size, desc.usage));
        if let Some(bytes) = initial_data {
            let mut data = buffer.data.lock().unwrap();
            data[..bytes.len()].copy_from_slice(bytes);
        }
        let mut state = self.state.lock().unwrap();
        state
            .events
            .push(format!("create_buffer({:?}, {})", desc.usage, desc.size));
        state.buffers.push(buffer.clone());
        Ok(buffer)
    }

    fn create_frame_binding_group(
        &mut self,
        _uniform_buffer: &Arc<dyn Buffer>,
    ) -> Result<Arc<dyn BindingGroup>> {
        let mut state = self.state.lock().unwrap();
        if state.exhaust_binding_groups {
            return Err(Error::OutOfMemory);
        }
        state.events.push("create_frame_binding_group".to_string());
        Ok(Arc::new(MockBindingGroup))
    }

    fn wait_idle(&self) -> Result<()> {
        self.state.lock().unwrap().events.push("wait_idle".to_string());
        Ok(())
    }
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
