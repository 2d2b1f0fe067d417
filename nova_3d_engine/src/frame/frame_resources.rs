/// FrameResourceSet - the N per-slot uniform buffers and binding groups
///
/// One slot per frame in flight. Each slot owns a host-visible, persistently
/// mapped uniform buffer sized for one `GlobalUniforms` and a binding group
/// pointing at it through the fixed per-frame layout (binding 0, uniform
/// buffer, all graphics stages). Slots are selected by frame index and never
/// shared across concurrently executing frames: the swapchain's per-slot
/// fence wait at acquire is the only thing that makes overwriting a slot
/// safe, and it is sufficient.

use std::sync::{Arc, Mutex};
use crate::error::{Error, Result};
use crate::frame::GlobalUniforms;
use crate::graphics_device::{
    GraphicsDevice, Buffer, BufferDesc, BufferUsage, BindingGroup,
};

struct FrameSlot {
    uniform_buffer: Arc<dyn Buffer>,
    binding_group: Arc<dyn BindingGroup>,
}

/// Per-frame GPU resources, one slot per frame in flight
pub struct FrameResourceSet {
    slots: Vec<FrameSlot>,
}

impl FrameResourceSet {
    /// Create one uniform buffer + binding group per frame slot
    pub fn new(
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        frames_in_flight: usize,
    ) -> Result<Self> {
        let mut device = device
            .lock()
            .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))?;

        let uniform_size = std::mem::size_of::<GlobalUniforms>() as u64;
        let mut slots = Vec::with_capacity(frames_in_flight);
        for _ in 0..frames_in_flight {
            let uniform_buffer = device.create_buffer(
                BufferDesc {
                    size: uniform_size,
                    usage: BufferUsage::Uniform,
                },
                None,
            )?;
            let binding_group = device.create_frame_binding_group(&uniform_buffer)?;
            slots.push(FrameSlot {
                uniform_buffer,
                binding_group,
            });
        }

        crate::engine_debug!(
            "nova3d::FrameResourceSet",
            "Created {} frame slots ({} uniform bytes each)",
            frames_in_flight,
            uniform_size
        );

        Ok(Self { slots })
    }

    /// Overwrite slot `frame_index`'s uniform buffer and flush it
    ///
    /// A faithful byte copy of `uniforms` into the mapped range followed by
    /// an explicit flush (host-visible memory is not assumed host-coherent).
    pub fn write_global_uniforms(
        &self,
        frame_index: usize,
        uniforms: &GlobalUniforms,
    ) -> Result<()> {
        let slot = self.slot(frame_index)?;
        let bytes = bytemuck::bytes_of(uniforms);
        slot.uniform_buffer.update(0, bytes)?;
        slot.uniform_buffer.flush(0, bytes.len() as u64)
    }

    /// Binding group for slot `frame_index`
    pub fn binding_group(&self, frame_index: usize) -> Result<&Arc<dyn BindingGroup>> {
        Ok(&self.slot(frame_index)?.binding_group)
    }

    /// Uniform buffer for slot `frame_index`
    pub fn uniform_buffer(&self, frame_index: usize) -> Result<&Arc<dyn Buffer>> {
        Ok(&self.slot(frame_index)?.uniform_buffer)
    }

    /// Number of frame slots
    pub fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn slot(&self, frame_index: usize) -> Result<&FrameSlot> {
        self.slots.get(frame_index).ok_or_else(|| {
            Error::InvalidResource(format!(
                "frame index {} out of range ({} slots)",
                frame_index,
                self.slots.len()
            ))
        })
    }
}

#[cfg(test)]
#[path = "frame_resources_tests.rs"]
mod tests;
