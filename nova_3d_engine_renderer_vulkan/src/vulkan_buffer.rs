/// Buffer - Vulkan implementation of the Buffer trait

use nova_3d_engine::nova3d::render::{Buffer as RendererBuffer, BufferUsage};
use nova_3d_engine::nova3d::{Error, Result};
use nova_3d_engine::engine_bail;
use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use crate::vulkan_context::GpuContext;

const LOG_SOURCE: &str = "nova3d::vulkan";

/// Vulkan buffer implementation
///
/// Uniform buffers live in CpuToGpu memory and stay persistently mapped for
/// their whole lifetime. Vertex and index buffers live in GpuOnly memory and
/// are filled once through a staging transfer at creation.
pub struct Buffer {
    /// Shared GPU context
    context: Arc<GpuContext>,
    /// Vulkan buffer handle
    pub(crate) buffer: vk::Buffer,
    /// Memory allocation (Option so Drop can take it for freeing)
    allocation: Option<Allocation>,
    /// Buffer size in bytes
    size: u64,
    /// Usage the buffer was created with
    usage: BufferUsage,
}

impl Buffer {
    pub(crate) fn new(
        context: Arc<GpuContext>,
        buffer: vk::Buffer,
        allocation: Allocation,
        size: u64,
        usage: BufferUsage,
    ) -> Self {
        Self {
            context,
            buffer,
            allocation: Some(allocation),
            size,
            usage,
        }
    }
}

impl RendererBuffer for Buffer {
    fn update(&self, offset: u64, data: &[u8]) -> Result<()> {
        let allocation = match &self.allocation {
            Some(a) => a,
            None => return Err(Error::InvalidResource("buffer allocation already freed".to_string())),
        };

        let mapped = match allocation.mapped_ptr() {
            Some(ptr) => ptr.as_ptr() as *mut u8,
            None => {
                return Err(Error::InvalidResource(format!(
                    "update called on a buffer without mapped memory (usage: {:?})",
                    self.usage
                )))
            }
        };

        if offset + data.len() as u64 > self.size {
            return Err(Error::InvalidResource(format!(
                "update of {} bytes at offset {} exceeds buffer size {}",
                data.len(),
                offset,
                self.size
            )));
        }

        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                mapped.add(offset as usize),
                data.len(),
            );
        }

        Ok(())
    }

    fn flush(&self, offset: u64, size: u64) -> Result<()> {
        let allocation = match &self.allocation {
            Some(a) => a,
            None => return Err(Error::InvalidResource("buffer allocation already freed".to_string())),
        };

        if allocation.mapped_ptr().is_none() {
            return Err(Error::InvalidResource(format!(
                "flush called on a buffer without mapped memory (usage: {:?})",
                self.usage
            )));
        }

        // Flush ranges must be aligned to nonCoherentAtomSize. Align the
        // start down and extend the size to cover the requested range; fall
        // back to WHOLE_SIZE when the padded range would overrun the
        // allocation.
        let atom = self.context.non_coherent_atom_size;
        let aligned_offset = (offset / atom) * atom;
        let mut aligned_size = (size + (offset - aligned_offset)).div_ceil(atom) * atom;
        if aligned_offset + aligned_size > allocation.size() {
            aligned_size = vk::WHOLE_SIZE;
        }

        let range = vk::MappedMemoryRange::default()
            .memory(unsafe { allocation.memory() })
            .offset(allocation.offset() + aligned_offset)
            .size(aligned_size);

        unsafe {
            if let Err(e) = self.context.device.flush_mapped_memory_ranges(&[range]) {
                engine_bail!(LOG_SOURCE, "Failed to flush mapped memory range: {:?}", e);
            }
        }

        Ok(())
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn usage(&self) -> BufferUsage {
        self.usage
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            if let Ok(mut allocator) = self.context.allocator.lock() {
                let _ = allocator.free(allocation);
            }
        }
        unsafe {
            self.context.device.destroy_buffer(self.buffer, None);
        }
    }
}
