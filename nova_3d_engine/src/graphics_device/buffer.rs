/// Buffer trait - GPU buffer resources

use crate::error::Result;

/// How a buffer will be used, which decides its memory placement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    /// Vertex data, device-local, filled through a staging transfer
    Vertex,
    /// Index data, device-local, filled through a staging transfer
    Index,
    /// Per-frame uniform data, host-visible and persistently mapped
    Uniform,
}

/// Description of a buffer to create
#[derive(Debug, Clone, Copy)]
pub struct BufferDesc {
    pub size: u64,
    pub usage: BufferUsage,
}

/// GPU buffer resource
///
/// Uniform buffers are persistently mapped: `update` copies into the mapped
/// range and `flush` makes the write visible to the GPU (host-visible memory
/// is not guaranteed host-coherent). Device-local buffers reject `update`.
pub trait Buffer: Send + Sync {
    /// Overwrite `data.len()` bytes at `offset` in the mapped range
    fn update(&self, offset: u64, data: &[u8]) -> Result<()>;

    /// Flush `size` bytes at `offset` so the GPU observes prior `update`s
    fn flush(&self, offset: u64, size: u64) -> Result<()>;

    /// Buffer size in bytes
    fn size(&self) -> u64;

    /// Usage the buffer was created with
    fn usage(&self) -> BufferUsage;
}
