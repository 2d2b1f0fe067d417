/// Mesh and MeshRegistry - shared geometry, arena-indexed
///
/// Mesh data is shared across scene objects through registry keys: objects
/// hold a `MeshKey`, never a copy of the geometry. The registry owns the
/// GPU buffers; removing a mesh drops them once no draw is in flight
/// (the caller recycles meshes between frames, under the same contract as
/// scene mutation).

use std::sync::{Arc, Mutex};
use bytemuck::{Pod, Zeroable};
use slotmap::SlotMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    GraphicsDevice, Buffer, BufferDesc, BufferUsage, CommandList, IndexType,
};

slotmap::new_key_type! {
    /// Handle into a [`MeshRegistry`]
    pub struct MeshKey;
}

/// One vertex of a mesh
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
}

/// GPU-resident geometry: a vertex buffer and an optional index buffer
pub struct Mesh {
    vertex_buffer: Arc<dyn Buffer>,
    vertex_count: u32,
    index_buffer: Option<Arc<dyn Buffer>>,
    index_count: u32,
}

impl Mesh {
    /// Upload geometry into device-local buffers
    ///
    /// Vertex and index data go through a staging transfer inside the
    /// device's `create_buffer`.
    pub fn new(
        device: &Arc<Mutex<dyn GraphicsDevice>>,
        vertices: &[Vertex],
        indices: Option<&[u32]>,
    ) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(Error::InvalidResource(format!(
                "mesh needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }

        let mut device = device
            .lock()
            .map_err(|_| Error::BackendError("Graphics device lock poisoned".to_string()))?;

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let vertex_buffer = device.create_buffer(
            BufferDesc {
                size: vertex_bytes.len() as u64,
                usage: BufferUsage::Vertex,
            },
            Some(vertex_bytes),
        )?;

        let (index_buffer, index_count) = match indices {
            Some(indices) if !indices.is_empty() => {
                let index_bytes: &[u8] = bytemuck::cast_slice(indices);
                let buffer = device.create_buffer(
                    BufferDesc {
                        size: index_bytes.len() as u64,
                        usage: BufferUsage::Index,
                    },
                    Some(index_bytes),
                )?;
                (Some(buffer), indices.len() as u32)
            }
            _ => (None, 0),
        };

        Ok(Self {
            vertex_buffer,
            vertex_count: vertices.len() as u32,
            index_buffer,
            index_count,
        })
    }

    /// Bind the vertex (and index) buffers
    pub fn bind(&self, cmd: &mut dyn CommandList) -> Result<()> {
        cmd.bind_vertex_buffer(&self.vertex_buffer, 0)?;
        if let Some(index_buffer) = &self.index_buffer {
            cmd.bind_index_buffer(index_buffer, 0, IndexType::U32)?;
        }
        Ok(())
    }

    /// Issue the draw call (indexed when an index buffer is present)
    pub fn draw(&self, cmd: &mut dyn CommandList) -> Result<()> {
        if self.index_buffer.is_some() {
            cmd.draw_indexed(self.index_count, 0, 0)
        } else {
            cmd.draw(self.vertex_count, 0)
        }
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_indexed(&self) -> bool {
        self.index_buffer.is_some()
    }
}

/// Arena of shared meshes
pub struct MeshRegistry {
    meshes: SlotMap<MeshKey, Mesh>,
}

impl MeshRegistry {
    pub fn new() -> Self {
        Self {
            meshes: SlotMap::with_key(),
        }
    }

    pub fn insert(&mut self, mesh: Mesh) -> MeshKey {
        self.meshes.insert(mesh)
    }

    pub fn get(&self, key: MeshKey) -> Option<&Mesh> {
        self.meshes.get(key)
    }

    pub fn remove(&mut self, key: MeshKey) -> Option<Mesh> {
        self.meshes.remove(key)
    }

    pub fn contains(&self, key: MeshKey) -> bool {
        self.meshes.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.meshes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.meshes.is_empty()
    }
}

impl Default for MeshRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
