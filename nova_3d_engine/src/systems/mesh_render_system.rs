/// MeshRenderSystem - draws every scene object that carries a mesh

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};
use glam::Mat4;

use crate::error::{Error, Result};
use crate::frame::FrameInfo;
use crate::graphics_device::{Pipeline, ShaderStageFlags};
use crate::resource::MeshRegistry;

/// Per-draw constants for mesh rendering (128 bytes, the common push limit)
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct MeshPushConstants {
    pub model: Mat4,
    /// Normal matrix as a mat4 for std430 alignment; upper-left 3x3 is used
    pub normal: Mat4,
}

/// Forward mesh renderer
pub struct MeshRenderSystem {
    pipeline: Arc<dyn Pipeline>,
}

impl MeshRenderSystem {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Record draws for all meshed objects into the frame's command list
    ///
    /// Objects are visited in id order so recorded command streams are
    /// reproducible run to run.
    pub fn render(&self, frame: &mut FrameInfo<'_>, registry: &MeshRegistry) -> Result<()> {
        let cmd = &mut *frame.command_list;
        cmd.bind_pipeline(&self.pipeline)?;
        cmd.bind_binding_group(&self.pipeline, 0, frame.global_binding_group)?;

        let mut objects: Vec<_> = frame
            .scene
            .objects()
            .filter(|object| object.mesh.is_some())
            .collect();
        objects.sort_by_key(|object| object.id());

        for object in objects {
            let Some(mesh_key) = object.mesh else { continue };
            let mesh = registry.get(mesh_key).ok_or_else(|| {
                Error::InvalidResource(format!(
                    "object {} references a mesh no longer in the registry",
                    object.id().raw()
                ))
            })?;

            let push = MeshPushConstants {
                model: object.transform.matrix(),
                normal: Mat4::from_mat3(object.transform.normal_matrix()),
            };
            cmd.push_constants(ShaderStageFlags::ALL_GRAPHICS, 0, bytemuck::bytes_of(&push))?;
            mesh.bind(cmd)?;
            mesh.draw(cmd)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "mesh_render_system_tests.rs"]
mod tests;
