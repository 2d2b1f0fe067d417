/// PointLightSystem - fills the frame's light array and draws light billboards
///
/// `update` only reads the scene: light animation (rotation etc.) is the
/// application update step's job, keeping simulation state out of the render
/// path.

use std::sync::Arc;
use bytemuck::{Pod, Zeroable};

use crate::error::Result;
use crate::frame::{FrameInfo, GlobalUniforms, PointLightUniform, MAX_POINT_LIGHTS};
use crate::graphics_device::{Pipeline, ShaderStageFlags};
use crate::scene::Scene;

const LOG_SOURCE: &str = "nova3d::PointLightSystem";

/// Per-draw constants for one light billboard
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct PointLightPushConstants {
    /// World position; w unused
    pub position: [f32; 4],
    /// Light color; w carries the intensity
    pub color: [f32; 4],
    pub radius: f32,
    pub _padding: [f32; 3],
}

/// Point light billboard renderer
pub struct PointLightSystem {
    pipeline: Arc<dyn Pipeline>,
}

impl PointLightSystem {
    pub fn new(pipeline: Arc<dyn Pipeline>) -> Self {
        Self { pipeline }
    }

    /// Fill the frame's bounded light array from the scene
    ///
    /// Lights are taken in id order; anything past the array capacity is
    /// dropped for this frame with a warning.
    pub fn update(&self, scene: &Scene, uniforms: &mut GlobalUniforms) {
        let mut lights: Vec<_> = scene
            .objects()
            .filter(|object| object.point_light.is_some())
            .collect();
        lights.sort_by_key(|object| object.id());

        if lights.len() > MAX_POINT_LIGHTS {
            crate::engine_warn!(
                LOG_SOURCE,
                "{} point lights in scene, only {} fit the frame uniforms",
                lights.len(),
                MAX_POINT_LIGHTS
            );
        }

        let mut count = 0;
        for object in lights.into_iter().take(MAX_POINT_LIGHTS) {
            // filter above guarantees the attribute is present
            let Some(light) = object.point_light else { continue };
            uniforms.point_lights[count] = PointLightUniform::new(
                object.transform.translation,
                object.color,
                light.intensity,
            );
            count += 1;
        }
        uniforms.num_lights = count as u32;
    }

    /// Draw a 6-vertex billboard quad per light
    pub fn render(&self, frame: &mut FrameInfo<'_>) -> Result<()> {
        let mut lights: Vec<_> = frame
            .scene
            .objects()
            .filter(|object| object.point_light.is_some())
            .collect();
        lights.sort_by_key(|object| object.id());

        if lights.is_empty() {
            return Ok(());
        }

        let cmd = &mut *frame.command_list;
        cmd.bind_pipeline(&self.pipeline)?;
        cmd.bind_binding_group(&self.pipeline, 0, frame.global_binding_group)?;

        for object in lights.into_iter().take(MAX_POINT_LIGHTS) {
            let Some(light) = object.point_light else { continue };
            let push = PointLightPushConstants {
                position: object.transform.translation.extend(1.0).to_array(),
                color: object.color.extend(light.intensity).to_array(),
                radius: light.radius,
                _padding: [0.0; 3],
            };
            cmd.push_constants(ShaderStageFlags::ALL_GRAPHICS, 0, bytemuck::bytes_of(&push))?;
            cmd.draw(6, 0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "point_light_system_tests.rs"]
mod tests;
