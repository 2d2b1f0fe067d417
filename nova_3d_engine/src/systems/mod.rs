/// Render systems - consumers of a frame's command list and globals
///
/// Each system binds its own pipeline, binds the per-frame binding group at
/// set 0, and pushes small per-draw constants before each draw. Systems read
/// the scene, never mutate it; animation belongs to the application's update
/// step.

pub mod mesh_render_system;
pub mod point_light_system;

pub use mesh_render_system::*;
pub use point_light_system::*;
