/// FrameInfo - everything a render system needs for one frame
///
/// Assembled fresh by the application between begin_frame and end_frame;
/// contents are fully overwritten each iteration. Render systems borrow the
/// scene read-only for the duration of the frame.

use std::sync::Arc;
use crate::camera::Camera;
use crate::graphics_device::{CommandList, BindingGroup};
use crate::scene::Scene;

/// Per-frame context handed to render systems
pub struct FrameInfo<'a> {
    /// Index of the frame slot in use
    pub frame_index: usize,
    /// Seconds since the previous frame
    pub frame_time: f32,
    /// Command list of the frame in progress
    pub command_list: &'a mut dyn CommandList,
    /// Binding group of slot `frame_index` (set 0, per-frame globals)
    pub global_binding_group: &'a Arc<dyn BindingGroup>,
    pub camera: &'a Camera,
    pub scene: &'a Scene,
}
