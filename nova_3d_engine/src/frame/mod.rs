/// Frame module - frame lifecycle and per-frame GPU resources
///
/// The frame orchestrator sequences begin-frame/end-frame against the
/// swapchain; the frame resource set owns the N per-slot uniform buffers and
/// binding groups; global uniforms is the POD struct written into a slot's
/// buffer each frame.

pub mod orchestrator;
pub mod frame_resources;
pub mod global_uniforms;
pub mod frame_info;

pub use orchestrator::*;
pub use frame_resources::*;
pub use global_uniforms::*;
pub use frame_info::*;
