/*!
# Nova 3D Engine

Core traits and types for the Nova 3D rendering engine: the frame lifecycle
and resource-synchronization layer of a forward renderer.

The engine is backend-agnostic: GPU access goes through trait objects
(`GraphicsDevice`, `Swapchain`, `CommandList`, `Buffer`, `BindingGroup`,
`Pipeline`), implemented by a backend crate (Vulkan via
`nova_3d_engine_renderer_vulkan`).

## Architecture

- **FrameOrchestrator**: begin-frame/end-frame state machine; swapchain
  acquisition, recreation on resize/staleness, frame-slot cycling
- **FrameResourceSet**: N per-slot uniform buffers + binding groups
  (N = max frames in flight)
- **Scene**: the store of renderable objects and point lights
- **MeshRegistry**: arena of shared geometry
- **Render systems**: mesh and point-light recording over a frame's
  command list

The frame loop is single-threaded; CPU/GPU overlap is bounded by the
swapchain's per-slot fences.
*/

// Internal modules
mod error;
mod engine;
pub mod log;
pub mod graphics_device;
pub mod frame;
pub mod scene;
pub mod camera;
pub mod resource;
pub mod systems;

// Main nova3d namespace module
pub mod nova3d {
    // Error types
    pub use crate::error::{Error, Result};

    // Engine services (logging singleton)
    pub use crate::engine::Engine;

    // Logging sub-module (types only, NOT macros)
    pub mod log {
        pub use crate::log::{Logger, LogEntry, LogSeverity, DefaultLogger};
        // Note: engine_* macros are NOT re-exported here - they live at the crate root
    }

    // Render sub-module with all device types and the frame layer
    pub mod render {
        pub use crate::graphics_device::*;
        pub use crate::frame::*;
        pub use crate::systems::*;
    }

    // Scene sub-module
    pub mod scene {
        pub use crate::scene::*;
    }

    // Resource sub-module
    pub mod resource {
        pub use crate::resource::*;
    }

    // Camera sub-module
    pub mod camera {
        pub use crate::camera::*;
    }
}

// Re-export math library at crate root
pub use glam;
