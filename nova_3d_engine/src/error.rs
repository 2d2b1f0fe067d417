//! Error types for the Nova3D engine
//!
//! This module defines the error types used throughout the engine.
//! Stale-surface conditions (out-of-date / suboptimal swapchains) are NOT
//! errors: they are reported through dedicated result enums on the swapchain
//! interface and handled by recreating the chain. Programming errors
//! (mismatched frame tokens, begin-frame while a frame is in progress) are
//! invariant violations and panic instead of returning an `Error`.

use std::fmt;

/// Result type for Nova3D engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Nova3D engine errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Backend-specific error (device-loss class, unrecoverable)
    BackendError(String),

    /// Out of GPU memory, or descriptor/buffer allocation exhausted
    OutOfMemory,

    /// Invalid resource (buffer, mesh, framebuffer, etc.)
    InvalidResource(String),

    /// Initialization failed (engine, device, subsystems)
    InitializationFailed(String),

    /// Surface extent is degenerate (zero width or height); the caller must
    /// poll the surface until a non-zero extent is observed before creating
    /// or recreating a swapchain
    SurfaceLost(String),

    /// Swapchain recreation changed the color or depth format the dependent
    /// pipelines were built against; unrecoverable without a full pipeline
    /// rebuild
    FormatDrift(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::OutOfMemory => write!(f, "Out of GPU memory"),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::SurfaceLost(msg) => write!(f, "Surface lost: {}", msg),
            Error::FormatDrift(msg) => write!(f, "Swapchain format drift: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

/// Log an ERROR message and produce an [`Error::BackendError`] in one step.
///
/// # Example
///
/// ```no_run
/// # use nova_3d_engine::{engine_err, nova3d::Result};
/// # fn create_fence() -> Result<()> {
/// # let e = "timeout";
/// return Err(engine_err!("nova3d::vulkan", "Failed to create fence: {:?}", e));
/// # }
/// ```
#[macro_export]
macro_rules! engine_err {
    ($source:expr, $($arg:tt)*) => {{
        $crate::engine_error!($source, $($arg)*);
        $crate::nova3d::Error::BackendError(format!($($arg)*))
    }};
}

/// Log an ERROR message and return early with an [`Error::BackendError`].
#[macro_export]
macro_rules! engine_bail {
    ($source:expr, $($arg:tt)*) => {
        return Err($crate::engine_err!($source, $($arg)*))
    };
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
