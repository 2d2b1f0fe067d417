//! Unit tests for error.rs
//!
//! Tests all Error variants and their implementations (Display, Debug, Clone,
//! std::error::Error), plus the engine_bail! early-return macro.

use crate::error::{Error, Result};

// ============================================================================
// ERROR DISPLAY TESTS
// ============================================================================

#[test]
fn test_backend_error_display() {
    let err = Error::BackendError("queue submit failed".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Backend error"));
    assert!(display.contains("queue submit failed"));
}

#[test]
fn test_out_of_memory_display() {
    let err = Error::OutOfMemory;
    let display = format!("{}", err);
    assert_eq!(display, "Out of GPU memory");
}

#[test]
fn test_invalid_resource_display() {
    let err = Error::InvalidResource("mesh key not found".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Invalid resource"));
    assert!(display.contains("mesh key not found"));
}

#[test]
fn test_initialization_failed_display() {
    let err = Error::InitializationFailed("no suitable GPU".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Initialization failed"));
    assert!(display.contains("no suitable GPU"));
}

#[test]
fn test_surface_lost_display() {
    let err = Error::SurfaceLost("surface extent is 0x600".to_string());
    let display = format!("{}", err);
    assert!(display.contains("Surface lost"));
    assert!(display.contains("0x600"));
}

#[test]
fn test_format_drift_display() {
    let err = Error::FormatDrift("color format changed after recreation".to_string());
    let display = format!("{}", err);
    assert!(display.contains("format drift"));
    assert!(display.contains("color format changed"));
}

// ============================================================================
// TRAIT IMPLEMENTATION TESTS
// ============================================================================

#[test]
fn test_error_implements_std_error() {
    fn assert_std_error<T: std::error::Error>() {}
    assert_std_error::<Error>();
}

#[test]
fn test_error_clone() {
    let err = Error::FormatDrift("depth changed".to_string());
    let cloned = err.clone();
    assert_eq!(format!("{}", err), format!("{}", cloned));
}

#[test]
fn test_error_debug() {
    let err = Error::SurfaceLost("0x0".to_string());
    let debug_str = format!("{:?}", err);
    assert!(debug_str.contains("SurfaceLost"));
    assert!(debug_str.contains("0x0"));
}

#[test]
fn test_result_alias() {
    fn ok_op() -> Result<u32> {
        Ok(7)
    }
    fn failing_op() -> Result<u32> {
        Err(Error::OutOfMemory)
    }

    assert_eq!(ok_op().unwrap(), 7);
    assert!(failing_op().is_err());
}

// ============================================================================
// MACRO TESTS
// ============================================================================

#[test]
fn test_engine_bail_returns_early() {
    fn guarded(fail: bool) -> Result<u32> {
        if fail {
            crate::engine_bail!("nova3d::test", "guard tripped: {}", 42);
        }
        Ok(1)
    }

    assert_eq!(guarded(false).unwrap(), 1);
    match guarded(true) {
        Err(Error::BackendError(msg)) => assert_eq!(msg, "guard tripped: 42"),
        other => panic!("expected BackendError, got {:?}", other),
    }
}

#[test]
fn test_engine_err_produces_backend_error() {
    let err = crate::engine_err!("nova3d::test", "fence timeout after {} ms", 100);
    match err {
        Error::BackendError(msg) => assert_eq!(msg, "fence timeout after 100 ms"),
        other => panic!("expected BackendError, got {:?}", other),
    }
}
