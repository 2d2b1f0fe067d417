/// Pipeline trait - opaque graphics pipeline handle
///
/// Pipeline-state construction (shaders, vertex layout, blend state) is a
/// backend concern; the core only binds pipelines and pushes constants
/// through them.

/// Opaque graphics pipeline
pub trait Pipeline: Send + Sync {}
