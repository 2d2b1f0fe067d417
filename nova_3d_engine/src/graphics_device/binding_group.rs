/// BindingGroup trait - an immutable set of GPU resource bindings
///
/// A binding group is the bound descriptor set consumed by shader stages.
/// The engine uses one fixed, process-wide layout for per-frame globals:
/// binding 0 = uniform buffer, visible to all graphics stages, count 1.

/// Immutable group of resource bindings (descriptor set)
///
/// Marker trait: the group is fully described at creation and carries no
/// operations of its own; command lists bind it by set index.
pub trait BindingGroup: Send + Sync {}
