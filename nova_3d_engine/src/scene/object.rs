/// SceneObject - one renderable or light-emitting entry of the scene store

use glam::Vec3;
use crate::resource::MeshKey;
use crate::scene::Transform;

/// Stable identifier of a scene object
///
/// Monotonically increasing, unique within one scene store. Never reused,
/// even after the object is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(pub(crate) u64);

impl ObjectId {
    /// The raw numeric value, for logs and debugging
    pub fn raw(&self) -> u64 {
        self.0
    }
}

/// Optional light-emission attribute of a scene object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointLight {
    pub intensity: f32,
    /// Billboard radius of the light quad
    pub radius: f32,
}

/// One entry of the scene store
///
/// Components are optional fields, not subclasses: an object with a mesh is
/// renderable geometry, one with a point light is a light emitter, and an
/// object may be both or neither.
#[derive(Debug, Clone)]
pub struct SceneObject {
    id: ObjectId,
    pub transform: Transform,
    pub color: Vec3,
    /// Shared mesh handle into the mesh registry
    pub mesh: Option<MeshKey>,
    pub point_light: Option<PointLight>,
}

impl SceneObject {
    pub(crate) fn new(id: ObjectId) -> Self {
        Self {
            id,
            transform: Transform::default(),
            color: Vec3::ONE,
            mesh: None,
            point_light: None,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }
}
