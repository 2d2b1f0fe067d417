/// Scene - the store of renderable objects and point lights
///
/// Maps stable object identifiers to objects. The identifier generator is
/// owned by the store and seeded at construction, so two stores hand out
/// independent, deterministic id sequences with no hidden global counter.
///
/// Concurrency contract: the scene is read-only during the render phase of a
/// frame and mutated freely between frames by the application layer. The
/// frame loop is single-threaded, so no locking is needed.

use glam::Vec3;
use rustc_hash::FxHashMap;
use crate::scene::{ObjectId, SceneObject, PointLight};

/// Scene store
pub struct Scene {
    objects: FxHashMap<ObjectId, SceneObject>,
    next_id: u64,
}

impl Scene {
    pub fn new() -> Self {
        Self {
            objects: FxHashMap::default(),
            next_id: 0,
        }
    }

    /// Create an empty object and return its id
    pub fn create_object(&mut self) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        self.objects.insert(id, SceneObject::new(id));
        id
    }

    /// Create an object carrying a point light
    pub fn create_point_light(&mut self, intensity: f32, radius: f32, color: Vec3) -> ObjectId {
        let id = ObjectId(self.next_id);
        self.next_id += 1;
        let mut object = SceneObject::new(id);
        object.color = color;
        object.point_light = Some(PointLight { intensity, radius });
        self.objects.insert(id, object);
        id
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    /// Remove an object; its id is never reused
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        self.objects.remove(&id)
    }

    /// Iterate all objects (arbitrary order)
    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// Iterate all objects mutably (arbitrary order)
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SceneObject> {
        self.objects.values_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "scene_tests.rs"]
mod tests;
