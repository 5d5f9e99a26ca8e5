//! Scene arena owning all objects

use crate::error::{Result, SceneError};
use crate::filter::PropertyFilter;
use crate::object::{ObjectId, SceneObject};

/// Owner of every [`SceneObject`]
///
/// Objects are never physically removed; invalidation hides them from
/// selection and from geometry indices built afterwards.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<SceneObject>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a scene from loaded objects, in order
    pub fn from_objects(objects: impl IntoIterator<Item = SceneObject>) -> Self {
        Self {
            objects: objects.into_iter().collect(),
        }
    }

    /// Add an object and return its id
    pub fn insert(&mut self, object: SceneObject) -> ObjectId {
        let id = ObjectId::from_index(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(id.index())
    }

    /// Like [`Scene::get`] but reports a missing id as an error
    pub fn object(&self, id: ObjectId) -> Result<&SceneObject> {
        self.get(id).ok_or(SceneError::ObjectNotFound(id))
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(id.index())
    }

    /// Mark an object invalid; returns whether it was valid before
    pub fn invalidate(&mut self, id: ObjectId) -> Result<bool> {
        let object = self
            .objects
            .get_mut(id.index())
            .ok_or(SceneError::ObjectNotFound(id))?;
        let was_valid = object.is_valid();
        object.invalidate();
        Ok(was_valid)
    }

    pub fn is_valid(&self, id: ObjectId) -> bool {
        self.get(id).map(SceneObject::is_valid).unwrap_or(false)
    }

    /// Total number of objects, valid or not
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn valid_count(&self) -> usize {
        self.objects.iter().filter(|o| o.is_valid()).count()
    }

    /// All objects with their ids
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId::from_index(i as u32), object))
    }

    /// Valid objects with their ids
    pub fn valid_objects(&self) -> impl Iterator<Item = (ObjectId, &SceneObject)> {
        self.iter().filter(|(_, object)| object.is_valid())
    }

    /// Ids of valid objects passing `filter`, in insertion order
    pub fn select(&self, filter: &PropertyFilter) -> Vec<ObjectId> {
        self.valid_objects()
            .filter(|(_, object)| filter.matches(object))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn furnished_scene() -> Scene {
        Scene::from_objects([
            SceneObject::new("floor").with_property("type", "Floor"),
            SceneObject::new("chair_a").with_property("coarse_grained_class", "chair"),
            SceneObject::new("table").with_property("coarse_grained_class", "table"),
            SceneObject::new("chair_b").with_property("coarse_grained_class", "chair"),
        ])
    }

    #[test]
    fn test_select_by_property() {
        let scene = furnished_scene();
        let chairs = scene.select(&PropertyFilter::equals("coarse_grained_class", "chair"));
        assert_eq!(chairs, vec![ObjectId::from_index(1), ObjectId::from_index(3)]);
    }

    #[test]
    fn test_invalid_objects_are_not_selected() {
        let mut scene = furnished_scene();
        assert!(scene.invalidate(ObjectId::from_index(1)).unwrap());
        assert!(!scene.invalidate(ObjectId::from_index(1)).unwrap());

        let chairs = scene.select(&PropertyFilter::equals("coarse_grained_class", "chair"));
        assert_eq!(chairs, vec![ObjectId::from_index(3)]);
        assert_eq!(scene.valid_count(), 3);
        assert_eq!(scene.len(), 4);
    }

    #[test]
    fn test_unknown_id() {
        let mut scene = furnished_scene();
        let missing = ObjectId::from_index(42);
        assert!(scene.get(missing).is_none());
        assert!(!scene.is_valid(missing));
        assert!(matches!(scene.invalidate(missing), Err(SceneError::ObjectNotFound(_))));
    }

    #[test]
    fn test_insert_assigns_next_id() {
        let mut scene = furnished_scene();
        let id = scene.insert(SceneObject::new("lamp"));
        assert_eq!(id, ObjectId::from_index(4));
        assert_eq!(scene.object(id).unwrap().name, "lamp");
    }
}
