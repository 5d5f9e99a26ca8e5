//! Placement collision checks against a geometry index

use std::collections::HashSet;

use glam::Mat4;
use stager_geometry::TriangleMesh;

use crate::filter::PropertyFilter;
use crate::index::GeometryIndex;
use crate::object::ObjectId;
use crate::scene::Scene;

/// Objects ignored by a query, by identity
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<ObjectId>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// All objects of `scene` passing `filter`, valid or not
    pub fn from_filter(scene: &Scene, filter: &PropertyFilter) -> Self {
        scene
            .iter()
            .filter(|(_, object)| filter.matches(object))
            .map(|(id, _)| id)
            .collect()
    }

    pub fn insert(&mut self, id: ObjectId) -> bool {
        self.0.insert(id)
    }

    /// Copy of this set with one more id
    pub fn with(&self, id: ObjectId) -> Self {
        let mut set = self.clone();
        set.insert(id);
        set
    }

    #[inline]
    pub fn contains(&self, id: ObjectId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ObjectId> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = ObjectId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Extend<ObjectId> for ExclusionSet {
    fn extend<I: IntoIterator<Item = ObjectId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

/// Answers "would this mesh, placed here, overlap the indexed scene?"
#[derive(Debug, Clone, Copy)]
pub struct CollisionChecker<'a> {
    index: &'a GeometryIndex,
}

impl<'a> CollisionChecker<'a> {
    pub fn new(index: &'a GeometryIndex) -> Self {
        Self { index }
    }

    /// True when `mesh` at `transform` overlaps any non-excluded object.
    /// Touching counts as overlapping.
    pub fn placement_collides(&self, mesh: &TriangleMesh, transform: &Mat4, exclusion: &ExclusionSet) -> bool {
        self.index.overlaps(mesh, transform, exclusion)
    }

    /// Ids of every non-excluded object the placement overlaps
    pub fn colliding_objects(&self, mesh: &TriangleMesh, transform: &Mat4, exclusion: &ExclusionSet) -> Vec<ObjectId> {
        self.index.overlapping_objects(mesh, transform, exclusion)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::SceneObject;
    use crate::scene::Scene;
    use glam::Vec3;
    use std::sync::Arc;

    #[test]
    fn test_exclusion_removes_only_named_object() {
        let cube = Arc::new(TriangleMesh::cuboid(Vec3::splat(0.5)));
        let mut scene = Scene::new();
        let a = scene.insert(SceneObject::new("a").with_mesh(cube.clone()));
        let b = scene.insert(SceneObject::new("b").with_mesh(cube.clone()));
        let index = GeometryIndex::build(&scene);
        let checker = CollisionChecker::new(&index);

        let exclusion: ExclusionSet = [a].into_iter().collect();
        assert!(checker.placement_collides(&cube, &Mat4::IDENTITY, &exclusion));
        assert_eq!(checker.colliding_objects(&cube, &Mat4::IDENTITY, &exclusion), vec![b]);

        let both = exclusion.with(b);
        assert!(!checker.placement_collides(&cube, &Mat4::IDENTITY, &both));
    }
}
