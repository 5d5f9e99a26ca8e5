//! Geometry index: a read-only spatial snapshot of valid scene objects
//!
//! Two levels: a BVH over world-space object bounds, and the per-mesh
//! triangle BVH each [`TriangleMesh`] carries. The index never observes
//! later scene mutation; rebuild it instead.

use std::sync::Arc;

use glam::{Mat4, Vec3};
use stager_geometry::{Aabb, Bvh, Ray, TriangleMesh};

use crate::collision::ExclusionSet;
use crate::object::ObjectId;
use crate::scene::Scene;

/// Closest hit of a ray cast against the index
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit {
    pub object: ObjectId,
    /// Distance along the ray from its origin
    pub distance: f32,
    /// World-space hit point
    pub point: Vec3,
}

#[derive(Debug, Clone)]
struct IndexedObject {
    id: ObjectId,
    mesh: Arc<TriangleMesh>,
    local_to_world: Mat4,
    world_to_local: Mat4,
    bounds: Aabb,
}

/// Immutable snapshot of mesh-bearing valid objects
#[derive(Debug, Clone, Default)]
pub struct GeometryIndex {
    entries: Vec<IndexedObject>,
    bvh: Bvh,
}

impl GeometryIndex {
    /// Index every valid, mesh-bearing object of the scene
    pub fn build(scene: &Scene) -> Self {
        Self::from_candidates(scene, scene.valid_objects().map(|(id, _)| id))
    }

    /// Index a subset of the scene; invalid and mesh-less ids are skipped
    pub fn build_from(scene: &Scene, ids: impl IntoIterator<Item = ObjectId>) -> Self {
        Self::from_candidates(scene, ids)
    }

    fn from_candidates(scene: &Scene, ids: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut entries = Vec::new();
        for id in ids {
            let Some(object) = scene.get(id).filter(|o| o.is_valid()) else {
                continue;
            };
            let Some(mesh) = object.mesh.as_ref().filter(|m| !m.is_empty()) else {
                continue;
            };
            let determinant = object.transform.determinant();
            if !determinant.is_finite() || determinant.abs() < f32::EPSILON {
                log::warn!("Skipping '{}' ({}): degenerate transform", object.name, id);
                continue;
            }
            entries.push(IndexedObject {
                id,
                mesh: Arc::clone(mesh),
                local_to_world: object.transform,
                world_to_local: object.transform.inverse(),
                bounds: mesh.bounds().transform(&object.transform),
            });
        }

        let bounds: Vec<Aabb> = entries.iter().map(|e| e.bounds).collect();
        let bvh = Bvh::build(&bounds);
        log::debug!("Built geometry index over {} objects", entries.len());
        Self { entries, bvh }
    }

    /// Number of indexed objects
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Ids in index order
    pub fn object_ids(&self) -> impl Iterator<Item = ObjectId> + '_ {
        self.entries.iter().map(|e| e.id)
    }

    /// World bounds of all indexed geometry
    pub fn bounds(&self) -> Aabb {
        self.bvh.bounds()
    }

    /// World bounds of one indexed object
    pub fn object_bounds(&self, id: ObjectId) -> Option<Aabb> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.bounds)
    }

    /// Closest hit within `max_distance`, ignoring excluded objects
    ///
    /// `ray` should have a normalized direction so distances are metric.
    pub fn cast_ray(&self, ray: &Ray, max_distance: f32, exclusion: &ExclusionSet) -> Option<RayHit> {
        self.bvh
            .cast_ray(ray, max_distance, |slot, closest| {
                let entry = &self.entries[slot];
                if exclusion.contains(entry.id) {
                    return None;
                }
                // Unnormalized local ray keeps the world parameterization
                let local = ray.transform(&entry.world_to_local);
                entry.mesh.cast_ray(&local, closest).map(|hit| hit.distance)
            })
            .map(|(slot, distance)| RayHit {
                object: self.entries[slot].id,
                distance,
                point: ray.at(distance),
            })
    }

    /// Closest hit against a single indexed object
    pub fn cast_ray_against(&self, id: ObjectId, ray: &Ray, max_distance: f32) -> Option<RayHit> {
        let entry = self.entries.iter().find(|e| e.id == id)?;
        let local = ray.transform(&entry.world_to_local);
        entry.mesh.cast_ray(&local, max_distance).map(|hit| RayHit {
            object: id,
            distance: hit.distance,
            point: ray.at(hit.distance),
        })
    }

    /// True when `mesh` placed at `transform` overlaps any non-excluded object
    pub fn overlaps(&self, mesh: &TriangleMesh, transform: &Mat4, exclusion: &ExclusionSet) -> bool {
        let query = mesh.bounds().transform(transform);
        self.bvh.query_aabb(&query, |slot| {
            self.entry_overlaps(&self.entries[slot], mesh, transform, exclusion)
        })
    }

    /// Every non-excluded object overlapped by `mesh` at `transform`, in index order
    pub fn overlapping_objects(&self, mesh: &TriangleMesh, transform: &Mat4, exclusion: &ExclusionSet) -> Vec<ObjectId> {
        let query = mesh.bounds().transform(transform);
        let mut slots = Vec::new();
        self.bvh.query_aabb(&query, |slot| {
            if self.entry_overlaps(&self.entries[slot], mesh, transform, exclusion) {
                slots.push(slot);
            }
            false
        });
        slots.sort_unstable();
        slots.into_iter().map(|slot| self.entries[slot].id).collect()
    }

    fn entry_overlaps(&self, entry: &IndexedObject, mesh: &TriangleMesh, transform: &Mat4, exclusion: &ExclusionSet) -> bool {
        if exclusion.contains(entry.id) {
            return false;
        }
        let mesh_to_entry = entry.world_to_local * *transform;
        entry.mesh.overlaps_mesh(mesh, &mesh_to_entry)
    }

    /// Object-to-world transform of an indexed object
    pub fn object_transform(&self, id: ObjectId) -> Option<Mat4> {
        self.entries.iter().find(|e| e.id == id).map(|e| e.local_to_world)
    }
}
