//! Camera position sampling inside rooms

use glam::Vec3;
use rand::{Rng, RngCore};
use stager_geometry::{Aabb, Ray};
use stager_scene::{GeometryIndex, ObjectId, PropertyFilter, Scene};

use crate::error::{CameraError, Result};
use crate::pose::uniform;

/// A sampled camera position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomPoint {
    pub location: Vec3,
    /// Which room (floor) the point belongs to
    pub region: usize,
}

/// Produces positions inside the navigable space of a scene
pub trait PointInRoomSampler {
    /// A point `height` above some floor
    fn sample(&self, height: f32, rng: &mut dyn RngCore) -> Result<RoomPoint>;
}

/// Samples above floor objects
///
/// Picks a floor uniformly, draws x and y inside its world bounds, and casts
/// a ray straight down to make sure the point lies over the floor surface
/// rather than just its bounding box.
#[derive(Debug, Clone)]
pub struct FloorPointSampler {
    index: GeometryIndex,
    floors: Vec<(ObjectId, Aabb)>,
    max_tries: u32,
}

impl FloorPointSampler {
    pub const DEFAULT_MAX_TRIES: u32 = 1000;

    /// Sampler over the valid objects of `scene` matching `floor_filter`
    pub fn new(scene: &Scene, floor_filter: &PropertyFilter) -> Result<Self> {
        let ids = scene.select(floor_filter);
        let index = GeometryIndex::build_from(scene, ids.iter().copied());
        let floors: Vec<(ObjectId, Aabb)> = ids
            .into_iter()
            .filter_map(|id| index.object_bounds(id).map(|bounds| (id, bounds)))
            .collect();
        if floors.is_empty() {
            return Err(CameraError::NoFloors);
        }
        log::debug!("Room sampler over {} floors", floors.len());
        Ok(Self {
            index,
            floors,
            max_tries: Self::DEFAULT_MAX_TRIES,
        })
    }

    pub fn with_max_tries(mut self, max_tries: u32) -> Self {
        self.max_tries = max_tries.max(1);
        self
    }

    pub fn floor_count(&self) -> usize {
        self.floors.len()
    }
}

impl PointInRoomSampler for FloorPointSampler {
    fn sample(&self, height: f32, rng: &mut dyn RngCore) -> Result<RoomPoint> {
        for _ in 0..self.max_tries {
            let region = rng.random_range(0..self.floors.len());
            let (floor, bounds) = self.floors[region];
            let x = uniform(rng, bounds.min.x, bounds.max.x);
            let y = uniform(rng, bounds.min.y, bounds.max.y);

            let origin = Vec3::new(x, y, bounds.max.z + 1.0);
            let down = Ray::new(origin, Vec3::NEG_Z);
            if let Some(hit) = self.index.cast_ray_against(floor, &down, f32::MAX) {
                return Ok(RoomPoint {
                    location: hit.point + Vec3::Z * height,
                    region,
                });
            }
        }
        Err(CameraError::NoRoomPoint {
            tries: self.max_tries,
        })
    }
}
