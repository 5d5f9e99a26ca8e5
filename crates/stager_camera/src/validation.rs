//! Pose validation: obstacle clearance and scene coverage

use std::collections::HashMap;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use stager_scene::{ExclusionSet, GeometryIndex, ObjectId, PropertyValue, Scene};

use crate::error::{check_range, Result};
use crate::intrinsics::CameraIntrinsics;

/// Closed interval used by the aggregate distance checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistanceRange {
    pub min: f32,
    pub max: f32,
}

impl DistanceRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn contains(&self, value: f32) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Distance constraints on what the camera sees
///
/// Distances come from a grid of rays through the image plane. Unset checks
/// are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProximityChecks {
    /// Fail if any hit is this close or closer
    pub min: Option<f32>,
    /// Fail if any hit is this far or farther
    pub max: Option<f32>,
    /// Bounds on the mean hit distance
    pub avg: Option<DistanceRange>,
    /// Bounds on the variance of hit distances
    pub var: Option<DistanceRange>,
    /// Fail if any ray hits nothing
    pub no_background: bool,
}

impl ProximityChecks {
    /// Only a minimum obstacle distance
    pub fn min_distance(min: f32) -> Self {
        Self {
            min: Some(min),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if let (Some(min), Some(max)) = (self.min, self.max) {
            check_range("proximity", min, max)?;
        }
        if let Some(avg) = self.avg {
            check_range("average distance", avg.min, avg.max)?;
        }
        if let Some(var) = self.var {
            check_range("distance variance", var.min, var.max)?;
        }
        Ok(())
    }
}

/// Check that no obstacle violates `checks` from `pose`
///
/// Casts `rays_per_side`² unbounded rays through the view frustum against
/// `index`. Averages are taken over all rays, hit or not.
pub fn obstacle_in_view(
    pose: &Mat4,
    checks: &ProximityChecks,
    index: &GeometryIndex,
    intrinsics: &CameraIntrinsics,
    rays_per_side: u32,
) -> bool {
    let exclusion = ExclusionSet::new();
    let rays = intrinsics.frustum_rays(pose, rays_per_side);
    let ray_count = rays.len() as f32;

    let mut sum = 0.0f32;
    let mut sum_sq = 0.0f32;
    for ray in &rays {
        match index.cast_ray(ray, f32::MAX, &exclusion) {
            Some(hit) => {
                let distance = hit.distance;
                if checks.min.is_some_and(|min| distance <= min) {
                    return false;
                }
                if checks.max.is_some_and(|max| distance >= max) {
                    return false;
                }
                sum += distance;
                sum_sq += distance * distance;
            }
            None if checks.no_background => return false,
            None => {}
        }
    }

    let mean = sum / ray_count;
    if let Some(avg) = checks.avg {
        if !avg.contains(mean) {
            return false;
        }
    }
    if let Some(var) = checks.var {
        let variance = sum_sq / ray_count - mean * mean;
        if !var.contains(variance) {
            return false;
        }
    }
    true
}

/// Scores how much of interest a pose sees, in [0, 1]
pub trait CoverageEstimator {
    fn score(&self, pose: &Mat4) -> f32;
}

impl<F> CoverageEstimator for F
where
    F: Fn(&Mat4) -> f32,
{
    fn score(&self, pose: &Mat4) -> f32 {
        self(pose)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CoverageClass {
    Property(String),
    Object(ObjectId),
}

/// Ray-based coverage heuristic
///
/// Rays through the image plane are bucketed by the class of the object
/// they hit. Structural objects (walls, floors, ceilings) count for nothing.
/// The score rewards many distinct classes spread evenly over the image:
///
/// ```text
/// variance = classes / 3 * Π (1 - hits_c / rays)
/// score    = variance * weighted_hits / rays
/// ```
///
/// By default a class is the value of `class_key`, so two chairs sharing a
/// category make one bucket. With `per_object` every object is its own
/// bucket; special weights still follow `class_key`.
pub struct RayCoverageEstimator<'a> {
    scene: &'a Scene,
    index: &'a GeometryIndex,
    intrinsics: CameraIntrinsics,
    /// Property naming an object's class; objects without it are their own class
    pub class_key: String,
    /// Property holding the structural type
    pub type_key: String,
    /// Types that contribute nothing
    pub ignored_types: Vec<String>,
    /// Classes weighted by `special_weight` instead of 1
    pub special_classes: Vec<PropertyValue>,
    pub special_weight: f32,
    /// Bucket hits by object instead of by class
    pub per_object: bool,
    pub rays_per_side: u32,
}

impl<'a> RayCoverageEstimator<'a> {
    pub fn new(scene: &'a Scene, index: &'a GeometryIndex, intrinsics: CameraIntrinsics) -> Self {
        Self {
            scene,
            index,
            intrinsics,
            class_key: "category_id".to_string(),
            type_key: "type".to_string(),
            ignored_types: vec!["Wall".to_string(), "Floor".to_string(), "Ceiling".to_string()],
            special_classes: Vec::new(),
            special_weight: 2.0,
            per_object: false,
            rays_per_side: 10,
        }
    }

    pub fn with_class_key(mut self, key: impl Into<String>) -> Self {
        self.class_key = key.into();
        self
    }

    pub fn with_special_classes(mut self, classes: Vec<PropertyValue>, weight: f32) -> Self {
        self.special_classes = classes;
        self.special_weight = weight;
        self
    }

    pub fn with_per_object(mut self, per_object: bool) -> Self {
        self.per_object = per_object;
        self
    }

    pub fn with_rays_per_side(mut self, rays_per_side: u32) -> Self {
        self.rays_per_side = rays_per_side.max(1);
        self
    }

    /// Class and weight of a hit object, None for structural objects
    fn classify(&self, id: ObjectId) -> Option<(CoverageClass, f32)> {
        let object = self.scene.get(id)?;
        let structural = object
            .property(&self.type_key)
            .and_then(PropertyValue::as_str)
            .is_some_and(|kind| self.ignored_types.iter().any(|t| t == kind));
        if structural {
            return None;
        }
        let class = object.property(&self.class_key);
        let weight = match class {
            Some(class) if self.special_classes.contains(class) => self.special_weight,
            _ => 1.0,
        };
        let bucket = match class {
            Some(class) if !self.per_object => CoverageClass::Property(class.to_string()),
            _ => CoverageClass::Object(id),
        };
        Some((bucket, weight))
    }
}

impl CoverageEstimator for RayCoverageEstimator<'_> {
    fn score(&self, pose: &Mat4) -> f32 {
        let exclusion = ExclusionSet::new();
        let rays = self.intrinsics.frustum_rays(pose, self.rays_per_side);
        let ray_count = rays.len() as f32;

        let mut hits: HashMap<CoverageClass, u32> = HashMap::new();
        let mut weighted = 0.0f32;
        for ray in &rays {
            let Some(hit) = self.index.cast_ray(ray, f32::MAX, &exclusion) else {
                continue;
            };
            if let Some((class, weight)) = self.classify(hit.object) {
                *hits.entry(class).or_insert(0) += 1;
                weighted += weight;
            }
        }

        let variance = hits
            .values()
            .fold(hits.len() as f32 / 3.0, |acc, &count| acc * (1.0 - count as f32 / ray_count));
        (variance * weighted / ray_count).clamp(0.0, 1.0)
    }
}

/// Outcome of validating one pose
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Verdict {
    pub clearance: bool,
    /// Only computed when clearance passed
    pub coverage: Option<f32>,
    pub threshold: f32,
}

impl Verdict {
    pub fn accepted(&self) -> bool {
        self.clearance && self.coverage.is_some_and(|score| score > self.threshold)
    }
}

/// Combines obstacle clearance and coverage into an accept/reject decision
pub struct PoseValidator<'a> {
    index: &'a GeometryIndex,
    coverage: &'a dyn CoverageEstimator,
    pub intrinsics: CameraIntrinsics,
    pub checks: ProximityChecks,
    pub coverage_threshold: f32,
    pub rays_per_side: u32,
}

impl<'a> PoseValidator<'a> {
    pub fn new(index: &'a GeometryIndex, coverage: &'a dyn CoverageEstimator) -> Self {
        Self {
            index,
            coverage,
            intrinsics: CameraIntrinsics::default(),
            checks: ProximityChecks::min_distance(1.0),
            coverage_threshold: 0.4,
            rays_per_side: 10,
        }
    }

    pub fn with_intrinsics(mut self, intrinsics: CameraIntrinsics) -> Self {
        self.intrinsics = intrinsics;
        self
    }

    pub fn with_checks(mut self, checks: ProximityChecks) -> Self {
        self.checks = checks;
        self
    }

    pub fn with_coverage_threshold(mut self, threshold: f32) -> Self {
        self.coverage_threshold = threshold;
        self
    }

    pub fn with_rays_per_side(mut self, rays_per_side: u32) -> Self {
        self.rays_per_side = rays_per_side.max(1);
        self
    }

    pub fn validate(&self, pose: &Mat4) -> Verdict {
        let clearance = obstacle_in_view(pose, &self.checks, self.index, &self.intrinsics, self.rays_per_side);
        let coverage = clearance.then(|| self.coverage.score(pose));
        Verdict {
            clearance,
            coverage,
            threshold: self.coverage_threshold,
        }
    }

    pub fn accepts(&self, pose: &Mat4) -> bool {
        self.validate(pose).accepted()
    }
}
