//! Viewpoint search by rejection sampling
//!
//! The search is a small state machine. Each step draws one candidate pose,
//! validates it and records the outcome; the loop stops once enough poses
//! were accepted or the try budget is spent.

use glam::Mat4;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use stager_scene::GeometryIndex;

use crate::error::{CameraError, Result};
use crate::intrinsics::CameraIntrinsics;
use crate::pose::{build_transformation_matrix, HeightRange, OrientationRanges};
use crate::room::PointInRoomSampler;
use crate::validation::{CoverageEstimator, PoseValidator, ProximityChecks};

/// Search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Candidate budget
    pub max_tries: u32,
    /// Number of poses to accept
    pub target_count: usize,
    pub height: HeightRange,
    pub orientation: OrientationRanges,
    pub proximity: ProximityChecks,
    /// Coverage must be strictly above this
    pub coverage_threshold: f32,
    /// Side of the validation ray grid
    pub rays_per_side: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_tries: 10_000,
            target_count: 5,
            height: HeightRange::default(),
            orientation: OrientationRanges::default(),
            proximity: ProximityChecks::min_distance(1.0),
            coverage_threshold: 0.4,
            rays_per_side: 10,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<()> {
        self.height.validate()?;
        self.orientation.validate()?;
        self.proximity.validate()?;
        if !self.coverage_threshold.is_finite() {
            return Err(CameraError::InvalidConfig(format!(
                "coverage threshold must be finite, got {}",
                self.coverage_threshold
            )));
        }
        if self.rays_per_side == 0 {
            return Err(CameraError::InvalidConfig("rays_per_side must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// Append-only pose list with a fixed capacity
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AcceptedPoseSet {
    poses: Vec<Mat4>,
    capacity: usize,
}

impl AcceptedPoseSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            poses: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a pose; returns false once full
    pub fn push(&mut self, pose: Mat4) -> bool {
        if self.is_full() {
            return false;
        }
        self.poses.push(pose);
        true
    }

    pub fn len(&self) -> usize {
        self.poses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.poses.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.poses.len() >= self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = &Mat4> {
        self.poses.iter()
    }

    pub fn as_slice(&self) -> &[Mat4] {
        &self.poses
    }

    pub fn into_vec(self) -> Vec<Mat4> {
        self.poses
    }
}

/// Why a search finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    TargetReached,
    BudgetExhausted,
}

/// Search state after the latest step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    /// Nothing evaluated yet
    Searching,
    /// The last candidate was accepted
    Accepted,
    /// The last candidate was rejected or could not be sampled
    Rejected,
    Done(StopReason),
}

/// Result of a finished search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOutcome {
    pub poses: Vec<Mat4>,
    pub tries: u32,
    pub stop_reason: StopReason,
}

/// Rejection-sampling search for camera poses
pub struct ViewpointSearch<'a> {
    config: SearchConfig,
    sampler: &'a dyn PointInRoomSampler,
    validator: PoseValidator<'a>,
    accepted: AcceptedPoseSet,
    tries: u32,
    state: SearchState,
}

impl<'a> ViewpointSearch<'a> {
    pub fn new(
        config: SearchConfig,
        intrinsics: CameraIntrinsics,
        sampler: &'a dyn PointInRoomSampler,
        index: &'a GeometryIndex,
        coverage: &'a dyn CoverageEstimator,
    ) -> Result<Self> {
        config.validate()?;
        intrinsics.validate()?;
        let validator = PoseValidator::new(index, coverage)
            .with_intrinsics(intrinsics)
            .with_checks(config.proximity)
            .with_coverage_threshold(config.coverage_threshold)
            .with_rays_per_side(config.rays_per_side);
        Ok(Self {
            accepted: AcceptedPoseSet::new(config.target_count),
            config,
            sampler,
            validator,
            tries: 0,
            state: SearchState::Searching,
        })
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn tries(&self) -> u32 {
        self.tries
    }

    pub fn accepted(&self) -> &AcceptedPoseSet {
        &self.accepted
    }

    pub fn validator(&self) -> &PoseValidator<'a> {
        &self.validator
    }

    fn stop_reason(&self) -> Option<StopReason> {
        if self.accepted.len() >= self.config.target_count {
            Some(StopReason::TargetReached)
        } else if self.tries >= self.config.max_tries {
            Some(StopReason::BudgetExhausted)
        } else {
            None
        }
    }

    /// Evaluate one candidate, or finish if a stop condition holds
    pub fn step(&mut self, rng: &mut dyn RngCore) -> SearchState {
        if let SearchState::Done(_) = self.state {
            return self.state;
        }
        if let Some(reason) = self.stop_reason() {
            self.state = SearchState::Done(reason);
            return self.state;
        }

        self.tries += 1;
        self.state = match self.candidate(rng) {
            Some(pose) => {
                let verdict = self.validator.validate(&pose);
                if verdict.accepted() {
                    self.accepted.push(pose);
                    log::debug!(
                        "Try {}: accepted pose {} at {:?}",
                        self.tries,
                        self.accepted.len(),
                        pose.w_axis.truncate()
                    );
                    SearchState::Accepted
                } else {
                    log::debug!(
                        "Try {}: rejected (clearance {}, coverage {:?})",
                        self.tries,
                        verdict.clearance,
                        verdict.coverage
                    );
                    SearchState::Rejected
                }
            }
            None => SearchState::Rejected,
        };
        self.state
    }

    fn candidate(&self, rng: &mut dyn RngCore) -> Option<Mat4> {
        let height = self.config.height.sample(rng);
        let point = match self.sampler.sample(height, rng) {
            Ok(point) => point,
            Err(e) => {
                log::debug!("Try {}: no camera position ({})", self.tries, e);
                return None;
            }
        };
        let euler = self.config.orientation.sample(rng);
        Some(build_transformation_matrix(point.location, euler))
    }

    /// Step until done
    pub fn run(mut self, rng: &mut dyn RngCore) -> SearchOutcome {
        let stop_reason = loop {
            if let SearchState::Done(reason) = self.step(rng) {
                break reason;
            }
        };
        match stop_reason {
            StopReason::TargetReached => log::info!(
                "Viewpoint search accepted {} poses in {} tries",
                self.accepted.len(),
                self.tries
            ),
            StopReason::BudgetExhausted => log::warn!(
                "Viewpoint search ran out of tries: {} of {} poses after {} tries",
                self.accepted.len(),
                self.config.target_count,
                self.tries
            ),
        }
        SearchOutcome {
            poses: self.accepted.into_vec(),
            tries: self.tries,
            stop_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pose_set_capacity() {
        let mut set = AcceptedPoseSet::new(2);
        assert!(set.push(Mat4::IDENTITY));
        assert!(set.push(Mat4::IDENTITY));
        assert!(!set.push(Mat4::IDENTITY));
        assert_eq!(set.len(), 2);
        assert!(set.is_full());

        let empty = AcceptedPoseSet::new(0);
        assert!(empty.is_full());
    }

    #[test]
    fn test_config_validation() {
        assert!(SearchConfig::default().validate().is_ok());
        let bad = SearchConfig {
            rays_per_side: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = SearchConfig {
            height: HeightRange::new(3.0, 1.0),
            ..Default::default()
        };
        assert!(matches!(bad.validate(), Err(CameraError::InvalidRange { .. })));
    }

    #[test]
    fn test_config_partial_fields() {
        let config: SearchConfig = serde_json::from_str(r#"{"target_count": 3}"#).unwrap();
        assert_eq!(config.target_count, 3);
        assert_eq!(config.max_tries, 10_000);
        assert_eq!(config.proximity.min, Some(1.0));
    }
}
