//! Camera pose construction and orientation sampling

use glam::{Mat3, Mat4, Vec3};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::error::{check_range, Result};

/// Pose from a location and Euler angles (radians)
///
/// Rotations apply about the fixed X, then Y, then Z axes, i.e.
/// `R = Rz * Ry * Rx`.
pub fn build_transformation_matrix(location: Vec3, euler: Vec3) -> Mat4 {
    let rotation = Mat3::from_rotation_z(euler.z) * Mat3::from_rotation_y(euler.y) * Mat3::from_rotation_x(euler.x);
    Mat4::from_translation(location) * Mat4::from_mat3(rotation)
}

/// Uniform sample in `[min, max]`; a collapsed range returns `min`
pub(crate) fn uniform(rng: &mut dyn RngCore, min: f32, max: f32) -> f32 {
    if max > min {
        rng.random_range(min..=max)
    } else {
        min
    }
}

/// Per-axis Euler angle bounds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationRanges {
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl Default for OrientationRanges {
    /// Tilted 70 degrees up from straight down, no roll, any heading
    fn default() -> Self {
        Self {
            min: [1.2217, 0.0, 0.0],
            max: [1.2217, 0.0, std::f32::consts::TAU],
        }
    }
}

impl OrientationRanges {
    pub fn new(min: [f32; 3], max: [f32; 3]) -> Self {
        Self { min, max }
    }

    /// Orientation with every axis pinned
    pub fn fixed(euler: [f32; 3]) -> Self {
        Self::new(euler, euler)
    }

    pub fn validate(&self) -> Result<()> {
        for (axis, name) in ["rotation x", "rotation y", "rotation z"].iter().enumerate() {
            check_range(name, self.min[axis], self.max[axis])?;
        }
        Ok(())
    }

    /// Each axis independently and uniformly within its bounds
    pub fn sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        Vec3::new(
            uniform(rng, self.min[0], self.max[0]),
            uniform(rng, self.min[1], self.max[1]),
            uniform(rng, self.min[2], self.max[2]),
        )
    }
}

/// Camera height above the floor
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeightRange {
    pub min: f32,
    pub max: f32,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self { min: 0.5, max: 2.0 }
    }
}

impl HeightRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn validate(&self) -> Result<()> {
        check_range("height", self.min, self.max)
    }

    pub fn sample(&self, rng: &mut dyn RngCore) -> f32 {
        uniform(rng, self.min, self.max)
    }
}
