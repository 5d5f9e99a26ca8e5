//! Camera intrinsics and view-frustum ray grids
//!
//! Cameras look down their local -Z axis with +Y up.

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use stager_geometry::Ray;

use crate::error::{CameraError, Result};

/// Pinhole camera parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraIntrinsics {
    /// Field of view in radians, along the larger image dimension
    pub fov: f32,
    pub resolution_x: u32,
    pub resolution_y: u32,
}

impl Default for CameraIntrinsics {
    fn default() -> Self {
        Self {
            fov: 0.691_111,
            resolution_x: 512,
            resolution_y: 512,
        }
    }
}

impl CameraIntrinsics {
    pub fn new(fov: f32, resolution_x: u32, resolution_y: u32) -> Self {
        Self {
            fov,
            resolution_x,
            resolution_y,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.fov > 0.0 && self.fov < std::f32::consts::PI) {
            return Err(CameraError::InvalidConfig(format!(
                "fov must be within (0, pi), got {}",
                self.fov
            )));
        }
        if self.resolution_x == 0 || self.resolution_y == 0 {
            return Err(CameraError::InvalidConfig("resolution must be non-zero".to_string()));
        }
        Ok(())
    }

    /// Half extents of the image plane at unit distance
    pub fn half_extents(&self) -> (f32, f32) {
        let half = (self.fov * 0.5).tan();
        let (w, h) = (self.resolution_x as f32, self.resolution_y as f32);
        if w >= h {
            (half, half * h / w)
        } else {
            (half * w / h, half)
        }
    }

    /// Regular `rays_per_side` x `rays_per_side` grid of rays from the camera
    /// through its image plane, corners included
    pub fn frustum_rays(&self, pose: &Mat4, rays_per_side: u32) -> Vec<Ray> {
        let origin = pose.transform_point3(Vec3::ZERO);
        let (half_w, half_h) = self.half_extents();
        let n = rays_per_side.max(1);
        let step = |i: u32| {
            if n == 1 {
                0.0
            } else {
                i as f32 / (n - 1) as f32 * 2.0 - 1.0
            }
        };

        let mut rays = Vec::with_capacity((n * n) as usize);
        for x in 0..n {
            for y in 0..n {
                let local = Vec3::new(step(x) * half_w, step(y) * half_h, -1.0);
                rays.push(Ray::new(origin, pose.transform_vector3(local)));
            }
        }
        rays
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_half_extents_follow_aspect() {
        let wide = CameraIntrinsics::new(std::f32::consts::FRAC_PI_2, 200, 100);
        let (w, h) = wide.half_extents();
        assert!((w - 1.0).abs() < 1e-5);
        assert!((h - 0.5).abs() < 1e-5);

        let tall = CameraIntrinsics::new(std::f32::consts::FRAC_PI_2, 100, 200);
        let (w, h) = tall.half_extents();
        assert!((w - 0.5).abs() < 1e-5);
        assert!((h - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_frustum_grid() {
        let camera = CameraIntrinsics::new(std::f32::consts::FRAC_PI_2, 100, 100);
        let pose = Mat4::from_translation(Vec3::new(0.0, 0.0, 2.0));
        let rays = camera.frustum_rays(&pose, 3);
        assert_eq!(rays.len(), 9);
        // Center ray looks straight down -Z
        assert!((rays[4].direction - Vec3::NEG_Z).length() < 1e-5);
        assert_eq!(rays[4].origin, Vec3::new(0.0, 0.0, 2.0));
        // Corner rays span the full field of view
        let corner = rays[0].direction;
        assert!((corner.x / -corner.z + 1.0).abs() < 1e-5);

        let single = camera.frustum_rays(&pose, 1);
        assert_eq!(single.len(), 1);
        assert!((single[0].direction - Vec3::NEG_Z).length() < 1e-5);
    }

    #[test]
    fn test_validate() {
        assert!(CameraIntrinsics::default().validate().is_ok());
        assert!(CameraIntrinsics::new(0.0, 10, 10).validate().is_err());
        assert!(CameraIntrinsics::new(1.0, 0, 10).validate().is_err());
    }
}
