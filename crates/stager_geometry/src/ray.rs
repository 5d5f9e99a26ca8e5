//! Rays for scene ray casts

use glam::{Mat4, Vec3};

/// 3D ray
///
/// `Ray::new` normalizes the direction so hit distances are metric. A ray
/// moved into another frame with [`Ray::transform`] keeps its (possibly
/// scaled) direction, so a hit parameter found in that frame is the same
/// parameter in the original one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    /// Create a new ray with normalized direction
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    /// Create a ray from `start` through `end`
    #[inline]
    pub fn from_points(start: Vec3, end: Vec3) -> Self {
        Self::new(start, end - start)
    }

    /// Point at parameter t along the ray
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Component-wise reciprocal of the direction, for slab tests
    #[inline]
    pub fn inverse_direction(&self) -> Vec3 {
        Vec3::ONE / self.direction
    }

    /// Transform the ray without renormalizing its direction
    pub fn transform(&self, matrix: &Mat4) -> Self {
        Self {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ray_at() {
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -4.0));
        assert_eq!(ray.direction, Vec3::NEG_Z);
        assert_eq!(ray.at(2.0), Vec3::new(0.0, 0.0, -2.0));
    }

    #[test]
    fn test_transform_keeps_parameter() {
        let ray = Ray::new(Vec3::new(1.0, 0.0, 0.0), Vec3::X);
        let to_local = Mat4::from_scale(Vec3::splat(0.5));
        let local = ray.transform(&to_local);
        // t = 3 in world lands on the image of the world point in local space
        assert!((local.at(3.0) - to_local.transform_point3(ray.at(3.0))).length() < 0.001);
    }
}
