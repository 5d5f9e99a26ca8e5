//! Relative pose samplers for placing substitutes

use std::ops::Range;

use glam::{Mat4, Quat};
use rand::{Rng, RngCore};

/// Maps an original object's pose to the pose of its substitute
pub trait RelativePoseSampler {
    fn sample(&self, base: &Mat4, rng: &mut dyn RngCore) -> Mat4;
}

impl<F> RelativePoseSampler for F
where
    F: Fn(&Mat4, &mut dyn RngCore) -> Mat4,
{
    fn sample(&self, base: &Mat4, rng: &mut dyn RngCore) -> Mat4 {
        self(base, rng)
    }
}

/// Keep the original pose unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct KeepPose;

impl RelativePoseSampler for KeepPose {
    fn sample(&self, base: &Mat4, _rng: &mut dyn RngCore) -> Mat4 {
        *base
    }
}

/// Rotate about the world Z axis through the object's origin by an angle
/// drawn uniformly from `min..max` radians
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RandomYaw {
    pub min: f32,
    pub max: f32,
}

impl RandomYaw {
    pub fn new(range: Range<f32>) -> Self {
        Self {
            min: range.start,
            max: range.end,
        }
    }

    /// Any heading
    pub fn full_turn() -> Self {
        Self::new(0.0..std::f32::consts::TAU)
    }
}

impl RelativePoseSampler for RandomYaw {
    fn sample(&self, base: &Mat4, rng: &mut dyn RngCore) -> Mat4 {
        let yaw = if self.max > self.min {
            rng.random_range(self.min..self.max)
        } else {
            self.min
        };
        let (scale, rotation, translation) = base.to_scale_rotation_translation();
        Mat4::from_scale_rotation_translation(scale, Quat::from_rotation_z(yaw) * rotation, translation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_random_yaw_keeps_position_and_up() {
        let mut rng = StdRng::seed_from_u64(3);
        let base = Mat4::from_translation(Vec3::new(1.0, 2.0, 0.0));
        let sampler = RandomYaw::full_turn();
        for _ in 0..10 {
            let pose = sampler.sample(&base, &mut rng);
            assert!((pose.w_axis.truncate() - Vec3::new(1.0, 2.0, 0.0)).length() < 1e-5);
            assert!((pose.transform_vector3(Vec3::Z) - Vec3::Z).length() < 1e-5);
        }
    }

    #[test]
    fn test_fixed_yaw() {
        let mut rng = StdRng::seed_from_u64(3);
        let sampler = RandomYaw::new(std::f32::consts::FRAC_PI_2..std::f32::consts::FRAC_PI_2);
        let pose = sampler.sample(&Mat4::IDENTITY, &mut rng);
        assert!((pose.transform_vector3(Vec3::X) - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_closure_sampler() {
        fn lift(base: &Mat4, _: &mut dyn RngCore) -> Mat4 {
            Mat4::from_translation(Vec3::Z) * *base
        }

        let mut rng = StdRng::seed_from_u64(3);
        let pose = lift.sample(&Mat4::IDENTITY, &mut rng);
        assert_eq!(pose.w_axis.z, 1.0);
        assert_eq!(KeepPose.sample(&pose, &mut rng), pose);
    }
}
