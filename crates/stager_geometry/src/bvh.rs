//! Bounding volume hierarchy over primitive bounds
//!
//! Built top-down with a median split on the axis of largest centroid
//! extent. The hierarchy only stores bounds and primitive indices, so the
//! same structure serves triangles inside a mesh and objects inside a scene.

use glam::Vec3;

use crate::bounds::Aabb;
use crate::intersect::ray_aabb;
use crate::ray::Ray;

#[derive(Clone, Debug)]
struct BvhNode {
    bounds: Aabb,
    /// Child node indices, unused for leaves
    left: u32,
    right: u32,
    /// Range into `Bvh::indices`; `count > 0` marks a leaf
    start: u32,
    count: u32,
}

impl BvhNode {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.count > 0
    }
}

/// Immutable BVH over a list of primitive bounds
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    indices: Vec<u32>,
    root: usize,
}

impl Bvh {
    /// Maximum number of primitives stored in a leaf
    pub const LEAF_SIZE: usize = 4;

    /// Build over `bounds`; primitive `i` is identified by its index in the slice
    pub fn build(bounds: &[Aabb]) -> Self {
        let mut indices: Vec<u32> = (0..bounds.len() as u32).collect();
        let mut nodes = Vec::with_capacity(bounds.len().saturating_mul(2) / Self::LEAF_SIZE + 1);
        if bounds.is_empty() {
            return Self::default();
        }
        let root = build_range(&mut nodes, &mut indices, bounds, 0, bounds.len());
        Self { nodes, indices, root }
    }

    /// Number of primitives
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Bounds of everything in the hierarchy
    pub fn bounds(&self) -> Aabb {
        self.nodes
            .get(self.root)
            .map(|node| node.bounds)
            .unwrap_or(Aabb::EMPTY)
    }

    /// Closest-hit ray traversal
    ///
    /// `hit_primitive(index, closest)` tests one primitive and returns its
    /// hit parameter. Returns the closest primitive hit within `t_max`.
    pub fn cast_ray<F>(&self, ray: &Ray, t_max: f32, mut hit_primitive: F) -> Option<(usize, f32)>
    where
        F: FnMut(usize, f32) -> Option<f32>,
    {
        if self.nodes.is_empty() {
            return None;
        }

        let mut closest = t_max;
        let mut best = None;
        let mut stack = vec![self.root];

        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if ray_aabb(ray, &node.bounds, closest).is_none() {
                continue;
            }

            if node.is_leaf() {
                let range = node.start as usize..(node.start + node.count) as usize;
                for &primitive in &self.indices[range] {
                    if let Some(t) = hit_primitive(primitive as usize, closest) {
                        if t <= closest {
                            closest = t;
                            best = Some((primitive as usize, t));
                        }
                    }
                }
                continue;
            }

            // Near child goes on top of the stack
            let left = node.left as usize;
            let right = node.right as usize;
            let left_hit = ray_aabb(ray, &self.nodes[left].bounds, closest).map(|(near, _)| near);
            let right_hit = ray_aabb(ray, &self.nodes[right].bounds, closest).map(|(near, _)| near);
            match (left_hit, right_hit) {
                (Some(l), Some(r)) if l <= r => {
                    stack.push(right);
                    stack.push(left);
                }
                (Some(_), Some(_)) => {
                    stack.push(left);
                    stack.push(right);
                }
                (Some(_), None) => stack.push(left),
                (None, Some(_)) => stack.push(right),
                (None, None) => {}
            }
        }

        best
    }

    /// Visit every primitive whose bounds intersect `aabb`
    ///
    /// The visitor returns `true` to stop early; the return value reports
    /// whether traversal was stopped.
    pub fn query_aabb<F>(&self, aabb: &Aabb, mut visit: F) -> bool
    where
        F: FnMut(usize) -> bool,
    {
        if self.nodes.is_empty() || aabb.is_empty() {
            return false;
        }

        let mut stack = vec![self.root];
        while let Some(node_index) = stack.pop() {
            let node = &self.nodes[node_index];
            if !node.bounds.intersects(aabb) {
                continue;
            }
            if node.is_leaf() {
                let range = node.start as usize..(node.start + node.count) as usize;
                for &primitive in &self.indices[range] {
                    if visit(primitive as usize) {
                        return true;
                    }
                }
            } else {
                stack.push(node.right as usize);
                stack.push(node.left as usize);
            }
        }
        false
    }
}

fn build_range(
    nodes: &mut Vec<BvhNode>,
    indices: &mut [u32],
    bounds: &[Aabb],
    start: usize,
    end: usize,
) -> usize {
    let range_bounds = indices[start..end]
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| acc.union(&bounds[i as usize]));
    let count = end - start;

    if count <= Bvh::LEAF_SIZE {
        nodes.push(BvhNode {
            bounds: range_bounds,
            left: 0,
            right: 0,
            start: start as u32,
            count: count as u32,
        });
        return nodes.len() - 1;
    }

    let centroids = indices[start..end]
        .iter()
        .fold(Aabb::EMPTY, |acc, &i| acc.expand_to_include(bounds[i as usize].center()));
    let axis = centroids.longest_axis();

    indices[start..end].sort_by(|&a, &b| {
        let ca: Vec3 = bounds[a as usize].center();
        let cb: Vec3 = bounds[b as usize].center();
        ca[axis].total_cmp(&cb[axis])
    });

    let mid = (start + end) / 2;
    let left = build_range(nodes, indices, bounds, start, mid);
    let right = build_range(nodes, indices, bounds, mid, end);
    nodes.push(BvhNode {
        bounds: range_bounds,
        left: left as u32,
        right: right as u32,
        start: start as u32,
        count: 0,
    });
    nodes.len() - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_boxes_along_x(count: usize) -> Vec<Aabb> {
        (0..count)
            .map(|i| Aabb::from_center_half_extents(Vec3::new(i as f32 * 3.0, 0.0, 0.0), Vec3::splat(0.5)))
            .collect()
    }

    #[test]
    fn test_empty_bvh() {
        let bvh = Bvh::build(&[]);
        assert!(bvh.is_empty());
        assert!(bvh.bounds().is_empty());
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert!(bvh.cast_ray(&ray, f32::MAX, |_, _| Some(1.0)).is_none());
        assert!(!bvh.query_aabb(&Aabb::new(Vec3::ZERO, Vec3::ONE), |_| true));
    }

    #[test]
    fn test_cast_ray_finds_closest() {
        let boxes = unit_boxes_along_x(20);
        let bvh = Bvh::build(&boxes);
        assert_eq!(bvh.len(), 20);

        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let hit = bvh.cast_ray(&ray, f32::MAX, |i, t_max| {
            ray_aabb(&ray, &boxes[i], t_max).map(|(near, _)| near)
        });
        let (index, distance) = hit.expect("ray should hit the first box");
        assert_eq!(index, 0);
        assert!((distance - 9.5).abs() < 0.001);

        // Reverse direction hits the last box first
        let ray = Ray::new(Vec3::new(100.0, 0.0, 0.0), Vec3::NEG_X);
        let hit = bvh.cast_ray(&ray, f32::MAX, |i, t_max| {
            ray_aabb(&ray, &boxes[i], t_max).map(|(near, _)| near)
        });
        assert_eq!(hit.map(|(i, _)| i), Some(19));
    }

    #[test]
    fn test_cast_ray_respects_t_max() {
        let boxes = unit_boxes_along_x(5);
        let bvh = Bvh::build(&boxes);
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let hit = bvh.cast_ray(&ray, 5.0, |i, t_max| {
            ray_aabb(&ray, &boxes[i], t_max).map(|(near, _)| near)
        });
        assert!(hit.is_none());
    }

    #[test]
    fn test_query_aabb_visits_overlapping() {
        let boxes = unit_boxes_along_x(30);
        let bvh = Bvh::build(&boxes);
        let query = Aabb::new(Vec3::new(2.0, -1.0, -1.0), Vec3::new(7.0, 1.0, 1.0));
        let mut found = Vec::new();
        let stopped = bvh.query_aabb(&query, |i| {
            found.push(i);
            false
        });
        found.sort_unstable();
        assert!(!stopped);
        assert_eq!(found, vec![1, 2]);
    }
}
