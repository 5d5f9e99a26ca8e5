//! Intersection tests for ray casts and collision detection
//!
//! - Ray vs AABB (slab method)
//! - Ray vs triangle (Möller-Trumbore)
//! - Triangle vs triangle (separating axis theorem)

use glam::Vec3;

use crate::bounds::Aabb;
use crate::ray::Ray;

/// A triangle as three world- or local-space vertices
pub type Triangle = [Vec3; 3];

/// Result of a ray-triangle intersection
#[derive(Clone, Copy, Debug)]
pub struct TriangleHit {
    /// Ray parameter of the hit point
    pub distance: f32,
    /// Barycentric coordinates [w, u, v] where w = 1 - u - v
    pub barycentric: [f32; 3],
}

/// Ray-AABB intersection using the slab method
///
/// Returns the parameter interval `(t_near, t_far)` clipped to `[0, t_max]`,
/// or None if the ray misses the box within that range. A ray starting
/// inside the box has `t_near == 0`.
pub fn ray_aabb(ray: &Ray, aabb: &Aabb, t_max: f32) -> Option<(f32, f32)> {
    if aabb.is_empty() {
        return None;
    }
    let inv_dir = ray.inverse_direction();

    let t1 = (aabb.min - ray.origin) * inv_dir;
    let t2 = (aabb.max - ray.origin) * inv_dir;

    let t_near = t1.min(t2).max_element().max(0.0);
    let t_far = t1.max(t2).min_element().min(t_max);

    if t_near > t_far {
        None
    } else {
        Some((t_near, t_far))
    }
}

/// Ray-Triangle intersection using the Möller-Trumbore algorithm
///
/// # Arguments
/// * `ray` - The ray to test (direction need not be normalized)
/// * `triangle` - Triangle vertices
/// * `cull_backface` - If true, only front-facing (counter-clockwise) triangles are hit
pub fn ray_triangle(ray: &Ray, triangle: &Triangle, cull_backface: bool) -> Option<TriangleHit> {
    const EPSILON: f32 = 1e-7;

    let [v0, v1, v2] = *triangle;
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = ray.direction.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle plane
    if a.abs() < EPSILON {
        return None;
    }

    if cull_backface && a < 0.0 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin - v0;
    let u = f * s.dot(h);

    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction.dot(q);

    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);

    if t > EPSILON {
        Some(TriangleHit {
            distance: t,
            barycentric: [1.0 - u - v, u, v],
        })
    } else {
        None
    }
}

/// Bounds of a single triangle
#[inline]
pub fn triangle_aabb(triangle: &Triangle) -> Aabb {
    Aabb::new(
        triangle[0].min(triangle[1]).min(triangle[2]),
        triangle[0].max(triangle[1]).max(triangle[2]),
    )
}

/// Triangle-triangle overlap using the separating axis theorem
///
/// Candidate axes are both face normals, the nine edge-edge cross products
/// and the six in-plane edge normals (face normal x edge), which covers the
/// coplanar case. Touching triangles overlap. Degenerate axes are skipped.
///
/// Both triangles are moved to `a[0]` and rescaled so the longest edge has
/// unit length before testing, which keeps the degenerate-axis cutoff
/// independent of object size.
pub fn triangles_overlap(a: &Triangle, b: &Triangle) -> bool {
    const AXIS_EPSILON: f32 = 1e-12;

    let origin = a[0];
    let longest = a
        .iter()
        .zip(a.iter().cycle().skip(1))
        .chain(b.iter().zip(b.iter().cycle().skip(1)))
        .map(|(p, q)| (*q - *p).length_squared())
        .fold(0.0f32, f32::max)
        .sqrt();
    if longest == 0.0 {
        // Both triangles collapsed to points
        return a[0] == b[0];
    }
    let scale = 1.0 / longest;
    let a = a.map(|v| (v - origin) * scale);
    let b = b.map(|v| (v - origin) * scale);
    let (a, b) = (&a, &b);

    let edges_a = [a[1] - a[0], a[2] - a[1], a[0] - a[2]];
    let edges_b = [b[1] - b[0], b[2] - b[1], b[0] - b[2]];
    let normal_a = edges_a[0].cross(edges_a[1]);
    let normal_b = edges_b[0].cross(edges_b[1]);

    let mut axes = Vec::with_capacity(17);
    axes.push(normal_a);
    axes.push(normal_b);
    for edge_a in &edges_a {
        for edge_b in &edges_b {
            axes.push(edge_a.cross(*edge_b));
        }
    }
    for edge in &edges_a {
        axes.push(normal_a.cross(*edge));
    }
    for edge in &edges_b {
        axes.push(normal_b.cross(*edge));
    }

    axes.iter()
        .filter(|axis| axis.length_squared() > AXIS_EPSILON)
        .all(|axis| !separated_on_axis(*axis, a, b))
}

fn separated_on_axis(axis: Vec3, a: &Triangle, b: &Triangle) -> bool {
    let (a_min, a_max) = project(axis, a);
    let (b_min, b_max) = project(axis, b);
    a_max < b_min || b_max < a_min
}

fn project(axis: Vec3, triangle: &Triangle) -> (f32, f32) {
    let d0 = axis.dot(triangle[0]);
    let d1 = axis.dot(triangle[1]);
    let d2 = axis.dot(triangle[2]);
    (d0.min(d1).min(d2), d0.max(d1).max(d2))
}
