//! Indexed triangle meshes with a per-mesh BVH

use glam::{Mat4, Vec3};

use crate::bounds::Aabb;
use crate::bvh::Bvh;
use crate::error::{GeometryError, Result};
use crate::intersect::{ray_triangle, triangle_aabb, triangles_overlap, Triangle};
use crate::ray::Ray;

/// Closest ray hit on a mesh
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshHit {
    /// Index of the triangle that was hit
    pub triangle: usize,
    /// Ray parameter of the hit
    pub distance: f32,
}

/// Immutable triangle mesh in its local frame
///
/// The BVH over the triangles is built once on construction; share meshes
/// behind an `Arc` so duplicates of an object reuse it.
#[derive(Clone, Debug)]
pub struct TriangleMesh {
    vertices: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
    bounds: Aabb,
    bvh: Bvh,
}

impl TriangleMesh {
    /// Create from vertex positions and a flat triangle index list
    pub fn new(vertices: Vec<Vec3>, indices: &[u32]) -> Result<Self> {
        if indices.len() % 3 != 0 {
            return Err(GeometryError::InvalidIndexCount(indices.len()));
        }
        let triangles = indices
            .chunks_exact(3)
            .map(|chunk| [chunk[0], chunk[1], chunk[2]])
            .collect();
        Self::from_triangles(vertices, triangles)
    }

    /// Create from vertex positions and index triples
    pub fn from_triangles(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self> {
        if let Some(index) = vertices.iter().position(|v| !v.is_finite()) {
            return Err(GeometryError::NonFiniteVertex(index));
        }
        for triangle in &triangles {
            for &index in triangle {
                if index as usize >= vertices.len() {
                    return Err(GeometryError::IndexOutOfRange {
                        index,
                        vertex_count: vertices.len(),
                    });
                }
            }
        }
        Ok(Self::build(vertices, triangles))
    }

    fn build(vertices: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Self {
        let triangle_bounds: Vec<Aabb> = triangles
            .iter()
            .map(|t| triangle_aabb(&Self::resolve(&vertices, t)))
            .collect();
        let bvh = Bvh::build(&triangle_bounds);
        let bounds = bvh.bounds();
        Self {
            vertices,
            triangles,
            bounds,
            bvh,
        }
    }

    #[inline]
    fn resolve(vertices: &[Vec3], triangle: &[u32; 3]) -> Triangle {
        [
            vertices[triangle[0] as usize],
            vertices[triangle[1] as usize],
            vertices[triangle[2] as usize],
        ]
    }

    /// Axis-aligned box centered on the origin
    pub fn cuboid(half_extents: Vec3) -> Self {
        let corners = Aabb::from_center_half_extents(Vec3::ZERO, half_extents.abs()).corners();
        let triangles = vec![
            [0, 2, 3], [0, 3, 1], // -Z
            [4, 5, 7], [4, 7, 6], // +Z
            [0, 1, 5], [0, 5, 4], // -Y
            [2, 6, 7], [2, 7, 3], // +Y
            [0, 4, 6], [0, 6, 2], // -X
            [1, 3, 7], [1, 7, 5], // +X
        ];
        Self::build(corners.to_vec(), triangles)
    }

    /// Rectangle in the XY plane at z = 0, facing +Z
    pub fn plane(size_x: f32, size_y: f32) -> Self {
        let hx = size_x.abs() * 0.5;
        let hy = size_y.abs() * 0.5;
        let vertices = vec![
            Vec3::new(-hx, -hy, 0.0),
            Vec3::new(hx, -hy, 0.0),
            Vec3::new(hx, hy, 0.0),
            Vec3::new(-hx, hy, 0.0),
        ];
        Self::build(vertices, vec![[0, 1, 2], [0, 2, 3]])
    }

    #[inline]
    pub fn vertices(&self) -> &[Vec3] {
        &self.vertices
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Local-space bounds (empty for a mesh without triangles)
    #[inline]
    pub fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Vertices of triangle `index`
    #[inline]
    pub fn triangle(&self, index: usize) -> Triangle {
        Self::resolve(&self.vertices, &self.triangles[index])
    }

    /// Closest two-sided ray hit within `t_max`
    pub fn cast_ray(&self, ray: &Ray, t_max: f32) -> Option<MeshHit> {
        self.bvh
            .cast_ray(ray, t_max, |index, closest| {
                ray_triangle(ray, &self.triangle(index), false)
                    .map(|hit| hit.distance)
                    .filter(|&t| t <= closest)
            })
            .map(|(triangle, distance)| MeshHit { triangle, distance })
    }

    /// Check a triangle given in this mesh's frame against the mesh
    pub fn overlaps_triangle(&self, triangle: &Triangle) -> bool {
        let query = triangle_aabb(triangle);
        self.bvh
            .query_aabb(&query, |index| triangles_overlap(&self.triangle(index), triangle))
    }

    /// Surface-surface overlap with `other` placed by `other_to_self`
    ///
    /// Only surfaces are tested: a mesh fully enclosed by another without
    /// touching it does not overlap.
    pub fn overlaps_mesh(&self, other: &TriangleMesh, other_to_self: &Mat4) -> bool {
        if !self.bounds.intersects(&other.bounds.transform(other_to_self)) {
            return false;
        }
        (0..other.triangle_count()).any(|index| {
            let triangle = other
                .triangle(index)
                .map(|v| other_to_self.transform_point3(v));
            triangle_aabb(&triangle).intersects(&self.bounds) && self.overlaps_triangle(&triangle)
        })
    }
}
