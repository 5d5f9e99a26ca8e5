//! # stager_geometry - Spatial Query Primitives
//!
//! Geometry used by scene substitution and viewpoint search:
//!
//! - [`Aabb`] bounds and [`Ray`]s
//! - Ray/box, ray/triangle and triangle/triangle tests
//! - [`TriangleMesh`] with its own [`Bvh`]
//!
//! All types are plain `glam` values in a Z-up world.

pub mod bounds;
pub mod bvh;
pub mod error;
pub mod intersect;
pub mod mesh;
pub mod ray;

pub use bounds::Aabb;
pub use bvh::Bvh;
pub use error::{GeometryError, Result};
pub use intersect::{ray_aabb, ray_triangle, triangle_aabb, triangles_overlap, Triangle, TriangleHit};
pub use mesh::{MeshHit, TriangleMesh};
pub use ray::Ray;

pub use glam::{Mat3, Mat4, Vec3};
