//! # stager_scene - Scene Model and Object Substitution
//!
//! Owns the scene objects, answers spatial queries over them, and swaps
//! selected objects for substitutes without creating overlaps.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────┐
//! │                    Scene                        │
//! │   SceneObject { transform, mesh, properties }   │
//! └───────┬──────────────────────────┬──────────────┘
//!         │ snapshot (valid only)    │ select / insert / invalidate
//!         ▼                          ▼
//!  ┌──────────────┐          ┌────────────────┐
//!  │GeometryIndex │◀─────────│ ObjectReplacer │
//!  │  object BVH  │ rebuild  │ PropertyFilter │
//!  │  mesh BVHs   │          │ PoseSampler    │
//!  └──────┬───────┘          └────────────────┘
//!         ▼
//!  ┌────────────────┐
//!  │CollisionChecker│
//!  └────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use stager_scene::prelude::*;
//!
//! let mut scene = Scene::from_objects(GltfLoader::new().load_scene(path, &labels)?);
//! let chairs = scene.select(&PropertyFilter::equals("coarse_grained_class", "chair"));
//! let floors = ExclusionSet::from_filter(&scene, &PropertyFilter::equals("type", "Floor"));
//!
//! let replacer = ObjectReplacer::new(ReplaceOptions::default())?;
//! let report = replacer.replace(&mut scene, &chairs, &[substitute], &floors, &RandomYaw::full_turn(), &mut rng)?;
//! ```

pub mod collision;
pub mod error;
pub mod filter;
pub mod gltf_loader;
pub mod index;
pub mod loader;
pub mod object;
pub mod placement;
pub mod properties;
pub mod replace;
pub mod scene;

pub mod prelude {
    //! Common imports for scene handling
    pub use crate::collision::{CollisionChecker, ExclusionSet};
    pub use crate::error::{Result, SceneError};
    pub use crate::filter::PropertyFilter;
    pub use crate::gltf_loader::GltfLoader;
    pub use crate::index::{GeometryIndex, RayHit};
    pub use crate::loader::{LabelMapping, ObjectLoader, SceneLoader};
    pub use crate::object::{ObjectId, SceneObject};
    pub use crate::placement::{KeepPose, RandomYaw, RelativePoseSampler};
    pub use crate::properties::{Properties, PropertyValue};
    pub use crate::replace::{
        ObjectReplacer, ReplaceOptions, ReplacementAssignment, ReplacementReport, SelectionPolicy,
        SubstitutePolicy,
    };
    pub use crate::scene::Scene;
}

pub use prelude::*;
