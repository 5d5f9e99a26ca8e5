//! Scene objects and their identifiers

use std::fmt;
use std::sync::Arc;

use glam::Mat4;
use serde::{Deserialize, Serialize};
use stager_geometry::{Aabb, TriangleMesh};

use crate::properties::{Properties, PropertyValue};

/// Stable identifier of an object within its [`Scene`](crate::Scene)
///
/// Ids are arena indices and are never reused; invalidated objects keep
/// their id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(u32);

impl ObjectId {
    #[inline]
    pub const fn from_index(index: u32) -> Self {
        Self(index)
    }

    #[inline]
    pub const fn index(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A placeable object: name, world transform, optional mesh, properties
#[derive(Debug, Clone)]
pub struct SceneObject {
    pub name: String,
    pub transform: Mat4,
    pub mesh: Option<Arc<TriangleMesh>>,
    pub properties: Properties,
    valid: bool,
}

impl SceneObject {
    /// New valid object at the identity transform, without geometry
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: Mat4::IDENTITY,
            mesh: None,
            properties: Properties::new(),
            valid: true,
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_mesh(mut self, mesh: impl Into<Arc<TriangleMesh>>) -> Self {
        self.mesh = Some(mesh.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key, value);
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Logically remove the object. There is no way back to valid.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    /// Mesh bounds in the object's local frame
    pub fn local_bounds(&self) -> Option<Aabb> {
        self.mesh.as_ref().map(|mesh| mesh.bounds()).filter(|b| !b.is_empty())
    }

    /// Mesh bounds moved into world space
    pub fn world_bounds(&self) -> Option<Aabb> {
        self.local_bounds().map(|bounds| bounds.transform(&self.transform))
    }
}
