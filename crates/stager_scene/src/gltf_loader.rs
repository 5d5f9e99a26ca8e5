//! glTF scene and object loading
//!
//! Every node with a triangle mesh becomes one [`SceneObject`] carrying its
//! world transform. Node `extras` objects become custom properties.

use std::path::Path;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use stager_geometry::TriangleMesh;

use crate::error::{Result, SceneError};
use crate::loader::{LabelMapping, ObjectLoader, SceneLoader};
use crate::object::SceneObject;
use crate::properties::{Properties, PropertyValue};

/// Loads `.gltf` / `.glb` files
#[derive(Debug, Clone)]
pub struct GltfLoader {
    /// Text property holding the category name
    pub category_key: String,
    /// Integer property written from the label mapping
    pub category_id_key: String,
}

impl Default for GltfLoader {
    fn default() -> Self {
        Self {
            category_key: "category".to_string(),
            category_id_key: "category_id".to_string(),
        }
    }
}

impl GltfLoader {
    pub fn new() -> Self {
        Self::default()
    }

    fn load(&self, path: &Path) -> Result<Vec<SceneObject>> {
        let (document, buffers, _images) = gltf::import(path).map_err(|source| SceneError::Gltf {
            path: path.to_path_buf(),
            source,
        })?;

        let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
            log::warn!("{} contains no scene", path.display());
            return Ok(Vec::new());
        };

        let mut objects = Vec::new();
        for node in scene.nodes() {
            self.visit_node(&node, Mat4::IDENTITY, &buffers, &mut objects)?;
        }
        log::debug!("Loaded {} objects from {}", objects.len(), path.display());
        Ok(objects)
    }

    fn visit_node(
        &self,
        node: &gltf::Node,
        parent: Mat4,
        buffers: &[gltf::buffer::Data],
        objects: &mut Vec<SceneObject>,
    ) -> Result<()> {
        let transform = parent * Mat4::from_cols_array_2d(&node.transform().matrix());

        if let Some(mesh) = node.mesh() {
            let name = node
                .name()
                .or_else(|| mesh.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("node_{}", node.index()));
            let geometry = read_mesh(&mesh, buffers).map_err(|source| SceneError::InvalidMesh {
                name: name.clone(),
                source,
            })?;
            objects.push(
                SceneObject::new(name)
                    .with_transform(transform)
                    .with_mesh(Arc::new(geometry))
                    .with_properties(node_properties(node)),
            );
        }

        for child in node.children() {
            self.visit_node(&child, transform, buffers, objects)?;
        }
        Ok(())
    }

    fn apply_labels(&self, objects: &mut [SceneObject], labels: &LabelMapping) {
        if labels.is_empty() {
            return;
        }
        for object in objects {
            let category = object
                .property(&self.category_key)
                .and_then(PropertyValue::as_str)
                .map(str::to_string);
            let Some(category) = category else { continue };
            match labels.id_for(&category) {
                Some(id) => {
                    object.properties.insert(self.category_id_key.clone(), id);
                }
                None => log::warn!("No label id for category '{}' of '{}'", category, object.name),
            }
        }
    }
}

impl SceneLoader for GltfLoader {
    fn load_scene(&self, path: &Path, labels: &LabelMapping) -> Result<Vec<SceneObject>> {
        let mut objects = self.load(path)?;
        self.apply_labels(&mut objects, labels);
        log::info!("Loaded scene {} ({} objects)", path.display(), objects.len());
        Ok(objects)
    }
}

impl ObjectLoader for GltfLoader {
    fn load_objects(&self, path: &Path) -> Result<Vec<SceneObject>> {
        self.load(path)
    }
}

/// Merge all triangle primitives of a mesh into one [`TriangleMesh`]
fn read_mesh(mesh: &gltf::Mesh, buffers: &[gltf::buffer::Data]) -> stager_geometry::Result<TriangleMesh> {
    let mut vertices: Vec<Vec3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for primitive in mesh.primitives() {
        if primitive.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive {:?}", primitive.mode());
            continue;
        }
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(positions) = reader.read_positions() else {
            continue;
        };

        let offset = vertices.len() as u32;
        vertices.extend(positions.map(Vec3::from_array));
        let count = vertices.len() as u32 - offset;
        match reader.read_indices() {
            Some(read) => indices.extend(read.into_u32().map(|i| i + offset)),
            None => indices.extend(offset..offset + count),
        }
    }

    TriangleMesh::new(vertices, &indices)
}

fn node_properties(node: &gltf::Node) -> Properties {
    node.extras()
        .as_ref()
        .and_then(|raw| serde_json::from_str::<serde_json::Value>(raw.get()).ok())
        .and_then(|value| value.as_object().map(Properties::from_json_object))
        .unwrap_or_default()
}
