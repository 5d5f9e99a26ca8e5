//! Loader interfaces and label mapping
//!
//! File formats stay behind [`SceneLoader`] and [`ObjectLoader`]; the rest
//! of the workspace only sees [`SceneObject`]s.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use crate::error::{Result, SceneError};
use crate::object::SceneObject;

/// Loads a whole scene, resolving category labels through `labels`
pub trait SceneLoader {
    fn load_scene(&self, path: &Path, labels: &LabelMapping) -> Result<Vec<SceneObject>>;
}

/// Loads the objects contained in a model file
pub trait ObjectLoader {
    fn load_objects(&self, path: &Path) -> Result<Vec<SceneObject>>;
}

/// Bidirectional category name <-> id mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelMapping {
    ids: HashMap<String, i64>,
    names: BTreeMap<i64, String>,
}

impl LabelMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names are matched case-insensitively
    pub fn insert(&mut self, id: i64, name: impl AsRef<str>) {
        let name = name.as_ref().trim().to_lowercase();
        self.ids.insert(name.clone(), id);
        self.names.insert(id, name);
    }

    /// Parse `id,name` lines; an optional header line is skipped
    pub fn from_csv_str(text: &str) -> Result<Self> {
        let mut mapping = Self::new();
        for (number, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((id, name)) = line.split_once(',') else {
                return Err(SceneError::LabelMapping {
                    line: number + 1,
                    reason: "expected 'id,name'".to_string(),
                });
            };
            match id.trim().parse::<i64>() {
                Ok(id) => mapping.insert(id, name.split(',').next().unwrap_or(name)),
                Err(_) if mapping.is_empty() && number == 0 => continue,
                Err(e) => {
                    return Err(SceneError::LabelMapping {
                        line: number + 1,
                        reason: format!("invalid id '{}': {}", id.trim(), e),
                    })
                }
            }
        }
        Ok(mapping)
    }

    pub fn from_csv_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        let mapping = Self::from_csv_str(&text)?;
        log::info!("Loaded {} labels from {}", mapping.len(), path.as_ref().display());
        Ok(mapping)
    }

    pub fn id_for(&self, name: &str) -> Option<i64> {
        self.ids.get(&name.trim().to_lowercase()).copied()
    }

    pub fn name_for(&self, id: i64) -> Option<&str> {
        self.names.get(&id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_with_header() {
        let mapping = LabelMapping::from_csv_str("id,name\n0,void\n1,wall\n2,floor\n# comment\n3,Chair\n").unwrap();
        assert_eq!(mapping.len(), 4);
        assert_eq!(mapping.id_for("chair"), Some(3));
        assert_eq!(mapping.id_for("CHAIR "), Some(3));
        assert_eq!(mapping.name_for(2), Some("floor"));
        assert_eq!(mapping.id_for("sofa"), None);
    }

    #[test]
    fn test_parse_without_header() {
        let mapping = LabelMapping::from_csv_str("5,lamp").unwrap();
        assert_eq!(mapping.id_for("lamp"), Some(5));
    }

    #[test]
    fn test_bad_lines() {
        assert!(matches!(
            LabelMapping::from_csv_str("0,void\nnot-a-line\n"),
            Err(SceneError::LabelMapping { line: 2, .. })
        ));
        assert!(matches!(
            LabelMapping::from_csv_str("0,void\nx,wall\n"),
            Err(SceneError::LabelMapping { line: 2, .. })
        ));
    }
}
