//! Chart values tree with dotted-path injection

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};
use std::path::Path;

use crate::error::{CoreError, Result};
use crate::yaml;

/// Values container rooted at a YAML mapping
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Values(pub Mapping);

impl Values {
    /// Create empty values
    pub fn new() -> Self {
        Self(Mapping::new())
    }

    /// Load values from a YAML file
    ///
    /// An empty file yields empty values. Anything other than a mapping at the
    /// top level is rejected.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let values_error = |message: String| CoreError::ValuesFile {
            path: path.to_path_buf(),
            message,
        };

        let content = std::fs::read_to_string(path).map_err(|e| values_error(e.to_string()))?;
        if content.trim().is_empty() {
            return Ok(Self::new());
        }

        let mut value: Value =
            serde_yaml::from_str(&content).map_err(|e| values_error(e.to_string()))?;
        value
            .apply_merge()
            .map_err(|e| values_error(e.to_string()))?;

        match value {
            Value::Null => Ok(Self::new()),
            Value::Mapping(map) => Ok(Self(map)),
            other => Err(values_error(format!(
                "expected a mapping at the top level, found {}",
                type_name(&other)
            ))),
        }
    }

    /// Set a value by dotted path (e.g., "global.features.enabled")
    ///
    /// Missing intermediate mappings are created. An intermediate segment
    /// holding a non-mapping value is replaced by an empty mapping.
    pub fn set(&mut self, path: &str, value: Value) {
        let parts: Vec<&str> = path.split('.').collect();
        set_nested(&mut self.0, &parts, value);
    }

    /// Get a value by dotted path
    pub fn get(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let first = parts.next()?;
        let mut current = self.0.get(first)?;
        for key in parts {
            current = current.as_mapping()?.get(key)?;
        }
        Some(current)
    }

    /// Number of top-level keys
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn inner(&self) -> &Mapping {
        &self.0
    }

    /// Serialize as block-style YAML with sorted keys
    pub fn to_yaml(&self) -> Result<String> {
        yaml::to_block_yaml(&Value::Mapping(self.0.clone()))
    }
}

impl From<Mapping> for Values {
    fn from(map: Mapping) -> Self {
        Self(map)
    }
}

/// Set a boolean at a dotted path, creating intermediate mappings
///
/// This is the generator's view of values: existing non-mapping values along
/// the path are discarded, and the final segment is always overwritten.
pub fn inject_dotted_path(tree: &mut Values, path: &str, value: bool) {
    tree.set(path, Value::Bool(value));
}

fn set_nested(map: &mut Mapping, path: &[&str], new_value: Value) {
    let Some((&key, remaining)) = path.split_first() else {
        return;
    };

    if remaining.is_empty() {
        map.insert(Value::String(key.to_string()), new_value);
        return;
    }

    let entry = map
        .entry(Value::String(key.to_string()))
        .or_insert_with(|| Value::Mapping(Mapping::new()));

    if !entry.is_mapping() {
        *entry = Value::Mapping(Mapping::new());
    }

    if let Value::Mapping(child) = entry {
        set_nested(child, remaining, new_value);
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
