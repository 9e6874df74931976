//! Manifest loading from a file or a directory tree

use serde::Deserialize;
use serde_yaml::Value;
use std::path::{Path, PathBuf};

use crate::error::{CoreError, Result};
use crate::resource::Resource;

/// Documents loaded from one input path
#[derive(Debug, Clone)]
pub struct ManifestSet {
    /// The path the set was loaded from (file or directory)
    pub source: PathBuf,

    /// Files that were read, in load order
    pub files: Vec<PathBuf>,

    /// Non-empty documents, in load order
    pub resources: Vec<Resource>,
}

impl ManifestSet {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

/// Load all manifests found at `path`
///
/// A file is read as a multi-document YAML stream. A directory is scanned
/// recursively for `*.yaml` and `*.yml` files, which are read in path order.
/// Empty documents are skipped; at least one document must remain.
pub fn load_manifests(path: &Path) -> Result<ManifestSet> {
    let files = if path.is_file() {
        vec![path.to_path_buf()]
    } else if path.is_dir() {
        let files = yaml_files(path);
        if files.is_empty() {
            return Err(CoreError::NoYamlFilesFound {
                path: path.to_path_buf(),
            });
        }
        files
    } else {
        return Err(CoreError::InputPathMissing {
            path: path.to_path_buf(),
        });
    };

    let mut resources = Vec::new();
    for file in &files {
        let content = std::fs::read_to_string(file)?;
        let docs = parse_documents(&content, file)?;
        tracing::debug!("Read {} document(s) from {}", docs.len(), file.display());
        resources.extend(docs);
    }

    if resources.is_empty() {
        return Err(CoreError::NoValidManifests {
            path: path.to_path_buf(),
        });
    }

    Ok(ManifestSet {
        source: path.to_path_buf(),
        files,
        resources,
    })
}

/// Parse a multi-document YAML stream into resources
///
/// `path` is only used for error messages.
pub fn parse_documents(content: &str, path: &Path) -> Result<Vec<Resource>> {
    let mut resources = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let value = Value::deserialize(document)
            .and_then(|mut value| value.apply_merge().map(|()| value))
            .map_err(|e| CoreError::YamlParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        if is_empty_document(&value) {
            continue;
        }

        if !value.is_mapping() {
            return Err(CoreError::YamlParse {
                path: path.to_path_buf(),
                message: format!("document {} is not a mapping", index + 1),
            });
        }

        resources.push(Resource::new(value));
    }

    Ok(resources)
}

/// Documents with no content: null, `false`, zero and empty collections or strings
fn is_empty_document(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::Mapping(map) => map.is_empty(),
        Value::Sequence(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        Value::Tagged(_) => false,
    }
}

/// Collect `*.yaml` / `*.yml` files under `dir`, sorted for deterministic ordering
fn yaml_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    for entry in walkdir::WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file()
            && let Some(ext) = path.extension()
        {
            let ext = ext.to_string_lossy().to_lowercase();
            if matches!(ext.as_str(), "yaml" | "yml") {
                files.push(path.to_path_buf());
            }
        }
    }

    files.sort();
    files
}
