//! Core error types

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Path not found: {}", path.display())]
    InputPathMissing { path: PathBuf },

    #[error("No YAML files found in directory: {}", path.display())]
    NoYamlFilesFound { path: PathBuf },

    #[error("Error parsing YAML file {}: {message}", path.display())]
    YamlParse { path: PathBuf, message: String },

    #[error("No valid manifests found in: {}", path.display())]
    NoValidManifests { path: PathBuf },

    #[error("Error loading values file {}: {message}", path.display())]
    ValuesFile { path: PathBuf, message: String },

    #[error("Failed to serialize YAML: {0}")]
    Serialize(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CoreError>;
