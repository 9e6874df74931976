//! Chartify Core - building blocks for turning two manifest snapshots into a chart
//!
//! This crate provides the pieces that do not touch the output chart:
//! - `Resource`: a parsed Kubernetes manifest document and its identity key
//! - `manifest`: loading manifests from a file or a directory tree
//! - `diff`: classifying resources as added, removed, modified or unchanged
//! - `Values`: the chart values tree with dotted-path injection
//! - `yaml`: block-style YAML emission with stable key order

pub mod diff;
pub mod error;
pub mod manifest;
pub mod resource;
pub mod values;
pub mod yaml;

pub use diff::{DiffEntry, DiffKind, DiffSet, DiffSummary, KeyCollision, Side, compute_diff};
pub use error::{CoreError, Result};
pub use manifest::{ManifestSet, load_manifests, parse_documents};
pub use resource::{
    Resource, ResourceKey, compute_key, is_custom_resource_definition, template_filename,
};
pub use values::{Values, inject_dotted_path};
