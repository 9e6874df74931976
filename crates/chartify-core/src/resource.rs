//! Kubernetes resource documents and their identity keys
//!
//! A [`Resource`] wraps one parsed manifest document as a generic YAML tree.
//! Its [`ResourceKey`] identifies the object slot (group, version, kind,
//! namespace, name) so that the same object can be matched across the base
//! and overlay snapshots regardless of content.

use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::fmt;

use crate::error::Result;
use crate::yaml;

/// apiVersion prefix of the CustomResourceDefinition API group
const CRD_API_PREFIX: &str = "apiextensions.k8s.io/";

/// Kind of a CustomResourceDefinition
const CRD_KIND: &str = "CustomResourceDefinition";

/// Group segment used for resources of the core (unnamed) API group
const CORE_GROUP: &str = "core";

/// A single Kubernetes manifest document
///
/// Resources are compared by value. Mapping key order does not affect
/// equality; sequence order does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Resource(Value);

impl Resource {
    /// Wrap an already parsed YAML value
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Parse a single YAML document
    pub fn from_yaml(yaml: &str) -> serde_yaml::Result<Self> {
        serde_yaml::from_str(yaml).map(Self)
    }

    /// Get the underlying YAML tree
    pub fn value(&self) -> &Value {
        &self.0
    }

    /// Raw `apiVersion` field
    pub fn api_version(&self) -> Option<String> {
        self.0.get("apiVersion").and_then(scalar_text)
    }

    /// Raw `kind` field
    pub fn kind(&self) -> Option<String> {
        self.0.get("kind").and_then(scalar_text)
    }

    /// `metadata.name`
    pub fn name(&self) -> Option<String> {
        self.metadata_field("name")
    }

    /// `metadata.namespace`, only when set to a non-empty value
    pub fn namespace(&self) -> Option<String> {
        self.metadata_field("namespace").filter(|ns| !ns.is_empty())
    }

    /// Identity key of this resource
    pub fn key(&self) -> ResourceKey {
        let api_version = self.api_version().unwrap_or_else(|| "v1".to_string());
        let kind = self.kind().unwrap_or_else(|| "unknown".to_string());
        let name = self.name().unwrap_or_else(|| "unnamed".to_string());

        // "v1" has no group; "apps/v1" splits on the first slash only
        let (group, version) = match api_version.split_once('/') {
            Some((group, version)) => (group, version),
            None => ("", api_version.as_str()),
        };
        let group = if group.is_empty() { CORE_GROUP } else { group };
        let kind = kind.to_lowercase();

        let key = match self.namespace() {
            Some(namespace) => format!("{group}_{version}_{kind}_{namespace}_{name}"),
            None => format!("{group}_{version}_{kind}_{name}"),
        };

        ResourceKey(key)
    }

    /// Output file name for the template generated from this resource
    pub fn template_filename(&self) -> String {
        format!("{}.yaml", self.key())
    }

    /// Whether this is a CustomResourceDefinition
    pub fn is_crd(&self) -> bool {
        self.kind().as_deref() == Some(CRD_KIND)
            && self
                .api_version()
                .is_some_and(|v| v.starts_with(CRD_API_PREFIX))
    }

    /// Short `Kind/name` label for logs and reports
    pub fn display_name(&self) -> String {
        format!(
            "{}/{}",
            self.kind().unwrap_or_else(|| "Unknown".to_string()),
            self.name().unwrap_or_else(|| "Unnamed".to_string())
        )
    }

    /// Serialize to block-style YAML with sorted keys and no trailing whitespace
    pub fn to_yaml(&self) -> Result<String> {
        yaml::to_block_yaml(&self.0)
    }

    fn metadata_field(&self, field: &str) -> Option<String> {
        self.0
            .get("metadata")
            .and_then(|m| m.get(field))
            .and_then(scalar_text)
    }
}

impl From<Value> for Resource {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

/// Render a scalar YAML value as text; null and collections yield `None`
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Stable identity of a resource slot across snapshots
///
/// Format: `{group}_{version}_{kind}_[{namespace}_]{name}` where `group` is
/// `core` for the unnamed API group and `kind` is lowercased.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ResourceKey(String);

impl ResourceKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ResourceKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Compute the identity key of a resource
pub fn compute_key(resource: &Resource) -> ResourceKey {
    resource.key()
}

/// Template file name for a resource: its key plus `.yaml`
pub fn template_filename(resource: &Resource) -> String {
    resource.template_filename()
}

/// Check whether a resource is a CustomResourceDefinition
pub fn is_custom_resource_definition(resource: &Resource) -> bool {
    resource.is_crd()
}
