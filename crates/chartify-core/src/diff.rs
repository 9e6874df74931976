//! Resource-level diff between a base and an overlay snapshot
//!
//! Resources are matched by [`ResourceKey`]; each key found in either
//! snapshot yields exactly one [`DiffEntry`]. Content is compared by deep
//! structural equality, so key order inside mappings does not matter.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt;

use crate::resource::{Resource, ResourceKey};

/// Which snapshot a resource came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Base,
    Overlay,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Base => write!(f, "base"),
            Side::Overlay => write!(f, "overlay"),
        }
    }
}

/// Classification of a single resource slot
#[derive(Debug, Clone, PartialEq)]
pub enum DiffEntry {
    /// Present only in the overlay
    Added(Resource),
    /// Present only in the base
    Removed(Resource),
    /// Present in both with different content
    Modified { base: Resource, overlay: Resource },
    /// Present in both with identical content
    Unchanged { base: Resource, overlay: Resource },
}

impl DiffEntry {
    pub fn kind(&self) -> DiffKind {
        match self {
            DiffEntry::Added(_) => DiffKind::Added,
            DiffEntry::Removed(_) => DiffKind::Removed,
            DiffEntry::Modified { .. } => DiffKind::Modified,
            DiffEntry::Unchanged { .. } => DiffKind::Unchanged,
        }
    }

    /// The resource that names this entry: the overlay for added
    /// resources, the base otherwise
    pub fn representative(&self) -> &Resource {
        match self {
            DiffEntry::Added(overlay) => overlay,
            DiffEntry::Removed(base) => base,
            DiffEntry::Modified { base, .. } | DiffEntry::Unchanged { base, .. } => base,
        }
    }

    pub fn base(&self) -> Option<&Resource> {
        match self {
            DiffEntry::Added(_) => None,
            DiffEntry::Removed(base) => Some(base),
            DiffEntry::Modified { base, .. } | DiffEntry::Unchanged { base, .. } => Some(base),
        }
    }

    pub fn overlay(&self) -> Option<&Resource> {
        match self {
            DiffEntry::Added(overlay) => Some(overlay),
            DiffEntry::Removed(_) => None,
            DiffEntry::Modified { overlay, .. } | DiffEntry::Unchanged { overlay, .. } => {
                Some(overlay)
            }
        }
    }
}

/// Tag of a [`DiffEntry`] without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Modified,
    Unchanged,
}

impl DiffKind {
    pub fn label(&self) -> &'static str {
        match self {
            DiffKind::Added => "added",
            DiffKind::Removed => "removed",
            DiffKind::Modified => "modified",
            DiffKind::Unchanged => "unchanged",
        }
    }
}

impl fmt::Display for DiffKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A key that appeared more than once within one snapshot
///
/// The later document replaced the earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KeyCollision {
    pub side: Side,
    pub key: ResourceKey,
}

/// Entry counts per kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn total(&self) -> usize {
        self.added + self.removed + self.modified + self.unchanged
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        match kind {
            DiffKind::Added => self.added,
            DiffKind::Removed => self.removed,
            DiffKind::Modified => self.modified,
            DiffKind::Unchanged => self.unchanged,
        }
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} added, {} removed, {} modified, {} unchanged",
            self.added, self.removed, self.modified, self.unchanged
        )
    }
}

/// Result of diffing two snapshots, ordered by resource key
#[derive(Debug, Clone, Default)]
pub struct DiffSet {
    entries: BTreeMap<ResourceKey, DiffEntry>,
    collisions: Vec<KeyCollision>,
}

impl DiffSet {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&DiffEntry> {
        self.entries.get(key)
    }

    /// Entries in key order
    pub fn iter(&self) -> impl Iterator<Item = (&ResourceKey, &DiffEntry)> {
        self.entries.iter()
    }

    /// Entries of a single kind, in key order
    pub fn of_kind(&self, kind: DiffKind) -> impl Iterator<Item = (&ResourceKey, &DiffEntry)> {
        self.entries.iter().filter(move |(_, e)| e.kind() == kind)
    }

    /// Keys that were overwritten within a snapshot
    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    pub fn summary(&self) -> DiffSummary {
        let mut summary = DiffSummary::default();
        for entry in self.entries.values() {
            match entry.kind() {
                DiffKind::Added => summary.added += 1,
                DiffKind::Removed => summary.removed += 1,
                DiffKind::Modified => summary.modified += 1,
                DiffKind::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }
}

impl<'a> IntoIterator for &'a DiffSet {
    type Item = (&'a ResourceKey, &'a DiffEntry);
    type IntoIter = std::collections::btree_map::Iter<'a, ResourceKey, DiffEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Compare two snapshots resource by resource
///
/// Within each snapshot a repeated key keeps the last document; every such
/// overwrite is recorded in [`DiffSet::collisions`].
pub fn compute_diff(base: &[Resource], overlay: &[Resource]) -> DiffSet {
    let mut collisions = Vec::new();
    let mut base_by_key = key_resources(base, Side::Base, &mut collisions);
    let mut overlay_by_key = key_resources(overlay, Side::Overlay, &mut collisions);

    let mut entries = BTreeMap::new();

    // Keys present in both are compared; leftovers are added or removed
    let shared: Vec<ResourceKey> = base_by_key
        .keys()
        .filter(|k| overlay_by_key.contains_key(*k))
        .cloned()
        .collect();

    for key in shared {
        let (Some(b), Some(o)) = (base_by_key.remove(&key), overlay_by_key.remove(&key)) else {
            continue;
        };
        let entry = if b == o {
            DiffEntry::Unchanged { base: b, overlay: o }
        } else {
            DiffEntry::Modified { base: b, overlay: o }
        };
        entries.insert(key, entry);
    }

    for (key, resource) in overlay_by_key {
        entries.insert(key, DiffEntry::Added(resource));
    }

    for (key, resource) in base_by_key {
        entries.insert(key, DiffEntry::Removed(resource));
    }

    DiffSet {
        entries,
        collisions,
    }
}

fn key_resources(
    resources: &[Resource],
    side: Side,
    collisions: &mut Vec<KeyCollision>,
) -> BTreeMap<ResourceKey, Resource> {
    let mut keyed = BTreeMap::new();

    for resource in resources {
        let key = resource.key();
        match keyed.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(resource.clone());
            }
            Entry::Occupied(mut slot) => {
                tracing::warn!(
                    "Duplicate resource key {} in {} manifests; keeping the later document",
                    slot.key(),
                    side
                );
                collisions.push(KeyCollision {
                    side,
                    key: slot.key().clone(),
                });
                slot.insert(resource.clone());
            }
        }
    }

    keyed
}
