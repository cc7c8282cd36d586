//! YAML hierarchy document parsing and indexing.
//!
//! The document nests groups directly:
//!
//! ```yaml
//! groups:
//!   - handle: "123456789/1"
//!     name: "Sciences"
//!     leaves:
//!       - { handle: "123456789/2", name: "Physics", items: 40 }
//!     groups:
//!       - handle: "123456789/3"
//!         name: "Biology"
//! ```
//!
//! Parsing flattens it into an [`Index`] with units stored in a flat `Vec`
//! and children tracked by indices.

use std::collections::HashMap;

use serde::Deserialize;

use arbor_store::Unit;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HierarchyDocument {
    groups: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct GroupEntry {
    handle: String,
    name: String,
    #[serde(default)]
    leaves: Vec<LeafEntry>,
    #[serde(default)]
    groups: Vec<GroupEntry>,
}

#[derive(Debug, Deserialize)]
struct LeafEntry {
    handle: String,
    name: String,
    items: Option<u64>,
}

/// Error produced while indexing a document.
#[derive(Debug, thiserror::Error)]
pub(crate) enum DocumentError {
    #[error("malformed hierarchy document: {0}")]
    Parse(#[source] serde_yaml::Error),
    #[error("unit with an empty handle")]
    EmptyHandle,
    #[error("duplicate handle {0}")]
    DuplicateHandle(String),
}

/// Unit with its child indices.
#[derive(Debug)]
pub(crate) struct IndexedUnit {
    pub unit: Unit,
    pub sub_groups: Vec<usize>,
    pub leaves: Vec<usize>,
    pub items: Option<u64>,
}

/// Flattened hierarchy with O(1) handle lookups.
#[derive(Debug, Default)]
pub(crate) struct Index {
    pub units: Vec<IndexedUnit>,
    pub top: Vec<usize>,
    by_handle: HashMap<String, usize>,
}

impl Index {
    /// Parse and index a YAML document.
    ///
    /// Ids are assigned in pre-order starting at 1: a group, then its leaves,
    /// then its sub-groups. Empty content yields an empty index.
    pub(crate) fn parse(content: &str) -> Result<Self, DocumentError> {
        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Ok(Self::default());
        }

        let document: HierarchyDocument =
            serde_yaml::from_str(trimmed).map_err(DocumentError::Parse)?;

        let mut index = Self::default();
        for group in &document.groups {
            let idx = index.add_group(group)?;
            index.top.push(idx);
        }
        Ok(index)
    }

    /// Look up a unit index by handle.
    pub(crate) fn get(&self, handle: &str) -> Option<usize> {
        self.by_handle.get(handle).copied()
    }

    fn add_group(&mut self, entry: &GroupEntry) -> Result<usize, DocumentError> {
        let idx = self.insert(Unit::group(self.next_id(), &entry.handle, &entry.name), None)?;

        for leaf in &entry.leaves {
            let leaf_idx = self.insert(
                Unit::leaf(self.next_id(), &leaf.handle, &leaf.name),
                leaf.items,
            )?;
            self.units[idx].leaves.push(leaf_idx);
        }

        for sub in &entry.groups {
            let sub_idx = self.add_group(sub)?;
            self.units[idx].sub_groups.push(sub_idx);
        }

        Ok(idx)
    }

    fn insert(&mut self, unit: Unit, items: Option<u64>) -> Result<usize, DocumentError> {
        if unit.handle.trim().is_empty() {
            return Err(DocumentError::EmptyHandle);
        }
        if self.by_handle.contains_key(&unit.handle) {
            return Err(DocumentError::DuplicateHandle(unit.handle));
        }

        let idx = self.units.len();
        self.by_handle.insert(unit.handle.clone(), idx);
        self.units.push(IndexedUnit {
            unit,
            sub_groups: Vec::new(),
            leaves: Vec::new(),
            items,
        });
        Ok(idx)
    }

    fn next_id(&self) -> u64 {
        self.units.len() as u64 + 1
    }
}
