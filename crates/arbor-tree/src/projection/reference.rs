//! Nested reference projection.
//!
//! Each group becomes a [`Reference`] carrying up to two [`ReferenceSet`]s:
//! first its leaves (if any), then its sub-groups (if any), each set in
//! discovery order. Sub-groups are projected the same way recursively, so the
//! output nests as deep as the tree.

use serde::{Deserialize, Serialize};

use arbor_store::Unit;

use crate::node::TreeNode;

/// Ordered collection of references with an optional id and render hint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceSet {
    /// Identifier of the set in the rendered output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Render hint for the consumer (e.g. `"hierarchy"`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rend: Option<String>,
    /// References in order.
    pub references: Vec<Reference>,
}

impl ReferenceSet {
    /// Create an anonymous set.
    #[must_use]
    pub fn new(references: Vec<Reference>) -> Self {
        Self {
            id: None,
            rend: None,
            references,
        }
    }

    /// Create a set with an id and render hint.
    #[must_use]
    pub fn named(
        id: impl Into<String>,
        rend: impl Into<String>,
        references: Vec<Reference>,
    ) -> Self {
        Self {
            id: Some(id.into()),
            rend: Some(rend.into()),
            references,
        }
    }
}

/// A pointer to one unit, optionally nesting further reference sets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    /// Referenced unit.
    pub unit: Unit,
    /// Nested sets (leaves first, then sub-groups).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sets: Vec<ReferenceSet>,
}

impl Reference {
    /// Create a reference with no nested sets.
    #[must_use]
    pub fn new(unit: Unit) -> Self {
        Self {
            unit,
            sets: Vec::new(),
        }
    }
}

/// Project every top-level group of `tree` into a reference.
///
/// Children of the root that carry no unit are skipped.
#[must_use]
pub fn reference_groups(tree: &TreeNode) -> Vec<Reference> {
    tree.children().iter().filter_map(reference_for).collect()
}

/// Project one group node and its subtree.
///
/// Returns `None` for the synthetic root.
#[must_use]
pub fn reference_for(node: &TreeNode) -> Option<Reference> {
    let unit = node.unit()?;
    let partition = node.partition();
    let mut reference = Reference::new(unit.clone());

    if !partition.leaves.is_empty() {
        let leaves = partition
            .leaves
            .iter()
            .filter_map(|leaf| leaf.unit().cloned().map(Reference::new))
            .collect();
        reference.sets.push(ReferenceSet::new(leaves));
    }

    if !partition.groups.is_empty() {
        let groups = partition
            .groups
            .iter()
            .copied()
            .filter_map(reference_for)
            .collect();
        reference.sets.push(ReferenceSet::new(groups));
    }

    Some(reference)
}
