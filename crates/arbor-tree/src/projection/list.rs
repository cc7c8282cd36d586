//! Nested link-list projection.
//!
//! Each group contributes an emphasized link to its handle page. If the group
//! has children, a single sub-list follows it holding plain links to its
//! leaves, then the nested entries of its sub-groups.

use serde::{Deserialize, Serialize};

use arbor_store::Unit;

use crate::node::TreeNode;

/// An identified list of entries.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// List identifier (`sub-list-{unit id}` for nested lists).
    pub id: String,
    /// Items and nested lists in order.
    pub entries: Vec<ListEntry>,
}

impl List {
    /// Create an empty list.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            entries: Vec::new(),
        }
    }
}

/// One entry of a [`List`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ListEntry {
    /// A link.
    Item(ListItem),
    /// A nested list.
    List(List),
}

/// A labeled link.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    /// Display label (the unit name).
    pub label: String,
    /// Link target.
    pub target: String,
    /// Rendered in bold (groups).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub emphasized: bool,
}

/// Projects a tree into nested lists of links under a base path.
///
/// Links have the form `{base_path}/handle/{handle}`.
#[derive(Clone, Debug)]
pub struct ListProjection {
    base_path: String,
}

impl ListProjection {
    /// Create a projection for `base_path`. A trailing `/` is ignored.
    #[must_use]
    pub fn new(base_path: &str) -> Self {
        Self {
            base_path: base_path.trim_end_matches('/').to_owned(),
        }
    }

    /// Link target for a unit.
    #[must_use]
    pub fn link(&self, unit: &Unit) -> String {
        format!("{}/handle/{}", self.base_path, unit.handle)
    }

    /// Build a list with `id` holding every top-level group of `tree`.
    #[must_use]
    pub fn project(&self, id: impl Into<String>, tree: &TreeNode) -> List {
        let mut list = List::new(id);
        for group in tree.children() {
            self.append(&mut list, group);
        }
        list
    }

    /// Append one group node (and its sub-list, if any) to `list`.
    pub fn append(&self, list: &mut List, node: &TreeNode) {
        let Some(unit) = node.unit() else {
            return;
        };
        list.entries.push(ListEntry::Item(ListItem {
            label: unit.name.clone(),
            target: self.link(unit),
            emphasized: true,
        }));

        let partition = node.partition();
        if partition.is_empty() {
            return;
        }

        let mut sub_list = List::new(format!("sub-list-{}", unit.id));
        for leaf in partition.leaves.iter().filter_map(|n| n.unit()) {
            sub_list.entries.push(ListEntry::Item(ListItem {
                label: leaf.name.clone(),
                target: self.link(leaf),
                emphasized: false,
            }));
        }
        for group in partition.groups {
            self.append(&mut sub_list, group);
        }
        list.entries.push(ListEntry::List(sub_list));
    }
}
