//! Hierarchy tree nodes.
//!
//! A [`TreeNode`] records one unit's position in a specific traversal. The
//! tree returned by [`TreeBuilder`](crate::TreeBuilder) is anchored at a
//! synthetic root that carries no unit and sits at level 0; every child sits
//! exactly one level below its parent.
//!
//! Nodes are read-only once built. Only the builder attaches children, and it
//! never attaches any to a leaf.

use serde::Serialize;

use arbor_store::Unit;

/// One unit's position in a built hierarchy.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TreeNode {
    /// Unit this node represents. `None` only for the synthetic root.
    #[serde(skip_serializing_if = "Option::is_none")]
    unit: Option<Unit>,
    /// Depth in the hierarchy (root = 0).
    level: u32,
    /// Children in discovery order.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<TreeNode>,
}

/// Children of a node split by kind, each in discovery order.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    /// Group children.
    pub groups: Vec<&'a TreeNode>,
    /// Leaf children.
    pub leaves: Vec<&'a TreeNode>,
}

impl Partition<'_> {
    /// True if there are neither group nor leaf children.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty() && self.leaves.is_empty()
    }
}

impl TreeNode {
    /// Create the synthetic root anchor.
    #[must_use]
    pub(crate) fn root() -> Self {
        Self {
            unit: None,
            level: 0,
            children: Vec::new(),
        }
    }

    /// Create a node for `unit` at `level` with the given children.
    #[must_use]
    pub(crate) fn with_children(unit: Unit, level: u32, children: Vec<TreeNode>) -> Self {
        debug_assert!(children.is_empty() || unit.is_group());
        Self {
            unit: Some(unit),
            level,
            children,
        }
    }

    /// Attach already-built top-level nodes to a root.
    pub(crate) fn set_children(&mut self, children: Vec<TreeNode>) {
        self.children = children;
    }

    /// Unit represented by this node (`None` for the synthetic root).
    #[must_use]
    pub fn unit(&self) -> Option<&Unit> {
        self.unit.as_ref()
    }

    /// Depth of this node (root = 0, top-level units = 1).
    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    /// Children in discovery order.
    #[must_use]
    pub fn children(&self) -> &[TreeNode] {
        &self.children
    }

    /// True for the synthetic root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.unit.is_none()
    }

    /// Split children into groups and leaves.
    ///
    /// Children of the synthetic root are always groups.
    #[must_use]
    pub fn partition(&self) -> Partition<'_> {
        let mut partition = Partition::default();
        for child in &self.children {
            match child.unit() {
                Some(unit) if unit.is_leaf() => partition.leaves.push(child),
                _ => partition.groups.push(child),
            }
        }
        partition
    }

    /// Number of nodes in this subtree, including this node.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false: a subtree contains at least its own node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Iterate over this node and all descendants in pre-order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { stack: vec![self] }
    }
}

/// Pre-order iterator over a subtree. See [`TreeNode::iter`].
pub struct Iter<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a TreeNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

impl<'a> IntoIterator for &'a TreeNode {
    type Item = &'a TreeNode;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
