//! Depth-limited hierarchy construction.
//!
//! [`TreeBuilder`] expands a set of root units into a [`TreeNode`] tree using
//! an explicit work stack, so arbitrarily deep hierarchies never grow the call
//! stack. Nodes are first collected in a flat arena (children always land at
//! higher indices than their parent), then folded into the nested tree in a
//! single reverse pass.
//!
//! # Expansion order
//!
//! The work stack is last-in first-out: the most recently discovered sub-group
//! is expanded first. This changes the order in which the store is queried but
//! never the shape of the tree; each node's children keep discovery order
//! (sub-groups first, then leaves).

use arbor_store::{Unit, UnitStore};

use crate::error::TreeError;
use crate::node::TreeNode;

/// Depth used when none is configured. Large enough to mean "unbounded" for
/// any realistic repository.
pub const DEFAULT_DEPTH: u32 = 999;

/// Builds depth-limited hierarchy trees from a [`UnitStore`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TreeBuilder {
    depth: u32,
    exclude_leaves: bool,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_DEPTH, false)
    }
}

/// Arena slot for a node under construction.
struct Slot {
    unit: Unit,
    level: u32,
    children: Vec<usize>,
}

impl TreeBuilder {
    /// Create a builder.
    ///
    /// # Arguments
    ///
    /// * `depth` - Maximum level that is still expanded is `depth - 1`; nodes
    ///   at `depth` appear but are not expanded. `0` keeps only the roots.
    /// * `exclude_leaves` - Never attach leaf units.
    #[must_use]
    pub fn new(depth: u32, exclude_leaves: bool) -> Self {
        Self {
            depth,
            exclude_leaves,
        }
    }

    /// Maximum expansion depth.
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }

    /// Whether leaves are excluded.
    #[must_use]
    pub fn exclude_leaves(&self) -> bool {
        self.exclude_leaves
    }

    /// Build a tree whose synthetic root holds one level-1 node per root unit.
    ///
    /// Each group node with `level < depth` is expanded: its sub-groups are
    /// attached and queued, then (unless leaves are excluded) its leaves are
    /// attached. Leaves are never queued, so they ignore the depth check.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Retrieval`] on the first store failure. No partial
    /// tree is returned.
    pub fn build(&self, store: &dyn UnitStore, roots: Vec<Unit>) -> Result<TreeNode, TreeError> {
        let mut slots: Vec<Slot> = Vec::new();
        let mut top: Vec<usize> = Vec::with_capacity(roots.len());
        let mut stack: Vec<usize> = Vec::with_capacity(roots.len());

        for unit in roots {
            let idx = slots.len();
            slots.push(Slot {
                unit,
                level: 1,
                children: Vec::new(),
            });
            top.push(idx);
            stack.push(idx);
        }

        while let Some(idx) = stack.pop() {
            let level = slots[idx].level;
            if level >= self.depth || slots[idx].unit.is_leaf() {
                continue;
            }

            let sub_groups = store.sub_groups(&slots[idx].unit)?;
            let leaves = if self.exclude_leaves {
                Vec::new()
            } else {
                store.leaves(&slots[idx].unit)?
            };

            for unit in sub_groups {
                let child = slots.len();
                slots.push(Slot {
                    unit,
                    level: level + 1,
                    children: Vec::new(),
                });
                slots[idx].children.push(child);
                stack.push(child);
            }
            for unit in leaves {
                let child = slots.len();
                slots.push(Slot {
                    unit,
                    level: level + 1,
                    children: Vec::new(),
                });
                slots[idx].children.push(child);
            }
        }

        let node_count = slots.len();
        let mut root = TreeNode::root();
        root.set_children(assemble(slots, &top));

        tracing::debug!(
            nodes = node_count,
            depth = self.depth,
            exclude_leaves = self.exclude_leaves,
            "Built hierarchy tree"
        );

        Ok(root)
    }
}

/// Fold arena slots into nested nodes, returning the nodes for `top`.
///
/// Children are always stored after their parent, so walking the arena
/// backwards finishes every child before its parent needs it.
fn assemble(slots: Vec<Slot>, top: &[usize]) -> Vec<TreeNode> {
    let mut built: Vec<Option<TreeNode>> = Vec::with_capacity(slots.len());
    built.resize_with(slots.len(), || None);

    for (idx, slot) in slots.into_iter().enumerate().rev() {
        let children = slot
            .children
            .iter()
            .filter_map(|&child| built[child].take())
            .collect();
        built[idx] = Some(TreeNode::with_children(slot.unit, slot.level, children));
    }

    top.iter().filter_map(|&idx| built[idx].take()).collect()
}
