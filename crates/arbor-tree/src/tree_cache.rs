//! Per-request memoization of a built hierarchy.

use std::sync::Arc;

use arbor_store::{Unit, UnitStore};

use crate::builder::TreeBuilder;
use crate::error::TreeError;
use crate::node::TreeNode;

/// Holds at most one built tree for the lifetime of a request.
///
/// The first [`get_or_build`](Self::get_or_build) builds the tree; later
/// calls return the same tree without touching the store, whatever `parent`
/// they pass. Call [`reset`](Self::reset) between requests.
///
/// A `TreeCache` belongs to one request at a time; it takes `&mut self` and
/// is not meant to be shared across threads.
pub struct TreeCache {
    store: Arc<dyn UnitStore>,
    builder: TreeBuilder,
    root: Option<TreeNode>,
}

impl TreeCache {
    /// Create an empty cache over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UnitStore>, builder: TreeBuilder) -> Self {
        Self {
            store,
            builder,
            root: None,
        }
    }

    /// Return the memoized tree, building it on first use.
    ///
    /// With `parent = None` the roots are all top-level groups; with
    /// `Some(group)` they are that group's direct sub-groups. A failed build
    /// memoizes nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Retrieval`] if the store fails while building.
    pub fn get_or_build(&mut self, parent: Option<&Unit>) -> Result<&TreeNode, TreeError> {
        let tree = match self.root.take() {
            Some(tree) => tree,
            None => {
                let roots = match parent {
                    Some(group) => self.store.sub_groups(group)?,
                    None => self.store.top_level_groups()?,
                };
                self.builder.build(self.store.as_ref(), roots)?
            }
        };
        Ok(self.root.insert(tree))
    }

    /// Whether a tree is currently memoized.
    #[must_use]
    pub fn is_built(&self) -> bool {
        self.root.is_some()
    }

    /// Drop the memoized tree so the next request rebuilds it.
    pub fn reset(&mut self) {
        self.root = None;
    }

    /// Builder parameters used for every build.
    #[must_use]
    pub fn builder(&self) -> &TreeBuilder {
        &self.builder
    }

    /// Store the tree is built from.
    #[must_use]
    pub fn store(&self) -> &dyn UnitStore {
        self.store.as_ref()
    }
}
