//! Children-of-one-group view.

use std::sync::Arc;

use arbor_store::{ItemCounter, Unit, UnitStore};

use crate::browser::HIERARCHY_REND;
use crate::builder::TreeBuilder;
use crate::error::TreeError;
use crate::key::ChildrenKey;
use crate::pipeline::CacheableView;
use crate::projection::{Reference, ReferenceSet, reference_groups};
use crate::tree_cache::TreeCache;
use crate::validity::{Validity, ValidityAccumulator, ValidityOptions};

/// Identifier of the rendered reference set.
pub const CHILDREN_ID: &str = "group-children-reference";

/// Fingerprint used when the handle does not resolve.
const UNRESOLVED_KEY: &str = "0";

/// Outcome of looking up the view's handle.
#[derive(Clone, Debug)]
enum Resolution {
    Found(Unit),
    Missing,
    Failed(String),
}

/// View of the sub-groups (to a depth) and direct leaves of one group.
///
/// The tree is rooted at the group's sub-groups and always includes leaves.
pub struct GroupChildren {
    handle: String,
    depth: u32,
    trees: TreeCache,
    counter: Option<Arc<dyn ItemCounter>>,
    options: ValidityOptions,
    resolution: Option<Resolution>,
    validity: Option<Validity>,
}

impl GroupChildren {
    /// Create the view for the group with `handle`.
    #[must_use]
    pub fn new(
        store: Arc<dyn UnitStore>,
        handle: impl Into<String>,
        depth: u32,
        options: ValidityOptions,
    ) -> Self {
        Self {
            handle: handle.into(),
            depth,
            trees: TreeCache::new(store, TreeBuilder::new(depth, false)),
            counter: None,
            options,
            resolution: None,
            validity: None,
        }
    }

    /// Use `counter` for size tokens.
    #[must_use]
    pub fn with_counter(mut self, counter: Arc<dyn ItemCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    /// Handle this view was created for.
    #[must_use]
    pub fn handle(&self) -> &str {
        &self.handle
    }

    /// Resolve the handle once per request.
    ///
    /// Failures are memoized too, so [`key`](Self::key) and
    /// [`validity`](Self::validity) always see the same outcome.
    fn resolve(&mut self) -> Resolution {
        if let Some(resolution) = &self.resolution {
            return resolution.clone();
        }
        let resolution = match self.trees.store().find(&self.handle) {
            Ok(Some(unit)) => Resolution::Found(unit),
            Ok(None) => Resolution::Missing,
            Err(e) => Resolution::Failed(e.to_string()),
        };
        self.resolution = Some(resolution.clone());
        resolution
    }

    /// Fingerprint of the resolved handle and depth, or `"0"` if the handle
    /// does not resolve.
    pub fn key(&mut self) -> String {
        match self.resolve() {
            Resolution::Found(unit) => ChildrenKey {
                handle: &unit.handle,
                depth: self.depth,
            }
            .compute_hash(),
            Resolution::Missing | Resolution::Failed(_) => UNRESOLVED_KEY.to_owned(),
        }
    }

    /// Validity of the group, its direct leaves and its sub-group tree.
    ///
    /// Unknown handles, leaves and store failures are
    /// [`Validity::Uncacheable`].
    pub fn validity(&mut self) -> Validity {
        if let Some(validity) = &self.validity {
            return validity.clone();
        }
        match self.compute_validity() {
            Ok(validity) => {
                self.validity = Some(validity.clone());
                validity
            }
            Err(reason) => {
                tracing::warn!(
                    handle = %self.handle,
                    reason = %reason,
                    "Children validity unavailable"
                );
                Validity::Uncacheable { reason }
            }
        }
    }

    fn compute_validity(&mut self) -> Result<Validity, String> {
        let group = match self.resolve() {
            Resolution::Found(unit) if unit.is_group() => unit,
            Resolution::Found(_) => return Err(format!("{} is not a group", self.handle)),
            Resolution::Missing => return Err(format!("unit not found: {}", self.handle)),
            Resolution::Failed(reason) => return Err(reason),
        };
        let leaves = self
            .trees
            .store()
            .leaves(&group)
            .map_err(|e| e.to_string())?;
        let tree = self
            .trees
            .get_or_build(Some(&group))
            .map_err(|e| e.to_string())?;

        let accumulator =
            ValidityAccumulator::new(&self.options).with_counter(self.counter.as_deref());
        let mut descriptor = accumulator.accumulate(tree);
        accumulator.add_unit(&mut descriptor, &group);
        for leaf in &leaves {
            accumulator.add_unit(&mut descriptor, leaf);
        }
        Ok(Validity::Cacheable(descriptor))
    }

    /// Render the group's children.
    ///
    /// Returns `Ok(None)` for a leaf, or for a group without sub-groups and
    /// leaves.
    ///
    /// # Errors
    ///
    /// - [`TreeError::NotFound`] if the handle does not resolve
    /// - [`TreeError::Retrieval`] if the store fails
    pub fn body(&mut self) -> Result<Option<ReferenceSet>, TreeError> {
        let group = match self.resolve() {
            Resolution::Found(unit) => Some(unit),
            Resolution::Missing => None,
            // Look up again so the caller gets the store error itself
            Resolution::Failed(_) => self.trees.store().find(&self.handle)?,
        };
        let Some(group) = group else {
            return Err(TreeError::NotFound(self.handle.clone()));
        };
        if !group.is_group() {
            return Ok(None);
        }

        let leaves = self.trees.store().leaves(&group)?;
        let tree = self.trees.get_or_build(Some(&group))?;
        if tree.children().is_empty() && leaves.is_empty() {
            return Ok(None);
        }

        let mut references = reference_groups(tree);
        references.extend(leaves.into_iter().map(Reference::new));
        Ok(Some(ReferenceSet::named(
            CHILDREN_ID,
            HIERARCHY_REND,
            references,
        )))
    }

    /// Drop the memoized tree, resolved group and validity.
    pub fn recycle(&mut self) {
        self.trees.reset();
        self.resolution = None;
        self.validity = None;
    }
}

impl CacheableView for GroupChildren {
    type Output = Option<ReferenceSet>;

    fn key(&mut self) -> String {
        GroupChildren::key(self)
    }

    fn validity(&mut self) -> Validity {
        GroupChildren::validity(self)
    }

    fn render(&mut self) -> Result<Option<ReferenceSet>, TreeError> {
        self.body()
    }

    fn recycle(&mut self) {
        GroupChildren::recycle(self);
    }
}
