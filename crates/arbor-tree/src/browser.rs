//! Whole-hierarchy view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use arbor_store::{ItemCounter, UnitStore};

use crate::builder::{DEFAULT_DEPTH, TreeBuilder};
use crate::error::TreeError;
use crate::key::{BrowseKey, RenderMode};
use crate::pipeline::CacheableView;
use crate::projection::{List, ListProjection, ReferenceSet, reference_groups};
use crate::tree_cache::TreeCache;
use crate::validity::{Validity, ValidityAccumulator, ValidityOptions};

/// Identifier of the rendered reference set or list.
pub const BROWSER_ID: &str = "hierarchy-browser";

/// Render hint attached to reference sets.
pub const HIERARCHY_REND: &str = "hierarchy";

/// Parameters of a [`HierarchyBrowser`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BrowseOptions {
    /// Maximum tree depth.
    pub depth: u32,
    /// Omit leaves.
    pub exclude_leaves: bool,
    /// Projection to render.
    pub mode: RenderMode,
    /// Base path for list links.
    pub base_path: String,
    /// Cache descriptor settings.
    pub validity: ValidityOptions,
}

impl Default for BrowseOptions {
    fn default() -> Self {
        Self {
            depth: DEFAULT_DEPTH,
            exclude_leaves: false,
            mode: RenderMode::Full,
            base_path: String::new(),
            validity: ValidityOptions::default(),
        }
    }
}

/// Rendered whole-hierarchy view.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Body {
    /// One reference per top-level group.
    References(ReferenceSet),
    /// Nested link list.
    List(List),
}

/// View of every top-level group and its descendants.
///
/// Holds one [`TreeCache`], so validity and rendering within a request share
/// one traversal. Call [`recycle`](Self::recycle) between requests.
pub struct HierarchyBrowser {
    trees: TreeCache,
    counter: Option<Arc<dyn ItemCounter>>,
    options: BrowseOptions,
    validity: Option<Validity>,
}

impl HierarchyBrowser {
    /// Create a browser over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn UnitStore>, options: BrowseOptions) -> Self {
        let builder = TreeBuilder::new(options.depth, options.exclude_leaves);
        Self {
            trees: TreeCache::new(store, builder),
            counter: None,
            options,
            validity: None,
        }
    }

    /// Use `counter` for size tokens.
    #[must_use]
    pub fn with_counter(mut self, counter: Arc<dyn ItemCounter>) -> Self {
        self.counter = Some(counter);
        self
    }

    /// View parameters.
    #[must_use]
    pub fn options(&self) -> &BrowseOptions {
        &self.options
    }

    /// Fingerprint of depth, leaf exclusion and render mode.
    #[must_use]
    pub fn key(&self) -> String {
        BrowseKey {
            depth: self.options.depth,
            exclude_leaves: self.options.exclude_leaves,
            mode: self.options.mode,
        }
        .compute_hash()
    }

    /// Validity of the current tree.
    ///
    /// A cacheable result is memoized until [`recycle`](Self::recycle). A
    /// store failure yields [`Validity::Uncacheable`] and is retried on the
    /// next call.
    pub fn validity(&mut self) -> Validity {
        if let Some(validity) = &self.validity {
            return validity.clone();
        }

        let tree = match self.trees.get_or_build(None) {
            Ok(tree) => tree,
            Err(e) => {
                tracing::warn!(error = %e, "Hierarchy validity unavailable");
                return Validity::Uncacheable {
                    reason: e.to_string(),
                };
            }
        };

        let descriptor = ValidityAccumulator::new(&self.options.validity)
            .with_counter(self.counter.as_deref())
            .accumulate(tree);
        tracing::info!(
            depth = self.options.depth,
            exclude_leaves = self.options.exclude_leaves,
            tokens = descriptor.tokens().len(),
            "Computed hierarchy validity"
        );

        let validity = Validity::Cacheable(descriptor);
        self.validity = Some(validity.clone());
        validity
    }

    /// Render the hierarchy in the configured mode.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Retrieval`] if the tree cannot be built.
    pub fn body(&mut self) -> Result<Body, TreeError> {
        let tree = self.trees.get_or_build(None)?;

        Ok(match self.options.mode {
            RenderMode::Full => Body::References(ReferenceSet::named(
                BROWSER_ID,
                HIERARCHY_REND,
                reference_groups(tree),
            )),
            RenderMode::List => {
                Body::List(ListProjection::new(&self.options.base_path).project(BROWSER_ID, tree))
            }
        })
    }

    /// Drop the memoized tree and validity.
    pub fn recycle(&mut self) {
        self.trees.reset();
        self.validity = None;
    }
}

impl CacheableView for HierarchyBrowser {
    type Output = Body;

    fn key(&mut self) -> String {
        HierarchyBrowser::key(self)
    }

    fn validity(&mut self) -> Validity {
        HierarchyBrowser::validity(self)
    }

    fn render(&mut self) -> Result<Body, TreeError> {
        self.body()
    }

    fn recycle(&mut self) {
        HierarchyBrowser::recycle(self);
    }
}
