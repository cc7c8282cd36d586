//! Hierarchy tree construction, projections and cache validity.
//!
//! This crate turns the group/leaf forest exposed by a
//! [`UnitStore`](arbor_store::UnitStore) into a depth-limited tree and derives
//! everything a renderer needs from that single traversal:
//!
//! - [`TreeBuilder`]: Stack-based, depth-limited tree construction
//! - [`TreeCache`]: Per-request memoization of one built tree
//! - [`projection`]: Reference-set and link-list projections of a tree
//! - [`ValidityAccumulator`]: Invalidation tokens for cache consumers
//! - [`HierarchyBrowser`] / [`GroupChildren`]: The two cacheable views
//! - [`render_cached`]: Serves a view through an `arbor_cache` bucket
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//!
//! use arbor_cache::{Cache, MemoryCache};
//! use arbor_tree::{BrowseOptions, HierarchyBrowser, render_cached};
//!
//! let mut view = HierarchyBrowser::new(Arc::new(store), BrowseOptions::default());
//! let cache = MemoryCache::new();
//! let rendered = render_cached(&mut view, cache.bucket("browse").as_ref())?;
//! view.recycle();
//! ```

mod browser;
mod builder;
mod children;
mod error;
mod key;
mod node;
mod pipeline;
pub mod projection;
mod tree_cache;
mod validity;

pub use browser::{BROWSER_ID, Body, BrowseOptions, HIERARCHY_REND, HierarchyBrowser};
pub use builder::{DEFAULT_DEPTH, TreeBuilder};
pub use children::{CHILDREN_ID, GroupChildren};
pub use error::TreeError;
pub use key::{BrowseKey, ChildrenKey, RenderMode};
pub use node::{Iter, Partition, TreeNode};
pub use pipeline::{CacheableView, Rendered, render_cached};
pub use tree_cache::TreeCache;
pub use validity::{CacheDescriptor, Validity, ValidityAccumulator, ValidityOptions};
