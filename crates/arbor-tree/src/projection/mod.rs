//! Renderable projections of a built hierarchy.
//!
//! Both projections are read-only walks over a [`TreeNode`](crate::TreeNode)
//! and split every node's children into leaves and sub-groups:
//!
//! - [`reference`]: nested reference sets, one per top-level group
//! - [`list`]: a nested link list rooted at a base path

pub mod list;
pub mod reference;

pub use list::{List, ListEntry, ListItem, ListProjection};
pub use reference::{Reference, ReferenceSet, reference_groups};
