//! Unit store abstraction for the arbor hierarchy engine.
//!
//! This crate provides the [`UnitStore`] trait through which hierarchy construction
//! enumerates groups and leaves, and the optional [`ItemCounter`] collaborator used
//! to fold item counts into cache validity. Keeping these behind traits enables:
//!
//! - **Unit testing** without a real backing store
//! - **Backend flexibility** (YAML file, database, remote repository API)
//! - **Clean separation** between tree shaping and data retrieval
//!
//! # Architecture
//!
//! The crate provides:
//! - [`Unit`] and [`UnitKind`], the entities supplied by a store
//! - [`UnitStore`] with `top_level_groups()`, `sub_groups()`, `leaves()` and `find()`
//! - [`ItemCounter`] with `count()`
//! - [`MockStore`] for testing (behind `mock` feature flag)
//!
//! # Example
//!
//! ```ignore
//! use arbor_store::{MockStore, UnitStore};
//!
//! let store = MockStore::new()
//!     .with_group("a", "Alpha")
//!     .with_leaf("a", "a1", "Alpha One");
//!
//! for group in store.top_level_groups()? {
//!     println!("{}: {}", group.handle, group.name);
//! }
//! ```

#[cfg(feature = "mock")]
mod mock;
mod store;
mod unit;

#[cfg(feature = "mock")]
pub use mock::MockStore;
pub use store::{CountError, ItemCounter, StoreError, StoreErrorKind, UnitStore};
pub use unit::{Unit, UnitKind};
