//! Mock store implementation for testing.
//!
//! Provides [`MockStore`] for unit testing without a backing file or database.

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::store::{CountError, ItemCounter, StoreError, UnitStore};
use crate::unit::Unit;

/// Backend identifier for error messages.
const BACKEND: &str = "Mock";

#[derive(Debug)]
struct MockEntry {
    unit: Unit,
    parent: Option<String>,
}

/// Mock store for testing.
///
/// Holds the group/leaf forest in memory. Use the builder methods to
/// configure the mock with test data. Units receive ids in insertion order,
/// starting at 1.
///
/// Besides data, the mock supports failure injection ([`with_failure`],
/// [`set_unavailable`]) and records every sub-group enumeration so tests can
/// pin the order in which a tree was expanded ([`enumerations`]).
///
/// [`with_failure`]: MockStore::with_failure
/// [`set_unavailable`]: MockStore::set_unavailable
/// [`enumerations`]: MockStore::enumerations
///
/// # Example
///
/// ```ignore
/// use arbor_store::{MockStore, UnitStore};
///
/// let store = MockStore::new()
///     .with_group("a", "Alpha")
///     .with_leaf("a", "a1", "Alpha One")
///     .with_sub_group("a", "b", "Beta");
///
/// let top = store.top_level_groups().unwrap();
/// assert_eq!(top[0].handle, "a");
/// ```
#[derive(Debug, Default)]
pub struct MockStore {
    entries: RwLock<Vec<MockEntry>>,
    counts: RwLock<HashMap<String, u64>>,
    failing: RwLock<HashSet<String>>,
    unavailable: AtomicBool,
    enumerations: RwLock<Vec<String>>,
}

impl MockStore {
    /// Create a new empty mock store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&self, unit: Unit, parent: Option<String>) {
        self.entries
            .write()
            .unwrap()
            .push(MockEntry { unit, parent });
    }

    fn next_id(&self) -> u64 {
        self.entries.read().unwrap().len() as u64 + 1
    }

    /// Add a top-level group.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_group(self, handle: impl Into<String>, name: impl Into<String>) -> Self {
        let unit = Unit::group(self.next_id(), handle, name);
        self.push(unit, None);
        self
    }

    /// Add a group nested under `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_sub_group(
        self,
        parent: impl Into<String>,
        handle: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let unit = Unit::group(self.next_id(), handle, name);
        self.push(unit, Some(parent.into()));
        self
    }

    /// Add a leaf held by `parent`.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_leaf(
        self,
        parent: impl Into<String>,
        handle: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        let unit = Unit::leaf(self.next_id(), handle, name);
        self.push(unit, Some(parent.into()));
        self
    }

    /// Record an item count for a handle.
    ///
    /// Units without a recorded count fail to count.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_item_count(self, handle: impl Into<String>, count: u64) -> Self {
        self.counts.write().unwrap().insert(handle.into(), count);
        self
    }

    /// Make enumerating the children of `handle` fail as unavailable.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn with_failure(self, handle: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(handle.into());
        self
    }

    /// Make every store call fail (or succeed again).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Handles passed to `sub_groups`, in call order.
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned.
    #[must_use]
    pub fn enumerations(&self) -> Vec<String> {
        self.enumerations.read().unwrap().clone()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable().with_backend(BACKEND));
        }
        Ok(())
    }

    fn check_group(&self, group: &Unit) -> Result<(), StoreError> {
        self.check_available()?;
        if self.failing.read().unwrap().contains(&group.handle) {
            return Err(StoreError::unavailable()
                .with_backend(BACKEND)
                .with_handle(group.handle.clone()));
        }
        Ok(())
    }

    fn children_of(&self, group: &Unit, want: fn(&Unit) -> bool) -> Vec<Unit> {
        self.entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.parent.as_deref() == Some(group.handle.as_str()) && want(&e.unit))
            .map(|e| e.unit.clone())
            .collect()
    }
}

impl UnitStore for MockStore {
    fn top_level_groups(&self) -> Result<Vec<Unit>, StoreError> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .filter(|e| e.parent.is_none() && e.unit.is_group())
            .map(|e| e.unit.clone())
            .collect())
    }

    fn sub_groups(&self, group: &Unit) -> Result<Vec<Unit>, StoreError> {
        self.check_group(group)?;
        self.enumerations
            .write()
            .unwrap()
            .push(group.handle.clone());
        Ok(self.children_of(group, Unit::is_group))
    }

    fn leaves(&self, group: &Unit) -> Result<Vec<Unit>, StoreError> {
        self.check_group(group)?;
        Ok(self.children_of(group, Unit::is_leaf))
    }

    fn find(&self, handle: &str) -> Result<Option<Unit>, StoreError> {
        self.check_available()?;
        Ok(self
            .entries
            .read()
            .unwrap()
            .iter()
            .find(|e| e.unit.handle == handle)
            .map(|e| e.unit.clone()))
    }
}

impl ItemCounter for MockStore {
    fn count(&self, unit: &Unit) -> Result<u64, CountError> {
        self.check_available()?;
        self.counts
            .read()
            .unwrap()
            .get(&unit.handle)
            .copied()
            .ok_or_else(|| CountError::Unavailable(unit.handle.clone()))
    }
}
