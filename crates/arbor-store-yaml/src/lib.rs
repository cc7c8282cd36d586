//! YAML file store backend for the arbor hierarchy engine.
//!
//! This crate provides [`YamlStore`], an implementation of the
//! [`UnitStore`](arbor_store::UnitStore) and [`ItemCounter`](arbor_store::ItemCounter)
//! traits backed by a single YAML hierarchy document. It handles:
//!
//! - Parsing and validating the document (unique, non-empty handles)
//! - Assigning stable numeric ids in document order
//! - Item counts for leaves (`items`) and groups (sum over the subtree)
//!
//! # Example
//!
//! ```ignore
//! use arbor_store::UnitStore;
//! use arbor_store_yaml::YamlStore;
//!
//! let store = YamlStore::open("hierarchy.yaml")?;
//! for group in store.top_level_groups()? {
//!     println!("{}: {}", group.handle, group.name);
//! }
//! ```

mod document;

use std::fs;
use std::path::{Path, PathBuf};

use arbor_store::{CountError, ItemCounter, StoreError, StoreErrorKind, Unit, UnitStore};
use document::{DocumentError, Index};

/// Backend identifier for error messages.
const BACKEND: &str = "Yaml";

impl From<DocumentError> for StoreError {
    fn from(e: DocumentError) -> Self {
        let handle = match &e {
            DocumentError::Parse(_) => None,
            DocumentError::EmptyHandle => Some(String::new()),
            DocumentError::DuplicateHandle(handle) => Some(handle.clone()),
        };
        let err = StoreError::new(StoreErrorKind::InvalidData)
            .with_backend(BACKEND)
            .with_source(e);
        match handle {
            Some(handle) => err.with_handle(handle),
            None => err,
        }
    }
}

/// Store backed by a YAML hierarchy document.
///
/// The document is read and indexed once at construction; the store is
/// read-only afterwards.
#[derive(Debug)]
pub struct YamlStore {
    index: Index,
    source: Option<PathBuf>,
}

impl YamlStore {
    /// Open and index a hierarchy file.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with kind `Unavailable` if the file cannot be read,
    /// or `InvalidData` if it is malformed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|e| StoreError::io(e).with_backend(BACKEND))?;
        let mut store = Self::from_yaml(&content)?;
        store.source = Some(path.to_path_buf());

        tracing::debug!(
            path = %path.display(),
            units = store.len(),
            "Hierarchy document loaded"
        );
        Ok(store)
    }

    /// Index a hierarchy document held in memory.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] with kind `InvalidData` if the document is malformed.
    pub fn from_yaml(content: &str) -> Result<Self, StoreError> {
        Ok(Self {
            index: Index::parse(content)?,
            source: None,
        })
    }

    /// Path the store was opened from, if any.
    #[must_use]
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Number of units (groups and leaves) in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.units.len()
    }

    /// True if the store holds no units.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.units.is_empty()
    }

    fn lookup(&self, unit: &Unit) -> Result<usize, StoreError> {
        self.index.get(&unit.handle).ok_or_else(|| {
            StoreError::not_found(unit.handle.clone()).with_backend(BACKEND)
        })
    }

    fn units(&self, indices: &[usize]) -> Vec<Unit> {
        indices
            .iter()
            .map(|&i| self.index.units[i].unit.clone())
            .collect()
    }
}

impl UnitStore for YamlStore {
    fn top_level_groups(&self) -> Result<Vec<Unit>, StoreError> {
        Ok(self.units(&self.index.top))
    }

    fn sub_groups(&self, group: &Unit) -> Result<Vec<Unit>, StoreError> {
        let idx = self.lookup(group)?;
        Ok(self.units(&self.index.units[idx].sub_groups))
    }

    fn leaves(&self, group: &Unit) -> Result<Vec<Unit>, StoreError> {
        let idx = self.lookup(group)?;
        Ok(self.units(&self.index.units[idx].leaves))
    }

    fn find(&self, handle: &str) -> Result<Option<Unit>, StoreError> {
        Ok(self
            .index
            .get(handle)
            .map(|i| self.index.units[i].unit.clone()))
    }
}

impl ItemCounter for YamlStore {
    /// Leaves report their `items` value; groups report the sum over their
    /// whole subtree and fail if any leaf in it has no count.
    fn count(&self, unit: &Unit) -> Result<u64, CountError> {
        let root = self.lookup(unit)?;

        let mut total: u64 = 0;
        let mut stack = vec![root];
        while let Some(idx) = stack.pop() {
            let entry = &self.index.units[idx];
            if entry.unit.is_leaf() {
                let items = entry
                    .items
                    .ok_or_else(|| CountError::Unavailable(entry.unit.handle.clone()))?;
                total = total.saturating_add(items);
            }
            stack.extend(&entry.leaves);
            stack.extend(&entry.sub_groups);
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const SAMPLE: &str = r#"
groups:
  - handle: "123456789/1"
    name: "Sciences"
    leaves:
      - { handle: "123456789/2", name: "Physics", items: 40 }
    groups:
      - handle: "123456789/3"
        name: "Biology"
        leaves:
          - { handle: "123456789/4", name: "Botany", items: 2 }
          - { handle: "123456789/5", name: "Zoology", items: 5 }
  - handle: "123456789/6"
    name: "Arts"
    leaves:
      - { handle: "123456789/7", name: "Sculpture" }
"#;

    fn store() -> YamlStore {
        YamlStore::from_yaml(SAMPLE).unwrap()
    }

    fn find(store: &YamlStore, handle: &str) -> Unit {
        store.find(handle).unwrap().unwrap()
    }

    fn names(units: &[Unit]) -> Vec<&str> {
        units.iter().map(|u| u.name.as_str()).collect()
    }

    #[test]
    fn test_top_level_groups() {
        let store = store();

        assert_eq!(
            names(&store.top_level_groups().unwrap()),
            vec!["Sciences", "Arts"]
        );
    }

    #[test]
    fn test_sub_groups_and_leaves() {
        let store = store();
        let sciences = find(&store, "123456789/1");

        assert_eq!(names(&store.sub_groups(&sciences).unwrap()), vec!["Biology"]);
        assert_eq!(names(&store.leaves(&sciences).unwrap()), vec!["Physics"]);
    }

    #[test]
    fn test_leaf_enumerates_nothing() {
        let store = store();
        let physics = find(&store, "123456789/2");

        assert!(store.sub_groups(&physics).unwrap().is_empty());
        assert!(store.leaves(&physics).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_unit_is_not_found() {
        let store = store();
        let ghost = Unit::group(99, "nope", "Ghost");

        let err = store.sub_groups(&ghost).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::NotFound);
        assert_eq!(err.handle.as_deref(), Some("nope"));
    }

    #[test]
    fn test_count_leaf() {
        let store = store();

        assert_eq!(store.count(&find(&store, "123456789/2")).unwrap(), 40);
    }

    #[test]
    fn test_count_group_sums_subtree() {
        let store = store();

        assert_eq!(store.count(&find(&store, "123456789/1")).unwrap(), 47);
        assert_eq!(store.count(&find(&store, "123456789/3")).unwrap(), 7);
    }

    #[test]
    fn test_count_missing_items_fails() {
        let store = store();

        let result = store.count(&find(&store, "123456789/6"));

        assert!(matches!(result, Err(CountError::Unavailable(h)) if h == "123456789/7"));
    }

    #[test]
    fn test_duplicate_handle_is_invalid_data() {
        let yaml = "groups:\n  - { handle: x, name: X }\n  - { handle: x, name: Y }";

        let err = YamlStore::from_yaml(yaml).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidData);
        assert_eq!(err.handle.as_deref(), Some("x"));
        assert_eq!(
            err.to_string(),
            "[Yaml] Invalid data: duplicate handle x (handle: x)"
        );
    }

    #[test]
    fn test_malformed_document_message_names_cause() {
        let err = YamlStore::from_yaml("groups: [unclosed").unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::InvalidData);
        assert!(
            err.to_string()
                .starts_with("[Yaml] Invalid data: malformed hierarchy document:")
        );
    }

    #[test]
    fn test_open_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hierarchy.yaml");
        std::fs::write(&path, SAMPLE).unwrap();

        let store = YamlStore::open(&path).unwrap();

        assert_eq!(store.len(), 7);
        assert_eq!(store.source(), Some(path.as_path()));
    }

    #[test]
    fn test_open_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();

        let err = YamlStore::open(dir.path().join("missing.yaml")).unwrap_err();

        assert_eq!(err.kind, StoreErrorKind::Unavailable);
        assert_eq!(err.backend, Some("Yaml"));
    }
}
