//! Units supplied by a store.
//!
//! A [`Unit`] is either a group (a container that may hold sub-groups and
//! leaves) or a leaf (a terminal collection). Units are plain values: a store
//! hands out owned snapshots and the hierarchy keeps them for the lifetime of
//! a built tree.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Type tag of a [`Unit`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitKind {
    /// Container unit holding sub-groups and leaves.
    Group,
    /// Terminal unit, never has children.
    Leaf,
}

impl UnitKind {
    /// Lowercase name used in tokens and serialized output.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Group => "group",
            Self::Leaf => "leaf",
        }
    }
}

impl fmt::Display for UnitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An organizational unit supplied by a [`UnitStore`](crate::UnitStore).
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Numeric identity within the store (used for sub-list identifiers).
    pub id: u64,
    /// Stable external identifier (used in links and invalidation tokens).
    pub handle: String,
    /// Display name.
    pub name: String,
    /// Group or leaf.
    pub kind: UnitKind,
}

impl Unit {
    /// Create a group unit.
    #[must_use]
    pub fn group(id: u64, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            name: name.into(),
            kind: UnitKind::Group,
        }
    }

    /// Create a leaf unit.
    #[must_use]
    pub fn leaf(id: u64, handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id,
            handle: handle.into(),
            name: name.into(),
            kind: UnitKind::Leaf,
        }
    }

    /// True if this unit is a group.
    #[must_use]
    pub fn is_group(&self) -> bool {
        self.kind == UnitKind::Group
    }

    /// True if this unit is a leaf.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.kind == UnitKind::Leaf
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_group_constructor() {
        let unit = Unit::group(7, "123456789/7", "Sciences");

        assert_eq!(unit.id, 7);
        assert_eq!(unit.handle, "123456789/7");
        assert_eq!(unit.name, "Sciences");
        assert!(unit.is_group());
        assert!(!unit.is_leaf());
    }

    #[test]
    fn test_leaf_constructor() {
        let unit = Unit::leaf(8, "123456789/8", "Physics");

        assert_eq!(unit.kind, UnitKind::Leaf);
        assert!(unit.is_leaf());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(UnitKind::Group.to_string(), "group");
        assert_eq!(UnitKind::Leaf.to_string(), "leaf");
    }

    #[test]
    fn test_unit_serialization() {
        let unit = Unit::leaf(3, "h/3", "Theses");

        let json = serde_json::to_string(&unit).unwrap();

        assert_eq!(
            json,
            r#"{"id":3,"handle":"h/3","name":"Theses","kind":"leaf"}"#
        );
    }
}
