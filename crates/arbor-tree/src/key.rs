//! View fingerprints used as cache keys.
//!
//! A fingerprint covers every parameter that changes a rendered view. Equal
//! parameters always yield equal fingerprints, across processes and builds.

use sha2::{Digest, Sha256};

/// Which projection a hierarchy view renders.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Nested reference sets.
    #[default]
    Full,
    /// Nested link list.
    List,
}

impl RenderMode {
    /// Select the mode from the `full` configuration flag.
    #[must_use]
    pub fn from_full(full: bool) -> Self {
        if full { Self::Full } else { Self::List }
    }

    /// Whether this is [`RenderMode::Full`].
    #[must_use]
    pub fn is_full(self) -> bool {
        self == Self::Full
    }
}

fn sha256_hex(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Parameters of the whole-hierarchy view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BrowseKey {
    /// Maximum tree depth.
    pub depth: u32,
    /// Whether leaves are omitted.
    pub exclude_leaves: bool,
    /// Rendered projection.
    pub mode: RenderMode,
}

impl BrowseKey {
    /// Compute the fingerprint.
    ///
    /// # Hash Format
    ///
    /// SHA-256 hex of `"{depth}-{exclude_leaves}-{full}"`.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        sha256_hex(&format!(
            "{}-{}-{}",
            self.depth,
            self.exclude_leaves,
            self.mode.is_full()
        ))
    }
}

/// Parameters of the children-of-one-group view.
#[derive(Clone, Copy, Debug)]
pub struct ChildrenKey<'a> {
    /// Handle of the group.
    pub handle: &'a str,
    /// Maximum tree depth below the group.
    pub depth: u32,
}

impl ChildrenKey<'_> {
    /// Compute the fingerprint.
    ///
    /// # Hash Format
    ///
    /// SHA-256 hex of `"{handle}-{depth}"`.
    #[must_use]
    pub fn compute_hash(&self) -> String {
        sha256_hex(&format!("{}-{}", self.handle, self.depth))
    }
}
