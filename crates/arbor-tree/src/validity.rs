//! Cache validity for built hierarchies.
//!
//! [`ValidityAccumulator`] walks a tree once and records one identity token per
//! unit, plus an optional `size:<n>` token per unit when item counting is
//! enabled. The resulting [`CacheDescriptor`] is what a cache layer compares to
//! decide whether a stored view is still current.
//!
//! Failure policy is explicit in the types:
//!
//! - A unit whose count fails simply has no size token; the descriptor records
//!   how many were dropped in [`CacheDescriptor::omitted_metrics`].
//! - A view whose tree cannot be built is [`Validity::Uncacheable`], never a
//!   descriptor that would be valid forever.

use std::time::Duration;

use sha2::{Digest, Sha256};

use arbor_store::{ItemCounter, Unit};

use crate::node::TreeNode;

/// Settings that shape a [`CacheDescriptor`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidityOptions {
    /// Add a `size:<n>` token per unit (requires an [`ItemCounter`]).
    pub count_items: bool,
    /// Treat stored views as valid for this long without checking tokens.
    pub assumed_valid: Option<Duration>,
}

/// Invalidation tokens and an optional assumed-valid window.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CacheDescriptor {
    tokens: Vec<String>,
    omitted_metrics: usize,
    assumed_valid: Option<Duration>,
}

impl CacheDescriptor {
    /// Create an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the identity token `"<kind>:<handle>:<name>"` for `unit`.
    ///
    /// The name is rendered by both projections, so a rename changes the etag.
    pub fn add_unit(&mut self, unit: &Unit) {
        self.tokens
            .push(format!("{}:{}:{}", unit.kind, unit.handle, unit.name));
    }

    /// Add a `"size:<n>"` token.
    pub fn add_size(&mut self, count: u64) {
        self.tokens.push(format!("size:{count}"));
    }

    /// Record a size token that could not be computed.
    pub fn omit_metric(&mut self) {
        self.omitted_metrics += 1;
    }

    /// Set the assumed-valid window.
    pub fn set_assumed_valid(&mut self, duration: Duration) {
        self.assumed_valid = Some(duration);
    }

    /// Tokens in the order they were added.
    #[must_use]
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }

    /// Number of size tokens dropped because counting failed.
    #[must_use]
    pub fn omitted_metrics(&self) -> usize {
        self.omitted_metrics
    }

    /// Assumed-valid window, if configured.
    #[must_use]
    pub fn assumed_valid(&self) -> Option<Duration> {
        self.assumed_valid
    }

    /// Etag for the token set.
    ///
    /// SHA-256 hex of the sorted tokens joined by `\n`, so it does not depend
    /// on traversal order.
    #[must_use]
    pub fn etag(&self) -> String {
        let mut sorted: Vec<&str> = self.tokens.iter().map(String::as_str).collect();
        sorted.sort_unstable();

        let mut hasher = Sha256::new();
        hasher.update(sorted.join("\n").as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Outcome of a validity computation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Validity {
    /// The view may be cached under this descriptor.
    Cacheable(CacheDescriptor),
    /// The view must be rendered fresh and not stored.
    Uncacheable {
        /// Why no descriptor could be produced.
        reason: String,
    },
}

impl Validity {
    /// Descriptor, if cacheable.
    #[must_use]
    pub fn descriptor(&self) -> Option<&CacheDescriptor> {
        match self {
            Self::Cacheable(descriptor) => Some(descriptor),
            Self::Uncacheable { .. } => None,
        }
    }

    /// Whether a descriptor is available.
    #[must_use]
    pub fn is_cacheable(&self) -> bool {
        matches!(self, Self::Cacheable(_))
    }
}

/// Produces [`CacheDescriptor`]s from built trees.
pub struct ValidityAccumulator<'a> {
    options: &'a ValidityOptions,
    counter: Option<&'a dyn ItemCounter>,
}

impl<'a> ValidityAccumulator<'a> {
    /// Create an accumulator without an item counter.
    #[must_use]
    pub fn new(options: &'a ValidityOptions) -> Self {
        Self {
            options,
            counter: None,
        }
    }

    /// Use `counter` for size tokens when counting is enabled.
    #[must_use]
    pub fn with_counter(mut self, counter: Option<&'a dyn ItemCounter>) -> Self {
        self.counter = counter;
        self
    }

    /// Walk `tree` once and return its descriptor.
    ///
    /// Every node carrying a unit contributes tokens via
    /// [`add_unit`](Self::add_unit); the synthetic root contributes none. The
    /// assumed-valid window is attached after the walk.
    #[must_use]
    pub fn accumulate(&self, tree: &TreeNode) -> CacheDescriptor {
        let mut descriptor = CacheDescriptor::new();
        let mut visited = 0usize;
        let mut stack = vec![tree];

        while let Some(node) = stack.pop() {
            if let Some(unit) = node.unit() {
                self.add_unit(&mut descriptor, unit);
                visited += 1;
            }
            stack.extend(node.children());
        }

        if let Some(duration) = self.options.assumed_valid {
            descriptor.set_assumed_valid(duration);
        }

        tracing::debug!(
            units = visited,
            tokens = descriptor.tokens.len(),
            omitted = descriptor.omitted_metrics,
            "Accumulated hierarchy validity"
        );
        descriptor
    }

    /// Add the identity token, and the size token if enabled, for one unit.
    pub fn add_unit(&self, descriptor: &mut CacheDescriptor, unit: &Unit) {
        descriptor.add_unit(unit);

        let Some(counter) = self.counter.filter(|_| self.options.count_items) else {
            return;
        };
        match counter.count(unit) {
            Ok(count) => descriptor.add_size(count),
            Err(e) => {
                tracing::debug!(handle = %unit.handle, error = %e, "Item count omitted");
                descriptor.omit_metric();
            }
        }
    }
}
