//! Store traits and error types.
//!
//! Provides the [`UnitStore`] trait for enumerating the group/leaf forest and
//! the optional [`ItemCounter`] collaborator, along with [`StoreError`] for
//! unified retrieval failures across backends.
//!
//! Retrieval failures are fatal to the operation that hit them and are never
//! retried. Counting failures are reported through [`CountError`] so callers
//! can decide to drop the metric instead.

use crate::unit::Unit;

/// Semantic error categories.
#[derive(Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreErrorKind {
    /// Unit does not exist.
    NotFound,
    /// Backing data is malformed (duplicate handles, parse errors).
    InvalidData,
    /// Backend is unavailable (connectivity, missing file).
    Unavailable,
    /// Operation timed out.
    Timeout,
    /// Other/unknown error category.
    Other,
}

/// Retrieval failure with semantic kind and backend-specific source.
#[derive(Debug)]
pub struct StoreError {
    /// Semantic error category.
    pub kind: StoreErrorKind,
    /// Handle context (if applicable).
    pub handle: Option<String>,
    /// Backend identifier (e.g., "Yaml", "Mock").
    pub backend: Option<&'static str>,
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl StoreError {
    /// Create a new store error.
    #[must_use]
    pub fn new(kind: StoreErrorKind) -> Self {
        Self {
            kind,
            handle: None,
            backend: None,
            source: None,
        }
    }

    /// Attach handle context.
    #[must_use]
    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.handle = Some(handle.into());
        self
    }

    /// Attach backend identifier.
    #[must_use]
    pub fn with_backend(mut self, backend: &'static str) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Attach the underlying error source.
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Downcast the source error to a concrete type.
    #[must_use]
    pub fn downcast_source<E: std::error::Error + 'static>(&self) -> Option<&E> {
        self.source.as_ref()?.downcast_ref()
    }

    /// Create a not found error for a handle.
    #[must_use]
    pub fn not_found(handle: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::NotFound).with_handle(handle)
    }

    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable() -> Self {
        Self::new(StoreErrorKind::Unavailable)
    }

    /// Create a store error from an I/O error.
    #[must_use]
    pub fn io(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound
            | std::io::ErrorKind::PermissionDenied
            | std::io::ErrorKind::ConnectionRefused
            | std::io::ErrorKind::ConnectionReset => StoreErrorKind::Unavailable,
            std::io::ErrorKind::TimedOut => StoreErrorKind::Timeout,
            std::io::ErrorKind::InvalidData => StoreErrorKind::InvalidData,
            _ => StoreErrorKind::Other,
        };
        Self::new(kind).with_source(err)
    }
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Format: "[Backend] Kind: message (handle: h)"
        if let Some(backend) = self.backend {
            write!(f, "[{backend}] ")?;
        }

        let kind_str = match self.kind {
            StoreErrorKind::NotFound => "Not found",
            StoreErrorKind::InvalidData => "Invalid data",
            StoreErrorKind::Unavailable => "Unavailable",
            StoreErrorKind::Timeout => "Timeout",
            StoreErrorKind::Other => "Error",
        };

        write!(f, "{kind_str}")?;

        if let Some(source) = &self.source {
            write!(f, ": {source}")?;
        }

        if let Some(handle) = &self.handle {
            write!(f, " (handle: {handle})")?;
        }

        Ok(())
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|s| s.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Store abstraction for enumerating the group/leaf forest.
///
/// Implementations return units in a stable order; hierarchy construction
/// preserves that order as discovery order. Every method may fail with a
/// [`StoreError`], which callers propagate unchanged.
pub trait UnitStore: Send + Sync {
    /// Return all groups that have no parent group.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn top_level_groups(&self) -> Result<Vec<Unit>, StoreError>;

    /// Return the direct sub-groups of `group`.
    ///
    /// A leaf has no sub-groups; implementations return an empty list for it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or `group` is unknown.
    fn sub_groups(&self, group: &Unit) -> Result<Vec<Unit>, StoreError>;

    /// Return the leaves held directly by `group`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read or `group` is unknown.
    fn leaves(&self, group: &Unit) -> Result<Vec<Unit>, StoreError>;

    /// Resolve a handle to a unit.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(unit))` - A unit with this handle exists
    /// - `Ok(None)` - No unit has this handle
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the backend cannot be read.
    fn find(&self, handle: &str) -> Result<Option<Unit>, StoreError>;
}

/// Failure to count the items held by a unit.
#[derive(Debug, thiserror::Error)]
pub enum CountError {
    /// The counter does not support this kind of unit.
    #[error("item counting is not supported for {0}")]
    Unsupported(String),
    /// No count is recorded for the unit.
    #[error("item count unavailable for {0}")]
    Unavailable(String),
    /// The backing store failed while counting.
    #[error("{0}")]
    Store(#[from] StoreError),
}

/// Optional collaborator reporting how many items a unit holds.
pub trait ItemCounter: Send + Sync {
    /// Count the items held by `unit`.
    ///
    /// # Errors
    ///
    /// Returns [`CountError`] if the count cannot be determined.
    fn count(&self, unit: &Unit) -> Result<u64, CountError>;
}
