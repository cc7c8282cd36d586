//! Cache-aware rendering of hierarchy views.
//!
//! [`render_cached`] drives any [`CacheableView`] against a
//! [`CacheBucket`]:
//!
//! 1. A stored entry still inside its assumed-valid window is served without
//!    computing validity.
//! 2. An [`Uncacheable`](Validity::Uncacheable) view is rendered and never
//!    stored.
//! 3. Otherwise the entry stored under the view key and descriptor etag is
//!    served, or the view is rendered and stored.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use arbor_cache::{CacheBucket, CacheBucketExt};

use crate::error::TreeError;
use crate::validity::Validity;

/// A view whose rendering can be cached.
pub trait CacheableView {
    /// Rendered output.
    type Output: Serialize + DeserializeOwned;

    /// Fingerprint of the view parameters.
    fn key(&mut self) -> String;

    /// Validity of the current rendering.
    fn validity(&mut self) -> Validity;

    /// Render the view.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError`] if the hierarchy cannot be built or resolved.
    fn render(&mut self) -> Result<Self::Output, TreeError>;

    /// Drop per-request state so the next request starts fresh.
    fn recycle(&mut self);
}

/// Result of [`render_cached`].
#[derive(Debug)]
pub struct Rendered<T> {
    /// Rendered output.
    pub body: T,
    /// Whether the output came from the cache.
    pub from_cache: bool,
}

/// Stored cache entry.
#[derive(Serialize, Deserialize)]
struct CachedView<T> {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    assumed_valid_secs: Option<u64>,
    body: T,
}

/// Render `view` through `bucket`.
///
/// # Errors
///
/// Returns [`TreeError`] if the view has to be rendered and rendering fails.
/// Cache failures are never errors; they behave like misses.
pub fn render_cached<V: CacheableView>(
    view: &mut V,
    bucket: &dyn CacheBucket,
) -> Result<Rendered<V::Output>, TreeError> {
    let key = view.key();

    if let Some(entry) = bucket.get_json::<CachedView<V::Output>>(&key, "")
        && let Some(secs) = entry.assumed_valid_secs
        && bucket
            .age(&key)
            .is_some_and(|age| age < Duration::from_secs(secs))
    {
        tracing::debug!(key = %key, "Serving view inside assumed-valid window");
        return Ok(Rendered {
            body: entry.body,
            from_cache: true,
        });
    }

    let descriptor = match view.validity() {
        Validity::Cacheable(descriptor) => descriptor,
        Validity::Uncacheable { reason } => {
            tracing::debug!(
                key = %key,
                reason = %reason,
                "View is uncacheable, rendering fresh"
            );
            return Ok(Rendered {
                body: view.render()?,
                from_cache: false,
            });
        }
    };

    let etag = descriptor.etag();
    if let Some(entry) = bucket.get_json::<CachedView<V::Output>>(&key, &etag) {
        tracing::debug!(key = %key, "Serving cached view");
        return Ok(Rendered {
            body: entry.body,
            from_cache: true,
        });
    }

    let body = view.render()?;
    bucket.set_json(
        &key,
        &etag,
        &CachedView {
            assumed_valid_secs: descriptor.assumed_valid().map(|d| d.as_secs()),
            body: &body,
        },
    );
    tracing::debug!(key = %key, "Rendered and stored view");

    Ok(Rendered {
        body,
        from_cache: false,
    })
}
