//! In-memory manifest cache with single-flight filling.
//!
//! Entries live for the lifetime of the process and are keyed by a
//! fingerprint over everything that can change the result of a load: the
//! manifest bytes, the base URL, and the optional explicit version. There is
//! no TTL; a changed input simply produces a different key.
//!
//! Concurrent loads of the same fingerprint coalesce: the first caller fills
//! the entry while the rest block on the per-key slot and then reuse the
//! result, so one fingerprint costs at most one evaluation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use semver::Version;

use crate::core::manifest::Manifest;
use crate::loader::errors::LoadError;
use crate::loader::evaluate::RawEvaluationOutput;
use crate::util::hash::Fingerprint as Hasher;

/// Cache key derived from manifest content plus load context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Compute the fingerprint for a load request.
    pub fn compute(source: &[u8], base_url: &str, version: Option<&Version>) -> Self {
        let mut hasher = Hasher::new();
        hasher
            .update_bytes(source)
            .update_str(base_url)
            .update_opt(version.map(|v| v.to_string()).as_deref());
        Fingerprint(hasher.finish())
    }

    /// Hex form of the fingerprint.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A decoded manifest together with the snapshot it was decoded from.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub manifest: Manifest,
    pub raw: RawEvaluationOutput,
}

#[derive(Default)]
struct Slot(Mutex<Option<CacheEntry>>);

/// Process-lifetime manifest cache.
#[derive(Default)]
pub struct ManifestCache {
    slots: Mutex<HashMap<Fingerprint, Arc<Slot>>>,
}

impl ManifestCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        ManifestCache::default()
    }

    /// Return the cached entry for `key`, filling it with `fill` on a miss.
    ///
    /// Holding the slot lock across `fill` is what provides single-flight:
    /// same-key callers block here rather than evaluating again. A failed
    /// fill leaves the slot empty, so a later load may retry. Entries are
    /// revalidated on the way out; a violation surfaces as
    /// [`LoadError::CacheCorruption`] instead of handing out a bad manifest.
    pub fn get_or_fill<F>(&self, key: &Fingerprint, fill: F) -> Result<CacheEntry, LoadError>
    where
        F: FnOnce() -> Result<CacheEntry, LoadError>,
    {
        let slot = {
            let mut slots = self.slots.lock().map_err(|_| poisoned())?;
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let mut state = slot.0.lock().map_err(|_| poisoned())?;

        if let Some(entry) = state.as_ref() {
            entry
                .manifest
                .validate()
                .map_err(|detail| LoadError::CacheCorruption { detail })?;
            tracing::trace!(fingerprint = %key, "manifest cache hit");
            return Ok(entry.clone());
        }

        tracing::trace!(fingerprint = %key, "manifest cache miss");
        let entry = fill()?;
        *state = Some(entry.clone());
        Ok(entry)
    }

    /// Number of filled or in-flight fingerprints.
    pub fn len(&self) -> usize {
        self.slots.lock().map(|s| s.len()).unwrap_or(0)
    }

    /// Whether the cache has seen no fingerprints yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn poisoned() -> LoadError {
    LoadError::CacheCorruption {
        detail: "cache lock poisoned by a panicked load".to_string(),
    }
}
