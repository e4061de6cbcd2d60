//! Manifest loading.
//!
//! [`ManifestLoader`] is the single entry point for turning manifest source
//! into a validated [`Manifest`](crate::core::manifest::Manifest). Every load
//! walks the same pipeline:
//!
//! 1. resolve the tools-version directive and reject unsupported versions,
//! 2. fingerprint the request and consult the cache,
//! 3. on a miss, evaluate the manifest and decode the snapshot it produced.
//!
//! The loader is shared state; it takes `&self` everywhere and is safe to use
//! from multiple threads.

pub mod cache;
pub mod declarative;
pub mod decode;
pub mod errors;
pub mod evaluate;
pub mod sandbox;

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use semver::Version;

use crate::core::manifest::Manifest;
use crate::core::tools_version::ToolsVersion;

pub use cache::{CacheEntry, Fingerprint, ManifestCache};
pub use declarative::DeclarativeEvaluator;
pub use errors::LoadError;
pub use evaluate::{EvaluationContext, ManifestEvaluator, RawEvaluationOutput};
pub use sandbox::SandboxedEvaluator;

/// Loads, evaluates, and caches package manifests.
pub struct ManifestLoader {
    evaluator: Box<dyn ManifestEvaluator>,
    cache: ManifestCache,
    evaluations: AtomicUsize,
}

impl ManifestLoader {
    /// Create a loader backed by the given evaluator.
    pub fn new(evaluator: Box<dyn ManifestEvaluator>) -> Self {
        ManifestLoader {
            evaluator,
            cache: ManifestCache::new(),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Loader for the declarative manifest dialect.
    pub fn declarative() -> Self {
        ManifestLoader::new(Box::new(DeclarativeEvaluator::new()))
    }

    /// Load a manifest from in-memory source.
    ///
    /// `base_url` anchors relative dependency references; `version` is the
    /// package version the manifest belongs to, when the caller knows it.
    /// Identical requests are answered from the cache without re-evaluation.
    pub fn load(
        &self,
        source: &[u8],
        base_url: &str,
        version: Option<&Version>,
    ) -> Result<Manifest, LoadError> {
        let tools_version = ToolsVersion::resolve(source)?;
        let key = Fingerprint::compute(source, base_url, version);

        tracing::debug!(%tools_version, fingerprint = %key, "loading manifest");

        let entry = self.cache.get_or_fill(&key, || {
            self.evaluations.fetch_add(1, Ordering::SeqCst);
            let ctx = EvaluationContext {
                base_url,
                version,
                tools_version,
            };
            let raw = self.evaluator.evaluate(source, &ctx)?;
            let manifest = decode::decode(&raw, tools_version)?;
            Ok(CacheEntry { manifest, raw })
        })?;

        Ok(entry.manifest)
    }

    /// Load a manifest from a file on disk.
    pub fn load_file(
        &self,
        path: &Path,
        base_url: &str,
        version: Option<&Version>,
    ) -> Result<Manifest, LoadError> {
        let source = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&source, base_url, version)
    }

    /// Number of evaluations performed so far. Cache hits do not count.
    pub fn evaluation_count(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}
