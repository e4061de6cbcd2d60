//! The manifest evaluation capability.
//!
//! A manifest is not passive data; it declares a package object that has to
//! be materialized by running or interpreting the manifest itself. That step
//! sits behind the [`ManifestEvaluator`] trait so the loader's contract does
//! not depend on any particular evaluation strategy: the declarative
//! evaluator treats the body as restricted structured data, the sandboxed
//! evaluator runs it as a real program in isolation.

use semver::Version;

use crate::core::tools_version::ToolsVersion;
use crate::loader::errors::LoadError;

/// Ambient inputs the manifest may read during evaluation.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Base URL that relative dependency references resolve against.
    pub base_url: &'a str,

    /// Explicit package version, when the caller knows which version of the
    /// package the manifest belongs to. Version-conditional manifest logic
    /// keys off this.
    pub version: Option<&'a Version>,

    /// The schema version the manifest declared (or defaulted to).
    pub tools_version: ToolsVersion,
}

/// The serialized package snapshot an evaluation produces.
///
/// Opaque to callers of the loader; only the decoder and the cache see the
/// bytes. The encoding is the versioned JSON snapshot documented in
/// [`crate::loader::decode`].
#[derive(Debug, Clone)]
pub struct RawEvaluationOutput {
    bytes: Vec<u8>,
}

impl RawEvaluationOutput {
    pub(crate) fn new(bytes: Vec<u8>) -> Self {
        RawEvaluationOutput { bytes }
    }

    pub(crate) fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Size of the snapshot in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the snapshot is empty.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Evaluates manifest source into a serialized package snapshot.
///
/// Implementations must be usable from multiple threads; the loader is
/// shared and calls `evaluate` concurrently for distinct manifests.
pub trait ManifestEvaluator: Send + Sync {
    /// Run the manifest and capture the package object it declares.
    ///
    /// Any crash, abnormal termination, or incomplete output of the manifest
    /// code must surface as [`LoadError::Evaluation`]; implementations never
    /// return a partial snapshot and never retry on their own.
    fn evaluate(
        &self,
        source: &[u8],
        ctx: &EvaluationContext<'_>,
    ) -> Result<RawEvaluationOutput, LoadError>;
}
