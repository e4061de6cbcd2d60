//! Capstan - package manifest loading for C packages
//!
//! This crate provides the manifest-loading subsystem: tools-version
//! gating, manifest evaluation (declarative or sandboxed), snapshot
//! decoding, caching, and package scaffolding.

pub mod core;
pub mod loader;
pub mod ops;
pub mod util;

pub use crate::core::manifest::{Manifest, PackageDependency, Target, VersionRequirement};
pub use crate::core::tools_version::ToolsVersion;
pub use crate::loader::{
    DeclarativeEvaluator, LoadError, ManifestEvaluator, ManifestLoader, SandboxedEvaluator,
};
