//! Core data structures for Capstan.
//!
//! The foundational types shared by the loader and its consumers:
//! decoded manifests and tools-version directives.

pub mod manifest;
pub mod tools_version;

pub use manifest::{Manifest, PackageDependency, Target, VersionRequirement};
pub use tools_version::{ToolsVersion, ToolsVersionError};
