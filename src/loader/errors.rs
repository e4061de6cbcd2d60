//! Manifest loading error types and diagnostics.

use std::path::PathBuf;

use thiserror::Error;

use crate::core::tools_version::{ToolsVersion, ToolsVersionError};
use crate::util::diagnostic::Diagnostic;

/// Error during a single manifest load.
///
/// Every failure is terminal for that load call only; a loader shared across
/// many loads stays usable, and no partial manifest is ever returned.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("manifest requires tools-version {requested}, but the maximum supported is {maximum}")]
    UnsupportedToolsVersion {
        requested: ToolsVersion,
        maximum: ToolsVersion,
    },

    #[error("malformed tools-version directive: `{line}`")]
    MalformedDirective { line: String },

    #[error("manifest evaluation failed: {detail}")]
    Evaluation { detail: String },

    #[error("evaluation produced output that is not a valid package snapshot")]
    MalformedOutput {
        #[source]
        source: serde_json::Error,
    },

    #[error("manifest violates schema rules: {detail}")]
    SchemaViolation { detail: String },

    #[error("cached manifest failed revalidation: {detail}")]
    CacheCorruption { detail: String },

    #[error("failed to read manifest at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl From<ToolsVersionError> for LoadError {
    fn from(err: ToolsVersionError) -> Self {
        match err {
            ToolsVersionError::Malformed { line } => LoadError::MalformedDirective { line },
            ToolsVersionError::Unsupported { requested, maximum } => {
                LoadError::UnsupportedToolsVersion { requested, maximum }
            }
        }
    }
}

impl LoadError {
    /// Convert to a user-facing diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            LoadError::UnsupportedToolsVersion { requested, maximum } => {
                Diagnostic::error(format!("manifest requires tools-version {}", requested))
                    .with_context(format!("maximum supported tools-version is {}", maximum))
                    .with_suggestion(format!(
                        "Lower the `# capstan-tools-version:` directive to {} or below",
                        maximum
                    ))
                    .with_suggestion("Upgrade capstan to a newer release".to_string())
            }

            LoadError::MalformedDirective { line } => {
                Diagnostic::error("malformed tools-version directive")
                    .with_context(format!("first line is `{}`", line))
                    .with_suggestion(format!(
                        "Use the form `# capstan-tools-version:{}`",
                        ToolsVersion::CURRENT
                    ))
            }

            LoadError::Evaluation { detail } => {
                Diagnostic::error("manifest evaluation failed").with_context(detail.clone())
            }

            LoadError::MalformedOutput { source } => {
                Diagnostic::error("manifest produced an unreadable package snapshot")
                    .with_context(source.to_string())
                    .with_suggestion(
                        "Ensure the manifest emits a single JSON snapshot document".to_string(),
                    )
            }

            LoadError::SchemaViolation { detail } => {
                Diagnostic::error("manifest violates schema rules").with_context(detail.clone())
            }

            LoadError::CacheCorruption { detail } => {
                Diagnostic::error("cached manifest failed revalidation")
                    .with_context(detail.clone())
            }

            LoadError::Io { path, source } => Diagnostic::error("failed to read manifest")
                .with_location(path.clone())
                .with_context(source.to_string()),
        }
    }
}
