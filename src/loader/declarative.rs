//! Declarative manifest evaluation.
//!
//! The restricted manifest dialect: after the tools-version directive the
//! body is plain TOML, so "evaluating" it is parsing plus applying the
//! ambient inputs. Relative dependency URLs are resolved against the base
//! URL, and entries carrying `when-version` are kept only when the injected
//! package version satisfies the condition.
//!
//! ```toml
//! # capstan-tools-version:1.2
//! [package]
//! name = "Foo"
//!
//! [[targets]]
//! name = "sys"
//! dependencies = ["libc"]
//!
//! [[dependencies]]
//! url = "https://example.com/example"
//! major-version = 1
//! ```

use serde::Deserialize;
use url::Url;

use crate::loader::decode::{
    Snapshot, SnapshotDependency, SnapshotPackage, SnapshotRequirement, SnapshotTarget,
    SNAPSHOT_SCHEMA,
};
use crate::loader::errors::LoadError;
use crate::loader::evaluate::{EvaluationContext, ManifestEvaluator, RawEvaluationOutput};

/// Evaluator for the restricted declarative manifest dialect.
#[derive(Debug, Default)]
pub struct DeclarativeEvaluator;

impl DeclarativeEvaluator {
    /// Create a declarative evaluator.
    pub fn new() -> Self {
        DeclarativeEvaluator
    }
}

#[derive(Debug, Deserialize)]
struct RawDocument {
    package: RawPackage,

    #[serde(default)]
    targets: Vec<RawTarget>,

    #[serde(default)]
    dependencies: Vec<RawDependency>,
}

#[derive(Debug, Deserialize)]
struct RawPackage {
    name: String,

    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawTarget {
    name: String,

    #[serde(default)]
    dependencies: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RawDependency {
    url: String,

    /// Major-version floor requirement, e.g. `major-version = 1`.
    #[serde(default, rename = "major-version")]
    major_version: Option<u64>,

    /// Full semver requirement, e.g. `requirement = "^1.2"` (tools 1.1+).
    #[serde(default)]
    requirement: Option<String>,

    /// Keep this entry only when the injected package version matches.
    #[serde(default, rename = "when-version")]
    when_version: Option<String>,
}

fn evaluation_error(detail: impl Into<String>) -> LoadError {
    LoadError::Evaluation {
        detail: detail.into(),
    }
}

/// Resolve a dependency reference against the base URL.
///
/// Absolute references are kept as-is; anything else is joined onto the
/// base, which therefore must itself be a valid URL.
fn resolve_url(reference: &str, base_url: &str) -> Result<String, LoadError> {
    if let Ok(url) = Url::parse(reference) {
        return Ok(url.into());
    }

    let base = Url::parse(base_url).map_err(|e| {
        evaluation_error(format!(
            "base URL `{}` is not a valid URL (needed to resolve `{}`): {}",
            base_url, reference, e
        ))
    })?;

    let joined = base.join(reference).map_err(|e| {
        evaluation_error(format!(
            "cannot resolve dependency reference `{}` against `{}`: {}",
            reference, base_url, e
        ))
    })?;

    Ok(joined.into())
}

impl ManifestEvaluator for DeclarativeEvaluator {
    fn evaluate(
        &self,
        source: &[u8],
        ctx: &EvaluationContext<'_>,
    ) -> Result<RawEvaluationOutput, LoadError> {
        let text = std::str::from_utf8(source)
            .map_err(|e| evaluation_error(format!("manifest is not valid UTF-8: {}", e)))?;

        // The directive line is a TOML comment, so the full source parses.
        let doc: RawDocument = toml::from_str(text).map_err(|e| evaluation_error(e.to_string()))?;

        let mut dependencies = Vec::with_capacity(doc.dependencies.len());
        for dep in doc.dependencies {
            if let Some(ref condition) = dep.when_version {
                let req: semver::VersionReq = condition.parse().map_err(|e| {
                    evaluation_error(format!(
                        "invalid `when-version` condition `{}` for `{}`: {}",
                        condition, dep.url, e
                    ))
                })?;
                let applies = ctx.version.is_some_and(|v| req.matches(v));
                if !applies {
                    continue;
                }
            }

            let requirement = match (dep.major_version, dep.requirement) {
                (Some(major_floor), None) => SnapshotRequirement::MajorFloor { major_floor },
                (None, Some(range)) => SnapshotRequirement::Range { range },
                _ => {
                    return Err(evaluation_error(format!(
                        "dependency `{}` must specify exactly one of `major-version` or `requirement`",
                        dep.url
                    )))
                }
            };

            dependencies.push(SnapshotDependency {
                url: resolve_url(&dep.url, ctx.base_url)?,
                requirement,
            });
        }

        let snapshot = Snapshot {
            schema: SNAPSHOT_SCHEMA,
            package: SnapshotPackage {
                name: doc.package.name,
                version: doc.package.version,
                targets: doc
                    .targets
                    .into_iter()
                    .map(|t| SnapshotTarget {
                        name: t.name,
                        dependencies: t.dependencies,
                    })
                    .collect(),
                dependencies,
            },
        };

        let bytes = serde_json::to_vec(&snapshot)
            .map_err(|e| evaluation_error(format!("failed to encode snapshot: {}", e)))?;

        Ok(RawEvaluationOutput::new(bytes))
    }
}
