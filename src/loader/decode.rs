//! Snapshot decoding and schema validation.
//!
//! Evaluation output is a versioned JSON document:
//!
//! ```json
//! {
//!   "schema": 1,
//!   "package": {
//!     "name": "Foo",
//!     "version": "1.0.0",
//!     "targets": [{"name": "sys", "dependencies": ["libc"]}],
//!     "dependencies": [
//!       {"url": "https://example.com/example", "requirement": {"major-floor": 1}}
//!     ]
//!   }
//! }
//! ```
//!
//! The decoder is schema-aware: which fields are legal depends on the
//! tools-version the manifest declared, so an old manifest cannot smuggle in
//! newer constructs and a new loader still validates old manifests by their
//! own rules.

use semver::Version;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::core::manifest::{Manifest, PackageDependency, Target, VersionRequirement};
use crate::core::tools_version::ToolsVersion;
use crate::loader::errors::LoadError;
use crate::loader::evaluate::RawEvaluationOutput;

/// Snapshot encoding version. Bumped only on incompatible encoding changes;
/// independent of the manifest tools-version.
pub const SNAPSHOT_SCHEMA: u32 = 1;

/// Top-level snapshot document.
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    pub schema: u32,
    pub package: SnapshotPackage,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotPackage {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub targets: Vec<SnapshotTarget>,

    #[serde(default)]
    pub dependencies: Vec<SnapshotDependency>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotTarget {
    pub name: String,

    #[serde(default)]
    pub dependencies: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct SnapshotDependency {
    pub url: String,
    pub requirement: SnapshotRequirement,
}

/// Wire form of a version requirement.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub(crate) enum SnapshotRequirement {
    MajorFloor {
        #[serde(rename = "major-floor")]
        major_floor: u64,
    },
    Range {
        range: String,
    },
}

fn schema_violation(detail: impl Into<String>) -> LoadError {
    LoadError::SchemaViolation {
        detail: detail.into(),
    }
}

/// Parse and validate a snapshot into a [`Manifest`].
pub fn decode(raw: &RawEvaluationOutput, tools_version: ToolsVersion) -> Result<Manifest, LoadError> {
    let snapshot: Snapshot =
        serde_json::from_slice(raw.bytes()).map_err(|source| LoadError::MalformedOutput { source })?;

    if snapshot.schema != SNAPSHOT_SCHEMA {
        return Err(schema_violation(format!(
            "unknown snapshot schema {} (expected {})",
            snapshot.schema, SNAPSHOT_SCHEMA
        )));
    }

    let pkg = snapshot.package;

    let version = match pkg.version {
        Some(v) => {
            if !tools_version.supports_package_version() {
                return Err(schema_violation(format!(
                    "`package.version` requires tools-version 1.2, manifest declares {}",
                    tools_version
                )));
            }
            let parsed: Version = v
                .parse()
                .map_err(|e| schema_violation(format!("invalid package version `{}`: {}", v, e)))?;
            Some(parsed)
        }
        None => None,
    };

    let targets = pkg
        .targets
        .into_iter()
        .map(|t| Target::new(t.name, t.dependencies))
        .collect();

    let mut dependencies = Vec::with_capacity(pkg.dependencies.len());
    for dep in pkg.dependencies {
        Url::parse(&dep.url)
            .map_err(|e| schema_violation(format!("malformed dependency URL `{}`: {}", dep.url, e)))?;

        let requirement = match dep.requirement {
            SnapshotRequirement::MajorFloor { major_floor } => {
                VersionRequirement::major_floor(major_floor)
            }
            SnapshotRequirement::Range { range } => {
                if !tools_version.supports_requirement_ranges() {
                    return Err(schema_violation(format!(
                        "requirement ranges require tools-version 1.1, manifest declares {}",
                        tools_version
                    )));
                }
                let req = range.parse().map_err(|e| {
                    schema_violation(format!(
                        "unresolvable version requirement `{}` for `{}`: {}",
                        range, dep.url, e
                    ))
                })?;
                VersionRequirement::range(req)
            }
        };

        dependencies.push(PackageDependency::new(dep.url, requirement));
    }

    Manifest::new(pkg.name, version, targets, dependencies).map_err(schema_violation)
}
