//! Decoded package manifests.
//!
//! A [`Manifest`] is the immutable, fully validated description of a package
//! that the loader hands to the rest of the toolchain. It is either valid in
//! its entirety or never constructed; there is no partially populated state.

use std::collections::HashSet;

use semver::Version;
use serde::Serialize;

/// A dependency version requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum VersionRequirement {
    /// Major-version floor: `2` accepts any `2.x.y`.
    MajorFloor {
        #[serde(rename = "major-floor")]
        major: u64,
    },

    /// Full semver requirement range.
    Range { range: semver::VersionReq },
}

impl VersionRequirement {
    /// Requirement accepting any version with the given major component.
    pub fn major_floor(major: u64) -> Self {
        VersionRequirement::MajorFloor { major }
    }

    /// Requirement from a semver range.
    pub fn range(range: semver::VersionReq) -> Self {
        VersionRequirement::Range { range }
    }

    /// Check whether a version satisfies this requirement.
    pub fn matches(&self, version: &Version) -> bool {
        match self {
            VersionRequirement::MajorFloor { major } => version.major == *major,
            VersionRequirement::Range { range } => range.matches(version),
        }
    }
}

impl std::fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionRequirement::MajorFloor { major } => write!(f, "^{}", major),
            VersionRequirement::Range { range } => write!(f, "{}", range),
        }
    }
}

/// A named build unit with an ordered list of dependency names.
///
/// Dependency names may refer to sibling targets or to external packages;
/// tying them to concrete packages is the resolver's job, not the loader's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    name: String,
    dependencies: Vec<String>,
}

impl Target {
    /// Create a target.
    pub fn new(name: impl Into<String>, dependencies: Vec<String>) -> Self {
        Target {
            name: name.into(),
            dependencies,
        }
    }

    /// Target name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Names of targets or external packages this target depends on,
    /// in declaration order.
    pub fn dependencies(&self) -> &[String] {
        &self.dependencies
    }
}

/// A reference to an external package by URL plus a version requirement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDependency {
    url: String,
    requirement: VersionRequirement,
}

impl PackageDependency {
    /// Create a package dependency.
    pub fn new(url: impl Into<String>, requirement: VersionRequirement) -> Self {
        PackageDependency {
            url: url.into(),
            requirement,
        }
    }

    /// Dependency URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Version requirement.
    pub fn requirement(&self) -> &VersionRequirement {
        &self.requirement
    }

    /// Package name implied by the URL (last path segment, `.git` trimmed).
    pub fn implied_name(&self) -> &str {
        let tail = self
            .url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .unwrap_or(&self.url);
        tail.strip_suffix(".git").unwrap_or(tail)
    }
}

/// The decoded, immutable description of a package.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Manifest {
    name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<Version>,
    targets: Vec<Target>,
    dependencies: Vec<PackageDependency>,
}

impl Manifest {
    /// Construct a manifest, enforcing its structural invariants.
    ///
    /// Returns a human-readable description of the first violated invariant
    /// on failure; callers wrap it into their own error type.
    pub fn new(
        name: impl Into<String>,
        version: Option<Version>,
        targets: Vec<Target>,
        dependencies: Vec<PackageDependency>,
    ) -> Result<Self, String> {
        let manifest = Manifest {
            name: name.into(),
            version,
            targets,
            dependencies,
        };
        manifest.validate()?;
        Ok(manifest)
    }

    /// Construct without running validation.
    ///
    /// Only for tests that need an invalid manifest to exist, e.g. to
    /// exercise cache revalidation.
    #[cfg(test)]
    pub(crate) fn new_unchecked(
        name: impl Into<String>,
        version: Option<Version>,
        targets: Vec<Target>,
        dependencies: Vec<PackageDependency>,
    ) -> Self {
        Manifest {
            name: name.into(),
            version,
            targets,
            dependencies,
        }
    }

    /// Package name, guaranteed non-empty.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The package's own version, when the manifest declares one
    /// (tools-version 1.2 and later).
    pub fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    /// Build targets, in declaration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// External dependencies, in declaration order.
    pub fn dependencies(&self) -> &[PackageDependency] {
        &self.dependencies
    }

    /// Look up a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Re-check structural invariants.
    ///
    /// Used both at construction and defensively when an entry is pulled
    /// back out of the manifest cache.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.is_empty() {
            return Err("package name must not be empty".to_string());
        }

        let mut seen_targets = HashSet::new();
        for target in &self.targets {
            if target.name.is_empty() {
                return Err("target name must not be empty".to_string());
            }
            if !seen_targets.insert(target.name.as_str()) {
                return Err(format!("duplicate target name `{}`", target.name));
            }
        }

        let mut seen_urls = HashSet::new();
        for dep in &self.dependencies {
            if !seen_urls.insert(dep.url.as_str()) {
                return Err(format!("duplicate dependency URL `{}`", dep.url));
            }
        }

        Ok(())
    }
}
