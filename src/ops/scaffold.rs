//! Implementation of `capstan new` and `capstan init`.
//!
//! Scaffolding writes a manifest that the loader accepts as-is, plus the
//! minimal source layout for the chosen package kind. The package name in the
//! manifest keeps the directory's exact spelling; only the source module
//! identifier is sanitized, since it has to be usable in C code.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::tools_version::{ToolsVersion, DIRECTIVE_MARKER};

/// The file name manifests are written under.
pub const MANIFEST_FILE: &str = "Capstan.toml";

/// What kind of package to scaffold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackageKind {
    /// Manifest only, no sources.
    Empty,
    /// Package with a `main` entry point.
    Executable,
    /// Package exposing a module plus a test stub.
    Library,
    /// Wrapper declaring a system-installed module.
    SystemModule,
}

impl PackageKind {
    /// Human-readable kind name, as shown in progress output.
    pub fn as_str(&self) -> &'static str {
        match self {
            PackageKind::Empty => "empty",
            PackageKind::Executable => "executable",
            PackageKind::Library => "library",
            PackageKind::SystemModule => "system-module",
        }
    }
}

/// Receives a message per file or directory the scaffold creates.
///
/// Implemented for any `FnMut(&str)`, so callers can pass a closure that
/// prints, collects, or ignores the messages.
pub trait ProgressSink {
    fn created(&mut self, what: &str);
}

impl<F: FnMut(&str)> ProgressSink for F {
    fn created(&mut self, what: &str) {
        self(what)
    }
}

/// Options for creating a new package.
#[derive(Debug, Clone)]
pub struct ScaffoldOptions {
    /// Package kind to generate.
    pub kind: PackageKind,

    /// Initialize in an existing directory instead of requiring a fresh one.
    pub init: bool,
}

/// Create a new capstan package at `path`.
///
/// The directory name becomes the package name, spelled exactly as given.
pub fn scaffold_package(
    path: &Path,
    opts: &ScaffoldOptions,
    progress: &mut dyn ProgressSink,
) -> Result<()> {
    let name = package_name(path)?;

    if path.exists() && !opts.init {
        bail!(
            "destination `{}` already exists\n\
             \n\
             Use `capstan init` to initialize an existing directory.",
            path.display()
        );
    }

    if !path.exists() {
        fs::create_dir_all(path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }

    let manifest_path = path.join(MANIFEST_FILE);
    if manifest_path.exists() {
        bail!("`{}` already exists in `{}`", MANIFEST_FILE, path.display());
    }

    fs::write(&manifest_path, generate_manifest(&name, opts.kind))
        .with_context(|| format!("failed to write {}", MANIFEST_FILE))?;
    progress.created(MANIFEST_FILE);

    let module = sanitize_module_name(&name);

    // Every kind except a system module gets the scaffold tree, even when
    // nothing is placed in it yet.
    if opts.kind != PackageKind::SystemModule {
        fs::create_dir_all(path.join("sources"))
            .with_context(|| "failed to create sources directory")?;
        progress.created("sources/");

        fs::create_dir_all(path.join("tests"))
            .with_context(|| "failed to create tests directory")?;
        progress.created("tests/");
    }

    match opts.kind {
        PackageKind::Empty => {}

        PackageKind::Executable => {
            fs::write(path.join("sources/main.c"), generate_main(&name))
                .with_context(|| "failed to write sources/main.c")?;
            progress.created("sources/main.c");
        }

        PackageKind::Library => {
            let source_file = format!("sources/{}.c", module);
            fs::write(path.join(&source_file), generate_library(&module))
                .with_context(|| format!("failed to write {}", source_file))?;
            progress.created(&source_file);

            let test_file = format!("tests/{}_test.c", module);
            fs::write(path.join(&test_file), generate_library_test(&module))
                .with_context(|| format!("failed to write {}", test_file))?;
            progress.created(&test_file);
        }

        PackageKind::SystemModule => {
            fs::write(path.join("module.map"), generate_module_map(&module))
                .with_context(|| "failed to write module.map")?;
            progress.created("module.map");
        }
    }

    Ok(())
}

/// Initialize a capstan package in an existing directory.
pub fn init_package(
    path: &Path,
    kind: PackageKind,
    progress: &mut dyn ProgressSink,
) -> Result<()> {
    let opts = ScaffoldOptions { kind, init: true };
    scaffold_package(path, &opts, progress)
}

fn package_name(path: &Path) -> Result<String> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) if !name.is_empty() => Ok(name.to_string()),
        _ => bail!(
            "cannot derive a package name from `{}`",
            path.display()
        ),
    }
}

/// Turn a package name into a C-usable module identifier.
///
/// Every character outside `[A-Za-z0-9]` becomes `_`, and a leading digit
/// gets an underscore prefix. `some-package` becomes `some_package`.
pub fn sanitize_module_name(name: &str) -> String {
    let mut module: String = name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();

    if module.is_empty() || module.starts_with(|c: char| c.is_ascii_digit()) {
        module.insert(0, '_');
    }

    module
}

fn generate_manifest(name: &str, kind: PackageKind) -> String {
    let mut manifest = format!(
        "# {}:{}\n[package]\nname = \"{}\"\n",
        DIRECTIVE_MARKER,
        ToolsVersion::CURRENT,
        name
    );

    if kind != PackageKind::Empty {
        let module = sanitize_module_name(name);
        manifest.push_str(&format!("\n[[targets]]\nname = \"{}\"\n", module));
    }

    manifest
}

fn generate_main(name: &str) -> String {
    format!(
        r#"#include <stdio.h>

int main(int argc, char *argv[]) {{
    printf("Hello from {}!\n");
    return 0;
}}
"#,
        name
    )
}

fn generate_library(module: &str) -> String {
    format!(
        r#"int {module}_answer(void) {{
    return 42;
}}
"#,
        module = module
    )
}

fn generate_library_test(module: &str) -> String {
    format!(
        r#"#include <assert.h>

int {module}_answer(void);

int main(void) {{
    assert({module}_answer() == 42);
    return 0;
}}
"#,
        module = module
    )
}

fn generate_module_map(module: &str) -> String {
    format!(
        r#"module {} [system] {{
    header "/usr/include/{}.h"
    link "{}"
}}
"#,
        module, module, module
    )
}
