//! `capstan load` command
//!
//! Loads a manifest through the full pipeline and reports what it declares.

use std::path::PathBuf;

use anyhow::{Context, Result};

use capstan::ops::MANIFEST_FILE;
use capstan::util::diagnostic;
use capstan::util::shell::{Shell, Status};
use capstan::{Manifest, ManifestLoader, SandboxedEvaluator};

use crate::cli::LoadArgs;

pub fn execute(args: LoadArgs, shell: &Shell) -> Result<()> {
    let path = args.path.unwrap_or_else(|| PathBuf::from(MANIFEST_FILE));

    let loader = match args.sandbox {
        Some(interpreter) => {
            ManifestLoader::new(Box::new(SandboxedEvaluator::new(interpreter)))
        }
        None => ManifestLoader::declarative(),
    };

    shell.verbose_status(Status::Loading, path.display());

    let manifest = match loader.load_file(&path, &args.base_url, args.package_version.as_ref()) {
        Ok(manifest) => manifest,
        Err(err) => {
            diagnostic::emit(&err.to_diagnostic(), shell.use_color());
            std::process::exit(1);
        }
    };

    if args.json {
        let json =
            serde_json::to_string_pretty(&manifest).context("failed to encode manifest")?;
        println!("{}", json);
    } else {
        report(&manifest, shell);
    }

    Ok(())
}

fn report(manifest: &Manifest, shell: &Shell) {
    let name = match manifest.version() {
        Some(version) => format!("{} v{}", manifest.name(), version),
        None => manifest.name().to_string(),
    };
    shell.status(Status::Finished, format!("loaded package `{}`", name));

    for target in manifest.targets() {
        if target.dependencies().is_empty() {
            shell.status(Status::Info, format!("target `{}`", target.name()));
        } else {
            shell.status(
                Status::Info,
                format!(
                    "target `{}` depends on {}",
                    target.name(),
                    target.dependencies().join(", ")
                ),
            );
        }
    }

    for dep in manifest.dependencies() {
        shell.status(
            Status::Info,
            format!("dependency {} ({})", dep.url(), dep.requirement()),
        );
    }
}
