//! `capstan new` command

use std::path::{Path, PathBuf};

use anyhow::{bail, Result};

use capstan::ops::{scaffold_package, PackageKind, ScaffoldOptions};
use capstan::util::shell::{Shell, Status};

use crate::cli::NewArgs;

/// Determines the output path for a new package.
///
/// If a path is explicitly specified, uses that. Otherwise, creates a
/// directory with the same name as the package.
pub fn determine_package_path(name: &str, path: &Option<PathBuf>) -> PathBuf {
    path.clone().unwrap_or_else(|| PathBuf::from(name))
}

/// Validates that the target directory doesn't already exist or is empty.
pub fn validate_package_path(path: &Path) -> Result<(), String> {
    if path.exists() {
        if path.is_file() {
            return Err(format!(
                "destination `{}` already exists and is a file",
                path.display()
            ));
        }

        if let Ok(entries) = std::fs::read_dir(path) {
            if entries.count() > 0 {
                return Err(format!(
                    "destination `{}` already exists and is not empty",
                    path.display()
                ));
            }
        }
    }

    Ok(())
}

pub fn execute(args: NewArgs, shell: &Shell) -> Result<()> {
    let path = determine_package_path(&args.name, &args.path);
    if let Err(msg) = validate_package_path(&path) {
        bail!("{}", msg);
    }

    let kind: PackageKind = args.kind.into();
    let opts = ScaffoldOptions { kind, init: false };

    let mut progress = |what: &str| shell.verbose_status(Status::Created, what);
    scaffold_package(&path, &opts, &mut progress)?;

    shell.status(
        Status::Created,
        format!("{} package `{}`", kind.as_str(), args.name),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{KindArg, NewArgs};
    use clap::Parser;
    use tempfile::TempDir;

    fn parse_new_args(args: &[&str]) -> NewArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            new: NewArgs,
        }
        TestCli::parse_from(args).new
    }

    #[test]
    fn test_new_args_defaults() {
        let args = parse_new_args(&["test", "mypkg"]);
        assert_eq!(args.name, "mypkg");
        assert_eq!(args.kind, KindArg::Executable);
        assert!(args.path.is_none());
    }

    #[test]
    fn test_new_args_kind_and_path() {
        let args = parse_new_args(&["test", "mylib", "--kind", "library", "--path", "libs/mylib"]);
        assert_eq!(args.kind, KindArg::Library);
        assert_eq!(args.path, Some(PathBuf::from("libs/mylib")));
    }

    #[test]
    fn test_determine_package_path() {
        assert_eq!(
            determine_package_path("pkg", &None),
            PathBuf::from("pkg")
        );
        assert_eq!(
            determine_package_path("pkg", &Some(PathBuf::from("elsewhere"))),
            PathBuf::from("elsewhere")
        );
    }

    #[test]
    fn test_validate_package_path_nonexistent() {
        let tmp = TempDir::new().unwrap();
        assert!(validate_package_path(&tmp.path().join("fresh")).is_ok());
    }

    #[test]
    fn test_validate_package_path_empty_dir() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().join("empty");
        std::fs::create_dir(&dir).unwrap();
        assert!(validate_package_path(&dir).is_ok());
    }

    #[test]
    fn test_validate_package_path_nonempty_dir() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("file.txt"), "content").unwrap();

        let result = validate_package_path(tmp.path());
        assert!(result.unwrap_err().contains("not empty"));
    }

    #[test]
    fn test_validate_package_path_is_file() {
        let tmp = TempDir::new().unwrap();
        let file = tmp.path().join("some_file");
        std::fs::write(&file, "content").unwrap();

        let result = validate_package_path(&file);
        assert!(result.unwrap_err().contains("is a file"));
    }
}
