//! `capstan init` command

use anyhow::{Context, Result};

use capstan::ops::{init_package, PackageKind};
use capstan::util::shell::{Shell, Status};

use crate::cli::InitArgs;

pub fn execute(args: InitArgs, shell: &Shell) -> Result<()> {
    let path = match args.path {
        Some(path) => path,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };

    let kind: PackageKind = args.kind.into();

    let mut progress = |what: &str| shell.verbose_status(Status::Created, what);
    init_package(&path, kind, &mut progress)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    shell.status(
        Status::Created,
        format!("{} package `{}`", kind.as_str(), name),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::cli::{InitArgs, KindArg};
    use clap::Parser;
    use std::path::PathBuf;

    fn parse_init_args(args: &[&str]) -> InitArgs {
        #[derive(Parser)]
        struct TestCli {
            #[command(flatten)]
            init: InitArgs,
        }
        TestCli::parse_from(args).init
    }

    #[test]
    fn test_init_args_defaults() {
        let args = parse_init_args(&["test"]);
        assert_eq!(args.kind, KindArg::Executable);
        assert!(args.path.is_none());
    }

    #[test]
    fn test_init_args_explicit_path() {
        let args = parse_init_args(&["test", "somewhere", "--kind", "empty"]);
        assert_eq!(args.path, Some(PathBuf::from("somewhere")));
        assert_eq!(args.kind, KindArg::Empty);
    }
}
