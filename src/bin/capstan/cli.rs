//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell as CompletionShell;
use semver::Version;

use capstan::ops::PackageKind;
use capstan::util::shell::ColorChoice;

/// Capstan - package manifest tooling for C packages
#[derive(Parser)]
#[command(name = "capstan")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress status output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output mode: auto, always, never
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new capstan package
    New(NewArgs),

    /// Initialize a capstan package in an existing directory
    Init(InitArgs),

    /// Load and validate a package manifest
    Load(LoadArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Package kinds the scaffolder can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Empty,
    Executable,
    Library,
    SystemModule,
}

impl From<KindArg> for PackageKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Empty => PackageKind::Empty,
            KindArg::Executable => PackageKind::Executable,
            KindArg::Library => PackageKind::Library,
            KindArg::SystemModule => PackageKind::SystemModule,
        }
    }
}

#[derive(Args)]
pub struct NewArgs {
    /// Package name
    pub name: String,

    /// Kind of package to create
    #[arg(long, value_enum, default_value_t = KindArg::Executable)]
    pub kind: KindArg,

    /// Directory to create the package in (defaults to name)
    #[arg(long)]
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct InitArgs {
    /// Kind of package to create
    #[arg(long, value_enum, default_value_t = KindArg::Executable)]
    pub kind: KindArg,

    /// Directory to initialize (defaults to current directory)
    pub path: Option<PathBuf>,
}

#[derive(Args)]
pub struct LoadArgs {
    /// Manifest file to load (defaults to ./Capstan.toml)
    pub path: Option<PathBuf>,

    /// Base URL for resolving relative dependency references
    #[arg(long, default_value = "file:///")]
    pub base_url: String,

    /// Package version to evaluate the manifest for
    #[arg(long)]
    pub package_version: Option<Version>,

    /// Print the loaded manifest as JSON
    #[arg(long)]
    pub json: bool,

    /// Evaluate the manifest by running it under this interpreter
    #[arg(long, value_name = "INTERPRETER")]
    pub sandbox: Option<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: CompletionShell,
}
