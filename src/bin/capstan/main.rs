//! Capstan CLI - package manifest tooling for C packages

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use capstan::util::shell::Shell;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    let shell = Shell::from_flags(cli.quiet, cli.verbose, cli.color);

    if let Err(e) = run(cli, &shell) {
        shell.error(format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli, shell: &Shell) -> Result<()> {
    let filter = if cli.verbose {
        EnvFilter::new("capstan=debug")
    } else {
        EnvFilter::new("capstan=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::New(args) => commands::new::execute(args, shell),
        Commands::Init(args) => commands::init::execute(args, shell),
        Commands::Load(args) => commands::load::execute(args, shell),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}
