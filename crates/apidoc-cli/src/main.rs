//! apidoc CLI - API surface analysis for published Clojure artifacts.

use anyhow::Result;
use apidoc_cli::commands::{self, AnalyzeArgs, ConfigCommand, UnpackArgs};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "apidoc")]
#[command(about = "Analyze a published artifact's public API inside a pinned sandbox", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file path (default: ~/.apidoc/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output (-v debug, -vv trace)
    #[arg(short = 'v', action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Analyze an artifact and write its API description
    Analyze(AnalyzeArgs),

    /// Unpack an archive the way the analysis pipeline does
    Unpack(UnpackArgs),

    /// Manage apidoc configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Command::Analyze(args) => commands::handle_analyze_command(args, cli.config),
        Command::Unpack(args) => commands::handle_unpack_command(args),
        Command::Config { command } => commands::handle_config_command(command, cli.config),
    }
}
