//! wedtest CLI - Main Entry Point
//!
//! Inspects the reference capability table, checks flags reported by the
//! editor against it, and drives the test server's control endpoint.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use wedtest_common::HarnessConfig;

mod commands;
mod output;

use commands::{capabilities, config, control};

/// wedtest - wed editor acceptance harness
#[derive(Parser)]
#[command(name = "wedtest")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Configuration file
    #[arg(long, default_value = wedtest_common::DEFAULT_CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the reference capability table and audit it
    Table,

    /// Show the expected capability flags for an environment
    Classify(capabilities::EnvironmentArgs),

    /// Compare flags reported by the editor with the reference
    Check(capabilities::CheckArgs),

    /// Drive the test server control endpoint
    #[command(subcommand)]
    Control(control::ControlCommands),

    /// Show the effective configuration
    Config(config::ConfigArgs),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .init();

    let harness = HarnessConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command {
        Commands::Table => capabilities::table(cli.format)?,
        Commands::Classify(args) => capabilities::classify(&args, &harness.environment, cli.format)?,
        Commands::Check(args) => {
            if !capabilities::check(&args, &harness.environment, cli.format)? {
                std::process::exit(1);
            }
        }
        Commands::Control(cmd) => control::execute(cmd, &harness.server).await?,
        Commands::Config(args) => config::execute(&args, &harness, &cli.config)?,
        Commands::Version => {
            println!("wedtest {}", wedtest_common::VERSION);
            println!("  Engines: {}", wedtest_common::Engine::ALL.map(|e| e.as_str()).join(", "));
        }
    }

    Ok(())
}
