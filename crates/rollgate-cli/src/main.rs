//! Rollgate CLI - Generate promotion pipelines from service specs
//!
//! This CLI gives service owners a terminal interface to:
//! - Validate a service spec and see every problem at once
//! - Inspect the promotion plan with resolved values and where they came from
//! - Generate GitOps target manifests and CI workflows into the repository

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;
mod input;
mod output;
mod writer;

use commands::{generate, plan, validate};
use config::CliConfig;
use error::CliResult;

/// Rollgate CLI application
#[derive(Parser)]
#[command(name = "rollgate")]
#[command(about = "Rollgate - progressive rollout pipeline generator", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "ROLLGATE_CONFIG", global = true)]
    config: Option<String>,

    /// Output format (table, json, yaml)
    #[arg(short, long, default_value = "table", global = true)]
    output: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Generate manifests and workflows
    #[command(alias = "gen")]
    Generate(generate::GenerateArgs),

    /// Validate a service spec
    Validate(validate::ValidateArgs),

    /// Show the promotion plan
    Plan(plan::PlanArgs),

    /// Show configuration
    Config,
}

fn run(cli: Cli) -> CliResult<()> {
    let config = CliConfig::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Generate(args) => generate::execute(args, &config),
        Commands::Validate(args) => validate::execute(args),
        Commands::Plan(args) => plan::execute(args, cli.output),
        Commands::Config => output::print_single(&config, cli.output),
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize tracing; stdout is reserved for command output
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    if let Err(e) = run(cli) {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
