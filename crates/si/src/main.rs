//! `si` - System Initiative schema tooling
//!
//! Uploads schemas (with credential companion functions), inspects schemas,
//! and drives change sets and components through the public API.

use anyhow::Result;
use clap::{Parser, Subcommand};
use si::{CompanionPreset, Overrides};
use si_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

mod cli;

#[derive(Parser, Debug)]
#[command(name = "si", version, about = "System Initiative schema and change set tooling")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    /// API base URL [env: SI_BASE_URL]
    #[arg(long, global = true, value_name = "URL")]
    base_url: Option<String>,

    /// Read the API token from this file
    #[arg(long, global = true, value_name = "PATH")]
    key_file: Option<PathBuf>,

    /// Config file (default: ~/.si/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a schema from source and metadata; attaches companion
    /// functions for credential schemas
    CreateSchema(cli::create_schema::CreateSchemaArgs),

    /// Look up a schema by name and show its variant and functions
    Inspect(cli::inspect::InspectArgs),

    /// Show who the API token belongs to
    Whoami(cli::whoami::WhoamiArgs),

    /// Manage change sets
    ChangeSet {
        #[command(subcommand)]
        action: cli::change_set::ChangeSetAction,
    },

    /// Search and read schemas, variants and functions
    Schema(cli::schema::SchemaArgs),

    /// Create components and run management functions
    Component(cli::component::ComponentArgs),

    /// Show resolved configuration
    Config(cli::config::ConfigArgs),
}

impl Commands {
    fn preset(&self) -> Option<CompanionPreset> {
        match self {
            Commands::CreateSchema(args) => args.preset,
            _ => None,
        }
    }
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version go to stdout and succeed; every usage error
            // exits 1.
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(1)
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    let _log_guard = init_logging(LogConfig {
        app_name: "si",
        verbose: cli.verbose,
        log_dir: None,
    });

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("Command failed: {:#}", err);
            eprintln!("{:?}", err);
            ExitCode::from(1)
        }
    }
}

fn run_command(cli: Cli) -> Result<()> {
    let overrides = Overrides {
        base_url: cli.base_url,
        key_file: cli.key_file,
        config: cli.config,
        preset: cli.command.preset(),
    };
    let settings = cli::context::load_settings(&overrides)?;

    match cli.command {
        Commands::CreateSchema(args) => cli::create_schema::run(args, &settings),
        Commands::Inspect(args) => cli::inspect::run(args, &settings),
        Commands::Whoami(args) => cli::whoami::run(args, &settings),
        Commands::ChangeSet { action } => cli::change_set::run(action, &settings),
        Commands::Schema(args) => cli::schema::run(args, &settings),
        Commands::Component(args) => cli::component::run(args, &settings),
        Commands::Config(args) => cli::config::run(args, &settings),
    }
}
