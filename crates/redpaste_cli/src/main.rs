//! redpaste CLI
//!
//! Shares a clipboard-sized blob between machines through one Redis key.
//!
//! # Commands
//!
//! - `set` - Store stdin at the key
//! - `get` - Write the stored blob to stdout
//! - `watch <file>` - Mirror the key into a file
//! - `edit <file>` - Edit the blob in `$EDITOR`, pushing every save

mod commands;
mod config;
mod error;

use clap::{Parser, Subcommand};
use config::{CliConfig, ConfigOverrides, FileConfig};
use error::{CliError, CliResult};
use redpaste_store::RedisStore;
use redpaste_sync_engine::{EditorCommand, SyncEngine};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

/// Share a blob through a Redis key.
#[derive(Parser, Debug)]
#[command(name = "redpaste")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Create a default configuration file
    #[arg(long)]
    create_config: bool,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
enum Commands {
    /// Store stdin at the key
    Set,

    /// Write the stored blob to stdout
    Get,

    /// Keep a local file in step with the key
    Watch {
        /// File to write the blob to
        path: PathBuf,
    },

    /// Edit the blob in $EDITOR and push every save
    Edit {
        /// File to edit
        path: PathBuf,
    },
}

impl Commands {
    fn name(&self) -> &'static str {
        match self {
            Commands::Set => "set",
            Commands::Get => "get",
            Commands::Watch { .. } => "watch",
            Commands::Edit { .. } => "edit",
        }
    }
}

const USAGE: &str = "Usage: redpaste <set/get>\n       redpaste <watch/edit> <file>";

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            // --help and --version also arrive here.
            let _ = e.print();
            return if e.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    // Logs go to stderr; stdout carries the blob for `get`.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<ExitCode> {
    let config_path = FileConfig::default_path()?;
    let file = FileConfig::load(&config_path)?;

    if cli.create_config {
        file.save(&config_path)?;
        println!("Wrote default configuration at {}", config_path.display());
        return Ok(ExitCode::SUCCESS);
    }

    let config = CliConfig::resolve(file, &cli.overrides)?;
    let Some(command) = cli.command else {
        eprintln!("{USAGE}");
        return Ok(ExitCode::FAILURE);
    };

    let operation = command.name();
    dispatch(command, config).map_err(|e| e.during(operation))
}

fn dispatch(command: Commands, config: CliConfig) -> CliResult<ExitCode> {
    match command {
        Commands::Set => {
            let engine = connect(config)?;
            commands::set::run(&engine, io::stdin().lock())?;
        }
        Commands::Get => {
            let engine = connect(config)?;
            commands::get::run(&engine, io::stdout().lock())?;
        }
        Commands::Watch { path } => {
            let engine = connect(config)?;
            commands::watch::run(engine, path)?;
        }
        Commands::Edit { path } => {
            let editor = EditorCommand::from_env()?;
            let engine = connect(config)?;
            let exit = commands::edit::run(engine, path, &editor)?;
            return Ok(ExitCode::from(exit.exit_code()));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn connect(config: CliConfig) -> CliResult<Arc<SyncEngine<RedisStore>>> {
    let store = RedisStore::connect_with_timeout(&config.redis_connect, config.redis_timeout)
        .map_err(CliError::Store)?;
    debug!(key = %config.sync.key, "store ready");
    Ok(Arc::new(SyncEngine::new(config.sync, store)))
}
