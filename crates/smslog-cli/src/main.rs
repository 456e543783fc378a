//! # smslog CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use smslog_cli::append::{run_append, AppendArgs};
use smslog_cli::key::{run_key, KeyArgs};
use smslog_cli::show::{run_show, ShowArgs};

/// smslog: monthly SMS logs kept in a Git repository.
#[derive(Parser, Debug)]
#[command(name = "smslog", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Append one message to the current period's log.
    Append(AppendArgs),

    /// Print one period's log.
    Show(ShowArgs),

    /// Print the period key and file path for a moment.
    Key(KeyArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to start async runtime: {e}");
            return ExitCode::from(1);
        }
    };

    let result = match &cli.command {
        Commands::Append(args) => runtime.block_on(run_append(args)),
        Commands::Show(args) => runtime.block_on(run_show(args)),
        Commands::Key(args) => run_key(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
