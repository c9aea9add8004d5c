#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod commands;
mod config;
mod server;

use std::process;

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "docqa_cli::server::startup";
pub const TRACING_TARGET_SHUTDOWN: &str = "docqa_cli::server::shutdown";
pub const TRACING_TARGET_CONFIG: &str = "docqa_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "docqa_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = %format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();
    Cli::init_tracing()?;
    cli.log();
    cli.validate()?;

    let (embedder, completer) = commands::connect(&cli.rag)?;

    match cli.command {
        Command::Check => commands::check(&cli.rag, &embedder, &completer).await,
        Command::Ingest => commands::ingest(&cli.rag, embedder).await,
        Command::Ask {
            question,
            no_sources,
        } => commands::ask(&cli.rag, embedder, completer, &question, !no_sources).await,
        Command::Serve { server, recovery } => {
            commands::serve(&cli.rag, embedder, completer, server, &recovery).await
        }
        Command::Delete => commands::delete(&cli.rag, embedder).await,
    }
}
