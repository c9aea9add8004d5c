//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── rag: RagConfig            # Documents, index, Ollama, retrieval
//! └── command: Command
//!     ├── check
//!     ├── ingest
//!     ├── ask <question>
//!     ├── serve: ServerConfig   # Host, port, timeouts
//!     └── delete
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.

mod server;

use std::process;

use anyhow::Context;
use clap::{Parser, Subcommand};
use docqa_rig::RagConfig;
use docqa_server::middleware::RecoveryConfig;
pub use server::ServerConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "docqa")]
#[command(about = "Ask questions about a directory of PDF documents")]
#[command(version)]
pub struct Cli {
    /// Pipeline configuration shared by every command.
    #[clap(flatten)]
    pub rag: RagConfig,

    #[command(subcommand)]
    pub command: Command,
}

/// Operations the binary can run.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Check the documents directory and the Ollama daemon.
    Check,

    /// Extract, split, embed and persist every PDF in the documents directory.
    Ingest,

    /// Answer one question from the persisted index.
    Ask {
        /// The question to answer.
        question: String,

        /// Do not print the supporting sources.
        #[arg(long)]
        no_sources: bool,
    },

    /// Serve the question form over HTTP.
    Serve {
        /// Network binding and shutdown.
        #[clap(flatten)]
        server: ServerConfig,

        /// Request timeout.
        #[clap(flatten)]
        recovery: RecoveryConfig,
    },

    /// Remove the persisted collection.
    Delete,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing with environment-based filtering.
    pub fn init_tracing() -> anyhow::Result<()> {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("failed to initialize tracing")?;
        Ok(())
    }

    /// Validates all configuration values.
    pub fn validate(&self) -> anyhow::Result<()> {
        self.rag
            .validate()
            .context("invalid pipeline configuration")?;

        if let Command::Serve { server, recovery } = &self.command {
            server
                .validate()
                .context("invalid server configuration")?;
            validate_request_timeout(recovery).context("invalid server configuration")?;
        }

        Ok(())
    }

    /// Logs configuration (no sensitive information).
    pub fn log(&self) {
        Self::log_build_info();

        let rag = &self.rag;
        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            documents_dir = %rag.documents.documents_dir.display(),
            chunk_size = rag.documents.chunk_size,
            chunk_overlap = rag.documents.chunk_overlap,
            index = %rag.store.index_path().display(),
            collection = %rag.store.collection_name,
            "document configuration"
        );

        tracing::info!(
            target: TRACING_TARGET_CONFIG,
            ollama_url = %rag.ollama.ollama_url,
            embedding_model = %rag.ollama.embedding_model,
            completion_model = %rag.ollama.completion_model,
            top_k = rag.pipeline.top_k,
            similarity_threshold = ?rag.pipeline.similarity_threshold,
            temperature = rag.pipeline.temperature,
            "model configuration"
        );

        if let Command::Serve { server, recovery } = &self.command {
            server.log();
            tracing::info!(
                target: TRACING_TARGET_CONFIG,
                request_timeout_secs = recovery.request_timeout,
                "middleware configuration"
            );
        }
    }

    /// Logs build information at debug level.
    fn log_build_info() {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "build information"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Request timeout bounds shared with the server configuration.
fn validate_request_timeout(recovery: &RecoveryConfig) -> anyhow::Result<()> {
    if recovery.request_timeout == 0 || recovery.request_timeout > 300 {
        anyhow::bail!(
            "Request timeout {} seconds is invalid. Must be between 1 and 300 seconds.",
            recovery.request_timeout
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_with_defaults() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["docqa", "serve"])?;
        let Command::Serve { server, recovery } = &cli.command else {
            anyhow::bail!("expected serve");
        };
        assert_eq!(server.port, 7860);
        assert_eq!(recovery.request_timeout, 180);
        assert_eq!(cli.rag.store.collection_name, "document_qa_collection");
        cli.validate()?;
        Ok(())
    }

    #[test]
    fn pipeline_flags_precede_the_command() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "docqa",
            "--chunk-size",
            "500",
            "--chunk-overlap",
            "50",
            "ask",
            "What is this document about?",
        ])?;
        assert_eq!(cli.rag.documents.chunk_size, 500);
        assert!(matches!(
            cli.command,
            Command::Ask { ref question, no_sources: false } if question == "What is this document about?"
        ));
        Ok(())
    }

    #[test]
    fn rejects_invalid_values() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(["docqa", "--chunk-overlap", "1000", "ingest"])?;
        assert!(cli.validate().is_err());

        let cli = Cli::try_parse_from(["docqa", "serve", "--request-timeout", "0"])?;
        assert!(cli.validate().is_err());
        Ok(())
    }
}
