//! CVGuard CLI: run the CV upload checks against files on disk.
//!
//! Scanner and pipeline settings come from the environment (CLAMAV_*,
//! UPLOAD_*), optionally via a `.env` file.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use cvguard_cli::{init_tracing, load_candidate, summarize};
use cvguard_core::{AvScanConfig, UploadConfig};
use cvguard_processing::sanitize_filename;
use cvguard_services::{build_pipeline, ClamAvClient};

#[derive(Parser)]
#[command(name = "cvguard", about = "Validate CV uploads")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full validation pipeline on a file
    Validate {
        /// Path to the file to check
        file: PathBuf,
        /// Declared MIME type (inferred from the extension when omitted)
        #[arg(long)]
        content_type: Option<String>,
        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the sanitized form of a filename
    Sanitize {
        /// Filename as uploaded
        name: String,
    },
    /// Check that the ClamAV daemon answers
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate {
            file,
            content_type,
            json,
        } => {
            let candidate = load_candidate(&file, content_type.as_deref())?;
            tracing::debug!(?candidate, "Loaded upload candidate");

            let pipeline = build_pipeline(UploadConfig::from_env(), AvScanConfig::from_env());
            let result = pipeline.validate_upload(&candidate).await;

            if json {
                let out = serde_json::to_string_pretty(&result).context("Serialize result")?;
                println!("{}", out);
            } else {
                println!("{}", summarize(&result));
            }

            Ok(if result.valid {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Commands::Sanitize { name } => {
            println!("{}", sanitize_filename(&name));
            Ok(ExitCode::SUCCESS)
        }
        Commands::Ping => {
            let client = ClamAvClient::from_env();
            let address = client.config().address();
            if client.ping().await {
                println!("PONG from {}", address);
                Ok(ExitCode::SUCCESS)
            } else {
                println!("no answer from {}", address);
                Ok(ExitCode::FAILURE)
            }
        }
    }
}
