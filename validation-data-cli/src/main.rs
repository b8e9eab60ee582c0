//! nac-validation - generate device validation data from the command line

use std::{fs, path::PathBuf, process::ExitCode, time::Duration};

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use validation_data::{
    generate_validation_data, JsonFileIdentitySource, RelayClient, ValidationData,
    ValidationOptions,
};

/// Exit code for failures outside the pipeline (relay, output file).
const GENERIC_FAILURE: u8 = 1;

#[derive(Parser)]
#[command(name = "nac-validation")]
#[command(about = "Generate validation data for device identity registration", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validation pipeline on this machine
    Generate {
        /// Hardware identity JSON file
        #[arg(long)]
        hardware: PathBuf,

        /// Certificate document URL
        #[arg(long, env = "NAC_VALIDATION_CERT_URL")]
        cert_url: Option<String>,

        /// Session endpoint used when the certificate names none
        #[arg(long, env = "NAC_INITIALIZE_VALIDATION_URL")]
        session_url: Option<String>,

        /// Path to the native NAC library
        #[arg(long, env = "NAC_LIBRARY_PATH")]
        library: Option<PathBuf>,

        /// Per-request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write raw bytes to this file instead of base64 to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch validation data from a relay host
    Relay {
        /// Relay endpoint URL
        #[arg(long)]
        url: String,

        /// Bearer token for the relay
        #[arg(long, env = "NAC_RELAY_TOKEN")]
        token: Option<String>,

        /// Request timeout in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Write raw bytes to this file instead of base64 to stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();

    match cli.command {
        Commands::Generate {
            hardware,
            cert_url,
            session_url,
            library,
            timeout_secs,
            output,
        } => {
            let options = ValidationOptions {
                certificate_url: cert_url,
                session_url,
                library_path: library,
                timeout: timeout_secs.map(Duration::from_secs),
            };
            match generate_validation_data(JsonFileIdentitySource::new(hardware), &options) {
                Ok(data) => emit(&data, output.as_ref()),
                Err(e) => {
                    error!("Validation data generation failed with code {}: {e}", e.code());
                    ExitCode::from(e.code() as u8)
                }
            }
        }
        Commands::Relay {
            url,
            token,
            timeout_secs,
            output,
        } => {
            let mut client = RelayClient::new(url);
            if let Some(token) = token {
                client = client.with_token(token);
            }
            if let Some(secs) = timeout_secs {
                client = client.with_timeout(Duration::from_secs(secs));
            }
            match client.fetch_validation_data() {
                Ok(data) => emit(&data, output.as_ref()),
                Err(e) => {
                    error!("Relay request failed: {e}");
                    ExitCode::from(GENERIC_FAILURE)
                }
            }
        }
    }
}

/// Writes raw bytes to `output`, or base64 text to stdout.
fn emit(data: &ValidationData, output: Option<&PathBuf>) -> ExitCode {
    match output {
        Some(path) => match fs::write(path, data.as_bytes()) {
            Ok(()) => {
                info!(path = %path.display(), len = data.len(), "Wrote validation data");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!(path = %path.display(), "Failed to write validation data: {e}");
                ExitCode::from(GENERIC_FAILURE)
            }
        },
        None => {
            println!("{}", data.to_base64());
            ExitCode::SUCCESS
        }
    }
}
