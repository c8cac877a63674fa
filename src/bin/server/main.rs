//! dermascan server and CLI
//!
//! A cross-platform binary for skin-lesion classification and nearby-hospital
//! lookup via CLI or HTTP server.
//!
//! # Usage
//!
//! ## CLI Mode
//! ```bash
//! dermascan-server classify --file lesion.jpg --model models/lesion_classifier.onnx
//! dermascan-server hospitals --lat 16.5062 --lng 80.6480 --output json
//! ```
//!
//! ## Server Mode
//! ```bash
//! dermascan-server serve --model models/lesion_classifier.onnx --upload-dir static/data --port 8080
//! ```

mod cli;
mod config;
mod server;
mod service;
mod storage;

use clap::{Parser, Subcommand};
use cli::OutputFormat;
use config::{DEFAULT_MAX_UPLOAD_BYTES, LookupArgs, ModelArgs};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "dermascan-server")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Skin lesion classification and nearby hospital lookup via CLI or HTTP server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify a single image file
    Classify {
        /// Local file path of the image to classify
        #[arg(long)]
        file: PathBuf,

        #[command(flatten)]
        model: ModelArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Look up hospitals near a coordinate
    Hospitals {
        /// Latitude of the origin (defaults to the configured origin)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<String>,

        /// Longitude of the origin (defaults to the configured origin)
        #[arg(long, allow_hyphen_values = true)]
        lng: Option<String>,

        #[command(flatten)]
        lookup: LookupArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "pretty")]
        output: OutputFormat,
    },
    /// Start the HTTP server
    Serve {
        #[command(flatten)]
        model: ModelArgs,

        #[command(flatten)]
        lookup: LookupArgs,

        /// Port to listen on
        #[arg(long, short, default_value = "8080", env = "DERMASCAN_PORT")]
        port: u16,

        /// Host to bind to
        #[arg(long, default_value = "0.0.0.0", env = "DERMASCAN_HOST")]
        host: String,

        /// Directory uploaded images are saved to
        #[arg(long = "upload-dir", env = "DERMASCAN_UPLOAD_DIR")]
        upload_dir: Option<PathBuf>,

        /// Maximum upload size in bytes
        #[arg(long = "max-upload-bytes", default_value_t = DEFAULT_MAX_UPLOAD_BYTES, env = "DERMASCAN_MAX_UPLOAD_BYTES")]
        max_upload_bytes: usize,

        /// Load the classifier at startup instead of on the first request
        #[arg(long = "eager-load", env = "DERMASCAN_EAGER_LOAD")]
        eager_load: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize tracing
    dermascan::utils::init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Classify {
            file,
            model,
            output,
        } => {
            let config = model.to_classifier_config()?;
            info!("Processing file: {}", file.display());
            cli::classify_file(&file, &config, output)?;
        }
        Commands::Hospitals {
            lat,
            lng,
            lookup,
            output,
        } => {
            let config = lookup.to_search_config()?;
            cli::find_hospitals(&config, service::HospitalQuery { lat, lng }, output).await?;
        }
        Commands::Serve {
            model,
            lookup,
            port,
            host,
            upload_dir,
            max_upload_bytes,
            eager_load,
        } => {
            let config = config::ServerConfig {
                classifier: model.to_classifier_config()?,
                search: lookup.to_search_config()?,
                host,
                port,
                upload_dir,
                max_upload_bytes,
                eager_load,
            };

            info!("Starting server on {}:{}", config.host, config.port);
            server::run_server(config).await?;
        }
    }

    Ok(())
}
