//! Lesion Classification Example
//!
//! This example classifies one or more lesion photos and prints the predicted
//! diagnostic class, its confidence and the attached clinical advisory.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example classify -- [OPTIONS] --model-path <MODEL> <IMAGES>...
//! ```
//!
//! # Arguments
//!
//! * `-m, --model-path` - Path to the lesion classifier ONNX model
//! * `--device` - Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
//! * `--nchw` - Feed the model channels-first tensors
//! * `<IMAGES>...` - Paths to input images
//!
//! # Example
//!
//! ```bash
//! cargo run --example classify -- \
//!     -m models/lesion_classifier.onnx \
//!     images/mole.jpg
//! ```

use clap::Parser;
use dermascan::core::config::OrtSessionConfig;
use dermascan::domain::DiagnosticClass;
use dermascan::predictors::LesionClassificationPredictor;
use dermascan::processors::ChannelOrder;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{error, info};

/// Command-line arguments for the lesion classification example
#[derive(Parser)]
#[command(name = "classify")]
#[command(about = "Lesion Classification Example - predicts a diagnosis with advisory")]
struct Args {
    /// Path to the lesion classifier model file
    #[arg(short, long)]
    model_path: PathBuf,

    /// Paths to input images to classify
    #[arg(required = true)]
    images: Vec<PathBuf>,

    /// Device to use for inference (e.g., 'cpu', 'cuda', 'cuda:0')
    #[arg(long, default_value = "cpu")]
    device: String,

    /// Model expects [1, 3, H, W] instead of [1, H, W, 3]
    #[arg(long)]
    nchw: bool,

    /// Print the full probability distribution
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dermascan::utils::init_tracing();

    let args = Args::parse();

    info!("Lesion Classification Example");

    if !args.model_path.exists() {
        error!("Model file not found: {}", args.model_path.display());
        return Err("Model file not found".into());
    }

    info!("Using device: {}", args.device);
    let ort_config = OrtSessionConfig::from_device(&args.device)?.unwrap_or_default();

    let channel_order = if args.nchw {
        ChannelOrder::CHW
    } else {
        ChannelOrder::HWC
    };
    let predictor = LesionClassificationPredictor::builder()
        .channel_order(channel_order)
        .ort_session(ort_config)
        .build(&args.model_path)?;

    let start = Instant::now();
    predictor.warm_up()?;
    info!(
        "Classifier loaded in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    for (idx, image_path) in args.images.iter().enumerate() {
        let bytes = match std::fs::read(image_path) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to read image {}: {}", image_path.display(), e);
                continue;
            }
        };

        let start = Instant::now();
        let result = match predictor.predict(&bytes) {
            Ok(result) => result,
            Err(e) => {
                error!("Failed to classify {}: {}", image_path.display(), e);
                continue;
            }
        };

        info!("\nImage {}: {}", idx + 1, image_path.display());
        info!("  Prediction: {}", result.label());
        info!("  Confidence: {:.2}%", result.confidence_percent());
        info!("  Severity: {}", result.advisory.severity);
        for precaution in result.advisory.precautions {
            info!("  - {}", precaution);
        }
        info!("  Consultation: {}", result.advisory.consultation);
        info!(
            "  Classified in {:.2}ms",
            start.elapsed().as_secs_f64() * 1000.0
        );

        if args.verbose {
            info!("  All classes:");
            for class in DiagnosticClass::ALL {
                let p = result.distribution.probability(class);
                info!("    {:<30} {:.2}%", class.label(), p * 100.0);
            }
        }
    }

    Ok(())
}
