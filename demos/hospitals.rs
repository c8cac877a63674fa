//! Nearby Hospitals Example
//!
//! This example queries a Nominatim-compatible provider for hospitals inside
//! the configured viewbox and prints each one with its distance from the
//! given coordinate.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example hospitals -- [OPTIONS]
//! ```
//!
//! # Arguments
//!
//! * `--lat`, `--lng` - Origin coordinate (defaults to the configured origin)
//! * `--provider-url` - Search endpoint
//! * `--limit` - Maximum number of hospitals to request
//! * `--nearest-first` - Sort by distance instead of provider order
//!
//! # Example
//!
//! ```bash
//! cargo run --example hospitals -- --lat 16.5062 --lng 80.6480 --nearest-first
//! ```

use clap::Parser;
use dermascan::core::config::HospitalSearchConfig;
use dermascan::geo::{HospitalOrder, HospitalRankingService, NominatimClient};
use std::time::Instant;
use tracing::{info, warn};

/// Command-line arguments for the nearby hospitals example
#[derive(Parser)]
#[command(name = "hospitals")]
#[command(about = "Nearby Hospitals Example - lists hospitals with their distance")]
struct Args {
    /// Latitude of the origin
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<String>,

    /// Longitude of the origin
    #[arg(long, allow_hyphen_values = true)]
    lng: Option<String>,

    /// Nominatim-compatible search endpoint
    #[arg(long)]
    provider_url: Option<String>,

    /// Maximum number of hospitals to request
    #[arg(long, default_value = "5")]
    limit: usize,

    /// Sort by distance, unknown distances last
    #[arg(long)]
    nearest_first: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dermascan::utils::init_tracing();

    let args = Args::parse();

    info!("Nearby Hospitals Example");

    let mut config = HospitalSearchConfig {
        result_limit: args.limit,
        ..HospitalSearchConfig::default()
    };
    if let Some(url) = args.provider_url {
        config.provider_url = url;
    }
    if args.nearest_first {
        config.order = HospitalOrder::NearestFirst;
    }

    let client = NominatimClient::new(&config)?;
    let service = HospitalRankingService::new(client, &config);

    let start = Instant::now();
    let lookup = service
        .lookup(args.lat.as_deref(), args.lng.as_deref())
        .await?;
    info!(
        "Lookup completed in {:.2}ms",
        start.elapsed().as_secs_f64() * 1000.0
    );

    info!(
        "\n=== Hospitals near {}, {} ===",
        lookup.origin.latitude, lookup.origin.longitude
    );
    if lookup.hospitals.is_empty() {
        warn!("  No hospitals found in the search area");
    }
    for (idx, hospital) in lookup.hospitals.iter().enumerate() {
        match hospital.distance {
            Some(km) => info!("  [{}] {} - {:.2} km", idx + 1, hospital.name, km),
            None => info!("  [{}] {} - distance unknown", idx + 1, hospital.name),
        }
        if let Some(road) = &hospital.address {
            info!("      {}", road);
        }
    }

    Ok(())
}
