//! CLI mode for one-shot classification and hospital lookup.

use crate::service::{
    ClassifyResponse, HospitalQuery, HospitalsResponse, ServeError, build_predictor,
    lookup_hospitals,
};
use crate::storage::sanitize_file_name;
use clap::ValueEnum;
use dermascan::core::config::{ClassifierConfig, HospitalSearchConfig};
use dermascan::geo::{HospitalRankingService, NominatimClient};
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

/// Classify a local image file
pub fn classify_file(
    path: &Path,
    config: &ClassifierConfig,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let start = Instant::now();

    info!("Loading image from file...");
    let bytes = std::fs::read(path)?;
    info!("Loaded {} bytes in {:.2}ms", bytes.len(), start.elapsed().as_secs_f64() * 1000.0);

    info!("Initializing classifier...");
    let predictor = build_predictor(config)?;
    let init_start = Instant::now();
    predictor.warm_up()?;
    info!("Classifier loaded in {:.2}ms", init_start.elapsed().as_secs_f64() * 1000.0);

    let classify_start = Instant::now();
    let result = predictor
        .predict(&bytes)
        .map_err(ServeError::Classification)?;
    let classify_ms = classify_start.elapsed().as_secs_f64() * 1000.0;
    info!("Classification completed in {:.2}ms", classify_ms);

    let file_name = path
        .file_name()
        .map(|name| sanitize_file_name(name.to_str()));
    let response = ClassifyResponse::from_result(&result, file_name, classify_ms);
    print_classification(&response, output)
}

/// Look up hospitals near a coordinate (or the configured default)
pub async fn find_hospitals(
    config: &HospitalSearchConfig,
    query: HospitalQuery,
    output: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let client = NominatimClient::new(config)?;
    let service = HospitalRankingService::new(client, config);

    info!("Querying {} ...", config.provider_url);
    let start = Instant::now();
    let response = lookup_hospitals(&service, &query).await?;
    info!("Lookup completed in {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

    print_hospitals(&response, output)
}

/// Output the classification in the specified format
fn print_classification(
    response: &ClassifyResponse,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Pretty => {
            println!("\n=== Lesion Classification ===");
            if let Some(file) = &response.image_file {
                println!("Image: {}", file);
            }
            println!("Prediction: {}", response.prediction);
            println!("Confidence: {:.2}%", response.confidence);
            println!("Severity: {}", response.severity);
            println!();
            println!("--- Precautions ---");
            for item in &response.precautions {
                println!("  - {}", item);
            }
            println!("--- Food Precautions ---");
            for item in &response.food_precautions {
                println!("  - {}", item);
            }
            println!();
            println!("Consultation: {}", response.consultation);
        }
    }
    Ok(())
}

/// Output the hospital list in the specified format
fn print_hospitals(
    response: &HospitalsResponse,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(response)?);
        }
        OutputFormat::Pretty => {
            let hospitals = response.hospitals.as_deref().unwrap_or_default();
            println!("\n=== Nearby Hospitals ===");
            if let (Some(lat), Some(lng)) = (response.latitude_used, response.longitude_used) {
                println!("Origin: {}, {}", lat, lng);
            }
            println!("Found: {}", hospitals.len());
            println!();

            if hospitals.is_empty() {
                println!("No hospitals found in the search area.");
            }
            for (idx, hospital) in hospitals.iter().enumerate() {
                let distance = hospital
                    .distance
                    .map(|d| format!("{:.2} km", d))
                    .unwrap_or_else(|| "distance unknown".to_string());
                println!("[{}] {} ({})", idx + 1, hospital.name, distance);
                println!("    Address: {}", hospital.address);
            }
        }
    }
    Ok(())
}
