//! # dermascan
//!
//! Skin-lesion classification with clinical advisories, plus a nearby-hospital
//! lookup.
//!
//! The crate has two independent pipelines:
//!
//! - **Classification**: an uploaded image is decoded, resized and normalized
//!   ([`processors`]), run through an ONNX classifier ([`core::inference`]) and
//!   enriched with the advisory for the predicted class ([`domain`]). The
//!   [`predictors::LesionClassificationPredictor`] ties these together.
//! - **Hospital lookup**: a coordinate (or the configured default) is used to
//!   query a place-search provider inside a bounding box, and every candidate
//!   is annotated with its haversine distance ([`geo`]).
//!
//! ## Example
//!
//! ```rust,no_run
//! use dermascan::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let predictor = LesionClassificationPredictor::builder()
//!     .session_pool_size(2)
//!     .build("models/lesion_classifier.onnx")?;
//!
//! let bytes = std::fs::read("lesion.jpg")?;
//! let result = predictor.predict(&bytes)?;
//! println!("{} ({:.2}%)", result.label(), result.confidence_percent());
//! println!("Severity: {}", result.advisory.severity);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod domain;
pub mod geo;
pub mod predictors;
pub mod processors;
pub mod utils;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::core::config::OrtSessionConfig;
    pub use crate::core::{
        ClassifierConfig, ConfigValidator, DermaError, DermaResult, HospitalSearchConfig,
        InferenceEngine,
    };
    pub use crate::domain::{AdvisoryRecord, ClassificationResult, DiagnosticClass};
    pub use crate::geo::{
        Coordinate, HospitalCandidate, HospitalLookup, HospitalOrder, HospitalRankingService,
        NominatimClient, PlaceSearch, calculate_distance,
    };
    pub use crate::predictors::LesionClassificationPredictor;
    pub use crate::utils::init_tracing;
}
