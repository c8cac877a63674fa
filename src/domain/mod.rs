//! Domain types for lesion classification.
//!
//! Diagnostic classes, their advisory records and classification results.

pub mod advisory;
pub mod classification;
pub mod diagnosis;

pub use advisory::{AdvisoryRecord, advisory_for, advisory_for_id};
pub use classification::{ClassificationResult, ProbabilityDistribution};
pub use diagnosis::{DiagnosticClass, NUM_CLASSES};
