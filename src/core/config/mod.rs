//! Configuration management.
//!
//! Configuration types, validation and the ONNX Runtime session settings.

pub mod classifier;
pub mod errors;
pub mod onnx;
pub mod search;

// Re-export commonly used types
pub use classifier::ClassifierConfig;
pub use errors::{ConfigError, ConfigValidator};
pub use onnx::*;
pub use search::HospitalSearchConfig;
