//! The core module of the classification pipeline.
//!
//! This module contains the fundamental components shared by the rest of the
//! crate:
//! - Configuration management
//! - Error handling
//! - Inference engine integration
//!
//! It also provides re-exports of commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;

/// A batch of images as a 4-dimensional `f32` tensor.
pub type Tensor4D = ndarray::Array4<f32>;

pub use config::{ClassifierConfig, ConfigError, ConfigValidator, HospitalSearchConfig};
pub use errors::{CoordinateError, DermaError, DermaResult};
pub use inference::{InferenceEngine, OrtInfer, load_session};
