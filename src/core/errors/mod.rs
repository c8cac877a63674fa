//! Error types shared by both pipelines.

mod types;

pub use types::{CoordinateError, DermaError};

/// Result alias used throughout the crate.
pub type DermaResult<T> = Result<T, DermaError>;
