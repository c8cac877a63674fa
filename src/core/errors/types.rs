//! Core error types for the classification and hospital lookup pipelines.
//!
//! This module defines the main [`DermaError`] enum together with the smaller
//! [`CoordinateError`] used on the per-candidate distance failure path.

use thiserror::Error;

/// Errors raised while turning provider text into a coordinate.
///
/// These never escape a hospital lookup: a candidate whose coordinate fails to
/// parse keeps its entry with an unknown distance.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoordinateError {
    /// The value is missing or empty.
    #[error("missing {axis}")]
    Missing {
        /// Which axis was missing ("latitude" or "longitude").
        axis: &'static str,
    },
    /// The value is not a number.
    #[error("{axis} '{value}' is not numeric")]
    NotNumeric {
        /// Which axis failed to parse.
        axis: &'static str,
        /// The offending text.
        value: String,
    },
    /// The value is a number but lies outside the geographic range.
    #[error("{axis} {value} outside [{min}, {max}]")]
    OutOfRange {
        /// Which axis is out of range.
        axis: &'static str,
        /// The parsed value.
        value: f64,
        /// Lower bound of the valid range.
        min: f64,
        /// Upper bound of the valid range.
        max: f64,
    },
}

/// Enum representing the errors that can occur in dermascan.
///
/// Image errors (`Decode`, `UnsupportedFormat`) are user-correctable, model
/// errors (`ModelUnavailable`, `Inference`) are operator-correctable and
/// `ProviderUnavailable` covers the external place-search service.
#[derive(Error, Debug)]
pub enum DermaError {
    /// The uploaded bytes are not a decodable image.
    #[error("image decode failed: {message}")]
    Decode {
        /// Description of the decode failure.
        message: String,
        /// The underlying image error, when there is one.
        #[source]
        source: Option<image::ImageError>,
    },

    /// The image could not be converted to 3-channel RGB.
    #[error("unsupported image format: {message}")]
    UnsupportedFormat {
        /// Description of the unsupported format or colour type.
        message: String,
    },

    /// The classifier artifact could not be loaded.
    #[error("model '{model_path}' unavailable: {reason}")]
    ModelUnavailable {
        /// Path of the artifact that failed to load.
        model_path: String,
        /// Short reason string.
        reason: String,
        /// Underlying source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The classifier rejected the input or produced an unusable output.
    #[error("inference failed in model '{model_name}': {context}")]
    Inference {
        /// Name of the model where inference failed.
        model_name: String,
        /// Additional context about the failure.
        context: String,
        /// Underlying source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The place-search provider is unreachable, timed out or answered with
    /// something that could not be parsed.
    #[error("place-search provider unavailable: {message}")]
    ProviderUnavailable {
        /// Description of the provider failure.
        message: String,
        /// Underlying source error.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    ConfigError {
        /// A message describing the configuration error.
        message: String,
    },

    /// IO error.
    #[error("io")]
    Io(#[from] std::io::Error),
}

impl From<image::ImageError> for DermaError {
    /// Splits `image` errors into the two user-facing image error kinds.
    fn from(error: image::ImageError) -> Self {
        use image::error::{ImageFormatHint, UnsupportedErrorKind};

        match error {
            // Unrecognisable bytes surface from `image` as an unknown format.
            image::ImageError::Unsupported(err)
                if !matches!(
                    err.kind(),
                    UnsupportedErrorKind::Format(ImageFormatHint::Unknown)
                ) =>
            {
                Self::UnsupportedFormat {
                    message: err.to_string(),
                }
            }
            other => Self::Decode {
                message: other.to_string(),
                source: Some(other),
            },
        }
    }
}

impl From<crate::core::config::ConfigError> for DermaError {
    fn from(error: crate::core::config::ConfigError) -> Self {
        Self::ConfigError {
            message: error.to_string(),
        }
    }
}

impl DermaError {
    /// Creates a decode error without an underlying `image` error.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
            source: None,
        }
    }

    /// Creates a model-unavailable error for the artifact at `model_path`.
    pub fn model_unavailable(
        model_path: impl Into<String>,
        reason: impl Into<String>,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::ModelUnavailable {
            model_path: model_path.into(),
            reason: reason.into(),
            source,
        }
    }

    /// Creates an inference error without an underlying source.
    pub fn inference(model_name: impl Into<String>, context: impl Into<String>) -> Self {
        Self::Inference {
            model_name: model_name.into(),
            context: context.into(),
            source: None,
        }
    }

    /// Wraps an error that occurred while talking to the place-search provider.
    pub fn provider(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::ProviderUnavailable {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Returns true when the caller can fix the error by sending another image.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Decode { .. } | Self::UnsupportedFormat { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_image_error_maps_to_unsupported_format() {
        let hint = image::error::ImageFormatHint::Name("heic".to_string());
        let err: DermaError = image::ImageError::Unsupported(
            image::error::UnsupportedError::from_format_and_kind(
                hint.clone(),
                image::error::UnsupportedErrorKind::Format(hint),
            ),
        )
        .into();
        assert!(matches!(err, DermaError::UnsupportedFormat { .. }));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_garbage_bytes_map_to_decode() {
        let err: DermaError = image::load_from_memory(b"not an image at all")
            .unwrap_err()
            .into();
        assert!(err.is_user_error());
        assert!(matches!(err, DermaError::Decode { .. }));
    }

    #[test]
    fn test_model_errors_are_not_user_errors() {
        let err = DermaError::model_unavailable("model.onnx", "file not found", None);
        assert!(!err.is_user_error());
        assert_eq!(
            err.to_string(),
            "model 'model.onnx' unavailable: file not found"
        );
    }

    #[test]
    fn test_coordinate_error_messages() {
        let err = CoordinateError::NotNumeric {
            axis: "latitude",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "latitude 'abc' is not numeric");
    }
}
