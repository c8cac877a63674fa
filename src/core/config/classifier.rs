//! Classifier configuration.

use super::errors::{ConfigError, ConfigValidator, ensure_positive};
use super::onnx::OrtSessionConfig;
use crate::processors::{ChannelOrder, ResizeFilter};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the exported lesion classifier.
pub const DEFAULT_MODEL_PATH: &str = "models/lesion_classifier.onnx";

/// Input resolution (height, width) the lesion classifier was trained at.
pub const DEFAULT_INPUT_SHAPE: (u32, u32) = (224, 224);

/// Configuration for the lesion classifier and its preprocessing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Path to the ONNX artifact
    pub model_path: PathBuf,
    /// Name used in logs and errors
    pub model_name: String,
    /// Model input size as (height, width)
    pub input_shape: (u32, u32),
    /// Tensor layout the model expects
    pub channel_order: ChannelOrder,
    /// Interpolation used when resizing
    pub resize_filter: ResizeFilter,
    /// Multiplier applied to raw 8-bit intensities
    pub scale: f32,
    /// Per-channel mean subtracted after scaling (RGB order)
    pub mean: [f32; 3],
    /// Per-channel standard deviation divided after scaling (RGB order)
    pub std: [f32; 3],
    /// Number of ONNX Runtime sessions shared by concurrent predictions
    pub session_pool_size: usize,
    /// ONNX Runtime session options; `None` keeps the runtime defaults
    pub ort_session: Option<OrtSessionConfig>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            model_name: "lesion_classifier".to_string(),
            input_shape: DEFAULT_INPUT_SHAPE,
            channel_order: ChannelOrder::HWC,
            resize_filter: ResizeFilter::Nearest,
            scale: 1.0 / 255.0,
            mean: [0.0; 3],
            std: [1.0; 3],
            session_pool_size: 1,
            ort_session: None,
        }
    }
}

impl ClassifierConfig {
    /// Creates a default configuration pointing at `model_path`.
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            ..Self::default()
        }
    }

    /// Sets the session pool size.
    pub fn with_session_pool_size(mut self, size: usize) -> Self {
        self.session_pool_size = size;
        self
    }

    /// Sets the ONNX Runtime session configuration.
    pub fn with_ort_session(mut self, config: OrtSessionConfig) -> Self {
        self.ort_session = Some(config);
        self
    }
}

impl ConfigValidator for ClassifierConfig {
    /// Checks the numeric settings. Whether the artifact exists is left to the
    /// engine's first load, which reports it as an unavailable model.
    fn validate(&self) -> Result<(), ConfigError> {
        ensure_positive("input_shape.height", self.input_shape.0 as usize)?;
        ensure_positive("input_shape.width", self.input_shape.1 as usize)?;
        ensure_positive("session_pool_size", self.session_pool_size)?;
        if self.model_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "model_name".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_training_setup() {
        let config = ClassifierConfig::default();
        assert_eq!(config.input_shape, (224, 224));
        assert_eq!(config.channel_order, ChannelOrder::HWC);
        assert_eq!(config.resize_filter, ResizeFilter::Nearest);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation() {
        let config = ClassifierConfig::new("m.onnx").with_session_pool_size(0);
        assert!(config.validate().is_err());

        let config = ClassifierConfig {
            input_shape: (0, 224),
            ..ClassifierConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"model_path": "a.onnx", "channel_order": "chw"}"#).unwrap();
        assert_eq!(config.model_path, PathBuf::from("a.onnx"));
        assert_eq!(config.channel_order, ChannelOrder::CHW);
        assert_eq!(config.session_pool_size, 1);
    }
}
