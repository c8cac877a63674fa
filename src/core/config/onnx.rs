//! ONNX Runtime session settings for the lesion classifier.

use super::ConfigError;
use serde::{Deserialize, Serialize};

/// Graph optimization levels for ONNX Runtime.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrtGraphOptimizationLevel {
    /// Disable all optimizations.
    DisableAll,
    /// Enable basic optimizations.
    #[default]
    Level1,
    /// Enable extended optimizations.
    Level2,
    /// Enable all optimizations.
    Level3,
}

/// Execution providers for ONNX Runtime, in order of preference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum OrtExecutionProvider {
    /// CPU execution provider (always available)
    #[default]
    CPU,
    /// NVIDIA CUDA execution provider (requires the `cuda` feature)
    CUDA {
        /// CUDA device ID (default: 0)
        device_id: Option<i32>,
    },
}

/// Configuration for the ONNX Runtime sessions backing the classifier.
///
/// Every field is optional; unset fields leave ONNX Runtime's own defaults in
/// place.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrtSessionConfig {
    /// Number of threads used to parallelize execution within nodes
    pub intra_threads: Option<usize>,
    /// Number of threads used to parallelize execution across nodes
    pub inter_threads: Option<usize>,
    /// Graph optimization level
    pub optimization_level: Option<OrtGraphOptimizationLevel>,
    /// Execution providers in order of preference
    pub execution_providers: Option<Vec<OrtExecutionProvider>>,
}

impl OrtSessionConfig {
    /// Creates a new OrtSessionConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of intra-op threads.
    pub fn with_intra_threads(mut self, threads: usize) -> Self {
        self.intra_threads = Some(threads);
        self
    }

    /// Sets the number of inter-op threads.
    pub fn with_inter_threads(mut self, threads: usize) -> Self {
        self.inter_threads = Some(threads);
        self
    }

    /// Sets the graph optimization level.
    pub fn with_optimization_level(mut self, level: OrtGraphOptimizationLevel) -> Self {
        self.optimization_level = Some(level);
        self
    }

    /// Sets the execution providers.
    pub fn with_execution_providers(mut self, providers: Vec<OrtExecutionProvider>) -> Self {
        self.execution_providers = Some(providers);
        self
    }

    /// Parses a device string (`cpu`, `cuda`, `cuda:N`) into a session config.
    ///
    /// Returns `Ok(None)` for `cpu`, which keeps ONNX Runtime's CPU defaults.
    /// CUDA devices fall back to the CPU provider for unsupported operators.
    pub fn from_device(device: &str) -> Result<Option<Self>, ConfigError> {
        let device_lower = device.trim().to_lowercase();

        if device_lower == "cpu" {
            return Ok(None);
        }

        if device_lower.starts_with("cuda") {
            let device_id = if device_lower == "cuda" {
                0
            } else if let Some(id_str) = device_lower.strip_prefix("cuda:") {
                id_str
                    .parse::<i32>()
                    .map_err(|_| ConfigError::InvalidValue {
                        field: "device".to_string(),
                        reason: format!("invalid CUDA device id in '{device}'"),
                    })?
            } else {
                return Err(ConfigError::InvalidValue {
                    field: "device".to_string(),
                    reason: format!("'{device}' is not of the form 'cuda' or 'cuda:N'"),
                });
            };

            return Ok(Some(Self::new().with_execution_providers(vec![
                OrtExecutionProvider::CUDA {
                    device_id: Some(device_id),
                },
                OrtExecutionProvider::CPU,
            ])));
        }

        Err(ConfigError::InvalidValue {
            field: "device".to_string(),
            reason: format!("unsupported device '{device}'"),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ort_session_config_builder() {
        let config = OrtSessionConfig::new()
            .with_intra_threads(4)
            .with_inter_threads(2)
            .with_optimization_level(OrtGraphOptimizationLevel::Level2);

        assert_eq!(config.intra_threads, Some(4));
        assert_eq!(config.inter_threads, Some(2));
        assert_eq!(
            config.optimization_level,
            Some(OrtGraphOptimizationLevel::Level2)
        );
        assert!(config.execution_providers.is_none());
    }

    #[test]
    fn test_cpu_device_keeps_defaults() {
        assert_eq!(OrtSessionConfig::from_device("CPU").unwrap(), None);
    }

    #[test]
    fn test_cuda_device_ids() {
        let config = OrtSessionConfig::from_device("cuda:1").unwrap().unwrap();
        assert_eq!(
            config.execution_providers,
            Some(vec![
                OrtExecutionProvider::CUDA { device_id: Some(1) },
                OrtExecutionProvider::CPU
            ])
        );

        let config = OrtSessionConfig::from_device("cuda").unwrap().unwrap();
        assert_eq!(
            config.execution_providers.unwrap()[0],
            OrtExecutionProvider::CUDA { device_id: Some(0) }
        );
    }

    #[test]
    fn test_invalid_devices() {
        assert!(OrtSessionConfig::from_device("cuda:x").is_err());
        assert!(OrtSessionConfig::from_device("cudax").is_err());
        assert!(OrtSessionConfig::from_device("tpu").is_err());
    }
}
