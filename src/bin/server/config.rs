//! Configuration types for the dermascan server and CLI.

use clap::Args;
use dermascan::core::config::{
    ClassifierConfig, ConfigValidator, HospitalSearchConfig, OrtSessionConfig,
    classifier::DEFAULT_MODEL_PATH,
    search::{DEFAULT_PROVIDER_URL, DEFAULT_RESULT_LIMIT},
};
use dermascan::geo::{BoundingBox, Coordinate, HospitalOrder};
use dermascan::processors::ChannelOrder;
use std::path::PathBuf;

use crate::service::ServeError;

/// Default cap on a classify request body.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Classifier options shared by `classify` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct ModelArgs {
    /// Path to the ONNX lesion classifier
    #[arg(long, default_value = DEFAULT_MODEL_PATH, env = "DERMASCAN_MODEL")]
    pub model: PathBuf,

    /// Tensor layout the model expects (hwc or chw)
    #[arg(long = "channel-order", default_value = "hwc", env = "DERMASCAN_CHANNEL_ORDER")]
    pub channel_order: ChannelOrder,

    /// Number of ONNX Runtime sessions shared by concurrent requests
    #[arg(long = "sessions", default_value_t = 1, env = "DERMASCAN_SESSIONS")]
    pub sessions: usize,

    /// Device to use (cpu, cuda, cuda:0, etc.)
    #[arg(long, default_value = "cpu", env = "DERMASCAN_DEVICE")]
    pub device: String,
}

impl ModelArgs {
    /// Builds and validates the library classifier configuration.
    pub fn to_classifier_config(&self) -> Result<ClassifierConfig, ServeError> {
        let mut config = ClassifierConfig::new(&self.model).with_session_pool_size(self.sessions);
        config.channel_order = self.channel_order;
        if let Some(ort) = OrtSessionConfig::from_device(&self.device)
            .map_err(|e| ServeError::Config(e.to_string()))?
        {
            config = config.with_ort_session(ort);
        }
        config
            .validate()
            .map_err(|e| ServeError::Config(e.to_string()))?;
        Ok(config)
    }
}

/// Hospital lookup options shared by `hospitals` and `serve`.
#[derive(Args, Debug, Clone)]
pub struct LookupArgs {
    /// Nominatim-compatible search endpoint
    #[arg(long = "provider-url", default_value = DEFAULT_PROVIDER_URL, env = "DERMASCAN_PROVIDER_URL")]
    pub provider_url: String,

    /// Search viewbox as left,top,right,bottom
    #[arg(long, env = "DERMASCAN_VIEWBOX", allow_hyphen_values = true)]
    pub viewbox: Option<BoundingBox>,

    /// Default origin latitude when a request has none
    #[arg(long = "default-lat", env = "DERMASCAN_DEFAULT_LAT", allow_hyphen_values = true)]
    pub default_lat: Option<f64>,

    /// Default origin longitude when a request has none
    #[arg(long = "default-lng", env = "DERMASCAN_DEFAULT_LNG", allow_hyphen_values = true)]
    pub default_lng: Option<f64>,

    /// Maximum number of hospitals returned
    #[arg(long, default_value_t = DEFAULT_RESULT_LIMIT, env = "DERMASCAN_RESULT_LIMIT")]
    pub limit: usize,

    /// Provider request timeout in seconds
    #[arg(long = "provider-timeout", default_value_t = 10, env = "DERMASCAN_PROVIDER_TIMEOUT")]
    pub provider_timeout: u64,

    /// Result order (provider or nearest-first)
    #[arg(long, default_value = "provider", env = "DERMASCAN_ORDER")]
    pub order: HospitalOrder,
}

impl LookupArgs {
    /// Builds and validates the library search configuration.
    pub fn to_search_config(&self) -> Result<HospitalSearchConfig, ServeError> {
        let defaults = HospitalSearchConfig::default();
        let origin = Coordinate::new(
            self.default_lat.unwrap_or(defaults.default_origin.latitude),
            self.default_lng.unwrap_or(defaults.default_origin.longitude),
        );

        let config = HospitalSearchConfig {
            provider_url: self.provider_url.clone(),
            viewbox: self.viewbox.unwrap_or(defaults.viewbox),
            default_origin: origin,
            result_limit: self.limit,
            timeout_secs: self.provider_timeout,
            order: self.order,
            ..defaults
        };
        config
            .validate()
            .map_err(|e| ServeError::Config(e.to_string()))?;
        Ok(config)
    }
}

/// Configuration for the HTTP server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub classifier: ClassifierConfig,
    pub search: HospitalSearchConfig,
    pub host: String,
    pub port: u16,
    /// Directory uploads are kept in; `None` keeps them in memory only
    pub upload_dir: Option<PathBuf>,
    pub max_upload_bytes: usize,
    /// Load the model before accepting requests
    pub eager_load: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        model: ModelArgs,
        #[command(flatten)]
        lookup: LookupArgs,
    }

    #[test]
    fn test_defaults_build_valid_configs() {
        let cli = TestCli::try_parse_from(["test"]).unwrap();
        let classifier = cli.model.to_classifier_config().unwrap();
        assert_eq!(classifier.model_path, PathBuf::from(DEFAULT_MODEL_PATH));
        assert!(classifier.ort_session.is_none());

        let search = cli.lookup.to_search_config().unwrap();
        assert_eq!(search.result_limit, 5);
        assert_eq!(search.viewbox.to_string(), "80.2,16.5,80.7,16.1");
        assert_eq!(search.order, HospitalOrder::Provider);
    }

    #[test]
    fn test_overrides() {
        let cli = TestCli::try_parse_from([
            "test",
            "--channel-order",
            "chw",
            "--viewbox",
            "-0.5,51.7,0.3,51.3",
            "--default-lat",
            "51.5",
            "--default-lng",
            "-0.12",
            "--order",
            "nearest-first",
        ])
        .unwrap();

        assert_eq!(
            cli.model.to_classifier_config().unwrap().channel_order,
            ChannelOrder::CHW
        );
        let search = cli.lookup.to_search_config().unwrap();
        assert_eq!(search.default_origin, Coordinate::new(51.5, -0.12));
        assert_eq!(search.viewbox.left, -0.5);
        assert_eq!(search.order, HospitalOrder::NearestFirst);
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        let cli = TestCli::try_parse_from(["test", "--device", "tpu"]).unwrap();
        assert!(matches!(
            cli.model.to_classifier_config(),
            Err(ServeError::Config(_))
        ));

        let cli = TestCli::try_parse_from(["test", "--limit", "0"]).unwrap();
        assert!(matches!(
            cli.lookup.to_search_config(),
            Err(ServeError::Config(_))
        ));
    }
}
