//! Hospital search configuration.
//!
//! The defaults describe the deployment region the service was first built
//! for (Guntur, Andhra Pradesh).

use super::errors::{ConfigError, ConfigValidator, ensure_positive};
use crate::geo::{BoundingBox, Coordinate, HospitalOrder};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Nominatim search endpoint.
pub const DEFAULT_PROVIDER_URL: &str = "https://nominatim.openstreetmap.org/search";

/// Viewbox (`left,top,right,bottom`) the place search is bounded to.
pub const DEFAULT_VIEWBOX: BoundingBox = BoundingBox {
    left: 80.20,
    top: 16.50,
    right: 80.70,
    bottom: 16.10,
};

/// Origin used when the caller does not supply a usable coordinate.
pub const DEFAULT_ORIGIN: Coordinate = Coordinate {
    latitude: 16.3067,
    longitude: 80.4365,
};

/// Maximum number of candidates requested from the provider.
pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Configuration for the hospital search client and ranking service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HospitalSearchConfig {
    /// Place-search endpoint
    pub provider_url: String,
    /// `User-Agent` sent to the provider
    pub user_agent: String,
    /// Region the search is bounded to
    pub viewbox: BoundingBox,
    /// Origin used when the request carries no coordinate
    pub default_origin: Coordinate,
    /// Maximum number of candidates requested
    pub result_limit: usize,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Order of the returned hospitals
    pub order: HospitalOrder,
}

impl Default for HospitalSearchConfig {
    fn default() -> Self {
        Self {
            provider_url: DEFAULT_PROVIDER_URL.to_string(),
            user_agent: concat!("dermascan/", env!("CARGO_PKG_VERSION")).to_string(),
            viewbox: DEFAULT_VIEWBOX,
            default_origin: DEFAULT_ORIGIN,
            result_limit: DEFAULT_RESULT_LIMIT,
            timeout_secs: 10,
            order: HospitalOrder::Provider,
        }
    }
}

impl HospitalSearchConfig {
    /// The provider request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ConfigValidator for HospitalSearchConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.provider_url.starts_with("http://") || self.provider_url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidValue {
                field: "provider_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.provider_url),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent".to_string(),
                reason: "the provider requires an identifying User-Agent".to_string(),
            });
        }
        ensure_positive("result_limit", self.result_limit)?;
        ensure_positive("timeout_secs", self.timeout_secs as usize)?;
        self.viewbox.validate()?;
        self.default_origin
            .validate()
            .map_err(|err| ConfigError::InvalidValue {
                field: "default_origin".to_string(),
                reason: err.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = HospitalSearchConfig::default();
        assert_eq!(config.result_limit, 5);
        assert_eq!(config.viewbox.to_string(), "80.2,16.5,80.7,16.1");
        assert_eq!(config.default_origin, DEFAULT_ORIGIN);
        assert_eq!(config.order, HospitalOrder::Provider);
        assert!(config.user_agent.starts_with("dermascan/"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_failures() {
        let config = HospitalSearchConfig {
            provider_url: "ftp://example.org".to_string(),
            ..HospitalSearchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HospitalSearchConfig {
            result_limit: 0,
            ..HospitalSearchConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HospitalSearchConfig {
            default_origin: Coordinate {
                latitude: 95.0,
                longitude: 0.0,
            },
            ..HospitalSearchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
