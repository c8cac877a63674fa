//! Place-search client used to find hospitals inside a viewbox.
//!
//! The [`PlaceSearch`] trait is the seam between the ranking service and the
//! network. [`NominatimClient`] is the production implementation; tests swap
//! in static stubs.

use super::coordinate::BoundingBox;
use crate::core::config::HospitalSearchConfig;
use crate::core::{DermaError, DermaResult};
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use std::future::Future;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Fixed pause before every provider request, honouring the public Nominatim
/// usage policy of at most one request per second.
pub const PROVIDER_THROTTLE: Duration = Duration::from_secs(1);

/// Free-text query sent to the provider.
const HOSPITAL_QUERY: &str = "hospital";

/// One place as returned by the provider, before any interpretation.
///
/// Every field is optional: the ranking service decides what a missing name
/// or coordinate means. A field of the wrong JSON type reads as absent, so one
/// malformed record never sinks the rest of the batch.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPlace {
    /// Full display name
    #[serde(default, deserialize_with = "or_absent")]
    pub display_name: Option<String>,
    /// Latitude, as text
    #[serde(default, deserialize_with = "text_or_number")]
    pub lat: Option<String>,
    /// Longitude, as text
    #[serde(default, deserialize_with = "text_or_number")]
    pub lon: Option<String>,
    /// Structured address details
    #[serde(default, deserialize_with = "or_absent")]
    pub address: Option<RawAddress>,
}

/// The subset of the provider's address details used for display.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawAddress {
    /// Street or road name
    #[serde(default, deserialize_with = "or_absent")]
    pub road: Option<String>,
}

/// Accepts coordinates sent either as JSON strings or JSON numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Number(serde_json::Number),
        Other(IgnoredAny),
    }

    Ok(match Option::<TextOrNumber>::deserialize(deserializer)? {
        Some(TextOrNumber::Text(text)) => Some(text),
        Some(TextOrNumber::Number(number)) => Some(number.to_string()),
        Some(TextOrNumber::Other(_)) | None => None,
    })
}

/// Reads `T`, treating a value of any other shape as absent.
fn or_absent<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OrAbsent<V> {
        Value(V),
        Other(IgnoredAny),
    }

    Ok(match Option::<OrAbsent<T>>::deserialize(deserializer)? {
        Some(OrAbsent::Value(value)) => Some(value),
        Some(OrAbsent::Other(_)) | None => None,
    })
}

/// A source of hospital candidates.
pub trait PlaceSearch: Send + Sync {
    /// Returns up to `limit` hospital places inside `viewbox`, in provider
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`DermaError::ProviderUnavailable`] when the provider cannot be
    /// reached, times out, answers with a non-success status or sends a body
    /// that does not parse.
    fn search_hospitals(
        &self,
        viewbox: &BoundingBox,
        limit: usize,
    ) -> impl Future<Output = DermaResult<Vec<RawPlace>>> + Send;
}

/// HTTP client for a Nominatim-compatible search endpoint.
#[derive(Debug, Clone)]
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Builds a client with the configured endpoint, timeout and
    /// `User-Agent`.
    pub fn new(config: &HospitalSearchConfig) -> DermaResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| DermaError::ConfigError {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.provider_url.clone(),
        })
    }

    /// The search endpoint this client queries.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl PlaceSearch for NominatimClient {
    async fn search_hospitals(
        &self,
        viewbox: &BoundingBox,
        limit: usize,
    ) -> DermaResult<Vec<RawPlace>> {
        tokio::time::sleep(PROVIDER_THROTTLE).await;

        let query = [
            ("q", HOSPITAL_QUERY.to_string()),
            ("format", "json".to_string()),
            ("limit", limit.to_string()),
            ("addressdetails", "1".to_string()),
            ("bounded", "1".to_string()),
            ("viewbox", viewbox.to_string()),
        ];

        let start = Instant::now();
        debug!(url = %self.base_url, %viewbox, limit, "Querying place-search provider");

        let response = self
            .client
            .get(&self.base_url)
            .query(&query)
            .send()
            .await
            .map_err(|e| {
                let message = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("failed to reach provider: {e}")
                };
                DermaError::provider(message, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DermaError::ProviderUnavailable {
                message: format!("HTTP error: {status}"),
                source: None,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DermaError::provider(format!("failed to read response body: {e}"), e))?;

        let mut places: Vec<RawPlace> = serde_json::from_slice(&body)
            .map_err(|e| DermaError::provider(format!("unparseable response: {e}"), e))?;
        places.truncate(limit);

        info!(
            count = places.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Place search completed"
        );
        Ok(places)
    }
}
