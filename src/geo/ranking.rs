//! Hospital lookup: resolve the origin, query the provider and annotate every
//! candidate with its distance from the origin.

use super::coordinate::{BoundingBox, Coordinate, CoordinateResolver};
use super::distance::calculate_distance;
use super::search::{PlaceSearch, RawPlace};
use crate::core::DermaResult;
use crate::core::config::HospitalSearchConfig;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::str::FromStr;
use tracing::{debug, info};

/// Name given to candidates the provider returns without one.
pub const UNKNOWN_HOSPITAL: &str = "Unknown Hospital";

/// Order in which hospitals are returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HospitalOrder {
    /// Keep the provider's relevance order.
    #[default]
    Provider,
    /// Sort by ascending distance; candidates with unknown distance go last.
    NearestFirst,
}

impl FromStr for HospitalOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "provider" => Ok(Self::Provider),
            "nearest_first" | "nearest" => Ok(Self::NearestFirst),
            other => Err(format!(
                "unknown hospital order '{other}', expected 'provider' or 'nearest-first'"
            )),
        }
    }
}

/// One hospital returned by a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalCandidate {
    /// Display name, or [`UNKNOWN_HOSPITAL`]
    pub name: String,
    /// Road name, when the provider has one
    pub address: Option<String>,
    /// Latitude text as received from the provider
    pub lat: Option<String>,
    /// Longitude text as received from the provider
    pub lng: Option<String>,
    /// Kilometers from the lookup origin, rounded to two decimals; `None`
    /// when the candidate's coordinate is unusable
    pub distance: Option<f64>,
}

impl HospitalCandidate {
    /// Interprets a raw provider place relative to `origin`.
    pub fn from_place(place: RawPlace, origin: &Coordinate) -> Self {
        let distance = calculate_distance(
            origin.latitude,
            origin.longitude,
            place.lat.as_deref(),
            place.lon.as_deref(),
        );
        if distance.is_none() {
            debug!(
                name = ?place.display_name,
                lat = ?place.lat,
                lon = ?place.lon,
                "Candidate distance unknown"
            );
        }

        Self {
            name: place
                .display_name
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_HOSPITAL.to_string()),
            address: place
                .address
                .and_then(|a| a.road)
                .filter(|r| !r.trim().is_empty()),
            lat: place.lat,
            lng: place.lon,
            distance,
        }
    }
}

/// The outcome of a lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HospitalLookup {
    /// Coordinate distances were measured from
    pub origin: Coordinate,
    /// Candidates in the configured order
    pub hospitals: Vec<HospitalCandidate>,
}

/// Finds hospitals near a coordinate.
#[derive(Debug)]
pub struct HospitalRankingService<S> {
    search: S,
    resolver: CoordinateResolver,
    viewbox: BoundingBox,
    limit: usize,
    order: HospitalOrder,
}

impl<S: PlaceSearch> HospitalRankingService<S> {
    /// Creates a service that queries `search` with the settings in `config`.
    pub fn new(search: S, config: &HospitalSearchConfig) -> Self {
        Self {
            search,
            resolver: CoordinateResolver::new(config.default_origin),
            viewbox: config.viewbox,
            limit: config.result_limit,
            order: config.order,
        }
    }

    /// The origin resolver used for incoming requests.
    pub fn resolver(&self) -> &CoordinateResolver {
        &self.resolver
    }

    /// The order results are returned in.
    pub fn order(&self) -> HospitalOrder {
        self.order
    }

    /// Looks up hospitals near the given coordinate text.
    ///
    /// A missing or unusable coordinate falls back to the configured default
    /// origin. Zero candidates is a successful, empty result. A candidate with
    /// an unusable coordinate is kept with an unknown distance.
    ///
    /// # Errors
    ///
    /// Propagates [`crate::core::DermaError::ProviderUnavailable`] from the
    /// place search.
    pub async fn lookup(
        &self,
        latitude: Option<&str>,
        longitude: Option<&str>,
    ) -> DermaResult<HospitalLookup> {
        let origin = self.resolver.resolve(latitude, longitude);
        let places = self.search.search_hospitals(&self.viewbox, self.limit).await?;

        let mut hospitals: Vec<HospitalCandidate> = places
            .into_iter()
            .map(|place| HospitalCandidate::from_place(place, &origin))
            .collect();

        if self.order == HospitalOrder::NearestFirst {
            hospitals.sort_by(|a, b| nearest_first(a.distance, b.distance));
        }

        info!(
            %origin,
            count = hospitals.len(),
            unknown_distance = hospitals.iter().filter(|h| h.distance.is_none()).count(),
            "Hospital lookup completed"
        );
        Ok(HospitalLookup { origin, hospitals })
    }
}

fn nearest_first(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
