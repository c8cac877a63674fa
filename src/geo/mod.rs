//! Nearby-hospital lookup.
//!
//! - [`coordinate`]: coordinates, the search viewbox and origin resolution
//! - [`distance`]: haversine distance with an explicit "unknown" outcome
//! - [`search`]: the place-search seam and its Nominatim client
//! - [`ranking`]: the lookup service combining the three

pub mod coordinate;
pub mod distance;
pub mod ranking;
pub mod search;

pub use coordinate::{BoundingBox, Coordinate, CoordinateResolver, CoordinateValue};
pub use distance::{EARTH_RADIUS_KM, calculate_distance, distance_km, haversine_km};
pub use ranking::{
    HospitalCandidate, HospitalLookup, HospitalOrder, HospitalRankingService, UNKNOWN_HOSPITAL,
};
pub use search::{NominatimClient, PROVIDER_THROTTLE, PlaceSearch, RawAddress, RawPlace};
