//! Geographic coordinates, the search viewbox and the request origin resolver.

use crate::core::CoordinateError;
use crate::core::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// Valid latitude range in degrees.
pub const LATITUDE_RANGE: (f64, f64) = (-90.0, 90.0);
/// Valid longitude range in degrees.
pub const LONGITUDE_RANGE: (f64, f64) = (-180.0, 180.0);

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees, north positive
    pub latitude: f64,
    /// Longitude in degrees, east positive
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a coordinate without range checks.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Builds a validated coordinate from anything that coerces to degrees.
    pub fn from_values(
        latitude: impl CoordinateValue,
        longitude: impl CoordinateValue,
    ) -> Result<Self, CoordinateError> {
        let coordinate = Self::new(
            latitude.degrees("latitude")?,
            longitude.degrees("longitude")?,
        );
        coordinate.validate()?;
        Ok(coordinate)
    }

    /// Checks that both axes lie inside their geographic ranges.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        check_range("latitude", self.latitude, LATITUDE_RANGE)?;
        check_range("longitude", self.longitude, LONGITUDE_RANGE)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

fn check_range(
    axis: &'static str,
    value: f64,
    (min, max): (f64, f64),
) -> Result<(), CoordinateError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(CoordinateError::OutOfRange {
            axis,
            value,
            min,
            max,
        })
    }
}

/// A value that can be coerced to a number of degrees.
///
/// Implemented for numbers and for the textual forms the place-search
/// provider and query strings use.
pub trait CoordinateValue {
    /// Returns the value in degrees, or why it is not a number.
    fn degrees(&self, axis: &'static str) -> Result<f64, CoordinateError>;
}

impl CoordinateValue for f64 {
    fn degrees(&self, _axis: &'static str) -> Result<f64, CoordinateError> {
        Ok(*self)
    }
}

impl CoordinateValue for f32 {
    fn degrees(&self, _axis: &'static str) -> Result<f64, CoordinateError> {
        Ok(f64::from(*self))
    }
}

impl CoordinateValue for str {
    fn degrees(&self, axis: &'static str) -> Result<f64, CoordinateError> {
        let text = self.trim();
        if text.is_empty() {
            return Err(CoordinateError::Missing { axis });
        }
        text.parse::<f64>().map_err(|_| CoordinateError::NotNumeric {
            axis,
            value: text.to_string(),
        })
    }
}

impl CoordinateValue for String {
    fn degrees(&self, axis: &'static str) -> Result<f64, CoordinateError> {
        self.as_str().degrees(axis)
    }
}

impl<T: CoordinateValue + ?Sized> CoordinateValue for &T {
    fn degrees(&self, axis: &'static str) -> Result<f64, CoordinateError> {
        (**self).degrees(axis)
    }
}

impl<T: CoordinateValue> CoordinateValue for Option<T> {
    fn degrees(&self, axis: &'static str) -> Result<f64, CoordinateError> {
        match self {
            Some(value) => value.degrees(axis),
            None => Err(CoordinateError::Missing { axis }),
        }
    }
}

/// Rectangle the place search is bounded to, in the provider's
/// `left,top,right,bottom` viewbox order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude
    pub left: f64,
    /// Northern latitude
    pub top: f64,
    /// Eastern longitude
    pub right: f64,
    /// Southern latitude
    pub bottom: f64,
}

impl BoundingBox {
    /// Checks that the edges are valid degrees and enclose a non-empty area.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::InvalidValue {
            field: "viewbox".to_string(),
            reason,
        };

        for (axis, value, range) in [
            ("longitude", self.left, LONGITUDE_RANGE),
            ("latitude", self.top, LATITUDE_RANGE),
            ("longitude", self.right, LONGITUDE_RANGE),
            ("latitude", self.bottom, LATITUDE_RANGE),
        ] {
            check_range(axis, value, range).map_err(|e| invalid(e.to_string()))?;
        }

        if self.left == self.right || self.top == self.bottom {
            return Err(invalid(format!("'{self}' encloses no area")));
        }
        Ok(())
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
    }
}

impl FromStr for BoundingBox {
    type Err = ConfigError;

    /// Parses `left,top,right,bottom`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let [left, top, right, bottom] = parts.as_slice() else {
            return Err(ConfigError::InvalidValue {
                field: "viewbox".to_string(),
                reason: format!("expected 'left,top,right,bottom', got '{s}'"),
            });
        };

        let parse = |text: &str| {
            text.parse::<f64>().map_err(|_| ConfigError::InvalidValue {
                field: "viewbox".to_string(),
                reason: format!("'{text}' is not a number"),
            })
        };

        let bbox = Self {
            left: parse(left)?,
            top: parse(top)?,
            right: parse(right)?,
            bottom: parse(bottom)?,
        };
        bbox.validate()?;
        Ok(bbox)
    }
}

/// Picks the origin of a hospital lookup.
///
/// Total by construction: whenever the request does not carry a usable
/// latitude/longitude pair, the configured default is used instead. Values
/// that parse are returned unchanged, without range checks.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateResolver {
    default: Coordinate,
}

impl CoordinateResolver {
    /// Creates a resolver falling back to `default`.
    pub fn new(default: Coordinate) -> Self {
        Self { default }
    }

    /// The fallback coordinate.
    pub fn default_coordinate(&self) -> Coordinate {
        self.default
    }

    /// Resolves optional query values into the coordinate to search from.
    pub fn resolve(&self, latitude: Option<&str>, longitude: Option<&str>) -> Coordinate {
        let (Some(lat), Some(lng)) = (non_empty(latitude), non_empty(longitude)) else {
            return self.default;
        };

        match (lat.degrees("latitude"), lng.degrees("longitude")) {
            (Ok(latitude), Ok(longitude)) if latitude.is_finite() && longitude.is_finite() => {
                Coordinate::new(latitude, longitude)
            }
            (lat_result, lng_result) => {
                let reason = lat_result
                    .err()
                    .or(lng_result.err())
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "value is not finite".to_string());
                warn!(
                    lat,
                    lng,
                    %reason,
                    default = %self.default,
                    "Unusable coordinate in request, using default origin"
                );
                self.default
            }
        }
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEFAULT: Coordinate = Coordinate::new(16.3067, 80.4365);

    #[test]
    fn test_resolver_defaults_when_absent() {
        let resolver = CoordinateResolver::new(DEFAULT);
        assert_eq!(resolver.resolve(None, None), DEFAULT);
        assert_eq!(resolver.resolve(Some("17.0"), None), DEFAULT);
        assert_eq!(resolver.resolve(None, Some("80.0")), DEFAULT);
        assert_eq!(resolver.resolve(Some(""), Some("80.0")), DEFAULT);
    }

    #[test]
    fn test_resolver_parses_values_unchanged() {
        let resolver = CoordinateResolver::new(DEFAULT);
        assert_eq!(
            resolver.resolve(Some("16.5062"), Some("80.6480")),
            Coordinate::new(16.5062, 80.6480)
        );
        assert_eq!(
            resolver.resolve(Some(" -33.8688 "), Some("151.2093")),
            Coordinate::new(-33.8688, 151.2093)
        );
    }

    #[test]
    fn test_resolver_does_not_range_check() {
        let resolver = CoordinateResolver::new(DEFAULT);
        assert_eq!(
            resolver.resolve(Some("123.0"), Some("80.0")),
            Coordinate::new(123.0, 80.0)
        );
    }

    #[test]
    fn test_resolver_falls_back_on_garbage() {
        let resolver = CoordinateResolver::new(DEFAULT);
        assert_eq!(resolver.resolve(Some("north"), Some("80.0")), DEFAULT);
        assert_eq!(resolver.resolve(Some("NaN"), Some("80.0")), DEFAULT);
    }

    #[test]
    fn test_from_values() {
        assert_eq!(
            Coordinate::from_values("16.3", 80.4).unwrap(),
            Coordinate::new(16.3, 80.4)
        );
        assert!(matches!(
            Coordinate::from_values("abc", 80.4),
            Err(CoordinateError::NotNumeric { .. })
        ));
        assert!(matches!(
            Coordinate::from_values(None::<&str>, 80.4),
            Err(CoordinateError::Missing { axis: "latitude" })
        ));
        assert!(matches!(
            Coordinate::from_values(10.0, 181.0),
            Err(CoordinateError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_bounding_box_round_trip() {
        let bbox: BoundingBox = "80.20,16.50,80.70,16.10".parse().unwrap();
        assert_eq!(bbox.left, 80.20);
        assert_eq!(bbox.bottom, 16.10);
        assert_eq!(bbox.to_string(), "80.2,16.5,80.7,16.1");
        assert_eq!(bbox.to_string().parse::<BoundingBox>().unwrap(), bbox);
    }

    #[test]
    fn test_bounding_box_rejects_bad_input() {
        assert!("80.2,16.5,80.7".parse::<BoundingBox>().is_err());
        assert!("80.2,north,80.7,16.1".parse::<BoundingBox>().is_err());
        assert!("80.2,95.0,80.7,16.1".parse::<BoundingBox>().is_err());
        assert!("80.2,16.5,80.2,16.1".parse::<BoundingBox>().is_err());
    }
}
