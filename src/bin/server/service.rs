//! Classification and hospital lookup logic shared between CLI and server modes.

use axum::http::StatusCode;
use dermascan::core::config::{ClassifierConfig, HospitalSearchConfig};
use dermascan::core::DermaError;
use dermascan::domain::ClassificationResult;
use dermascan::geo::{HospitalCandidate, HospitalLookup, HospitalRankingService, PlaceSearch};
use dermascan::predictors::LesionClassificationPredictor;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;

/// Rendered in place of a missing street address.
pub const ADDRESS_PLACEHOLDER: &str = "Not Provided";

#[derive(Error, Debug)]
pub enum ServeError {
    #[error("Invalid upload: {0}")]
    BadRequest(String),

    #[error("Upload too large: {0}")]
    TooLarge(String),

    #[error("Classification failed: {0}")]
    Classification(DermaError),

    #[error("{0}")]
    Lookup(DermaError),

    #[error("Failed to store upload: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServeError {
    /// HTTP status reported for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Classification(e) if e.is_user_error() => StatusCode::BAD_REQUEST,
            Self::Classification(_) | Self::Storage(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Lookup(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Response from lesion classification
#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<usize>,
    pub prediction: String,
    /// Confidence of the predicted class in percent, two decimals
    pub confidence: f64,
    pub severity: String,
    pub precautions: Vec<String>,
    pub food_precautions: Vec<String>,
    pub consultation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub processing_time_ms: Option<f64>,
}

impl ClassifyResponse {
    pub fn error(message: String) -> Self {
        Self {
            success: false,
            class_id: None,
            prediction: String::new(),
            confidence: 0.0,
            severity: String::new(),
            precautions: Vec::new(),
            food_precautions: Vec::new(),
            consultation: String::new(),
            image_file: None,
            error: Some(message),
            processing_time_ms: None,
        }
    }

    /// Convert a classification result to an API response
    pub fn from_result(
        result: &ClassificationResult,
        image_file: Option<String>,
        processing_time_ms: f64,
    ) -> Self {
        let advisory = result.advisory;
        Self {
            success: true,
            class_id: Some(result.class.id()),
            prediction: result.label().to_string(),
            confidence: result.confidence_percent(),
            severity: advisory.severity.to_string(),
            precautions: advisory.precautions.iter().map(|p| p.to_string()).collect(),
            food_precautions: advisory
                .food_precautions
                .iter()
                .map(|p| p.to_string())
                .collect(),
            consultation: advisory.consultation.to_string(),
            image_file,
            error: None,
            processing_time_ms: Some(processing_time_ms),
        }
    }
}

/// Query parameters accepted by the hospital lookup
#[derive(Debug, Default, PartialEq)]
pub struct HospitalQuery {
    pub lat: Option<String>,
    pub lng: Option<String>,
}

impl HospitalQuery {
    /// Picks `lat` and `lng` out of raw query pairs. The first value of a
    /// repeated key wins and unknown keys are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (key, value) in pairs {
            let slot = match key.as_str() {
                "lat" => &mut query.lat,
                "lng" => &mut query.lng,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// A single hospital in a lookup response
#[derive(Debug, Serialize)]
pub struct HospitalResponse {
    pub name: String,
    pub address: String,
    pub lat: Option<String>,
    pub lng: Option<String>,
    pub distance: Option<f64>,
}

impl From<HospitalCandidate> for HospitalResponse {
    fn from(candidate: HospitalCandidate) -> Self {
        Self {
            name: candidate.name,
            address: candidate
                .address
                .unwrap_or_else(|| ADDRESS_PLACEHOLDER.to_string()),
            lat: candidate.lat,
            lng: candidate.lng,
            distance: candidate.distance,
        }
    }
}

/// Response from a hospital lookup
#[derive(Debug, Serialize)]
pub struct HospitalsResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latitude_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longitude_used: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospitals: Option<Vec<HospitalResponse>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl HospitalsResponse {
    pub fn error(message: String) -> Self {
        Self {
            status: "error",
            latitude_used: None,
            longitude_used: None,
            hospitals: None,
            message: Some(message),
        }
    }
}

impl From<HospitalLookup> for HospitalsResponse {
    fn from(lookup: HospitalLookup) -> Self {
        Self {
            status: "ok",
            latitude_used: Some(lookup.origin.latitude),
            longitude_used: Some(lookup.origin.longitude),
            hospitals: Some(lookup.hospitals.into_iter().map(Into::into).collect()),
            message: None,
        }
    }
}

/// Classifier shared by all handlers.
pub type SharedPredictor = Arc<LesionClassificationPredictor>;

/// Builds the classifier. The model itself is loaded on first use.
pub fn build_predictor(config: &ClassifierConfig) -> Result<SharedPredictor, ServeError> {
    LesionClassificationPredictor::from_config(config)
        .map(Arc::new)
        .map_err(|e| ServeError::Config(e.to_string()))
}

/// Runs a hospital lookup and shapes the result for output.
pub async fn lookup_hospitals<S: PlaceSearch>(
    service: &HospitalRankingService<S>,
    query: &HospitalQuery,
) -> Result<HospitalsResponse, ServeError> {
    service
        .lookup(query.lat.as_deref(), query.lng.as_deref())
        .await
        .map(HospitalsResponse::from)
        .map_err(ServeError::Lookup)
}

/// Provider search settings echoed in startup logs.
pub fn describe_search(config: &HospitalSearchConfig) -> String {
    format!(
        "{} (viewbox {}, limit {}, order {:?})",
        config.provider_url, config.viewbox, config.result_limit, config.order
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use dermascan::domain::{DiagnosticClass, ProbabilityDistribution};
    use dermascan::geo::Coordinate;

    #[test]
    fn test_status_mapping() {
        let bad = ServeError::Classification(DermaError::decode("truncated"));
        assert_eq!(bad.status(), StatusCode::BAD_REQUEST);

        let model = ServeError::Classification(DermaError::model_unavailable(
            "m.onnx",
            "file not found",
            None,
        ));
        assert_eq!(model.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let provider = ServeError::Lookup(DermaError::ProviderUnavailable {
            message: "request timed out".to_string(),
            source: None,
        });
        assert_eq!(provider.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            provider.to_string(),
            "place-search provider unavailable: request timed out"
        );
    }

    #[test]
    fn test_classify_response_from_result() {
        let scores = [0.01, 0.02, 0.03, 0.04, 0.8567, 0.02, 0.0233];
        let result = ClassificationResult::from_distribution(
            ProbabilityDistribution::from_scores("m", &scores).unwrap(),
        );
        let response = ClassifyResponse::from_result(&result, Some("mole.png".to_string()), 12.5);
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["success"], true);
        assert_eq!(json["class_id"], DiagnosticClass::Melanoma.id());
        assert_eq!(json["prediction"], "Melanoma");
        assert_eq!(json["confidence"], 85.67);
        assert_eq!(json["severity"], "Very High (dangerous)");
        assert_eq!(json["precautions"].as_array().unwrap().len(), 3);
        assert_eq!(json["food_precautions"].as_array().unwrap().len(), 5);
        assert_eq!(json["image_file"], "mole.png");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn test_query_from_pairs_keeps_first_value() {
        let pairs = [("lat", "16.5"), ("q", "x"), ("lat", "99"), ("lng", "80.6")]
            .map(|(k, v)| (k.to_string(), v.to_string()));
        assert_eq!(
            HospitalQuery::from_pairs(pairs),
            HospitalQuery {
                lat: Some("16.5".to_string()),
                lng: Some("80.6".to_string()),
            }
        );
        assert_eq!(HospitalQuery::from_pairs(Vec::new()), HospitalQuery::default());
    }

    #[test]
    fn test_hospitals_response_shape() {
        let lookup = HospitalLookup {
            origin: Coordinate::new(16.3067, 80.4365),
            hospitals: vec![HospitalCandidate {
                name: "Govt Hospital".to_string(),
                address: None,
                lat: Some("abc".to_string()),
                lng: Some("80.44".to_string()),
                distance: None,
            }],
        };
        let json = serde_json::to_value(HospitalsResponse::from(lookup)).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["latitude_used"], 16.3067);
        assert_eq!(json["hospitals"][0]["address"], ADDRESS_PLACEHOLDER);
        assert!(json["hospitals"][0]["distance"].is_null());
        assert!(json.get("message").is_none());

        let json =
            serde_json::to_value(HospitalsResponse::error("provider down".to_string())).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["message"], "provider down");
        assert!(json.get("hospitals").is_none());
    }
}
