//! Geocoding endpoints
//!
//! - `POST /api/v1/geocode {address}`
//! - `POST /api/v1/geocode/reverse {latitude, longitude}`
//!
//! Both collapse failures into two outcomes: nothing found
//! ([`ApiError::NotFound`]) or the service being unreachable
//! ([`ApiError::ServiceUnavailable`]).

use crate::client::SeoulServicesClient;
use crate::error::{ApiError, ApiResult};
use seoul_services_geo::Coordinate;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

const SERVICE: &str = "Geocoding service";

/// Geocoding API interface
#[derive(Clone)]
pub struct GeocodingApi {
    client: SeoulServicesClient,
}

impl GeocodingApi {
    /// Create a new geocoding API interface
    pub(crate) fn new(client: SeoulServicesClient) -> Self {
        Self { client }
    }

    /// Resolve a free-text address to a coordinate
    pub async fn geocode(&self, address: &str) -> ApiResult<GeocodeResult> {
        let address = address.trim();
        if address.is_empty() {
            return Err(ApiError::InvalidInput("address cannot be empty".into()));
        }

        let response: GeocodeResponse = self
            .client
            .post("geocode", &GeocodeRequest { address })
            .await
            .map_err(|e| e.for_service(SERVICE, || address.to_string()))?;

        let result = response.into_result(address)?;
        debug!(address, lat = result.coordinate.latitude, lon = result.coordinate.longitude, "Geocoded address");
        Ok(result)
    }

    /// Resolve a coordinate to an address
    pub async fn reverse(&self, coordinate: Coordinate) -> ApiResult<ReverseGeocodeResult> {
        if !coordinate.is_valid() {
            return Err(ApiError::InvalidInput(format!(
                "({}, {}) is not a valid coordinate",
                coordinate.latitude, coordinate.longitude
            )));
        }

        let body: Value = self
            .client
            .post("geocode/reverse", &coordinate)
            .await
            .map_err(|e| e.for_service(SERVICE, || describe(coordinate)))?;

        parse_reverse(body, coordinate)
    }
}

#[derive(Debug, Serialize)]
struct GeocodeRequest<'a> {
    address: &'a str,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    address: Option<String>,
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    sido: Option<String>,
    #[serde(default)]
    sigungu: Option<String>,
    #[serde(default)]
    dong: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// A geocoded address
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub coordinate: Coordinate,
    /// Normalized address as returned by the geocoder
    pub address: String,
    /// Which provider answered
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sido: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sigungu: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dong: Option<String>,
}

impl GeocodeResponse {
    fn into_result(self, query: &str) -> ApiResult<GeocodeResult> {
        if !self.success {
            return Err(ApiError::NotFound(self.message.unwrap_or_else(|| query.to_string())));
        }

        let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) else {
            return Err(ApiError::NotFound(query.to_string()));
        };
        let coordinate = Coordinate::new(latitude, longitude);
        if !coordinate.is_valid() {
            return Err(ApiError::InvalidResponse(format!(
                "geocoder returned ({latitude}, {longitude}) for '{query}'"
            )));
        }

        Ok(GeocodeResult {
            coordinate,
            address: self.address.filter(|a| !a.trim().is_empty()).unwrap_or_else(|| query.to_string()),
            source: self.source,
            sido: self.sido,
            sigungu: self.sigungu,
            dong: self.dong,
        })
    }
}

/// An address for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseGeocodeResult {
    /// Preferred display address
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub road_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jibun_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sigungu: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dong: Option<String>,
}

/// Accepts both the flat body and the `{success, data: {...}}` envelope.
fn parse_reverse(body: Value, coordinate: Coordinate) -> ApiResult<ReverseGeocodeResult> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .map_or_else(|| describe(coordinate), String::from);
        return Err(ApiError::NotFound(message));
    }

    let mut inner = match body {
        Value::Object(mut object) => match object.remove("data") {
            Some(data @ Value::Object(_)) => data,
            _ => Value::Object(object),
        },
        other => return Err(ApiError::InvalidResponse(format!("expected an object, got {other}"))),
    };

    // Fill `address` from the road or lot-number form when only those came back
    if let Value::Object(object) = &mut inner {
        let missing = object.get("address").and_then(Value::as_str).is_none_or(|a| a.trim().is_empty());
        if missing {
            let fallback = ["road_address", "jibun_address"]
                .iter()
                .find_map(|k| object.get(*k).and_then(Value::as_str).filter(|a| !a.trim().is_empty()))
                .map(String::from);
            match fallback {
                Some(address) => {
                    object.insert("address".into(), Value::String(address));
                }
                None => return Err(ApiError::NotFound(describe(coordinate))),
            }
        }
    }

    serde_json::from_value(inner).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

fn describe(coordinate: Coordinate) -> String {
    format!("({}, {})", coordinate.latitude, coordinate.longitude)
}

fn default_success() -> bool {
    true
}
