//! Nearby search and service detail endpoints
//!
//! - `GET /api/v1/services/nearby?lat=&lon=&radius=&categories=&limit=`
//! - `GET /api/v1/services/{category}/{id}`

use crate::client::SeoulServicesClient;
use crate::error::{ApiError, ApiResult};
use seoul_services_catalog::{parse_record, parse_records, Category, CategorySet, LocatedEntity, ParsedRecords};
use seoul_services_core::supersede::RequestTracker;
use seoul_services_geo::Coordinate;
use seoul_services_telemetry::{metrics, names, Timer};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info};

/// Default search radius in meters
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// Services API interface
#[derive(Clone)]
pub struct ServicesApi {
    client: SeoulServicesClient,
}

impl ServicesApi {
    /// Create a new services API interface
    pub(crate) fn new(client: SeoulServicesClient) -> Self {
        Self { client }
    }

    /// Services within a radius of a reference point.
    ///
    /// Records that cannot be placed on the map are dropped and counted; the
    /// rest of the response is returned. An empty category set returns an
    /// empty result without contacting the backend.
    pub async fn nearby(&self, query: &NearbyQuery) -> ApiResult<ParsedRecords> {
        query.validate()?;

        if query.categories.is_empty() {
            debug!("No categories selected, skipping nearby request");
            return Ok(ParsedRecords::default());
        }

        let timer = Timer::start(names::FETCH_NEARBY_MS);
        let response: NearbyResponse = self.client.get("services/nearby", &query.to_params()).await?;
        timer.stop();

        let parsed = response.into_records()?;
        metrics().increment_by(names::RECORDS_PARSED, parsed.entities.len() as u64);
        metrics().increment_by(names::RECORDS_DROPPED, parsed.dropped.len() as u64);

        info!(
            kept = parsed.entities.len(),
            dropped = parsed.dropped.len(),
            radius_m = query.radius_m,
            "Fetched nearby services"
        );
        Ok(parsed)
    }

    /// [`ServicesApi::nearby`] gated by `tracker`: returns `Ok(None)` when a
    /// newer request was started on the same tracker before this one
    /// finished, whatever its outcome.
    pub async fn nearby_latest(
        &self,
        tracker: &RequestTracker,
        query: &NearbyQuery,
    ) -> ApiResult<Option<ParsedRecords>> {
        let ticket = tracker.begin();
        let result = self.nearby(query).await;

        if !tracker.is_current(&ticket) {
            metrics().increment(names::RESPONSES_SUPERSEDED);
            debug!(sequence = ticket.sequence(), "Discarding superseded nearby response");
            return Ok(None);
        }
        result.map(Some)
    }

    /// One service by category and id
    pub async fn detail(&self, category: Category, id: &str) -> ApiResult<LocatedEntity> {
        let id = id.trim();
        if id.is_empty() {
            return Err(ApiError::InvalidInput("service id cannot be empty".into()));
        }

        let path = format!("services/{}/{}", category.as_str(), id);
        let response: DetailResponse = self
            .client
            .get(&path, &[])
            .await
            .map_err(|e| match e {
                ApiError::ApiResponse { status: 404, .. } => ApiError::NotFound(format!("{category} {id}")),
                e => e,
            })?;

        response.into_entity(category, id)
    }
}

/// Parameters of a nearby search
#[derive(Debug, Clone, PartialEq)]
pub struct NearbyQuery {
    /// Center of the search
    pub reference: Coordinate,
    /// Radius in meters
    pub radius_m: u32,
    /// Categories to include
    pub categories: CategorySet,
    /// Maximum number of records
    pub limit: Option<u32>,
}

impl NearbyQuery {
    /// All categories within the default radius
    pub fn new(reference: Coordinate) -> Self {
        Self {
            reference,
            radius_m: DEFAULT_RADIUS_M,
            categories: CategorySet::all(),
            limit: None,
        }
    }

    #[must_use]
    pub fn with_radius(mut self, radius_m: u32) -> Self {
        self.radius_m = radius_m;
        self
    }

    #[must_use]
    pub fn with_categories(mut self, categories: CategorySet) -> Self {
        self.categories = categories;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    fn validate(&self) -> ApiResult<()> {
        if !self.reference.is_valid() {
            return Err(ApiError::InvalidInput(format!(
                "reference point ({}, {}) is not a valid coordinate",
                self.reference.latitude, self.reference.longitude
            )));
        }
        if self.radius_m == 0 {
            return Err(ApiError::InvalidInput("radius must be greater than 0".into()));
        }
        Ok(())
    }

    /// Query string pairs. `categories` is left out when every category is
    /// selected.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("lat", self.reference.latitude.to_string()),
            ("lon", self.reference.longitude.to_string()),
            ("radius", self.radius_m.to_string()),
        ];
        if !self.categories.is_all() {
            let categories: Vec<&str> = self.categories.iter().map(Category::as_str).collect();
            params.push(("categories", categories.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        params
    }
}

/// Body of a nearby response. Older backends name the array `services`.
#[derive(Debug, Deserialize)]
struct NearbyResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default, alias = "services")]
    locations: Option<Vec<Value>>,
    #[serde(default)]
    message: Option<String>,
}

impl NearbyResponse {
    fn into_records(self) -> ApiResult<ParsedRecords> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message.unwrap_or_else(|| "nearby search failed".into()),
            ));
        }
        Ok(parse_records(&self.locations.unwrap_or_default()))
    }
}

/// Body of a detail response
#[derive(Debug, Deserialize)]
struct DetailResponse {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    message: Option<String>,
}

impl DetailResponse {
    fn into_entity(self, category: Category, id: &str) -> ApiResult<LocatedEntity> {
        let data = match (self.success, self.data) {
            (true, Some(data)) if !data.is_null() => data,
            _ => {
                return Err(ApiError::NotFound(
                    self.message.unwrap_or_else(|| format!("{category} {id}")),
                ))
            }
        };

        // The category segment of the URL is authoritative when the record
        // does not name its own source table.
        let data = match data {
            Value::Object(mut object) => {
                let has_source = ["_table", "data_source", "category"].iter().any(|k| object.contains_key(*k));
                if !has_source {
                    object.insert("category".into(), Value::String(category.as_str().into()));
                }
                Value::Object(object)
            }
            other => other,
        };

        parse_record(&data).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

fn default_success() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_query_params() {
        let query = NearbyQuery::new(Coordinate::new(37.5665, 126.978))
            .with_radius(1500)
            .with_limit(100);
        let params = query.to_params();

        assert_eq!(params[0], ("lat", "37.5665".to_string()));
        assert_eq!(params[2], ("radius", "1500".to_string()));
        assert!(!params.iter().any(|(k, _)| *k == "categories"));
        assert_eq!(params.last(), Some(&("limit", "100".to_string())));

        let libraries: CategorySet = [Category::Library, Category::FutureHeritage].into_iter().collect();
        let params = query.with_categories(libraries).to_params();
        assert!(params.contains(&("categories", "libraries,future_heritage".to_string())));
    }

    #[test]
    fn test_query_validation() {
        assert!(NearbyQuery::new(Coordinate::new(95.0, 126.978)).validate().is_err());
        assert!(NearbyQuery::new(Coordinate::new(37.5, 127.0)).with_radius(0).validate().is_err());
    }

    #[test]
    fn test_nearby_response_keeps_good_records() {
        let response: NearbyResponse = serde_json::from_value(json!({
            "success": true,
            "locations": [
                {"id": "lib-1", "_table": "libraries", "lbrry_name": "서울도서관", "lat": "37.5663", "lon": 126.9779},
                {"id": "bad", "_table": "libraries", "name": "좌표 없음"},
                {"api_id": "evt-7", "data_source": "culturalEventInfo", "title": "가을음악회", "lat": 37.57, "lot": 126.98}
            ]
        }))
        .unwrap();

        let parsed = response.into_records().unwrap();
        assert_eq!(parsed.entities.len(), 2);
        assert_eq!(parsed.dropped.len(), 1);
        assert_eq!(parsed.dropped[0].index, 1);
        assert_eq!(parsed.entities[1].category(), Category::CulturalEvent);
    }

    #[test]
    fn test_nearby_response_services_alias_and_failure() {
        let response: NearbyResponse = serde_json::from_value(json!({"services": []})).unwrap();
        assert!(response.into_records().unwrap().entities.is_empty());

        let response: NearbyResponse =
            serde_json::from_value(json!({"success": false, "message": "DB offline"})).unwrap();
        assert!(matches!(response.into_records(), Err(ApiError::Rejected(m)) if m == "DB offline"));
    }

    #[test]
    fn test_detail_response() {
        let response: DetailResponse = serde_json::from_value(json!({
            "success": true,
            "data": {"id": "sp-3", "fac_name": "세종문화회관", "latitude": 37.5725, "longitude": 126.9760}
        }))
        .unwrap();

        let entity = response.into_entity(Category::CulturalSpace, "sp-3").unwrap();
        assert_eq!(entity.category(), Category::CulturalSpace);
        assert_eq!(entity.name, "세종문화회관");

        let missing: DetailResponse = serde_json::from_value(json!({"success": false})).unwrap();
        assert!(matches!(missing.into_entity(Category::Library, "x"), Err(ApiError::NotFound(_))));
    }

    fn offline_client() -> SeoulServicesClient {
        let config = crate::ClientConfig::development()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(std::time::Duration::from_secs(2))
            .with_retry(seoul_services_core::retry::RetryConfig::no_retry());
        SeoulServicesClient::with_config(config).unwrap()
    }

    #[tokio::test]
    async fn test_empty_categories_skip_request() {
        let api = offline_client().services();
        let query = NearbyQuery::new(Coordinate::new(37.5665, 126.978)).with_categories(CategorySet::none());

        let parsed = api.nearby(&query).await.unwrap();
        assert!(parsed.entities.is_empty());
        assert!(parsed.dropped.is_empty());
    }

    #[tokio::test]
    async fn test_superseded_response_is_discarded() {
        let api = offline_client().services();
        let tracker = RequestTracker::new();
        let reference = Coordinate::new(37.5665, 126.978);
        let slow = NearbyQuery::new(reference);
        let instant = NearbyQuery::new(reference).with_categories(CategorySet::none());

        let (first, second) = tokio::join!(
            api.nearby_latest(&tracker, &slow),
            api.nearby_latest(&tracker, &instant)
        );

        // The first request failed, but it was superseded, so the failure is dropped too
        assert!(matches!(first, Ok(None)));
        assert!(matches!(second, Ok(Some(_))));
    }
}
