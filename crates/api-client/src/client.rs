//! The shared HTTP client behind every endpoint

use crate::config::ClientConfig;
use crate::endpoints::{GeocodingApi, ServicesApi};
use crate::error::{ApiError, ApiResult};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Method, Response};
use seoul_services_core::retry::{CircuitBreaker, CircuitState};
use seoul_services_telemetry::{metrics, names};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, instrument, warn, Span};
use uuid::Uuid;

const X_REQUEST_ID: &str = "X-Request-ID";

const CLIENT_AGENT: &str = concat!("seoul-services/", env!("CARGO_PKG_VERSION"));

/// Query string pairs
pub type Query = [(&'static str, String)];

/// Client for the Seoul services backend.
///
/// Cheap to clone; clones share the connection pool, the configuration and
/// the circuit breaker, so one failing backend trips every endpoint handle.
#[derive(Clone)]
pub struct SeoulServicesClient {
    http: Client,
    config: Arc<ClientConfig>,
    breaker: Arc<CircuitBreaker>,
}

impl SeoulServicesClient {
    /// Client configured from `SEOUL_SERVICES_*` variables.
    pub fn new() -> ApiResult<Self> {
        Self::with_config(ClientConfig::from_env()?)
    }

    pub fn with_config(config: ClientConfig) -> ApiResult<Self> {
        config.validate()?;

        let headers = HeaderMap::from_iter([
            (CONTENT_TYPE, HeaderValue::from_static("application/json")),
            (USER_AGENT, HeaderValue::from_static(CLIENT_AGENT)),
        ]);
        let http = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self {
            http,
            breaker: Arc::new(CircuitBreaker::new(config.circuit_breaker.clone())),
            config: Arc::new(config),
        })
    }

    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub fn circuit_state(&self) -> CircuitState {
        self.breaker.state()
    }

    pub fn reset_circuit(&self) {
        self.breaker.reset();
    }

    /// Nearby search and service detail
    #[must_use]
    pub fn services(&self) -> ServicesApi {
        ServicesApi::new(self.clone())
    }

    /// Address and coordinate lookups
    #[must_use]
    pub fn geocoding(&self) -> GeocodingApi {
        GeocodingApi::new(self.clone())
    }

    /// GET `{base}/api/v1/{path}`
    #[instrument(skip(self, query), fields(request_id))]
    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: &Query) -> ApiResult<T> {
        let url = self.config.endpoint_url(path);
        self.send(Method::GET, &url, query, Option::<&()>::None).await
    }

    /// POST a JSON body to `{base}/api/v1/{path}`
    #[instrument(skip(self, body), fields(request_id))]
    pub async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> ApiResult<T> {
        let url = self.config.endpoint_url(path);
        self.send(Method::POST, &url, &[], Some(body)).await
    }

    /// Runs one logical request through the circuit breaker and the retry
    /// schedule. Every attempt carries the same `X-Request-ID`.
    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        query: &Query,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let request_id = Uuid::new_v4().to_string();
        Span::current().record("request_id", request_id.as_str());

        if !self.breaker.can_execute() {
            warn!(url, "Circuit open, request not sent");
            metrics().increment(names::UPSTREAM_FAILURES);
            return Err(ApiError::CircuitOpen);
        }

        let schedule = self.config.retry.attempts();
        let total = schedule.len() as u32;
        let mut last_error = None;

        for attempt in schedule {
            if !attempt.delay.is_zero() {
                debug!(attempt = attempt.number, delay_ms = attempt.delay.as_millis() as u64, "Backing off");
                tokio::time::sleep(attempt.delay).await;
            }

            let started = Instant::now();
            match self.attempt(&request_id, method.clone(), url, query, body).await {
                Ok(value) => {
                    self.breaker.record_success();
                    debug!(
                        attempt = attempt.number,
                        elapsed_ms = started.elapsed().as_millis() as u64,
                        "Request succeeded"
                    );
                    return Ok(value);
                }
                Err(e) if e.is_retryable() => {
                    self.breaker.record_failure();
                    debug!(attempt = attempt.number, error = %e, "Attempt failed");
                    last_error = Some(e);
                }
                Err(e) => {
                    // The server answered; a 4xx says nothing about its health
                    if e.is_server_error() {
                        self.breaker.record_failure();
                    } else {
                        self.breaker.record_success();
                    }
                    if !matches!(e, ApiError::ApiResponse { status: 404, .. }) {
                        metrics().increment(names::UPSTREAM_FAILURES);
                    }
                    debug!(attempt = attempt.number, error = %e, "Attempt failed, not retryable");
                    return Err(e);
                }
            }
        }

        metrics().increment(names::UPSTREAM_FAILURES);
        let last_error = last_error.map_or_else(|| "no attempt was made".to_string(), |e| e.to_string());
        warn!(url, attempts = total, error = %last_error, "Giving up on request");
        Err(ApiError::RetriesExhausted {
            attempts: total,
            last_error,
        })
    }

    async fn attempt<T: DeserializeOwned, B: Serialize>(
        &self,
        request_id: &str,
        method: Method,
        url: &str,
        query: &Query,
        body: Option<&B>,
    ) -> ApiResult<T> {
        let mut request = self.http.request(method, url).header(X_REQUEST_ID, request_id);
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        read_response(response).await
    }
}

/// Decodes a 2xx body, or turns anything else into [`ApiError::ApiResponse`].
async fn read_response<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    let status = response.status();
    if status.is_success() {
        return response.json().await.map_err(ApiError::Request);
    }

    let body = response.text().await.unwrap_or_default();
    let message = if body.trim().is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        error_message(&body)
    };
    Err(ApiError::api_response(status.as_u16(), message))
}

/// The `message` of a JSON error body, or the raw text
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_else(|| body.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use seoul_services_core::retry::RetryConfig;
    use std::time::Duration;

    #[test]
    fn test_client_creation() {
        let client = SeoulServicesClient::with_config(ClientConfig::development());
        assert!(client.is_ok());
        assert_eq!(client.unwrap().circuit_state(), CircuitState::Closed);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = ClientConfig::development().with_base_url("not a url");
        assert!(matches!(SeoulServicesClient::with_config(config), Err(ApiError::Config(_))));
    }

    #[test]
    fn test_error_message_extraction() {
        assert_eq!(
            error_message(r#"{"success":false,"message":"주소를 찾을 수 없습니다"}"#),
            "주소를 찾을 수 없습니다"
        );
        assert_eq!(error_message("Bad Gateway\n"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_backend_exhausts_retries() {
        // Port 9 (discard) on localhost is not expected to accept HTTP
        let config = ClientConfig::development()
            .with_base_url("http://127.0.0.1:9")
            .with_timeout(Duration::from_secs(2))
            .with_retry(RetryConfig {
                max_attempts: 2,
                initial_delay: Duration::from_millis(1),
                jitter: false,
                ..RetryConfig::default()
            });
        let client = SeoulServicesClient::with_config(config).unwrap();

        let result: ApiResult<serde_json::Value> = client.get("services/nearby", &[]).await;
        assert!(matches!(result, Err(ApiError::RetriesExhausted { attempts: 2, .. })));
    }
}
