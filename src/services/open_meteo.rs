//! Open-Meteo hourly forecast client.
//!
//! See: https://open-meteo.com/en/docs

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::Deserialize;
use std::time::Duration;

use crate::errors::AppError;
use crate::helpers::round_dp;
use crate::models::{Coordinates, WeatherObservation};
use crate::services::weather_source::WeatherSource;

pub const DEFAULT_API_URL: &str = "https://api.open-meteo.com/v1/forecast";

const HOURLY_VARIABLES: &str =
    "temperature_2m,precipitation_probability,precipitation,sunshine_duration,cloud_cover";

/// `hourly.time` entries look like `2026-06-01T13:00`.
const LOCAL_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client for the Open-Meteo forecast API.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
    retry_backoff: Duration,
}

/// Why a single request attempt failed.
#[derive(Debug)]
enum FetchFailure {
    /// Transport error, 5xx or 429. Worth another attempt.
    Retryable(String),
    /// Anything else. Retrying will not help.
    Fatal(String),
}

// --- Open-Meteo JSON response types ---

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    utc_offset_seconds: i32,
    hourly: Option<HourlyBlock>,
}

/// Column-oriented hourly data. Open-Meteo sends `null` for hours it has no
/// value for.
#[derive(Debug, Deserialize)]
struct HourlyBlock {
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation_probability: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    sunshine_duration: Vec<Option<f64>>,
    #[serde(default)]
    cloud_cover: Vec<Option<f64>>,
}

fn column_value(column: &[Option<f64>], index: usize) -> f64 {
    column
        .get(index)
        .copied()
        .flatten()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

fn percentage(v: f64) -> u8 {
    v.round().clamp(0.0, 100.0) as u8
}

impl OpenMeteoClient {
    pub fn new(
        base_url: &str,
        user_agent: &str,
        max_retries: u32,
        retry_backoff: Duration,
    ) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AppError::InternalError(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_retries,
            retry_backoff,
        })
    }

    /// Fetch the raw forecast JSON for a location, retrying transient failures.
    pub async fn fetch_forecast(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> Result<serde_json::Value, AppError> {
        let mut attempt: u32 = 0;
        loop {
            match self.try_fetch(coordinates, days).await {
                Ok(json) => return Ok(json),
                Err(FetchFailure::Retryable(reason)) if attempt < self.max_retries => {
                    let delay = self
                        .retry_backoff
                        .saturating_mul(2u32.saturating_pow(attempt));
                    tracing::warn!(
                        "Open-Meteo attempt {}/{} failed ({}), retrying in {:?}",
                        attempt + 1,
                        self.max_retries + 1,
                        reason,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(FetchFailure::Retryable(reason)) | Err(FetchFailure::Fatal(reason)) => {
                    return Err(AppError::ExternalServiceError(reason));
                }
            }
        }
    }

    async fn try_fetch(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> Result<serde_json::Value, FetchFailure> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("latitude", format!("{:.4}", coordinates.latitude)),
                ("longitude", format!("{:.4}", coordinates.longitude)),
                ("hourly", HOURLY_VARIABLES.to_string()),
                ("timezone", "auto".to_string()),
                ("forecast_days", days.to_string()),
            ])
            .send()
            .await
            .map_err(|e| FetchFailure::Retryable(format!("Open-Meteo request failed: {}", e)))?;

        let status = response.status();
        if status.is_server_error() || status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(FetchFailure::Retryable(format!(
                "Open-Meteo returned HTTP {}",
                status
            )));
        }
        if !status.is_success() {
            return Err(FetchFailure::Fatal(format!(
                "Open-Meteo returned HTTP {}",
                status
            )));
        }

        response
            .json()
            .await
            .map_err(|e| FetchFailure::Fatal(format!("Open-Meteo JSON parse error: {}", e)))
    }
}

impl WeatherSource for OpenMeteoClient {
    async fn hourly_forecast(
        &self,
        coordinates: Coordinates,
        days: u32,
    ) -> Vec<WeatherObservation> {
        let parsed = match self.fetch_forecast(coordinates, days).await {
            Ok(raw_json) => parse_hourly_forecast(&raw_json),
            Err(e) => Err(e),
        };
        match parsed {
            Ok(observations) => {
                tracing::debug!(
                    "Open-Meteo returned {} hours for ({}, {})",
                    observations.len(),
                    coordinates.latitude,
                    coordinates.longitude
                );
                observations
            }
            Err(e) => {
                tracing::warn!(
                    "Weather fetch for ({}, {}) failed: {}",
                    coordinates.latitude,
                    coordinates.longitude,
                    e
                );
                Vec::new()
            }
        }
    }
}

/// Turn an Open-Meteo forecast document into chronological observations.
///
/// Pure function. Entries whose time cannot be parsed are skipped; missing
/// values read as 0. The response's single `utc_offset_seconds` (the offset in
/// force when the forecast was issued) is applied to every hour, so instants
/// after a DST change are off by an hour. Local dates and hours are exact.
pub fn parse_hourly_forecast(
    raw_json: &serde_json::Value,
) -> Result<Vec<WeatherObservation>, AppError> {
    let response: ForecastResponse = serde_json::from_value(raw_json.clone()).map_err(|e| {
        AppError::ExternalServiceError(format!("Open-Meteo response structure error: {}", e))
    })?;

    let hourly = response.hourly.ok_or_else(|| {
        AppError::ExternalServiceError("Open-Meteo response has no hourly block".to_string())
    })?;

    let offset = FixedOffset::east_opt(response.utc_offset_seconds).ok_or_else(|| {
        AppError::ExternalServiceError(format!(
            "Open-Meteo returned invalid UTC offset {}",
            response.utc_offset_seconds
        ))
    })?;

    let mut observations = Vec::with_capacity(hourly.time.len());
    for (i, time) in hourly.time.iter().enumerate() {
        let Some(timestamp) = parse_local_time(time, &offset) else {
            tracing::warn!("Skipping Open-Meteo hour with unparseable time '{}'", time);
            continue;
        };
        observations.push(WeatherObservation {
            timestamp,
            temperature: round_dp(column_value(&hourly.temperature_2m, i), 1),
            precipitation_probability: percentage(column_value(
                &hourly.precipitation_probability,
                i,
            )),
            precipitation_amount: round_dp(column_value(&hourly.precipitation, i).max(0.0), 2),
            sunshine_duration: column_value(&hourly.sunshine_duration, i).max(0.0),
            cloud_cover: percentage(column_value(&hourly.cloud_cover, i)),
        });
    }

    observations.sort_by_key(|o| o.timestamp);
    Ok(observations)
}

fn parse_local_time(time: &str, offset: &FixedOffset) -> Option<DateTime<FixedOffset>> {
    let naive = NaiveDateTime::parse_from_str(time, LOCAL_TIME_FORMAT).ok()?;
    offset.from_local_datetime(&naive).single()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn sample_body() -> serde_json::Value {
        json!({
            "latitude": 54.44,
            "longitude": 18.56,
            "utc_offset_seconds": 7200,
            "timezone": "Europe/Warsaw",
            "hourly": {
                "time": ["2026-06-01T00:00", "2026-06-01T01:00", "2026-06-01T02:00"],
                "temperature_2m": [14.26, 13.8, null],
                "precipitation_probability": [10, 55.4, 100],
                "precipitation": [0.0, 0.125, 1.2],
                "sunshine_duration": [0.0, 0.0, 1800.0],
                "cloud_cover": [20, 65, null]
            }
        })
    }

    fn client_for(server: &MockServer, max_retries: u32) -> OpenMeteoClient {
        OpenMeteoClient::new(
            &format!("{}/v1/forecast", server.uri()),
            "TrailComfort/test",
            max_retries,
            Duration::from_millis(1),
        )
        .unwrap()
    }

    #[test]
    fn test_parse_hourly_forecast() {
        let obs = parse_hourly_forecast(&sample_body()).unwrap();
        assert_eq!(obs.len(), 3);

        assert_eq!(obs[0].temperature, 14.3);
        assert_eq!(obs[0].precipitation_probability, 10);
        assert_eq!(obs[0].cloud_cover, 20);
        assert_eq!(obs[0].timestamp.offset().local_minus_utc(), 7200);
        assert_eq!(obs[0].local_date(), NaiveDate::from_ymd_opt(2026, 6, 1).unwrap());
        assert_eq!(obs[0].timestamp.hour(), 0);

        assert_eq!(obs[1].precipitation_amount, 0.13);
        assert_eq!(obs[1].precipitation_probability, 55);
    }

    #[test]
    fn test_parse_missing_values_default_to_zero() {
        let obs = parse_hourly_forecast(&sample_body()).unwrap();
        assert_eq!(obs[2].temperature, 0.0);
        assert_eq!(obs[2].cloud_cover, 0);
        assert_eq!(obs[2].sunshine_duration, 1800.0);
    }

    #[test]
    fn test_parse_missing_column_defaults_to_zero() {
        let body = json!({
            "utc_offset_seconds": 0,
            "hourly": {
                "time": ["2026-06-01T12:00"],
                "temperature_2m": [18.0]
            }
        });
        let obs = parse_hourly_forecast(&body).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].precipitation_amount, 0.0);
        assert_eq!(obs[0].cloud_cover, 0);
    }

    #[test]
    fn test_parse_skips_bad_times() {
        let body = json!({
            "utc_offset_seconds": 3600,
            "hourly": {
                "time": ["not-a-time", "2026-01-10T08:00"],
                "temperature_2m": [1.0, 2.0]
            }
        });
        let obs = parse_hourly_forecast(&body).unwrap();
        assert_eq!(obs.len(), 1);
        assert_eq!(obs[0].temperature, 2.0);
    }

    #[test]
    fn test_parse_without_hourly_block_fails() {
        let body = json!({"utc_offset_seconds": 0});
        assert!(matches!(
            parse_hourly_forecast(&body),
            Err(AppError::ExternalServiceError(_))
        ));
    }

    #[test]
    fn test_parse_clamps_percentages() {
        let body = json!({
            "utc_offset_seconds": 0,
            "hourly": {
                "time": ["2026-06-01T12:00"],
                "precipitation_probability": [140],
                "cloud_cover": [-3]
            }
        });
        let obs = parse_hourly_forecast(&body).unwrap();
        assert_eq!(obs[0].precipitation_probability, 100);
        assert_eq!(obs[0].cloud_cover, 0);
    }

    #[tokio::test]
    async fn test_hourly_forecast_sends_expected_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/forecast"))
            .and(query_param("latitude", "54.3722"))
            .and(query_param("longitude", "18.6464"))
            .and(query_param("timezone", "auto"))
            .and(query_param("forecast_days", "14"))
            .and(query_param("hourly", HOURLY_VARIABLES))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 0);
        let obs = client
            .hourly_forecast(Coordinates::new(54.372158, 18.646352), 14)
            .await;
        assert_eq!(obs.len(), 3);
    }

    #[tokio::test]
    async fn test_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(sample_body()))
            .mount(&server)
            .await;

        let client = client_for(&server, 3);
        let obs = client.hourly_forecast(Coordinates::new(54.4, 18.5), 14).await;
        assert_eq!(obs.len(), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_retries() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .expect(3)
            .mount(&server)
            .await;

        let client = client_for(&server, 2);
        let result = client.fetch_forecast(Coordinates::new(54.4, 18.5), 14).await;
        assert!(matches!(result, Err(AppError::ExternalServiceError(_))));
    }

    #[tokio::test]
    async fn test_client_error_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": true,
                "reason": "Latitude must be in range of -90 to 90°."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server, 5);
        let obs = client.hourly_forecast(Coordinates::new(54.4, 18.5), 14).await;
        assert!(obs.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_body_gives_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let client = client_for(&server, 0);
        let obs = client.hourly_forecast(Coordinates::new(54.4, 18.5), 14).await;
        assert!(obs.is_empty());
    }
}
