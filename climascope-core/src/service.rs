use std::fmt::Debug;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::model::{GeoCoordinate, GeocodedPlace, WeatherQuery, WeatherResult};

const REQUEST_TIMEOUT_SECS: u64 = 30;

const PROMPT_FALLBACK: &str = "Failed to process prompt.";
const GEOCODE_FAILED: &str = "Location not found.";
const QUERY_FAILED: &str = "Could not fetch weather data.";

/// Typed access to the three ClimaScope service endpoints.
///
/// Each operation is a single request/response exchange that surfaces
/// either a value or a [`SearchError`]; no retries happen at this layer.
#[async_trait]
pub trait WeatherService: Send + Sync + Debug {
    /// Interpret a free-text question. The returned result already
    /// carries its own location and date labels.
    async fn process_prompt(&self, text: &str) -> Result<WeatherResult, SearchError>;

    /// Resolve a location name to a coordinate and display label.
    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, SearchError>;

    /// Fetch historical statistics for a coordinate and calendar day.
    /// Label fields of the returned result are empty; the caller attaches
    /// them.
    async fn query_statistics(&self, query: &WeatherQuery) -> Result<WeatherResult, SearchError>;
}

/// HTTP implementation of [`WeatherService`] against a base URL.
#[derive(Debug, Clone)]
pub struct HttpWeatherService {
    base_url: String,
    http: Client,
}

impl HttpWeatherService {
    pub fn new(base_url: impl Into<String>) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Debug, Serialize)]
struct PromptBody<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct QueryBody {
    lat: f64,
    lon: f64,
    month: u32,
    day: u32,
}

#[derive(Debug, Deserialize)]
struct WireLocation {
    lat: f64,
    lon: f64,
}

/// Success body shared by `/process-prompt` and `/query`; only the former
/// includes the `found_*` labels.
#[derive(Debug, Deserialize)]
struct WireWeather {
    location: WireLocation,
    chance_of_rain: f64,
    avg_temp_celsius: f64,
    samples_found: u32,
    #[serde(default)]
    found_location: Option<String>,
    #[serde(default)]
    found_date: Option<String>,
}

impl WireWeather {
    fn into_result(self) -> WeatherResult {
        WeatherResult {
            coordinate: GeoCoordinate::new(self.location.lat, self.location.lon),
            chance_of_rain: self.chance_of_rain,
            avg_temp_celsius: self.avg_temp_celsius,
            samples_found: self.samples_found,
            location_label: self.found_location.unwrap_or_default(),
            date_label: self.found_date.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireGeocode {
    lat: f64,
    lon: f64,
    name: String,
}

#[derive(Debug, Deserialize)]
struct WireErrorBody {
    detail: Option<String>,
}

/// Pull the server-supplied `detail` out of an error body, if any.
fn extract_detail(body: &str) -> Option<String> {
    serde_json::from_str::<WireErrorBody>(body)
        .ok()
        .and_then(|e| e.detail)
        .filter(|d| !d.is_empty())
}

#[async_trait]
impl WeatherService for HttpWeatherService {
    async fn process_prompt(&self, text: &str) -> Result<WeatherResult, SearchError> {
        let url = self.endpoint("/process-prompt");

        let res = self
            .http
            .post(&url)
            .json(&PromptBody { text })
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("prompt request failed: {e}");
                SearchError::remote(PROMPT_FALLBACK)
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::debug!("failed to read prompt response body: {e}");
            SearchError::remote(PROMPT_FALLBACK)
        })?;

        if !status.is_success() {
            let detail = extract_detail(&body).unwrap_or_else(|| PROMPT_FALLBACK.to_string());
            return Err(SearchError::remote(detail));
        }

        let parsed: WireWeather = serde_json::from_str(&body).map_err(|e| {
            tracing::debug!("failed to parse prompt JSON: {e}");
            SearchError::remote(PROMPT_FALLBACK)
        })?;

        Ok(parsed.into_result())
    }

    async fn geocode(&self, query: &str) -> Result<GeocodedPlace, SearchError> {
        let url = self.endpoint("/geocode");

        let res = self
            .http
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("geocode request failed: {e}");
                SearchError::remote(GEOCODE_FAILED)
            })?;

        if !res.status().is_success() {
            return Err(SearchError::remote(GEOCODE_FAILED));
        }

        let parsed: WireGeocode = res.json().await.map_err(|e| {
            tracing::debug!("failed to parse geocode JSON: {e}");
            SearchError::remote(GEOCODE_FAILED)
        })?;

        Ok(GeocodedPlace {
            coordinate: GeoCoordinate::new(parsed.lat, parsed.lon),
            label: parsed.name,
        })
    }

    async fn query_statistics(&self, query: &WeatherQuery) -> Result<WeatherResult, SearchError> {
        let url = self.endpoint("/query");

        let res = self
            .http
            .post(&url)
            .json(&QueryBody {
                lat: query.coordinate.lat,
                lon: query.coordinate.lon,
                month: query.month,
                day: query.day,
            })
            .send()
            .await
            .map_err(|e| {
                tracing::debug!("statistics request failed: {e}");
                SearchError::remote(QUERY_FAILED)
            })?;

        if !res.status().is_success() {
            return Err(SearchError::remote(QUERY_FAILED));
        }

        let parsed: WireWeather = res.json().await.map_err(|e| {
            tracing::debug!("failed to parse statistics JSON: {e}");
            SearchError::remote(QUERY_FAILED)
        })?;

        Ok(parsed.into_result())
    }
}
