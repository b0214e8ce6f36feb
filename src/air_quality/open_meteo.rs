//! Open-Meteo geocoding and air-quality client
//!
//! Both APIs are key-free. Every request carries the configured timeout and is
//! attempted exactly once.

use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument, warn};

use super::{AirQualityProvider, Geocoder, HourlySeries, parse_timestamp};
use crate::AirqError;
use crate::config::AirqConfig;
use crate::models::{Coordinates, Location};

/// Hourly variables requested from the air-quality endpoint
pub const HOURLY_VARIABLES: &str =
    "pm10,pm2_5,carbon_monoxide,nitrogen_dioxide,sulphur_dioxide,ozone";

/// Responses slower than this are logged as warnings
const SLOW_RESPONSE_SECS: u64 = 5;

pub struct OpenMeteoClient {
    client: Client,
    geocoding_url: String,
    air_quality_url: String,
}

impl OpenMeteoClient {
    pub fn new(config: &AirqConfig) -> Result<Self, AirqError> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("airq/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| AirqError::config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            geocoding_url: config.api.geocoding_url.trim_end_matches('/').to_string(),
            air_quality_url: config.api.air_quality_url.trim_end_matches('/').to_string(),
        })
    }

    fn geocoding_request_url(&self, place: &str) -> String {
        format!(
            "{}?name={}&count=1&language=en&format=json",
            self.geocoding_url,
            urlencoding::encode(place)
        )
    }

    fn air_quality_request_url(&self, coordinates: Coordinates) -> String {
        format!(
            "{}?latitude={}&longitude={}&hourly={}",
            self.air_quality_url, coordinates.latitude, coordinates.longitude, HOURLY_VARIABLES
        )
    }

    /// GET `url` and decode the JSON body. Non-success statuses are turned into
    /// an error carrying Open-Meteo's `reason` when the body has one.
    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, String> {
        debug!("Open-Meteo request URL: {}", url);
        let start_time = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let reason = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.reason)
                .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());
            return Err(format!("HTTP {}: {}", status.as_u16(), reason));
        }

        let body = response
            .json::<T>()
            .await
            .map_err(|e| format!("invalid response body: {e}"))?;

        let duration = start_time.elapsed();
        if duration.as_secs() > SLOW_RESPONSE_SECS {
            warn!("Slow Open-Meteo response: {:.3}s", duration.as_secs_f64());
        } else {
            debug!("Open-Meteo response in {:.3}s", duration.as_secs_f64());
        }

        Ok(body)
    }
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    #[instrument(skip(self))]
    async fn geocode(&self, place: &str) -> Result<Option<Location>, AirqError> {
        let url = self.geocoding_request_url(place);
        let response: GeocodingResponse =
            self.get_json(&url).await.map_err(AirqError::geocoding)?;

        let Some(best) = response.results.unwrap_or_default().into_iter().next() else {
            warn!("No geocoding results for '{}'", place);
            return Ok(None);
        };

        let location = Location::try_from(best)?;
        info!(
            "Resolved '{}' to {} ({})",
            place,
            location.display_name(),
            location.coordinates.format_coordinates()
        );
        Ok(Some(location))
    }
}

#[async_trait]
impl AirQualityProvider for OpenMeteoClient {
    #[instrument(skip(self), fields(lat = coordinates.latitude, lon = coordinates.longitude))]
    async fn hourly_series(&self, coordinates: Coordinates) -> Result<HourlySeries, AirqError> {
        let url = self.air_quality_request_url(coordinates);
        let body: serde_json::Value =
            self.get_json(&url).await.map_err(AirqError::air_quality)?;
        let series = parse_air_quality(body, coordinates)?;

        info!("Fetched {} hourly air quality samples", series.len());
        Ok(series)
    }
}

/// Decode an air-quality body. A missing, mistyped or empty `hourly` block is
/// a data problem for these coordinates, not an upstream failure.
fn parse_air_quality(
    body: serde_json::Value,
    coordinates: Coordinates,
) -> Result<HourlySeries, AirqError> {
    let response: AirQualityResponse = serde_json::from_value(body)
        .map_err(|e| AirqError::no_data(coordinates, format!("malformed hourly data: {e}")))?;

    let hourly = response
        .hourly
        .ok_or_else(|| AirqError::no_data(coordinates, "response has no hourly block"))?;

    let series = hourly
        .into_series()
        .map_err(|message| AirqError::no_data(coordinates, message))?;

    if series.is_empty() {
        return Err(AirqError::no_data(coordinates, "empty time series"));
    }
    Ok(series)
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    reason: Option<String>,
}

/// Geocoding response from Open-Meteo
#[derive(Debug, Deserialize)]
struct GeocodingResponse {
    results: Option<Vec<GeocodingResult>>,
}

#[derive(Debug, Deserialize)]
struct GeocodingResult {
    name: String,
    latitude: f64,
    longitude: f64,
    country: Option<String>,
    admin1: Option<String>,
}

impl TryFrom<GeocodingResult> for Location {
    type Error = AirqError;

    fn try_from(result: GeocodingResult) -> Result<Self, Self::Error> {
        let coordinates = Coordinates::new(result.latitude, result.longitude)
            .map_err(|e| AirqError::geocoding(format!("invalid coordinates in response: {e}")))?;
        Ok(Location {
            name: result.name,
            coordinates,
            country: result.country,
            admin_area: result.admin1,
        })
    }
}

/// Air-quality response from Open-Meteo
#[derive(Debug, Deserialize)]
struct AirQualityResponse {
    hourly: Option<HourlyData>,
}

#[derive(Debug, Deserialize)]
struct HourlyData {
    #[serde(default)]
    time: Vec<String>,
    #[serde(rename = "pm2_5", default)]
    pm25: Vec<Option<f64>>,
    #[serde(default)]
    pm10: Vec<Option<f64>>,
    #[serde(default)]
    nitrogen_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    sulphur_dioxide: Vec<Option<f64>>,
    #[serde(default)]
    carbon_monoxide: Vec<Option<f64>>,
    #[serde(default)]
    ozone: Vec<Option<f64>>,
}

impl HourlyData {
    fn into_series(self) -> Result<HourlySeries, String> {
        let timestamps = self
            .time
            .iter()
            .map(|text| parse_timestamp(text).ok_or_else(|| format!("malformed timestamp '{text}'")))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HourlySeries {
            timestamps,
            pm25: self.pm25,
            pm10: self.pm10,
            nitrogen_dioxide: self.nitrogen_dioxide,
            sulphur_dioxide: self.sulphur_dioxide,
            carbon_monoxide: self.carbon_monoxide,
            ozone: self.ozone,
        })
    }
}
