//! Location and air-quality data sources
//!
//! The traits here are the seam between the estimator and the outside world:
//! [`Geocoder`] resolves a place name, [`AirQualityProvider`] returns the hourly
//! pollutant series for a pair of coordinates. [`open_meteo`] implements both
//! against the public Open-Meteo APIs.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AirqError;
use crate::models::{Coordinates, Location, RawSample};

pub mod open_meteo;

pub use open_meteo::OpenMeteoClient;

/// Resolves free-text place names
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Best match for `place`, or `None` when the service has no result
    async fn geocode(&self, place: &str) -> Result<Option<Location>, AirqError>;
}

/// Supplies hourly pollutant time series
#[async_trait]
pub trait AirQualityProvider: Send + Sync {
    async fn hourly_series(&self, coordinates: Coordinates) -> Result<HourlySeries, AirqError>;
}

/// Hourly pollutant series with parallel value arrays. Values are raw API
/// units (CO in µg/m³); any entry may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlySeries {
    pub timestamps: Vec<DateTime<Utc>>,
    pub pm25: Vec<Option<f64>>,
    pub pm10: Vec<Option<f64>>,
    pub nitrogen_dioxide: Vec<Option<f64>>,
    pub sulphur_dioxide: Vec<Option<f64>>,
    pub carbon_monoxide: Vec<Option<f64>>,
    pub ozone: Vec<Option<f64>>,
}

impl HourlySeries {
    #[must_use]
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// The sample closest to `now`.
    ///
    /// Ties between equidistant timestamps go to the earlier index. Returns a
    /// description of the problem when the series is empty or the selected hour
    /// lacks a value.
    pub fn nearest_sample(&self, now: DateTime<Utc>) -> Result<RawSample, String> {
        let index = nearest_index(&self.timestamps, now).ok_or("empty time series")?;

        Ok(RawSample {
            timestamp: self.timestamps[index],
            pm25: value_at(&self.pm25, index, "pm2_5")?,
            pm10: value_at(&self.pm10, index, "pm10")?,
            nitrogen_dioxide: value_at(&self.nitrogen_dioxide, index, "nitrogen_dioxide")?,
            sulphur_dioxide: value_at(&self.sulphur_dioxide, index, "sulphur_dioxide")?,
            carbon_monoxide_ug: value_at(&self.carbon_monoxide, index, "carbon_monoxide")?,
            ozone: value_at(&self.ozone, index, "ozone")?,
        })
    }
}

/// Index of the timestamp with the smallest absolute distance to `now`; the
/// first one wins on ties.
#[must_use]
pub fn nearest_index(timestamps: &[DateTime<Utc>], now: DateTime<Utc>) -> Option<usize> {
    let mut best: Option<(usize, i64)> = None;
    for (index, timestamp) in timestamps.iter().enumerate() {
        let distance = (*timestamp - now).num_milliseconds().abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((index, distance)),
        }
    }
    best.map(|(index, _)| index)
}

fn value_at(values: &[Option<f64>], index: usize, variable: &str) -> Result<f64, String> {
    match values.get(index) {
        Some(Some(value)) if value.is_finite() => Ok(*value),
        Some(Some(value)) => Err(format!("{variable} is not a finite number ({value})")),
        Some(None) => Err(format!("{variable} has no value at the selected hour")),
        None => Err(format!(
            "{variable} has {} values, expected at least {}",
            values.len(),
            index + 1
        )),
    }
}

/// Parse an hourly timestamp, interpreting zone-less values as UTC
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}
