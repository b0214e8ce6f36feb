//! Results of one predict action

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{BandSummary, FeatureVector, Location, Pollutant, PollutantReading};

/// Format used when showing observation times to the user
pub const DISPLAY_TIME_FORMAT: &str = "%d %b %Y %H:%M";

/// Where the pollutant values came from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum InputSource {
    Manual,
    District { region: String, district: String },
}

/// Readings fetched for a district, already normalized to model units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveReading {
    pub district: String,
    pub location: Location,
    pub reading: PollutantReading,
    pub observed_at: DateTime<Utc>,
    /// `observed_at` rendered in the display time zone
    pub observed_at_local: String,
}

/// Marker for the location map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapMarker {
    pub latitude: f64,
    pub longitude: f64,
    pub tooltip: String,
}

/// One slice/bar of the pollutant charts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartEntry {
    pub pollutant: Pollutant,
    pub unit: String,
    pub value: f64,
    /// Fraction of the summed values, 0 when all values are 0
    pub share: f64,
}

/// A classified AQI prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Estimate {
    pub aqi: f64,
    pub band: BandSummary,
    pub input: InputSource,
    pub features: FeatureVector,
    pub location: Option<Location>,
    pub observed_at: Option<DateTime<Utc>>,
    pub observed_at_local: Option<String>,
    pub marker: Option<MapMarker>,
    pub chart: Vec<ChartEntry>,
}

/// Render a UTC timestamp in the given zone
#[must_use]
pub fn format_local_time(timestamp: DateTime<Utc>, zone: Tz) -> String {
    timestamp
        .with_timezone(&zone)
        .format(DISPLAY_TIME_FORMAT)
        .to_string()
}

#[must_use]
pub fn map_marker(location: &Location, aqi: f64) -> MapMarker {
    MapMarker {
        latitude: location.coordinates.latitude,
        longitude: location.coordinates.longitude,
        tooltip: format!("AQI: {aqi:.2}"),
    }
}

/// Per-pollutant values and their share of the total, in feature order
#[must_use]
pub fn chart_breakdown(reading: &PollutantReading) -> Vec<ChartEntry> {
    let total: f64 = reading.iter().map(|(_, value)| value).sum();
    reading
        .iter()
        .map(|(pollutant, value)| ChartEntry {
            pollutant,
            unit: pollutant.unit().to_string(),
            value,
            share: if total > 0.0 { value / total } else { 0.0 },
        })
        .collect()
}
