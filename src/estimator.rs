//! AQI estimation service
//!
//! Orchestrates one user action: resolve a district, fetch the nearest hourly
//! reading, normalize it, predict and classify. Manual entries skip straight to
//! the prediction step.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::Result;
use crate::air_quality::{AirQualityProvider, Geocoder};
use crate::error::AirqError;
use crate::models::estimate::{chart_breakdown, format_local_time, map_marker};
use crate::models::{
    AdvisoryBand, Estimate, FeatureVector, InputSource, LiveReading, Location, PollutantReading,
};
use crate::predictor::SharedPredictor;
use crate::regions::RegionTable;

/// Input for one predict action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum EstimateRequest {
    Manual { values: PollutantReading },
    District { region: String, district: String },
}

pub struct EstimatorService {
    geocoder: Arc<dyn Geocoder>,
    air_quality: Arc<dyn AirQualityProvider>,
    predictor: Option<SharedPredictor>,
    regions: RegionTable,
    display_zone: Tz,
}

impl EstimatorService {
    pub fn new(
        geocoder: Arc<dyn Geocoder>,
        air_quality: Arc<dyn AirQualityProvider>,
        predictor: Option<SharedPredictor>,
        regions: RegionTable,
        display_zone: Tz,
    ) -> Self {
        Self {
            geocoder,
            air_quality,
            predictor,
            regions,
            display_zone,
        }
    }

    #[must_use]
    pub fn model_loaded(&self) -> bool {
        self.predictor.is_some()
    }

    #[must_use]
    pub fn model_description(&self) -> Option<String> {
        self.predictor.as_ref().map(|p| p.describe())
    }

    #[must_use]
    pub fn regions(&self) -> RegionTable {
        self.regions
    }

    /// Canonical district name. With a region the district must belong to it;
    /// without one, names outside the table pass through as free text.
    pub fn resolve_district(&self, region: Option<&str>, district: &str) -> Result<String> {
        match region {
            Some(region) => self
                .regions
                .find_district(region, district)
                .map(str::to_string)
                .ok_or_else(|| {
                    AirqError::validation(format!(
                        "District '{}' is not part of {}",
                        district.trim(),
                        region.trim()
                    ))
                }),
            None => Ok(self
                .regions
                .region_of(district)
                .map_or_else(|| district.trim().to_string(), |(_, canonical)| canonical.to_string())),
        }
    }

    /// Latest readings for a place, normalized to model units
    pub async fn fetch_live(&self, district: &str) -> Result<LiveReading> {
        self.fetch_live_at(district, Utc::now()).await
    }

    /// [`Self::fetch_live`] with an explicit reference time
    #[instrument(skip(self))]
    pub async fn fetch_live_at(&self, district: &str, now: DateTime<Utc>) -> Result<LiveReading> {
        let district = district.trim();
        if district.is_empty() {
            return Err(AirqError::validation("District cannot be empty"));
        }

        let location = self
            .geocoder
            .geocode(district)
            .await?
            .ok_or_else(|| AirqError::location_not_found(district))?;

        let coordinates = location.coordinates;
        let series = self.air_quality.hourly_series(coordinates).await?;
        let sample = series
            .nearest_sample(now)
            .map_err(|message| AirqError::no_data(coordinates, message))?;
        debug!("Selected hourly sample at {}", sample.timestamp);

        let reading = sample.normalize();
        reading
            .validate()
            .map_err(|e| AirqError::no_data(coordinates, e.to_string()))?;

        info!(
            "Fetched live readings for {} at {}",
            location.display_name(),
            sample.timestamp
        );

        Ok(LiveReading {
            district: district.to_string(),
            location,
            reading,
            observed_at: sample.timestamp,
            observed_at_local: format_local_time(sample.timestamp, self.display_zone),
        })
    }

    /// Run the predictor on an assembled feature vector
    pub fn predict(&self, features: &FeatureVector) -> Result<f64> {
        let predictor = self
            .predictor
            .as_ref()
            .ok_or_else(|| AirqError::model_unavailable("no model artifact was loaded"))?;
        predictor.predict(features)
    }

    pub async fn estimate(&self, request: EstimateRequest) -> Result<Estimate> {
        self.estimate_at(request, Utc::now()).await
    }

    /// Full predict action with an explicit reference time
    #[instrument(skip(self))]
    pub async fn estimate_at(&self, request: EstimateRequest, now: DateTime<Utc>) -> Result<Estimate> {
        if !self.model_loaded() {
            warn!("Estimate requested but no model is loaded");
            return Err(AirqError::model_unavailable("no model artifact was loaded"));
        }

        match request {
            EstimateRequest::Manual { values } => {
                values.validate_manual()?;
                self.classify(values, InputSource::Manual, None)
            }
            EstimateRequest::District { region, district } => {
                let region_entry = self.regions.region(&region).ok_or_else(|| {
                    AirqError::validation(format!("Unknown region '{}'", region.trim()))
                })?;
                let district = self
                    .regions
                    .find_district(region_entry.name, &district)
                    .ok_or_else(|| {
                        AirqError::validation(format!(
                            "District '{}' is not part of {}",
                            district.trim(),
                            region_entry.name
                        ))
                    })?;

                let live = self.fetch_live_at(district, now).await?;
                let source = InputSource::District {
                    region: region_entry.name.to_string(),
                    district: district.to_string(),
                };
                self.classify(live.reading, source, Some(live))
            }
        }
    }

    fn classify(
        &self,
        reading: PollutantReading,
        input: InputSource,
        live: Option<LiveReading>,
    ) -> Result<Estimate> {
        let features = reading.to_feature_vector();
        let aqi = self.predict(&features)?;
        let band = AdvisoryBand::classify(aqi)?;
        info!("Predicted AQI {:.2} ({})", aqi, band);

        let (location, observed_at, observed_at_local) = match live {
            Some(live) => (
                Some(live.location),
                Some(live.observed_at),
                Some(live.observed_at_local),
            ),
            None => (None, None, None),
        };
        let marker = location
            .as_ref()
            .map(|location: &Location| map_marker(location, aqi));

        Ok(Estimate {
            aqi,
            band: band.summary(),
            input,
            features,
            location,
            observed_at,
            observed_at_local,
            marker,
            chart: chart_breakdown(&reading),
        })
    }
}
