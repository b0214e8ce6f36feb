//! `airq` - Air Quality Index estimation
//!
//! Turns either six manually entered pollutant concentrations or a district
//! name into an AQI estimate with a health-advisory band. Live readings come
//! from the Open-Meteo geocoding and air-quality APIs; the estimate comes from
//! a pre-trained regression pipeline loaded once at startup.

pub mod air_quality;
pub mod api;
pub mod config;
pub mod error;
pub mod estimator;
pub mod models;
pub mod predictor;
pub mod regions;
pub mod telemetry;
pub mod web;

// Re-export core types for public API
pub use air_quality::{AirQualityProvider, Geocoder, HourlySeries, OpenMeteoClient};
pub use config::AirqConfig;
pub use error::AirqError;
pub use estimator::{EstimateRequest, EstimatorService};
pub use models::{
    AdvisoryBand, Coordinates, Estimate, FeatureVector, LiveReading, Location, Pollutant,
    PollutantReading,
};
pub use predictor::{AqiPredictor, RegressionPipeline, SharedPredictor};
pub use regions::RegionTable;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, AirqError>;
