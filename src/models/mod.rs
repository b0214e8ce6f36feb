//! Data models for the airq pipeline
//!
//! - Pollutant: identifiers, readings, raw API samples and the feature vector
//! - Location: validated coordinates and resolved places
//! - Advisory: health-advisory bands and classification
//! - Estimate: the result of one predict action

pub mod advisory;
pub mod estimate;
pub mod location;
pub mod pollutant;

pub use advisory::{AdvisoryBand, BandSummary};
pub use estimate::{ChartEntry, Estimate, InputSource, LiveReading, MapMarker};
pub use location::{Coordinates, Location};
pub use pollutant::{FEATURE_COUNT, FeatureVector, Pollutant, PollutantReading, RawSample};
