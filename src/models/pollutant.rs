//! Pollutant identifiers, readings and the model feature vector

use std::fmt::Display;
use std::ops::RangeInclusive;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AirqError;

/// Number of model input features
pub const FEATURE_COUNT: usize = 6;

/// Divisor converting carbon monoxide from µg/m³ to mg/m³
pub const CO_MICROGRAMS_PER_MILLIGRAM: f64 = 1000.0;

/// The six pollutants the model is trained on, in feature order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pollutant {
    #[serde(rename = "PM2.5")]
    Pm25,
    #[serde(rename = "PM10")]
    Pm10,
    #[serde(rename = "NO2")]
    No2,
    #[serde(rename = "SO2")]
    So2,
    #[serde(rename = "CO")]
    Co,
    #[serde(rename = "O3")]
    O3,
}

impl Pollutant {
    /// Canonical feature order. The predictor is positional, so this order is
    /// part of the model contract.
    pub const ALL: [Pollutant; FEATURE_COUNT] = [
        Pollutant::Pm25,
        Pollutant::Pm10,
        Pollutant::No2,
        Pollutant::So2,
        Pollutant::Co,
        Pollutant::O3,
    ];

    /// Position of this pollutant in the feature vector
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Pollutant::Pm25 => 0,
            Pollutant::Pm10 => 1,
            Pollutant::No2 => 2,
            Pollutant::So2 => 3,
            Pollutant::Co => 4,
            Pollutant::O3 => 5,
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Pollutant::Pm25 => "PM2.5",
            Pollutant::Pm10 => "PM10",
            Pollutant::No2 => "NO2",
            Pollutant::So2 => "SO2",
            Pollutant::Co => "CO",
            Pollutant::O3 => "O3",
        }
    }

    /// Unit of the model-ready value
    #[must_use]
    pub fn unit(self) -> &'static str {
        match self {
            Pollutant::Co => "mg/m³",
            _ => "µg/m³",
        }
    }

    /// Accepted range for manually entered values
    #[must_use]
    pub fn manual_range(self) -> RangeInclusive<f64> {
        match self {
            Pollutant::Pm25 | Pollutant::Pm10 => 0.0..=400.0,
            Pollutant::No2 | Pollutant::So2 => 0.0..=200.0,
            Pollutant::Co => 0.0..=10.0,
            Pollutant::O3 => 0.0..=300.0,
        }
    }

    /// Starting value offered for manual entry
    #[must_use]
    pub fn default_value(self) -> f64 {
        match self {
            Pollutant::Pm25 => 35.0,
            Pollutant::Pm10 => 45.0,
            Pollutant::No2 => 25.0,
            Pollutant::So2 => 10.0,
            Pollutant::Co => 1.5,
            Pollutant::O3 => 30.0,
        }
    }

    /// Parse a label such as "PM2.5" or "pm25"
    pub fn from_label(label: &str) -> Option<Self> {
        let normalized: String = label
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_uppercase();
        Pollutant::ALL.into_iter().find(|p| {
            p.label()
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                == normalized
        })
    }
}

impl Display for Pollutant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Model-ready concentrations. CO is in mg/m³, everything else in µg/m³.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PollutantReading {
    #[serde(alias = "PM2.5")]
    pub pm25: f64,
    #[serde(alias = "PM10")]
    pub pm10: f64,
    #[serde(alias = "NO2")]
    pub no2: f64,
    #[serde(alias = "SO2")]
    pub so2: f64,
    #[serde(alias = "CO")]
    pub co: f64,
    #[serde(alias = "O3")]
    pub o3: f64,
}

impl Default for PollutantReading {
    fn default() -> Self {
        Self {
            pm25: Pollutant::Pm25.default_value(),
            pm10: Pollutant::Pm10.default_value(),
            no2: Pollutant::No2.default_value(),
            so2: Pollutant::So2.default_value(),
            co: Pollutant::Co.default_value(),
            o3: Pollutant::O3.default_value(),
        }
    }
}

impl PollutantReading {
    #[must_use]
    pub fn new(pm25: f64, pm10: f64, no2: f64, so2: f64, co: f64, o3: f64) -> Self {
        Self {
            pm25,
            pm10,
            no2,
            so2,
            co,
            o3,
        }
    }

    #[must_use]
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        match pollutant {
            Pollutant::Pm25 => self.pm25,
            Pollutant::Pm10 => self.pm10,
            Pollutant::No2 => self.no2,
            Pollutant::So2 => self.so2,
            Pollutant::Co => self.co,
            Pollutant::O3 => self.o3,
        }
    }

    pub fn set(&mut self, pollutant: Pollutant, value: f64) {
        match pollutant {
            Pollutant::Pm25 => self.pm25 = value,
            Pollutant::Pm10 => self.pm10 = value,
            Pollutant::No2 => self.no2 = value,
            Pollutant::So2 => self.so2 = value,
            Pollutant::Co => self.co = value,
            Pollutant::O3 => self.o3 = value,
        }
    }

    /// Values in feature order
    pub fn iter(&self) -> impl Iterator<Item = (Pollutant, f64)> + '_ {
        Pollutant::ALL.into_iter().map(|p| (p, self.get(p)))
    }

    /// Every value must be finite and non-negative
    pub fn validate(&self) -> Result<(), AirqError> {
        for (pollutant, value) in self.iter() {
            if !value.is_finite() || value < 0.0 {
                return Err(AirqError::validation(format!(
                    "{pollutant} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(())
    }

    /// Manual entries must also lie inside the per-pollutant entry range
    pub fn validate_manual(&self) -> Result<(), AirqError> {
        self.validate()?;
        for (pollutant, value) in self.iter() {
            let range = pollutant.manual_range();
            if !range.contains(&value) {
                return Err(AirqError::validation(format!(
                    "{pollutant} must be between {} and {} {}, got {value}",
                    range.start(),
                    range.end(),
                    pollutant.unit()
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn to_feature_vector(&self) -> FeatureVector {
        FeatureVector::from(self)
    }
}

/// Ordered model input `[PM2.5, PM10, NO2, SO2, CO, O3]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureVector([f64; FEATURE_COUNT]);

impl FeatureVector {
    #[must_use]
    pub fn new(values: [f64; FEATURE_COUNT]) -> Self {
        Self(values)
    }

    #[must_use]
    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.0
    }

    #[must_use]
    pub fn get(&self, pollutant: Pollutant) -> f64 {
        self.0[pollutant.index()]
    }
}

impl From<&PollutantReading> for FeatureVector {
    fn from(reading: &PollutantReading) -> Self {
        let mut values = [0.0; FEATURE_COUNT];
        for (pollutant, value) in reading.iter() {
            values[pollutant.index()] = value;
        }
        Self(values)
    }
}

impl From<FeatureVector> for PollutantReading {
    fn from(vector: FeatureVector) -> Self {
        let [pm25, pm10, no2, so2, co, o3] = vector.0;
        Self::new(pm25, pm10, no2, so2, co, o3)
    }
}

/// One hourly record as delivered by the air-quality API (CO in µg/m³)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawSample {
    pub timestamp: DateTime<Utc>,
    pub pm25: f64,
    pub pm10: f64,
    pub nitrogen_dioxide: f64,
    pub sulphur_dioxide: f64,
    pub carbon_monoxide_ug: f64,
    pub ozone: f64,
}

impl RawSample {
    /// Convert to model units: CO µg/m³ → mg/m³, everything else unchanged
    #[must_use]
    pub fn normalize(&self) -> PollutantReading {
        PollutantReading {
            pm25: self.pm25,
            pm10: self.pm10,
            no2: self.nitrogen_dioxide,
            so2: self.sulphur_dioxide,
            co: self.carbon_monoxide_ug / CO_MICROGRAMS_PER_MILLIGRAM,
            o3: self.ozone,
        }
    }
}
