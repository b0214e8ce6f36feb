//! Error types and handling for the `airq` pipeline

use thiserror::Error;

use crate::models::Coordinates;

/// Main error type for the AQI estimation pipeline
#[derive(Error, Debug)]
pub enum AirqError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// The geocoder returned no match for the place name
    #[error("Location not found: {place}")]
    LocationNotFound { place: String },

    /// Geocoding request or response failure
    #[error("Geocoding error: {message}")]
    Geocoding { message: String },

    /// Air-quality request failure
    #[error("Air quality API error: {message}")]
    AirQuality { message: String },

    /// The air-quality series was empty or malformed
    #[error("No air quality data for ({:.4}, {:.4}): {message}", coordinates.latitude, coordinates.longitude)]
    NoData {
        coordinates: Coordinates,
        message: String,
    },

    /// The model artifact is missing, corrupt, or was never loaded
    #[error("Model unavailable: {message}")]
    ModelUnavailable { message: String },

    /// The predictor failed on a feature vector
    #[error("Inference error: {message}")]
    Inference { message: String },

    /// The AQI value lies outside every advisory band
    #[error("AQI value {value} cannot be classified")]
    Unclassifiable { value: f64 },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl AirqError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn location_not_found<S: Into<String>>(place: S) -> Self {
        Self::LocationNotFound {
            place: place.into(),
        }
    }

    pub fn geocoding<S: Into<String>>(message: S) -> Self {
        Self::Geocoding {
            message: message.into(),
        }
    }

    pub fn air_quality<S: Into<String>>(message: S) -> Self {
        Self::AirQuality {
            message: message.into(),
        }
    }

    pub fn no_data<S: Into<String>>(coordinates: Coordinates, message: S) -> Self {
        Self::NoData {
            coordinates,
            message: message.into(),
        }
    }

    pub fn model_unavailable<S: Into<String>>(message: S) -> Self {
        Self::ModelUnavailable {
            message: message.into(),
        }
    }

    pub fn inference<S: Into<String>>(message: S) -> Self {
        Self::Inference {
            message: message.into(),
        }
    }

    /// Stable machine-readable code for API responses
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            AirqError::Config { .. } => "config",
            AirqError::Validation { .. } => "invalid_input",
            AirqError::LocationNotFound { .. } => "location_not_found",
            AirqError::Geocoding { .. } => "geocoding_failed",
            AirqError::AirQuality { .. } => "air_quality_failed",
            AirqError::NoData { .. } => "no_data",
            AirqError::ModelUnavailable { .. } => "model_unavailable",
            AirqError::Inference { .. } => "inference_failed",
            AirqError::Unclassifiable { .. } => "unclassifiable",
            AirqError::Io { .. } => "io",
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AirqError::Config { .. } => {
                "Configuration error. Please check your config file.".to_string()
            }
            AirqError::Validation { message } => format!("Invalid input: {message}"),
            AirqError::LocationNotFound { place } => {
                format!("No coordinates available for '{place}'.")
            }
            AirqError::Geocoding { .. } => {
                "Could not resolve the location. Please check your internet connection."
                    .to_string()
            }
            AirqError::AirQuality { .. } => {
                "Could not retrieve live data. Please try again later.".to_string()
            }
            AirqError::NoData { .. } => {
                "Could not retrieve live data: no readings available for this location."
                    .to_string()
            }
            AirqError::ModelUnavailable { .. } => {
                "The prediction model is unavailable. No estimate was produced.".to_string()
            }
            AirqError::Inference { message } => format!("Error in prediction: {message}"),
            AirqError::Unclassifiable { value } => {
                format!("AQI value {value:.2} is outside the advisory scale.")
            }
            AirqError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
        }
    }
}
