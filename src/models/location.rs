//! Location model for geographic coordinates and metadata

use serde::{Deserialize, Serialize};

use crate::AirqError;

/// Validated latitude/longitude pair
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Create coordinates, rejecting values outside [-90, 90] / [-180, 180]
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, AirqError> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(AirqError::validation(format!(
                "latitude {latitude} outside [-90, 90]"
            )));
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(AirqError::validation(format!(
                "longitude {longitude} outside [-180, 180]"
            )));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Format as "lat, lon" with four decimals
    #[must_use]
    pub fn format_coordinates(&self) -> String {
        format!("{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// A resolved place
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub name: String,
    pub coordinates: Coordinates,
    pub country: Option<String>,
    /// First-level administrative area (state)
    pub admin_area: Option<String>,
}

impl Location {
    #[must_use]
    pub fn new(name: String, coordinates: Coordinates) -> Self {
        Self {
            name,
            coordinates,
            country: None,
            admin_area: None,
        }
    }

    /// Name with admin area and country when known, e.g. "Pune, Maharashtra, India"
    #[must_use]
    pub fn display_name(&self) -> String {
        [
            Some(self.name.as_str()),
            self.admin_area.as_deref(),
            self.country.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_ranges() {
        assert!(Coordinates::new(90.0, 180.0).is_ok());
        assert!(Coordinates::new(-90.0, -180.0).is_ok());
        assert!(Coordinates::new(90.01, 0.0).is_err());
        assert!(Coordinates::new(0.0, -180.5).is_err());
        assert!(Coordinates::new(f64::NAN, 0.0).is_err());
    }

    #[test]
    fn test_format_coordinates() {
        let coordinates = Coordinates::new(21.1458, 79.088_16).unwrap();
        assert_eq!(coordinates.format_coordinates(), "21.1458, 79.0882");
    }

    #[test]
    fn test_display_name() {
        let mut location = Location::new("Nagpur".into(), Coordinates::new(21.1, 79.1).unwrap());
        assert_eq!(location.display_name(), "Nagpur");

        location.admin_area = Some("Maharashtra".into());
        location.country = Some("India".into());
        assert_eq!(location.display_name(), "Nagpur, Maharashtra, India");
    }
}
