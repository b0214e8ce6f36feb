//! Health advisory bands and AQI classification

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::AirqError;

/// Ordered health-advisory category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdvisoryBand {
    Good,
    Moderate,
    UnhealthyForSensitiveGroups,
    Unhealthy,
    VeryUnhealthy,
    Hazardous,
}

/// Inclusive upper bound of each band, ascending. Each band starts just above
/// the previous band's upper bound; Good starts at 0.
const BAND_TABLE: [(f64, AdvisoryBand); 6] = [
    (50.0, AdvisoryBand::Good),
    (100.0, AdvisoryBand::Moderate),
    (150.0, AdvisoryBand::UnhealthyForSensitiveGroups),
    (200.0, AdvisoryBand::Unhealthy),
    (300.0, AdvisoryBand::VeryUnhealthy),
    (f64::INFINITY, AdvisoryBand::Hazardous),
];

impl AdvisoryBand {
    pub const ALL: [AdvisoryBand; 6] = [
        AdvisoryBand::Good,
        AdvisoryBand::Moderate,
        AdvisoryBand::UnhealthyForSensitiveGroups,
        AdvisoryBand::Unhealthy,
        AdvisoryBand::VeryUnhealthy,
        AdvisoryBand::Hazardous,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            AdvisoryBand::Good => "Good",
            AdvisoryBand::Moderate => "Moderate",
            AdvisoryBand::UnhealthyForSensitiveGroups => "Unhealthy for Sensitive Groups",
            AdvisoryBand::Unhealthy => "Unhealthy",
            AdvisoryBand::VeryUnhealthy => "Very Unhealthy",
            AdvisoryBand::Hazardous => "Hazardous",
        }
    }

    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            AdvisoryBand::Good => "Air quality is healthy.",
            AdvisoryBand::Moderate => "Acceptable for most.",
            AdvisoryBand::UnhealthyForSensitiveGroups => "May affect sensitive people.",
            AdvisoryBand::Unhealthy => "Harmful to all individuals.",
            AdvisoryBand::VeryUnhealthy => "Health warnings possible.",
            AdvisoryBand::Hazardous => "Emergency conditions.",
        }
    }

    #[must_use]
    pub fn advice(self) -> &'static str {
        match self {
            AdvisoryBand::Good => "Enjoy outdoor activities.",
            AdvisoryBand::Moderate => "Sensitive individuals may feel mild effects.",
            AdvisoryBand::UnhealthyForSensitiveGroups => "Consider staying indoors.",
            AdvisoryBand::Unhealthy => "Limit outdoor exposure.",
            AdvisoryBand::VeryUnhealthy => "Strongly advised to stay indoors.",
            AdvisoryBand::Hazardous => "Avoid all outdoor activity.",
        }
    }

    /// Declared integer range, `None` upper bound for Hazardous
    #[must_use]
    pub fn range(self) -> (u32, Option<u32>) {
        match self {
            AdvisoryBand::Good => (0, Some(50)),
            AdvisoryBand::Moderate => (51, Some(100)),
            AdvisoryBand::UnhealthyForSensitiveGroups => (101, Some(150)),
            AdvisoryBand::Unhealthy => (151, Some(200)),
            AdvisoryBand::VeryUnhealthy => (201, Some(300)),
            AdvisoryBand::Hazardous => (301, None),
        }
    }

    /// Map an AQI value to its band by ascending scan.
    ///
    /// Negative and NaN values have no band and yield
    /// [`AirqError::Unclassifiable`].
    pub fn classify(aqi: f64) -> Result<Self, AirqError> {
        if aqi.is_nan() || aqi < 0.0 {
            return Err(AirqError::Unclassifiable { value: aqi });
        }
        BAND_TABLE
            .iter()
            .find(|(upper, _)| aqi <= *upper)
            .map(|(_, band)| *band)
            .ok_or(AirqError::Unclassifiable { value: aqi })
    }

    #[must_use]
    pub fn summary(self) -> BandSummary {
        let (lower, upper) = self.range();
        BandSummary {
            band: self,
            label: self.label().to_string(),
            message: self.message().to_string(),
            advice: self.advice().to_string(),
            lower,
            upper,
        }
    }
}

impl Display for AdvisoryBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Serializable band description for API responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSummary {
    pub band: AdvisoryBand,
    pub label: String,
    pub message: String,
    pub advice: String,
    pub lower: u32,
    pub upper: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0.0, AdvisoryBand::Good)]
    #[case(50.0, AdvisoryBand::Good)]
    #[case(50.01, AdvisoryBand::Moderate)]
    #[case(100.0, AdvisoryBand::Moderate)]
    #[case(100.01, AdvisoryBand::UnhealthyForSensitiveGroups)]
    #[case(150.0, AdvisoryBand::UnhealthyForSensitiveGroups)]
    #[case(175.3, AdvisoryBand::Unhealthy)]
    #[case(200.5, AdvisoryBand::VeryUnhealthy)]
    #[case(300.0, AdvisoryBand::VeryUnhealthy)]
    #[case(300.01, AdvisoryBand::Hazardous)]
    #[case(1e9, AdvisoryBand::Hazardous)]
    #[case(f64::INFINITY, AdvisoryBand::Hazardous)]
    fn test_classify_boundaries(#[case] aqi: f64, #[case] expected: AdvisoryBand) {
        assert_eq!(AdvisoryBand::classify(aqi).unwrap(), expected);
    }

    #[rstest]
    #[case(-0.01)]
    #[case(-50.0)]
    #[case(f64::NAN)]
    fn test_classify_rejects_out_of_range(#[case] aqi: f64) {
        let err = AdvisoryBand::classify(aqi).unwrap_err();
        assert!(matches!(err, AirqError::Unclassifiable { .. }));
    }

    #[test]
    fn test_classify_is_idempotent() {
        for aqi in [0.0, 42.0, 99.99, 150.0, 250.0, 301.0] {
            assert_eq!(
                AdvisoryBand::classify(aqi).unwrap(),
                AdvisoryBand::classify(aqi).unwrap()
            );
        }
    }

    #[test]
    fn test_bands_are_ordered_and_contiguous() {
        let mut previous_upper: Option<u32> = None;
        for band in AdvisoryBand::ALL {
            let (lower, upper) = band.range();
            match previous_upper {
                None => assert_eq!(lower, 0),
                Some(prev) => assert_eq!(lower, prev + 1),
            }
            previous_upper = upper;
        }
        assert_eq!(previous_upper, None);
        assert!(AdvisoryBand::Good < AdvisoryBand::Hazardous);
    }

    #[test]
    fn test_good_band_text() {
        let summary = AdvisoryBand::classify(42.0).unwrap().summary();
        assert_eq!(summary.label, "Good");
        assert_eq!(summary.message, "Air quality is healthy.");
        assert_eq!(summary.advice, "Enjoy outdoor activities.");
    }
}
