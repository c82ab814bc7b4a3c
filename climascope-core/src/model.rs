use serde::{Deserialize, Serialize};

use crate::error::SearchError;

/// Which of the two persistent input modalities is active.
///
/// Geolocation is not a mode of its own: it is a one-shot action that
/// switches to `Manual` and submits immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchMode {
    #[default]
    Prompt,
    Manual,
}

/// A geographic coordinate in degrees. `lat` in [-90, 90], `lon` in
/// [-180, 180]; range enforcement belongs to the remote service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub lat: f64,
    pub lon: f64,
}

impl GeoCoordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// The validated payload of a manual submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualInput {
    pub location_text: String,
    pub iso_date: String,
}

/// A location resolved by the geocoding endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodedPlace {
    pub coordinate: GeoCoordinate,
    pub label: String,
}

/// One historical-statistics lookup: a coordinate plus the month/day slice
/// of an ISO date.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherQuery {
    pub coordinate: GeoCoordinate,
    pub month: u32,
    pub day: u32,
}

impl WeatherQuery {
    /// Split a `YYYY-MM-DD` date into month and day.
    ///
    /// Calendar validity is deliberately not checked: Feb 30 passes
    /// through uncorrected and the remote service owns rejection. Only a
    /// string that does not split into three integer fields is refused.
    pub fn from_iso_date(coordinate: GeoCoordinate, iso_date: &str) -> Result<Self, SearchError> {
        fn invalid(iso_date: &str) -> SearchError {
            SearchError::validation(format!("Invalid date '{iso_date}'. Expected YYYY-MM-DD."))
        }

        let mut parts = iso_date.trim().splitn(3, '-');

        let _year = parts.next().ok_or_else(|| invalid(iso_date))?;
        let month = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| invalid(iso_date))?;
        let day = parts
            .next()
            .and_then(|p| p.parse::<u32>().ok())
            .ok_or_else(|| invalid(iso_date))?;

        Ok(Self { coordinate, month, day })
    }
}

/// A committed answer: rain likelihood and average temperature for one
/// place and calendar day.
///
/// `location_label` and `date_label` are human-readable; the statistics
/// endpoint does not know them, so the orchestrator attaches them after
/// the call returns. The prompt endpoint embeds its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherResult {
    pub coordinate: GeoCoordinate,
    /// Probability in [0, 1].
    pub chance_of_rain: f64,
    pub avg_temp_celsius: f64,
    pub samples_found: u32,
    pub location_label: String,
    pub date_label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_splits_iso_date() {
        let coord = GeoCoordinate::new(12.9, 77.6);
        let query = WeatherQuery::from_iso_date(coord, "2023-09-02").expect("valid date");

        assert_eq!(query.month, 9);
        assert_eq!(query.day, 2);
        assert_eq!(query.coordinate, coord);
    }

    #[test]
    fn query_does_not_check_calendar_validity() {
        let coord = GeoCoordinate::new(0.0, 0.0);
        let query = WeatherQuery::from_iso_date(coord, "2023-02-30").expect("passes through");

        assert_eq!(query.month, 2);
        assert_eq!(query.day, 30);
    }

    #[test]
    fn query_rejects_malformed_date() {
        let coord = GeoCoordinate::new(0.0, 0.0);

        for bad in ["", "2023", "2023-09", "not-a-date", "2023-9x-02"] {
            let err = WeatherQuery::from_iso_date(coord, bad).unwrap_err();
            assert!(matches!(err, SearchError::Validation(_)), "{bad:?}");
        }
    }
}
