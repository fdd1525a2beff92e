//! Forecast record model and its natural key

use serde::{Deserialize, Serialize};

/// Dataset header, in column order
pub const DATASET_COLUMNS: [&str; 14] = [
    "mountain",
    "date",
    "elevation",
    "time",
    "wind",
    "summary",
    "rain",
    "snow",
    "max_temperature",
    "min_temperature",
    "chill",
    "freezing_level",
    "sunrise",
    "sunset",
];

/// One forecast row for a mountain, date, elevation and time slot.
///
/// All payload fields are kept as the cleaned text the site shows;
/// interpreting units and numbers is left to downstream consumers.
/// Field order matches [`DATASET_COLUMNS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub mountain: String,
    /// ISO date (`YYYY-MM-DD`)
    pub date: String,
    pub elevation: String,
    /// Time slot label, e.g. `AM`, `PM`, `night`
    pub time: String,
    pub wind: String,
    pub summary: String,
    pub rain: String,
    pub snow: String,
    pub max_temperature: String,
    pub min_temperature: String,
    pub chill: String,
    pub freezing_level: String,
    pub sunrise: String,
    pub sunset: String,
}

/// Identity of a forecast row: (mountain, date, elevation, time)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NaturalKey {
    pub mountain: String,
    pub date: String,
    pub elevation: String,
    pub time: String,
}

impl ForecastRecord {
    #[must_use]
    pub fn key(&self) -> NaturalKey {
        NaturalKey {
            mountain: self.mountain.clone(),
            date: self.date.clone(),
            elevation: self.elevation.clone(),
            time: self.time.clone(),
        }
    }

    /// Overwrite every payload field with `other`'s, leaving the key untouched
    pub fn update_payload(&mut self, other: &ForecastRecord) {
        self.wind.clone_from(&other.wind);
        self.summary.clone_from(&other.summary);
        self.rain.clone_from(&other.rain);
        self.snow.clone_from(&other.snow);
        self.max_temperature.clone_from(&other.max_temperature);
        self.min_temperature.clone_from(&other.min_temperature);
        self.chill.clone_from(&other.chill);
        self.freezing_level.clone_from(&other.freezing_level);
        self.sunrise.clone_from(&other.sunrise);
        self.sunset.clone_from(&other.sunset);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(time: &str, wind: &str) -> ForecastRecord {
        ForecastRecord {
            mountain: "Mount Rainier".to_string(),
            date: "2026-10-17".to_string(),
            elevation: "4392".to_string(),
            time: time.to_string(),
            wind: wind.to_string(),
            summary: "clear".to_string(),
            rain: "-".to_string(),
            snow: "-".to_string(),
            max_temperature: "-8".to_string(),
            min_temperature: "-12".to_string(),
            chill: "-21".to_string(),
            freezing_level: "2950".to_string(),
            sunrise: "7:31".to_string(),
            sunset: "18:12".to_string(),
        }
    }

    #[test]
    fn test_key_ignores_payload() {
        let a = record("AM", "Calm");
        let b = record("AM", "Strong gale from the N");
        assert_eq!(a.key(), b.key());
        assert_ne!(a.key(), record("PM", "Calm").key());
    }

    #[test]
    fn test_update_payload_keeps_key() {
        let mut prior = record("AM", "Calm");
        let mut newer = record("AM", "Light breeze from the WNW");
        newer.mountain = "Other".to_string();
        prior.update_payload(&newer);
        assert_eq!(prior.wind, "Light breeze from the WNW");
        assert_eq!(prior.mountain, "Mount Rainier");
    }
}
