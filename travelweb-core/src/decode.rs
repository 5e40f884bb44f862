//! Decoding of the forecast service's category/value rows.
//!
//! One response carries several rows for the same date/time/cell, each tagged
//! with a short category code ("T1H", "SKY", ...). Folding them yields a
//! single observation; unrecognized categories are skipped and unrecognized
//! sky/precipitation codes map to an explicit "unknown" label, so a partially
//! decoded observation is still usable.

use serde::{Deserialize, Serialize};

/// Label for category codes outside the documented set.
pub const UNKNOWN_LABEL: &str = "unknown";

/// One weather observation or forecast slice, folded from category rows.
///
/// Every field is optional: a field left `None` was not reported, which is
/// distinct from a reported zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeatherObservation {
    /// Air temperature, °C (T1H / TMP).
    pub temperature: Option<f64>,
    /// Relative humidity, % (REH).
    pub humidity: Option<f64>,
    /// Precipitation amount, verbatim provider string (RN1 / PCP).
    pub precipitation: Option<String>,
    /// Decoded precipitation type label (PTY).
    pub precipitation_type: Option<String>,
    /// Decoded sky condition label (SKY).
    pub sky_condition: Option<String>,
    /// Wind speed, m/s (WSD).
    pub wind_speed: Option<f64>,
    /// Wind direction, degrees (VEC).
    pub wind_direction: Option<f64>,
    /// Precipitation probability, % (POP).
    pub precipitation_probability: Option<f64>,
}

/// Human-readable label for a SKY category value.
pub fn sky_label(code: &str) -> &'static str {
    match code {
        "1" => "clear",
        "3" => "partly cloudy",
        "4" => "cloudy",
        _ => UNKNOWN_LABEL,
    }
}

/// Human-readable label for a PTY category value.
pub fn precipitation_type_label(code: &str) -> &'static str {
    match code {
        "0" => "none",
        "1" => "rain",
        "2" => "rain/snow",
        "3" => "snow",
        "4" => "shower",
        "5" => "raindrop",
        "6" => "raindrop/snow flurry",
        "7" => "snow flurry",
        _ => UNKNOWN_LABEL,
    }
}

/// Fold ordered `(category, value)` pairs into a [`WeatherObservation`].
///
/// The last pair wins if a category repeats. Unparseable numeric values leave
/// the field unset rather than failing the whole observation.
pub fn decode_observation<'a, I>(pairs: I) -> WeatherObservation
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut obs = WeatherObservation::default();

    for (category, value) in pairs {
        match category {
            "T1H" | "TMP" => obs.temperature = value.parse().ok(),
            "REH" => obs.humidity = value.parse().ok(),
            "RN1" | "PCP" => obs.precipitation = Some(value.to_string()),
            "PTY" => obs.precipitation_type = Some(precipitation_type_label(value).to_string()),
            "SKY" => obs.sky_condition = Some(sky_label(value).to_string()),
            "WSD" => obs.wind_speed = value.parse().ok(),
            "VEC" => obs.wind_direction = value.parse().ok(),
            "POP" => obs.precipitation_probability = value.parse().ok(),
            _ => {}
        }
    }

    obs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_a_typical_observation() {
        let obs = decode_observation([("T1H", "21.3"), ("REH", "55"), ("PTY", "0"), ("SKY", "1")]);

        assert_eq!(obs.temperature, Some(21.3));
        assert_eq!(obs.humidity, Some(55.0));
        assert_eq!(obs.precipitation_type.as_deref(), Some("none"));
        assert_eq!(obs.sky_condition.as_deref(), Some("clear"));
        assert_eq!(obs.wind_speed, None);
        assert_eq!(obs.precipitation_probability, None);
    }

    #[test]
    fn unknown_categories_are_skipped() {
        let with = decode_observation([
            ("T1H", "21.3"),
            ("REH", "55"),
            ("PTY", "0"),
            ("SKY", "1"),
            ("ZZZ", "99"),
        ]);
        let without =
            decode_observation([("T1H", "21.3"), ("REH", "55"), ("PTY", "0"), ("SKY", "1")]);
        assert_eq!(with, without);
    }

    #[test]
    fn unknown_codes_map_to_unknown_label() {
        assert_eq!(sky_label("9"), UNKNOWN_LABEL);
        assert_eq!(precipitation_type_label("42"), UNKNOWN_LABEL);

        let obs = decode_observation([("SKY", "9"), ("PTY", "42")]);
        assert_eq!(obs.sky_condition.as_deref(), Some(UNKNOWN_LABEL));
        assert_eq!(obs.precipitation_type.as_deref(), Some(UNKNOWN_LABEL));
    }

    #[test]
    fn last_write_wins_on_duplicate_categories() {
        let obs = decode_observation([("T1H", "10.0"), ("T1H", "12.5")]);
        assert_eq!(obs.temperature, Some(12.5));
    }

    #[test]
    fn unparseable_numbers_leave_field_unset() {
        let obs = decode_observation([("T1H", "not-a-number"), ("REH", "55")]);
        assert_eq!(obs.temperature, None);
        assert_eq!(obs.humidity, Some(55.0));
    }

    #[test]
    fn precipitation_amount_is_kept_verbatim() {
        // RN1/PCP are strings like "1mm 미만" and must not be coerced.
        let obs = decode_observation([("RN1", "1mm 미만")]);
        assert_eq!(obs.precipitation.as_deref(), Some("1mm 미만"));
    }

    #[test]
    fn village_forecast_categories() {
        let obs = decode_observation([("TMP", "28.0"), ("POP", "60"), ("PCP", "5.0mm")]);
        assert_eq!(obs.temperature, Some(28.0));
        assert_eq!(obs.precipitation_probability, Some(60.0));
        assert_eq!(obs.precipitation.as_deref(), Some("5.0mm"));
    }
}
