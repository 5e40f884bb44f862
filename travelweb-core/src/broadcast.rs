//! Resolution of forecast issuance windows.
//!
//! The forecast service publishes three products on different schedules, and
//! each query must name the issuance it wants via `base_date`/`base_time`.
//! A batch is not queryable immediately at its nominal issuance time; these
//! resolvers pick the most recent issuance that is already safe to request.
//!
//! All three take the reference instant as a parameter (service-local wall
//! clock, i.e. KST for the real provider) so callers can freeze time in tests;
//! `chrono::Local::now().naive_local()` is the production input.

use chrono::{Duration, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Issuance hours of the village forecast, eight per day.
const VILLAGE_ISSUE_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];
/// Minutes past the half-hour issuance before the hourly forecast is queryable.
const ULTRA_FCST_SAFE_MINUTE: u32 = 45;
/// Minutes past a village issuance before it is queryable.
const VILLAGE_SAFE_MINUTE: u32 = 10;

/// A resolved forecast issuance, formatted as the provider's query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastWindow {
    /// Issuance date, `YYYYMMDD`.
    pub base_date: String,
    /// Issuance time, `HHmm`.
    pub base_time: String,
}

fn window(at: NaiveDateTime, base_time: String) -> ForecastWindow {
    ForecastWindow { base_date: at.format("%Y%m%d").to_string(), base_time }
}

/// Window for the near-real-time observation product (issued on the hour).
///
/// Returns the current hour's issuance even within the provider's ~10 minute
/// processing lag: the provider keeps serving the previous hour's rows under
/// the new base time until processing completes, so stepping back is not
/// required here the way it is for [`ultra_fcst_window`].
pub fn ncst_window(now: NaiveDateTime) -> ForecastWindow {
    window(now, format!("{:02}00", now.hour()))
}

/// Window for the hourly short-term forecast (issued at HH:30, queryable
/// from HH:45).
///
/// Before the safe minute the previous hour's issuance is the newest one
/// available; the step back rolls the date when it crosses midnight.
pub fn ultra_fcst_window(now: NaiveDateTime) -> ForecastWindow {
    let issued = if now.minute() < ULTRA_FCST_SAFE_MINUTE { now - Duration::hours(1) } else { now };
    window(issued, format!("{:02}30", issued.hour()))
}

/// Window for the village forecast (issued eight times a day, queryable ten
/// minutes after each issuance).
///
/// Picks the latest issuance hour at or before the reference hour. Before
/// 02:10 the newest queryable issuance is still the previous day's 23:00.
pub fn village_window(now: NaiveDateTime) -> ForecastWindow {
    let hour = now.hour();

    if hour < VILLAGE_ISSUE_HOURS[0]
        || (hour == VILLAGE_ISSUE_HOURS[0] && now.minute() < VILLAGE_SAFE_MINUTE)
    {
        return window(now - Duration::days(1), "2300".to_string());
    }

    let issue = VILLAGE_ISSUE_HOURS
        .iter()
        .rev()
        .copied()
        .find(|&h| hour >= h)
        .unwrap_or(VILLAGE_ISSUE_HOURS[0]);

    window(now, format!("{issue:02}00"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .expect("valid test instant")
    }

    fn win(date: &str, time: &str) -> ForecastWindow {
        ForecastWindow { base_date: date.to_string(), base_time: time.to_string() }
    }

    #[test]
    fn ncst_uses_current_hour() {
        assert_eq!(ncst_window(at(2024, 6, 15, 9, 31, 0)), win("20240615", "0900"));
    }

    #[test]
    fn ncst_keeps_current_hour_inside_processing_lag() {
        // Deliberately no step-back here, unlike the hourly forecast.
        assert_eq!(ncst_window(at(2024, 6, 15, 9, 3, 0)), win("20240615", "0900"));
    }

    #[test]
    fn ultra_fcst_steps_back_before_safe_minute() {
        assert_eq!(ultra_fcst_window(at(2024, 6, 15, 10, 44, 59)), win("20240615", "0930"));
        assert_eq!(ultra_fcst_window(at(2024, 6, 15, 10, 45, 0)), win("20240615", "1030"));
    }

    #[test]
    fn ultra_fcst_rolls_date_across_midnight() {
        assert_eq!(ultra_fcst_window(at(2024, 6, 15, 0, 20, 0)), win("20240614", "2330"));
    }

    #[test]
    fn ultra_fcst_rolls_across_month_and_year() {
        assert_eq!(ultra_fcst_window(at(2024, 3, 1, 0, 10, 0)), win("20240229", "2330"));
        assert_eq!(ultra_fcst_window(at(2024, 1, 1, 0, 0, 0)), win("20231231", "2330"));
    }

    #[test]
    fn village_picks_latest_issuance_at_or_before_now() {
        assert_eq!(village_window(at(2024, 6, 15, 14, 0, 0)), win("20240615", "1400"));
        assert_eq!(village_window(at(2024, 6, 15, 16, 59, 0)), win("20240615", "1400"));
        assert_eq!(village_window(at(2024, 6, 15, 23, 59, 0)), win("20240615", "2300"));
    }

    #[test]
    fn village_before_0210_uses_previous_day() {
        assert_eq!(village_window(at(2024, 6, 15, 1, 59, 0)), win("20240614", "2300"));
        assert_eq!(village_window(at(2024, 6, 15, 2, 9, 59)), win("20240614", "2300"));
        assert_eq!(village_window(at(2024, 6, 15, 2, 10, 0)), win("20240615", "0200"));
    }

    #[test]
    fn village_rolls_across_year_boundary() {
        assert_eq!(village_window(at(2024, 1, 1, 0, 5, 0)), win("20231231", "2300"));
    }

    #[test]
    fn resolvers_are_deterministic() {
        let now = at(2024, 6, 15, 11, 44, 59);
        assert_eq!(ncst_window(now), ncst_window(now));
        assert_eq!(ultra_fcst_window(now), ultra_fcst_window(now));
        assert_eq!(village_window(now), village_window(now));
    }
}
