//! Client for the KMA short-term forecast service (VilageFcstInfoService 2.0).
//!
//! Every endpoint takes the same four positional query parameters: the
//! issuance window (`base_date`/`base_time`, see [`crate::broadcast`]) and
//! the grid cell (`nx`/`ny`, see [`crate::grid`]). The composers at the
//! bottom chain projection, window resolution, fetch, and decoding the way
//! the original hooks did.

use anyhow::Result;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::broadcast::{ForecastWindow, ncst_window, ultra_fcst_window, village_window};
use crate::client::fetch_page;
use crate::decode::{WeatherObservation, decode_observation};
use crate::grid::{GridCell, project_to_grid};

const BASE_URL: &str = "http://apis.data.go.kr/1360000/VilageFcstInfoService_2.0";
const SERVICE: &str = "KMA forecast service";
const OK_CODE: &str = "00";

/// One page is enough for a single cell/window; the largest product
/// (village forecast) tops out well under this.
const NUM_OF_ROWS: u32 = 1000;

#[derive(Debug, Clone)]
pub struct WeatherClient {
    service_key: String,
    http: Client,
}

impl WeatherClient {
    pub fn new(service_key: String) -> Self {
        Self { service_key, http: Client::new() }
    }

    fn query(&self, cell: GridCell, window: &ForecastWindow) -> Vec<(&'static str, String)> {
        vec![
            ("serviceKey", self.service_key.clone()),
            ("dataType", "JSON".to_string()),
            ("numOfRows", NUM_OF_ROWS.to_string()),
            ("pageNo", "1".to_string()),
            ("base_date", window.base_date.clone()),
            ("base_time", window.base_time.clone()),
            ("nx", cell.nx.to_string()),
            ("ny", cell.ny.to_string()),
        ]
    }

    /// Near-real-time observation rows for one cell and issuance.
    pub async fn ultra_srt_ncst(
        &self,
        cell: GridCell,
        window: &ForecastWindow,
    ) -> Result<Vec<NcstRow>> {
        let url = format!("{BASE_URL}/getUltraSrtNcst");
        let page = fetch_page(&self.http, SERVICE, &url, OK_CODE, &self.query(cell, window)).await?;
        Ok(page.items)
    }

    /// Hourly short-term forecast rows for one cell and issuance.
    pub async fn ultra_srt_fcst(
        &self,
        cell: GridCell,
        window: &ForecastWindow,
    ) -> Result<Vec<FcstRow>> {
        let url = format!("{BASE_URL}/getUltraSrtFcst");
        let page = fetch_page(&self.http, SERVICE, &url, OK_CODE, &self.query(cell, window)).await?;
        Ok(page.items)
    }

    /// Village forecast rows for one cell and issuance.
    pub async fn village_fcst(
        &self,
        cell: GridCell,
        window: &ForecastWindow,
    ) -> Result<Vec<FcstRow>> {
        let url = format!("{BASE_URL}/getVilageFcst");
        let page = fetch_page(&self.http, SERVICE, &url, OK_CODE, &self.query(cell, window)).await?;
        Ok(page.items)
    }

    /// Current conditions at a geographic coordinate.
    ///
    /// Projects the coordinate onto the forecast grid, resolves the newest
    /// observation issuance relative to `now` (service-local wall clock), and
    /// folds the returned rows into one observation.
    pub async fn current_observation(
        &self,
        latitude: f64,
        longitude: f64,
        now: NaiveDateTime,
    ) -> Result<WeatherObservation> {
        let cell = project_to_grid(latitude, longitude);
        let window = ncst_window(now);
        let rows = self.ultra_srt_ncst(cell, &window).await?;

        Ok(decode_observation(rows.iter().map(|r| (r.category.as_str(), r.obsr_value.as_str()))))
    }

    /// Short-term forecast conditions at a geographic coordinate.
    ///
    /// Like [`Self::current_observation`] but against the hourly forecast
    /// product; rows for several forecast hours fold last-write-wins, so the
    /// result reflects the furthest hour in the response.
    pub async fn forecast_observation(
        &self,
        latitude: f64,
        longitude: f64,
        now: NaiveDateTime,
    ) -> Result<WeatherObservation> {
        let cell = project_to_grid(latitude, longitude);
        let window = ultra_fcst_window(now);
        let rows = self.ultra_srt_fcst(cell, &window).await?;

        Ok(decode_observation(rows.iter().map(|r| (r.category.as_str(), r.fcst_value.as_str()))))
    }

    /// Village forecast conditions at a geographic coordinate.
    pub async fn village_observation(
        &self,
        latitude: f64,
        longitude: f64,
        now: NaiveDateTime,
    ) -> Result<WeatherObservation> {
        let cell = project_to_grid(latitude, longitude);
        let window = village_window(now);
        let rows = self.village_fcst(cell, &window).await?;

        Ok(decode_observation(rows.iter().map(|r| (r.category.as_str(), r.fcst_value.as_str()))))
    }
}

/// One near-real-time observation row.
#[derive(Debug, Clone, Deserialize)]
pub struct NcstRow {
    #[serde(rename = "baseDate")]
    pub base_date: String,
    #[serde(rename = "baseTime")]
    pub base_time: String,
    pub category: String,
    pub nx: serde_json::Value,
    pub ny: serde_json::Value,
    #[serde(rename = "obsrValue")]
    pub obsr_value: String,
}

/// One forecast row (hourly or village product).
#[derive(Debug, Clone, Deserialize)]
pub struct FcstRow {
    #[serde(rename = "baseDate")]
    pub base_date: String,
    #[serde(rename = "baseTime")]
    pub base_time: String,
    pub category: String,
    #[serde(rename = "fcstDate")]
    pub fcst_date: String,
    #[serde(rename = "fcstTime")]
    pub fcst_time: String,
    #[serde(rename = "fcstValue")]
    pub fcst_value: String,
    pub nx: serde_json::Value,
    pub ny: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ncst_row_deserializes_with_numeric_grid_fields() {
        // The service has emitted nx/ny both as numbers and as strings over
        // time; the row type must accept either.
        let json = r#"{
            "baseDate": "20240615", "baseTime": "0900",
            "category": "T1H", "nx": 60, "ny": 127, "obsrValue": "21.3"
        }"#;
        let row: NcstRow = serde_json::from_str(json).expect("valid row");
        assert_eq!(row.category, "T1H");
        assert_eq!(row.obsr_value, "21.3");
    }

    #[test]
    fn fcst_row_deserializes_with_string_grid_fields() {
        let json = r#"{
            "baseDate": "20240615", "baseTime": "0930",
            "category": "SKY", "fcstDate": "20240615", "fcstTime": "1000",
            "fcstValue": "1", "nx": "60", "ny": "127"
        }"#;
        let row: FcstRow = serde_json::from_str(json).expect("valid row");
        assert_eq!(row.fcst_value, "1");
        assert_eq!(row.fcst_time, "1000");
    }

    #[test]
    fn query_carries_window_and_cell() {
        let client = WeatherClient::new("KEY".into());
        let cell = GridCell { nx: 60, ny: 127 };
        let window = ForecastWindow {
            base_date: "20240615".into(),
            base_time: "0900".into(),
        };

        let query = client.query(cell, &window);
        assert!(query.contains(&("base_date", "20240615".to_string())));
        assert!(query.contains(&("base_time", "0900".to_string())));
        assert!(query.contains(&("nx", "60".to_string())));
        assert!(query.contains(&("ny", "127".to_string())));
        assert!(query.contains(&("dataType", "JSON".to_string())));
    }
}
