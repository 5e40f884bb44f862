//! Client for the Korea Tourism Organization content service (KorService 2).

use anyhow::{Result, bail};
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;

use crate::client::{Page, fetch_page};

const BASE_URL: &str = "https://apis.data.go.kr/B551011/KorService2";
const SERVICE: &str = "tour service";
const OK_CODE: &str = "0000";

const MOBILE_OS: &str = "ETC";
const MOBILE_APP: &str = "TravelWeb";

/// Sort orders accepted by the list endpoints.
pub mod arrange {
    pub const TITLE: &str = "A";
    pub const MODIFIED: &str = "C";
    pub const CREATED: &str = "D";
    pub const TITLE_WITH_IMAGE: &str = "O";
    pub const MODIFIED_WITH_IMAGE: &str = "Q";
    pub const CREATED_WITH_IMAGE: &str = "R";
}

/// Content type ids used by the content service.
pub mod content_type {
    pub const TOURIST_SPOT: &str = "12";
    pub const CULTURAL_FACILITY: &str = "14";
    pub const FESTIVAL: &str = "15";
    pub const TRAVEL_COURSE: &str = "25";
    pub const LEPORTS: &str = "28";
    pub const ACCOMMODATION: &str = "32";
    pub const SHOPPING: &str = "38";
    pub const RESTAURANT: &str = "39";
}

/// Shared optional filters for the list endpoints.
#[derive(Debug, Clone, Default)]
pub struct ListOptions {
    pub num_of_rows: Option<u32>,
    pub page_no: Option<u32>,
    pub arrange: Option<String>,
    pub content_type_id: Option<String>,
    pub area_code: Option<String>,
    pub sigungu_code: Option<String>,
    pub cat1: Option<String>,
    pub cat2: Option<String>,
    pub cat3: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TourClient {
    service_key: String,
    http: Client,
}

impl TourClient {
    pub fn new(service_key: String) -> Self {
        Self { service_key, http: Client::new() }
    }

    fn base_query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("serviceKey", self.service_key.clone()),
            ("MobileOS", MOBILE_OS.to_string()),
            ("MobileApp", MOBILE_APP.to_string()),
            ("_type", "json".to_string()),
        ]
    }

    fn push_options(
        query: &mut Vec<(&'static str, String)>,
        opts: &ListOptions,
        default_rows: u32,
        default_arrange: &str,
    ) {
        query.push(("numOfRows", opts.num_of_rows.unwrap_or(default_rows).to_string()));
        query.push(("pageNo", opts.page_no.unwrap_or(1).to_string()));
        query.push((
            "arrange",
            opts.arrange.clone().unwrap_or_else(|| default_arrange.to_string()),
        ));
        if let Some(v) = &opts.content_type_id {
            query.push(("contentTypeId", v.clone()));
        }
        if let Some(v) = &opts.area_code {
            query.push(("areaCode", v.clone()));
        }
        if let Some(v) = &opts.sigungu_code {
            query.push(("sigunguCode", v.clone()));
        }
        if let Some(v) = &opts.cat1 {
            query.push(("cat1", v.clone()));
        }
        if let Some(v) = &opts.cat2 {
            query.push(("cat2", v.clone()));
        }
        if let Some(v) = &opts.cat3 {
            query.push(("cat3", v.clone()));
        }
    }

    /// Area-based content listing.
    pub async fn area_based_list(&self, opts: &ListOptions) -> Result<Page<TouristSpot>> {
        let mut query = self.base_query();
        Self::push_options(&mut query, opts, 10, arrange::MODIFIED);

        let url = format!("{BASE_URL}/areaBasedList2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Location-based content listing around a point (mapx = longitude,
    /// mapy = latitude, radius in meters, default 1000).
    pub async fn location_based_list(
        &self,
        map_x: f64,
        map_y: f64,
        radius_m: Option<u32>,
        opts: &ListOptions,
    ) -> Result<Page<TouristSpot>> {
        let mut query = self.base_query();
        Self::push_options(&mut query, opts, 10, arrange::MODIFIED);
        query.push(("mapX", map_x.to_string()));
        query.push(("mapY", map_y.to_string()));
        query.push(("radius", radius_m.unwrap_or(1000).to_string()));

        let url = format!("{BASE_URL}/locationBasedList2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Keyword search over content titles.
    pub async fn search_keyword(&self, keyword: &str, opts: &ListOptions) -> Result<Page<TouristSpot>> {
        if keyword.trim().is_empty() {
            bail!("keyword is required");
        }

        let mut query = self.base_query();
        Self::push_options(&mut query, opts, 10, arrange::MODIFIED);
        query.push(("keyword", keyword.to_string()));

        let url = format!("{BASE_URL}/searchKeyword2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Festivals starting in a date range (`YYYYMMDD`; end date optional).
    pub async fn search_festival(
        &self,
        event_start_date: &str,
        event_end_date: Option<&str>,
        opts: &ListOptions,
    ) -> Result<Page<Festival>> {
        if event_start_date.len() != 8 || !event_start_date.bytes().all(|b| b.is_ascii_digit()) {
            bail!("eventStartDate is required (format: YYYYMMDD), got '{event_start_date}'");
        }

        let mut query = self.base_query();
        Self::push_options(&mut query, opts, 10, arrange::MODIFIED);
        query.push(("eventStartDate", event_start_date.to_string()));
        if let Some(end) = event_end_date {
            query.push(("eventEndDate", end.to_string()));
        }

        let url = format!("{BASE_URL}/searchFestival2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Common detail fields (address, overview, map coordinates, image).
    pub async fn detail_common(
        &self,
        content_id: &str,
        content_type_id: &str,
    ) -> Result<Page<DetailCommon>> {
        if content_id.is_empty() || content_type_id.is_empty() {
            bail!("contentId and contentTypeId are required");
        }

        let mut query = self.base_query();
        query.push(("contentId", content_id.to_string()));
        query.push(("contentTypeId", content_type_id.to_string()));
        for flag in ["defaultYN", "firstImageYN", "areacodeYN", "addrinfoYN", "mapinfoYN", "overviewYN"]
        {
            query.push((flag, "Y".to_string()));
        }

        let url = format!("{BASE_URL}/detailCommon2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Type-specific intro fields. The shape varies per content type, so rows
    /// are returned as raw JSON objects.
    pub async fn detail_intro(
        &self,
        content_id: &str,
        content_type_id: &str,
    ) -> Result<Page<serde_json::Value>> {
        if content_id.is_empty() || content_type_id.is_empty() {
            bail!("contentId and contentTypeId are required");
        }

        let mut query = self.base_query();
        query.push(("contentId", content_id.to_string()));
        query.push(("contentTypeId", content_type_id.to_string()));

        let url = format!("{BASE_URL}/detailIntro2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Gallery images for one content item.
    pub async fn detail_image(&self, content_id: &str) -> Result<Page<ImageInfo>> {
        if content_id.is_empty() {
            bail!("contentId is required");
        }

        let mut query = self.base_query();
        query.push(("contentId", content_id.to_string()));
        query.push(("imageYN", "Y".to_string()));
        query.push(("subImageYN", "Y".to_string()));
        query.push(("numOfRows", "10".to_string()));
        query.push(("pageNo", "1".to_string()));

        let url = format!("{BASE_URL}/detailImage2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Area (province/city) codes; pass a parent `area_code` for districts.
    pub async fn area_code(&self, area_code: Option<&str>) -> Result<Page<AreaCode>> {
        let mut query = self.base_query();
        query.push(("numOfRows", "100".to_string()));
        query.push(("pageNo", "1".to_string()));
        if let Some(code) = area_code {
            query.push(("areaCode", code.to_string()));
        }

        let url = format!("{BASE_URL}/areaCode2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Service category codes; pass cat1/cat2 to descend the hierarchy.
    pub async fn category_code(
        &self,
        cat1: Option<&str>,
        cat2: Option<&str>,
    ) -> Result<Page<CategoryCode>> {
        let mut query = self.base_query();
        query.push(("numOfRows", "100".to_string()));
        query.push(("pageNo", "1".to_string()));
        if let Some(v) = cat1 {
            query.push(("cat1", v.to_string()));
        }
        if let Some(v) = cat2 {
            query.push(("cat2", v.to_string()));
        }

        let url = format!("{BASE_URL}/categoryCode2");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }
}

/// Format a date the way the service's date parameters expect.
pub fn format_yyyymmdd(date: NaiveDate) -> String {
    date.format("%Y%m%d").to_string()
}

/// Inclusive `(start, end)` range of `days` days from `start`, for festival
/// queries.
pub fn date_range(start: NaiveDate, days: u32) -> (String, String) {
    let end = start + chrono::Duration::days(i64::from(days));
    (format_yyyymmdd(start), format_yyyymmdd(end))
}

/// One content row from the list/search endpoints.
#[derive(Debug, Clone, Deserialize)]
pub struct TouristSpot {
    #[serde(rename = "contentid")]
    pub content_id: String,
    #[serde(rename = "contenttypeid")]
    pub content_type_id: String,
    pub title: String,
    #[serde(default)]
    pub addr1: String,
    pub addr2: Option<String>,
    #[serde(rename = "firstimage")]
    pub first_image: Option<String>,
    #[serde(rename = "firstimage2")]
    pub first_image2: Option<String>,
    #[serde(rename = "areacode")]
    pub area_code: Option<String>,
    #[serde(rename = "sigungucode")]
    pub sigungu_code: Option<String>,
    pub cat1: Option<String>,
    pub cat2: Option<String>,
    pub cat3: Option<String>,
    /// Longitude, decimal degrees as a string.
    #[serde(rename = "mapx")]
    pub map_x: Option<String>,
    /// Latitude, decimal degrees as a string.
    #[serde(rename = "mapy")]
    pub map_y: Option<String>,
    pub tel: Option<String>,
    pub zipcode: Option<String>,
    pub homepage: Option<String>,
    pub overview: Option<String>,
    #[serde(rename = "createdtime", default)]
    pub created_time: String,
    #[serde(rename = "modifiedtime", default)]
    pub modified_time: String,
}

impl TouristSpot {
    /// Decimal coordinate for the weather composers, when the row has one.
    pub fn coordinate(&self) -> Option<(f64, f64)> {
        let latitude = self.map_y.as_deref()?.parse().ok()?;
        let longitude = self.map_x.as_deref()?.parse().ok()?;
        Some((latitude, longitude))
    }
}

/// One festival row; carries the common content fields plus the event window.
#[derive(Debug, Clone, Deserialize)]
pub struct Festival {
    #[serde(flatten)]
    pub spot: TouristSpot,
    #[serde(rename = "eventstartdate")]
    pub event_start_date: String,
    #[serde(rename = "eventenddate")]
    pub event_end_date: String,
    #[serde(rename = "eventplace")]
    pub event_place: Option<String>,
    #[serde(rename = "playtime")]
    pub play_time: Option<String>,
    pub sponsor1: Option<String>,
    pub sponsor2: Option<String>,
    #[serde(rename = "usetimefestival")]
    pub use_time_festival: Option<String>,
}

/// One detail-common row.
#[derive(Debug, Clone, Deserialize)]
pub struct DetailCommon {
    #[serde(flatten)]
    pub spot: TouristSpot,
    #[serde(rename = "telname")]
    pub tel_name: Option<String>,
}

/// One gallery-image row.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageInfo {
    #[serde(rename = "contentid")]
    pub content_id: String,
    #[serde(rename = "originimgurl")]
    pub origin_img_url: String,
    #[serde(rename = "smallimageurl")]
    pub small_image_url: String,
    #[serde(rename = "serialnum")]
    pub serial_num: Option<String>,
}

/// One area-code row.
#[derive(Debug, Clone, Deserialize)]
pub struct AreaCode {
    pub code: String,
    pub name: String,
    pub rnum: u32,
}

/// One category-code row.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryCode {
    pub code: String,
    pub name: String,
    pub rnum: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn tourist_spot_coordinate_parses_map_fields() {
        let json = r#"{
            "contentid": "126508", "contenttypeid": "12", "title": "경복궁",
            "addr1": "서울특별시 종로구", "mapx": "126.9769930, ", "mapy": "37.5788222",
            "createdtime": "20030911090000", "modifiedtime": "20240312134650"
        }"#;
        // Deliberately broken mapx: coordinate() must degrade to None, not panic.
        let spot: TouristSpot = serde_json::from_str(json).expect("valid spot");
        assert!(spot.coordinate().is_none());

        let json = json.replace("126.9769930, ", "126.9769930");
        let spot: TouristSpot = serde_json::from_str(&json).expect("valid spot");
        let (lat, lon) = spot.coordinate().expect("coordinate present");
        assert!((lat - 37.5788222).abs() < 1e-9);
        assert!((lon - 126.9769930).abs() < 1e-9);
    }

    #[test]
    fn festival_flattens_common_fields() {
        let json = r#"{
            "contentid": "3113671", "contenttypeid": "15", "title": "서울 불꽃축제",
            "addr1": "서울특별시 영등포구", "createdtime": "2024", "modifiedtime": "2024",
            "eventstartdate": "20241005", "eventenddate": "20241005",
            "eventplace": "여의도 한강공원"
        }"#;
        let festival: Festival = serde_json::from_str(json).expect("valid festival");
        assert_eq!(festival.spot.title, "서울 불꽃축제");
        assert_eq!(festival.event_start_date, "20241005");
        assert_eq!(festival.event_place.as_deref(), Some("여의도 한강공원"));
    }

    #[test]
    fn date_range_spans_requested_days() {
        let start = NaiveDate::from_ymd_opt(2024, 12, 20).expect("valid date");
        let (from, to) = date_range(start, 30);
        assert_eq!(from, "20241220");
        assert_eq!(to, "20250119");
    }

    #[tokio::test]
    async fn keyword_is_required() {
        let client = TourClient::new("KEY".into());
        let err = client.search_keyword("   ", &ListOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("keyword is required"));
    }

    #[tokio::test]
    async fn festival_start_date_is_validated() {
        let client = TourClient::new("KEY".into());
        let err = client
            .search_festival("2024-10-05", None, &ListOptions::default())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("YYYYMMDD"));
    }

    #[tokio::test]
    async fn detail_common_requires_both_ids() {
        let client = TourClient::new("KEY".into());
        let err = client.detail_common("", "12").await.unwrap_err();
        assert!(err.to_string().contains("contentId and contentTypeId are required"));
    }
}
