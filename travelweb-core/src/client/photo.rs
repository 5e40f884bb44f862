//! Client for the tourism photo-contest award service (PhokoAwrdService).

use anyhow::{Result, bail};
use chrono::{NaiveDate, NaiveDateTime};
use reqwest::Client;
use serde::Deserialize;

use crate::client::{Page, fetch_page};

const BASE_URL: &str = "https://apis.data.go.kr/B551011/PhokoAwrdService";
const SERVICE: &str = "photo award service";
const OK_CODE: &str = "0000";

const MOBILE_OS: &str = "ETC";
const MOBILE_APP: &str = "TravelWeb";

/// Optional filters for the award list endpoints.
#[derive(Debug, Clone, Default)]
pub struct AwardListOptions {
    pub num_of_rows: Option<u32>,
    pub page_no: Option<u32>,
    /// Sort order; defaults to modified-date descending ("C").
    pub arrange: Option<String>,
    /// Modified-since filter (`YYMMDD`).
    pub modified_since: Option<String>,
    /// Legal-district province code.
    pub region_code: Option<String>,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct PhotoAwardClient {
    service_key: String,
    http: Client,
}

impl PhotoAwardClient {
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

    fn push_options(query: &mut Vec<(&'static str, String)>, opts: &AwardListOptions) {
        query.push(("numOfRows", opts.num_of_rows.unwrap_or(10).to_string()));
        query.push(("pageNo", opts.page_no.unwrap_or(1).to_string()));
        query.push(("arrange", opts.arrange.clone().unwrap_or_else(|| "C".to_string())));
        if let Some(v) = &opts.modified_since {
            query.push(("mdfcnDt", v.clone()));
        }
        if let Some(v) = &opts.region_code {
            query.push(("lDongRegnCd", v.clone()));
        }
        if let Some(v) = &opts.keyword {
            query.push(("keyword", v.clone()));
        }
    }

    /// Province codes of the legal-district registry (17 entries nationwide).
    pub async fn region_codes(&self) -> Result<Vec<RegionCode>> {
        let mut query = self.base_query();
        query.push(("numOfRows", "20".to_string()));
        query.push(("pageNo", "1".to_string()));

        let url = format!("{BASE_URL}/ldongCode");
        let page = fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await?;
        Ok(page.items)
    }

    /// Award listing, filterable by keyword and region.
    pub async fn award_list(&self, opts: &AwardListOptions) -> Result<Page<PhotoAwardItem>> {
        let mut query = self.base_query();
        Self::push_options(&mut query, opts);

        let url = format!("{BASE_URL}/phokoAwrdList");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Award listing including the display flag, for synchronization.
    pub async fn award_sync_list(
        &self,
        opts: &AwardListOptions,
        show_flag: Option<&str>,
    ) -> Result<Page<PhotoAwardSyncItem>> {
        let mut query = self.base_query();
        Self::push_options(&mut query, opts);
        query.push(("showflag", show_flag.unwrap_or("1").to_string()));

        let url = format!("{BASE_URL}/phokoAwrdSyncList");
        fetch_page(&self.http, SERVICE, &url, OK_CODE, &query).await
    }

    /// Keyword search returning parsed awards.
    pub async fn search_awards(
        &self,
        keyword: &str,
        opts: &AwardListOptions,
    ) -> Result<Vec<PhotoAward>> {
        if keyword.trim().is_empty() {
            bail!("keyword is required");
        }

        let opts = AwardListOptions { keyword: Some(keyword.to_string()), ..opts.clone() };
        let page = self.award_list(&opts).await?;
        Ok(page.items.iter().map(PhotoAward::from_item).collect())
    }

    /// Awards shot in one province, parsed.
    pub async fn awards_by_region(
        &self,
        region_code: &str,
        opts: &AwardListOptions,
    ) -> Result<Vec<PhotoAward>> {
        if region_code.is_empty() {
            bail!("regionCode is required");
        }

        let opts = AwardListOptions { region_code: Some(region_code.to_string()), ..opts.clone() };
        let page = self.award_list(&opts).await?;
        Ok(page.items.iter().map(PhotoAward::from_item).collect())
    }

    /// The `count` most recently modified awards, parsed.
    pub async fn latest_awards(&self, count: u32) -> Result<Vec<PhotoAward>> {
        let opts = AwardListOptions { num_of_rows: Some(count), ..AwardListOptions::default() };
        let page = self.award_list(&opts).await?;
        Ok(page.items.iter().map(PhotoAward::from_item).collect())
    }
}

/// One legal-district province code row.
#[derive(Debug, Clone, Deserialize)]
pub struct RegionCode {
    pub rnum: u32,
    #[serde(rename = "lDongRegnCd")]
    pub region_code: String,
    #[serde(rename = "lDongRegnNm")]
    pub region_name: String,
}

/// One raw award row.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoAwardItem {
    #[serde(rename = "contentId")]
    pub content_id: String,
    #[serde(rename = "koTitle", default)]
    pub ko_title: String,
    #[serde(rename = "enTitle", default)]
    pub en_title: String,
    #[serde(rename = "lDongRegnCd", default)]
    pub region_code: String,
    /// Shooting location (Korean).
    #[serde(rename = "koFilmst", default)]
    pub ko_location: String,
    #[serde(rename = "enFilmst", default)]
    pub en_location: String,
    /// Shooting month, `YYYYMM`.
    #[serde(rename = "filmDay", default)]
    pub film_day: String,
    /// Photographer (Korean).
    #[serde(rename = "koCmanNm", default)]
    pub ko_photographer: String,
    #[serde(rename = "enCmanNm", default)]
    pub en_photographer: String,
    /// Award designation, e.g. "스마트폰 부문 [입선]".
    #[serde(rename = "koWnprzDiz", default)]
    pub ko_award: String,
    #[serde(rename = "enWnprzDiz", default)]
    pub en_award: String,
    /// Comma-separated keywords.
    #[serde(rename = "koKeyWord", default)]
    pub ko_keywords: String,
    #[serde(rename = "enKeyWord", default)]
    pub en_keywords: String,
    #[serde(rename = "orgImage", default)]
    pub image_url: String,
    #[serde(rename = "thumbImage", default)]
    pub thumbnail_url: String,
    /// Registration timestamp, `YYYYMMDDHHmmss`.
    #[serde(rename = "regDt", default)]
    pub registered: String,
    /// Modification timestamp, `YYYYMMDDHHmmss`.
    #[serde(rename = "mdfcnDt", default)]
    pub modified: String,
}

/// One raw award row from the sync listing.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoAwardSyncItem {
    #[serde(flatten)]
    pub item: PhotoAwardItem,
    /// "1" when the content is currently displayed.
    #[serde(rename = "showflag", default)]
    pub show_flag: String,
}

/// An award row parsed into consumable fields.
#[derive(Debug, Clone, PartialEq)]
pub struct PhotoAward {
    pub id: String,
    pub title: String,
    pub english_title: String,
    pub location: String,
    pub region_code: String,
    pub photographer: String,
    pub award: String,
    pub award_category: String,
    pub award_rank: String,
    pub keywords: Vec<String>,
    /// Shooting month, `YYYY-MM` (verbatim input if malformed).
    pub film_month: String,
    pub image_url: String,
    pub thumbnail_url: String,
    pub registered_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
}

impl PhotoAward {
    pub fn from_item(item: &PhotoAwardItem) -> Self {
        let (award_category, award_rank) = parse_award(&item.ko_award);

        Self {
            id: item.content_id.clone(),
            title: item.ko_title.clone(),
            english_title: item.en_title.clone(),
            location: item.ko_location.clone(),
            region_code: item.region_code.clone(),
            photographer: item.ko_photographer.clone(),
            award: item.ko_award.clone(),
            award_category,
            award_rank,
            keywords: item
                .ko_keywords
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect(),
            film_month: format_film_month(&item.film_day),
            image_url: item.image_url.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            registered_at: parse_compact_datetime(&item.registered),
            modified_at: parse_compact_datetime(&item.modified),
        }
    }
}

/// Split "category [rank]" into its parts; no rank yields an empty rank.
pub fn parse_award(designation: &str) -> (String, String) {
    if let (Some(open), Some(close)) = (designation.find('['), designation.rfind(']')) {
        if open < close {
            let category = designation[..open].trim().to_string();
            let rank = designation[open + 1..close].trim().to_string();
            return (category, rank);
        }
    }

    (designation.trim().to_string(), String::new())
}

/// `YYYYMM` → `YYYY-MM`; anything else passes through verbatim.
pub fn format_film_month(film_day: &str) -> String {
    if film_day.len() == 6 && film_day.bytes().all(|b| b.is_ascii_digit()) {
        format!("{}-{}", &film_day[..4], &film_day[4..])
    } else {
        film_day.to_string()
    }
}

/// Lenient parse of the service's `YYYYMMDDHHmmss` timestamps; missing time
/// components default to midnight, malformed input yields `None`.
pub fn parse_compact_datetime(value: &str) -> Option<NaiveDateTime> {
    if value.len() < 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let field = |range: std::ops::Range<usize>| -> u32 {
        value.get(range).and_then(|s| s.parse().ok()).unwrap_or(0)
    };

    let date = NaiveDate::from_ymd_opt(value[..4].parse().ok()?, field(4..6), field(6..8))?;
    date.and_hms_opt(field(8..10), field(10..12), field(12..14))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_award_splits_category_and_rank() {
        let (category, rank) = parse_award("스마트폰 부문 [입선]");
        assert_eq!(category, "스마트폰 부문");
        assert_eq!(rank, "입선");
    }

    #[test]
    fn parse_award_without_rank_keeps_whole_designation() {
        let (category, rank) = parse_award("대상");
        assert_eq!(category, "대상");
        assert_eq!(rank, "");
    }

    #[test]
    fn film_month_formatting() {
        assert_eq!(format_film_month("202307"), "2023-07");
        assert_eq!(format_film_month("2023"), "2023");
        assert_eq!(format_film_month(""), "");
    }

    #[test]
    fn compact_datetime_parses_full_and_date_only_stamps() {
        let full = parse_compact_datetime("20240315093012").expect("full stamp");
        assert_eq!(full.format("%Y-%m-%d %H:%M:%S").to_string(), "2024-03-15 09:30:12");

        let date_only = parse_compact_datetime("20240315").expect("date-only stamp");
        assert_eq!(date_only.format("%H:%M:%S").to_string(), "00:00:00");

        assert!(parse_compact_datetime("not-a-date").is_none());
        assert!(parse_compact_datetime("2024").is_none());
    }

    #[test]
    fn from_item_parses_keywords_and_award() {
        let item = PhotoAwardItem {
            content_id: "3388".into(),
            ko_title: "한라산의 아침".into(),
            en_title: "Morning of Hallasan".into(),
            region_code: "50".into(),
            ko_location: "제주".into(),
            en_location: "Jeju".into(),
            film_day: "202311".into(),
            ko_photographer: "김사진".into(),
            en_photographer: "Kim".into(),
            ko_award: "풍경 부문 [금상]".into(),
            en_award: "Landscape [Gold]".into(),
            ko_keywords: "한라산, 일출, , 제주".into(),
            en_keywords: String::new(),
            image_url: "https://example.test/org.jpg".into(),
            thumbnail_url: "https://example.test/thumb.jpg".into(),
            registered: "20231201120000".into(),
            modified: "bad".into(),
        };

        let parsed = PhotoAward::from_item(&item);
        assert_eq!(parsed.award_category, "풍경 부문");
        assert_eq!(parsed.award_rank, "금상");
        assert_eq!(parsed.keywords, vec!["한라산", "일출", "제주"]);
        assert_eq!(parsed.film_month, "2023-11");
        assert!(parsed.registered_at.is_some());
        assert!(parsed.modified_at.is_none());
    }

    #[tokio::test]
    async fn search_requires_keyword() {
        let client = PhotoAwardClient::new("KEY".into());
        let err =
            client.search_awards("", &AwardListOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("keyword is required"));
    }

    #[tokio::test]
    async fn region_lookup_requires_code() {
        let client = PhotoAwardClient::new("KEY".into());
        let err =
            client.awards_by_region("", &AwardListOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("regionCode is required"));
    }
}
