//! REST clients for the three data.go.kr services.
//!
//! All three services speak the same JSON envelope dialect: a `response`
//! object with a `header` carrying a result code and a `body` carrying a
//! paginated item list. The only quirks are the per-service success code
//! ("00" for the weather service, "0000" for the tourism ones) and the fact
//! that a single-row page is emitted as a bare object instead of a
//! one-element array.

use crate::Config;
use crate::config::ApiId;
use anyhow::{Context, Result, anyhow};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;

pub mod photo;
pub mod tour;
pub mod weather;

/// Failure surfaced by a service call, once the request itself went through.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{service} request failed with status {status}: {body}")]
    Http { service: &'static str, status: StatusCode, body: String },

    #[error("{service} returned result code {code}: {message}")]
    Service { service: &'static str, code: String, message: String },
}

/// One page of results, flattened out of the envelope.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page_no: u32,
    pub num_of_rows: u32,
    pub total_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub response: EnvelopeResponse<T>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeResponse<T> {
    pub header: EnvelopeHeader,
    pub body: Option<EnvelopeBody<T>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeHeader {
    #[serde(rename = "resultCode")]
    pub result_code: String,
    #[serde(rename = "resultMsg")]
    pub result_msg: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeBody<T> {
    pub items: Option<EnvelopeItems<T>>,
    #[serde(rename = "numOfRows", default)]
    pub num_of_rows: u32,
    #[serde(rename = "pageNo", default)]
    pub page_no: u32,
    #[serde(rename = "totalCount", default)]
    pub total_count: u32,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EnvelopeItems<T> {
    pub item: OneOrMany<T>,
}

/// A page with a single row arrives as a bare object, not a one-element array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

/// Issue a GET, verify HTTP status and envelope result code, flatten the page.
pub(crate) async fn fetch_page<T>(
    http: &Client,
    service: &'static str,
    url: &str,
    ok_code: &str,
    query: &[(&str, String)],
) -> Result<Page<T>>
where
    T: DeserializeOwned,
{
    tracing::debug!(service, url, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .with_context(|| format!("Failed to send request to {service}"))?;

    let status = res.status();
    let body = res.text().await.with_context(|| format!("Failed to read {service} response body"))?;

    if !status.is_success() {
        return Err(ApiError::Http { service, status, body: truncate_body(&body) }.into());
    }

    let parsed: Envelope<T> =
        serde_json::from_str(&body).with_context(|| format!("Failed to parse {service} JSON"))?;

    let header = parsed.response.header;
    if header.result_code != ok_code {
        return Err(ApiError::Service {
            service,
            code: header.result_code,
            message: header.result_msg,
        }
        .into());
    }

    let body = parsed
        .response
        .body
        .ok_or_else(|| anyhow!("{service} response contained no body"))?;

    Ok(Page {
        items: body.items.map(|i| i.item.into_vec()).unwrap_or_default(),
        page_no: body.page_no,
        num_of_rows: body.num_of_rows,
        total_count: body.total_count,
    })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() <= MAX {
        return body.to_string();
    }

    // The services answer in Korean; cut on a char boundary, not at byte MAX.
    let cut = (0..=MAX).rev().find(|&i| body.is_char_boundary(i)).unwrap_or(0);
    format!("{}...", &body[..cut])
}

fn key_from_config(config: &Config, id: ApiId) -> Result<String> {
    config
        .service_key_for(id)
        .map(str::to_owned)
        .ok_or_else(|| {
            anyhow!(
                "No service key configured for '{id}'.\n\
                 Hint: run `travelweb configure` and enter your data.go.kr service key."
            )
        })
}

/// Construct the weather client from config.
pub fn weather_client_from_config(config: &Config) -> Result<weather::WeatherClient> {
    Ok(weather::WeatherClient::new(key_from_config(config, ApiId::Weather)?))
}

/// Construct the tour client from config.
pub fn tour_client_from_config(config: &Config) -> Result<tour::TourClient> {
    Ok(tour::TourClient::new(key_from_config(config, ApiId::Tour)?))
}

/// Construct the photo-award client from config.
pub fn photo_client_from_config(config: &Config) -> Result<photo::PhotoAwardClient> {
    Ok(photo::PhotoAwardClient::new(key_from_config(config, ApiId::PhotoAward)?))
}
