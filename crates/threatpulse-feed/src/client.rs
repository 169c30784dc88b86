use crate::error::{FeedError, Result};
use crate::window::FetchWindow;
use chrono::SecondsFormat;
use serde::Deserialize;
use std::time::Duration;

/// Identifying header required by the NVD API usage guidelines.
const USER_AGENT: &str = "ThreatPulse-CVE-Monitor/1.0";

/// Default NVD 2.0 CVE search endpoint. Public, no API key required.
pub const DEFAULT_FEED_ENDPOINT: &str = "https://services.nvd.nist.gov/rest/json/cves/2.0";

/// One page of raw feed results.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedPage {
    #[serde(default)]
    pub vulnerabilities: Vec<CveItem>,
    #[serde(default, rename = "totalResults")]
    pub total_results: u64,
}

/// One raw vulnerability entry as returned by the feed.
#[derive(Debug, Clone, Deserialize)]
pub struct CveItem {
    pub cve: Cve,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cve {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub descriptions: Vec<CveDescription>,
    /// Publication timestamp; NVD emits naive ISO-8601 without an offset.
    #[serde(default)]
    pub published: Option<String>,
    #[serde(default)]
    pub references: Vec<CveReference>,
    #[serde(default)]
    pub metrics: Option<CveMetrics>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CveDescription {
    pub lang: String,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CveReference {
    pub url: String,
}

/// CVSS metric blocks keyed by scheme version, newest first in preference.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CveMetrics {
    #[serde(default, rename = "cvssMetricV31")]
    pub cvss_metric_v31: Vec<CvssMetric>,
    #[serde(default, rename = "cvssMetricV30")]
    pub cvss_metric_v30: Vec<CvssMetric>,
    #[serde(default, rename = "cvssMetricV2")]
    pub cvss_metric_v2: Vec<CvssMetric>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CvssMetric {
    #[serde(rename = "cvssData")]
    pub cvss_data: CvssData,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CvssData {
    #[serde(rename = "baseScore")]
    pub base_score: f64,
}

/// HTTP client for the public NVD CVE feed.
///
/// Performs exactly one paginated GET per call; the feed is never retried
/// internally, and a failed fetch fails the whole pipeline run.
pub struct FeedClient {
    http: reqwest::Client,
    endpoint: String,
    page_size: u32,
}

impl FeedClient {
    pub fn new(endpoint: impl Into<String>, page_size: u32, timeout_secs: u64) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
            page_size,
        })
    }

    /// Fetch one page of CVE records published within `window`.
    pub async fn fetch_window(&self, window: &FetchWindow) -> Result<FeedPage> {
        let start = window.start.to_rfc3339_opts(SecondsFormat::Millis, true);
        let end = window.end.to_rfc3339_opts(SecondsFormat::Millis, true);

        let resp = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("pubStartDate", start),
                ("pubEndDate", end),
                ("resultsPerPage", self.page_size.to_string()),
            ])
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(FeedError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let page: FeedPage = serde_json::from_str(&body)?;
        Ok(page)
    }
}
