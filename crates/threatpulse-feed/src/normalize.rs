use crate::client::{CveDescription, CveItem, CveMetrics};
use chrono::{DateTime, NaiveDateTime, Utc};
use threatpulse_common::types::Severity;

/// Stored descriptions are capped at this many characters.
pub const MAX_DESCRIPTION_LEN: usize = 2000;

/// At most this many reference links are kept, in feed order.
pub const MAX_REFERENCE_LINKS: usize = 10;

/// Substituted when the feed record carries no description at all.
pub const NO_DESCRIPTION_PLACEHOLDER: &str = "No description available";

/// Fixed vocabulary for affected-product extraction. Iteration order is
/// preserved in the output so keyword lists are deterministic.
pub const PRODUCT_KEYWORDS: &[&str] = &[
    "linux",
    "windows",
    "apache",
    "nginx",
    "mysql",
    "postgresql",
    "docker",
    "kubernetes",
    "vmware",
    "cisco",
    "microsoft",
    "oracle",
    "ibm",
];

/// A feed record mapped into the internal vulnerability shape, ready to
/// persist.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedVulnerability {
    pub cve_id: String,
    pub description: String,
    pub cvss_score: Option<f64>,
    pub severity: Severity,
    pub published_at: DateTime<Utc>,
    pub reference_links: Vec<String>,
    pub affected_products: Vec<String>,
}

/// Why a raw feed record was dropped instead of normalized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("record has no CVE identifier")]
    MissingId,

    #[error("record '{cve_id}' has no parsable publication timestamp")]
    BadPublished { cve_id: String },
}

/// Map one raw feed record into a [`NormalizedVulnerability`].
///
/// Pure transform: score selection falls back v3.1 -> v3.0 -> v2, severity
/// derives from the score thresholds, the English description wins over the
/// first available one, and oversized text is truncated silently.
pub fn normalize(item: &CveItem) -> Result<NormalizedVulnerability, SkipReason> {
    let cve = &item.cve;

    let cve_id = match cve.id.as_deref().filter(|id| !id.is_empty()) {
        Some(id) => id.to_string(),
        None => return Err(SkipReason::MissingId),
    };

    let published_at = match cve.published.as_deref().and_then(parse_feed_timestamp) {
        Some(ts) => ts,
        None => return Err(SkipReason::BadPublished { cve_id }),
    };

    let cvss_score = select_base_score(cve.metrics.as_ref());
    let severity = Severity::from_score(cvss_score);

    let description = truncate_chars(&select_description(&cve.descriptions), MAX_DESCRIPTION_LEN);

    let reference_links: Vec<String> = cve
        .references
        .iter()
        .take(MAX_REFERENCE_LINKS)
        .map(|r| r.url.clone())
        .collect();

    let affected_products = extract_product_keywords(&description);

    Ok(NormalizedVulnerability {
        cve_id,
        description,
        cvss_score,
        severity,
        published_at,
        reference_links,
        affected_products,
    })
}

/// First present base score in strict scheme preference order.
fn select_base_score(metrics: Option<&CveMetrics>) -> Option<f64> {
    let metrics = metrics?;
    metrics
        .cvss_metric_v31
        .first()
        .or_else(|| metrics.cvss_metric_v30.first())
        .or_else(|| metrics.cvss_metric_v2.first())
        .map(|m| m.cvss_data.base_score)
}

fn select_description(descriptions: &[CveDescription]) -> String {
    descriptions
        .iter()
        .find(|d| d.lang == "en")
        .or_else(|| descriptions.first())
        .map(|d| d.value.clone())
        .unwrap_or_else(|| NO_DESCRIPTION_PLACEHOLDER.to_string())
}

/// Lowercase-substring containment test against the fixed vocabulary,
/// preserving vocabulary order.
fn extract_product_keywords(description: &str) -> Vec<String> {
    let lowered = description.to_lowercase();
    PRODUCT_KEYWORDS
        .iter()
        .filter(|kw| lowered.contains(**kw))
        .map(|kw| (*kw).to_string())
        .collect()
}

/// Truncate to at most `max` characters, never splitting a multi-byte char.
fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

/// NVD publishes naive ISO-8601 timestamps (`2024-01-02T03:04:05.123`);
/// accept an explicit offset too and treat the naive form as UTC.
fn parse_feed_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}
