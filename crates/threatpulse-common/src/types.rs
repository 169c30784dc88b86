use serde::{Deserialize, Serialize};

/// Vulnerability severity tier, ordered from lowest to highest.
///
/// # Examples
///
/// ```
/// use threatpulse_common::types::Severity;
///
/// let sev: Severity = "high".parse().unwrap();
/// assert_eq!(sev, Severity::High);
/// assert_eq!(sev.to_string(), "high");
/// assert!(Severity::Critical > Severity::Low);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// Derive the severity tier from an optional CVSS base score.
    ///
    /// Thresholds are inclusive at the lower bound, exclusive at the upper:
    /// `>= 9.0` critical, `>= 7.0` high, `>= 4.0` medium, everything else
    /// (including a missing score) low.
    ///
    /// # Examples
    ///
    /// ```
    /// use threatpulse_common::types::Severity;
    ///
    /// assert_eq!(Severity::from_score(Some(9.8)), Severity::Critical);
    /// assert_eq!(Severity::from_score(Some(8.999)), Severity::High);
    /// assert_eq!(Severity::from_score(None), Severity::Low);
    /// ```
    pub fn from_score(score: Option<f64>) -> Self {
        match score {
            Some(s) if s >= 9.0 => Severity::Critical,
            Some(s) if s >= 7.0 => Severity::High,
            Some(s) if s >= 4.0 => Severity::Medium,
            _ => Severity::Low,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            _ => Err(format!("unknown severity: {s}")),
        }
    }
}

/// Aggregate result of one feed pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Raw records returned by the feed for the computed window.
    pub fetched: u64,
    /// Records newly persisted this run.
    pub inserted: u64,
    /// Records skipped: already stored, unusable, or failed to persist.
    pub skipped: u64,
    /// Alerts created for newly affected (asset, vulnerability) pairs.
    pub alerts_created: u64,
}
