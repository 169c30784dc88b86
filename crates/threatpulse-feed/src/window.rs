use chrono::{DateTime, Duration, Utc};

/// How far back to look when no vulnerability has been stored yet.
pub const DEFAULT_LOOKBACK_DAYS: i64 = 7;

/// Half-open publication-date range `[start, end)` for one feed pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Compute the window for the next feed pull.
///
/// `end` is always `now`. `start` resumes from the most recently stored
/// publication timestamp, floored at `now - 7 days` to bound the pull and
/// clamped to `now` so a skewed future timestamp can never invert the range.
pub fn next_window(latest_published: Option<DateTime<Utc>>, now: DateTime<Utc>) -> FetchWindow {
    let floor = now - Duration::days(DEFAULT_LOOKBACK_DAYS);
    let start = match latest_published {
        Some(ts) => ts.max(floor).min(now),
        None => floor,
    };
    FetchWindow { start, end: now }
}
