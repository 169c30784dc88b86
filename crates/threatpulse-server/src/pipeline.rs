use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use threatpulse_common::id::IdGenerator;
use threatpulse_common::types::RunSummary;
use threatpulse_correlate::{find_affected_pairs, AffectedPair, AssetProfile, VulnerabilityProfile};
use threatpulse_feed::client::{CveItem, FeedClient};
use threatpulse_feed::normalize::normalize;
use threatpulse_feed::window::next_window;
use threatpulse_storage::{AlertRow, Store, VulnerabilityRow};

enum IngestOutcome {
    Inserted(String),
    Skipped,
}

/// One linear feed run: window -> fetch -> normalize+store -> correlate ->
/// alert, folding per-record outcomes into a [`RunSummary`].
///
/// Only the fetch stage (and the batch-level store reads around it) can fail
/// the run; per-record persistence failures are logged and become skips.
/// All writes are idempotent by natural key, so overlapping or retried runs
/// are safe.
pub struct FeedPipeline {
    store: Arc<Store>,
    client: FeedClient,
    ids: IdGenerator,
    correlation_window: Duration,
}

impl FeedPipeline {
    pub fn new(
        store: Arc<Store>,
        client: FeedClient,
        ids: IdGenerator,
        correlation_window_hours: i64,
    ) -> Self {
        Self {
            store,
            client,
            ids,
            correlation_window: Duration::hours(correlation_window_hours),
        }
    }

    /// Execute one run and return its summary.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let latest = self
            .store
            .latest_published_at()
            .await
            .context("Failed to read latest stored publication timestamp")?;

        let now = Utc::now();
        let window = next_window(latest, now);
        tracing::info!(start = %window.start, end = %window.end, "Fetching CVE feed window");

        let page = self
            .client
            .fetch_window(&window)
            .await
            .context("Feed fetch failed")?;

        let fetched = page.vulnerabilities.len() as u64;
        if page.total_results > fetched {
            tracing::warn!(
                total = page.total_results,
                fetched,
                "Feed window holds more results than one page; remainder picked up next run"
            );
        }

        let (inserted, skipped) = self.ingest(&page.vulnerabilities).await;
        let alerts_created = self.correlate_and_alert(now).await?;

        let summary = RunSummary {
            fetched,
            inserted,
            skipped,
            alerts_created,
        };
        tracing::info!(
            fetched = summary.fetched,
            inserted = summary.inserted,
            skipped = summary.skipped,
            alerts_created = summary.alerts_created,
            "Feed run complete"
        );
        Ok(summary)
    }

    /// Fold the raw batch into (inserted, skipped) counts. A failure on one
    /// record never aborts the batch.
    async fn ingest(&self, items: &[CveItem]) -> (u64, u64) {
        let mut inserted = 0u64;
        let mut skipped = 0u64;
        for item in items {
            match self.ingest_one(item).await {
                Ok(IngestOutcome::Inserted(cve_id)) => {
                    inserted += 1;
                    tracing::info!(cve_id = %cve_id, "Inserted CVE");
                }
                Ok(IngestOutcome::Skipped) => skipped += 1,
                Err(e) => {
                    skipped += 1;
                    tracing::error!(error = %e, "Failed to persist CVE record");
                }
            }
        }
        (inserted, skipped)
    }

    async fn ingest_one(&self, item: &CveItem) -> Result<IngestOutcome> {
        let record = match normalize(item) {
            Ok(record) => record,
            Err(reason) => {
                tracing::warn!(reason = %reason, "Skipping unusable feed record");
                return Ok(IngestOutcome::Skipped);
            }
        };

        if self.store.vulnerability_exists(&record.cve_id).await? {
            return Ok(IngestOutcome::Skipped);
        }

        let now = Utc::now();
        let row = VulnerabilityRow {
            id: self.ids.next(),
            cve_id: record.cve_id.clone(),
            description: record.description,
            cvss_score: record.cvss_score,
            severity: record.severity.to_string(),
            published_at: record.published_at,
            reference_links: record.reference_links,
            affected_products: record.affected_products,
            created_at: now,
            updated_at: now,
        };
        // A concurrent duplicate lands here as a UNIQUE violation and is
        // counted as a skip by the caller.
        self.store.insert_vulnerability(&row).await?;
        Ok(IngestOutcome::Inserted(record.cve_id))
    }

    /// Match recently stored vulnerabilities against active assets and write
    /// one alert per newly affected pair.
    async fn correlate_and_alert(&self, now: DateTime<Utc>) -> Result<u64> {
        let since = now - self.correlation_window;
        let recent = self
            .store
            .list_vulnerabilities_created_since(since)
            .await
            .context("Failed to load recent vulnerabilities for correlation")?;
        if recent.is_empty() {
            tracing::debug!("No recent vulnerabilities; skipping correlation");
            return Ok(0);
        }

        let assets = self
            .store
            .list_active_assets()
            .await
            .context("Failed to load active assets")?;
        if assets.is_empty() {
            tracing::debug!("No active assets; skipping correlation");
            return Ok(0);
        }

        let vuln_profiles: Vec<VulnerabilityProfile> = recent
            .iter()
            .map(|v| VulnerabilityProfile {
                id: v.id.clone(),
                description: v.description.clone(),
                affected_products: v.affected_products.clone(),
            })
            .collect();
        let asset_profiles: Vec<AssetProfile> = assets
            .iter()
            .map(|a| AssetProfile {
                id: a.id.clone(),
                asset_type: a.asset_type.clone(),
                vendor: a.vendor.clone(),
                os_version: a.os_version.clone(),
            })
            .collect();

        let pairs = find_affected_pairs(&vuln_profiles, &asset_profiles);
        tracing::info!(
            vulnerabilities = vuln_profiles.len(),
            assets = asset_profiles.len(),
            matched = pairs.len(),
            "Correlation pass finished"
        );

        let mut created = 0u64;
        for pair in &pairs {
            match self.write_alert(pair).await {
                Ok(true) => created += 1,
                Ok(false) => {}
                Err(e) => {
                    tracing::error!(
                        asset_id = %pair.asset_id,
                        vulnerability_id = %pair.vulnerability_id,
                        error = %e,
                        "Failed to create alert"
                    );
                }
            }
        }
        Ok(created)
    }

    /// Returns true when a new alert row was written, false when the pair
    /// already had one.
    async fn write_alert(&self, pair: &AffectedPair) -> Result<bool> {
        if self
            .store
            .alert_exists(&pair.asset_id, &pair.vulnerability_id)
            .await?
        {
            return Ok(false);
        }

        let now = Utc::now();
        let row = AlertRow {
            id: self.ids.next(),
            asset_id: pair.asset_id.clone(),
            vulnerability_id: pair.vulnerability_id.clone(),
            status: "new".to_string(),
            notified: false,
            created_at: now,
            updated_at: now,
        };
        self.store.insert_alert(&row).await?;
        tracing::info!(
            asset_id = %row.asset_id,
            vulnerability_id = %row.vulnerability_id,
            "Created alert"
        );
        Ok(true)
    }
}
