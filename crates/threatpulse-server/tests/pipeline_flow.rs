use chrono::{Duration, Utc};
use std::sync::Arc;
use tempfile::TempDir;
use threatpulse_common::id::IdGenerator;
use threatpulse_feed::client::FeedClient;
use threatpulse_server::pipeline::FeedPipeline;
use threatpulse_storage::{AssetRow, Store, VulnerabilityRow};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn setup_store() -> (TempDir, Arc<Store>) {
    let dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let store = Arc::new(Store::new(&db_url).await.unwrap());
    (dir, store)
}

fn pipeline_for(store: Arc<Store>, feed_url: &str) -> FeedPipeline {
    let client = FeedClient::new(feed_url, 100, 5).unwrap();
    FeedPipeline::new(store, client, IdGenerator::default(), 24)
}

async fn seed_asset(store: &Store, id: &str, asset_type: &str, is_active: bool) {
    let now = Utc::now();
    store
        .insert_asset(&AssetRow {
            id: id.to_string(),
            name: format!("{asset_type}-host"),
            asset_type: asset_type.to_string(),
            vendor: None,
            os_version: None,
            is_active,
            created_at: now,
            updated_at: now,
        })
        .await
        .unwrap();
}

fn feed_body() -> serde_json::Value {
    serde_json::json!({
        "totalResults": 2,
        "vulnerabilities": [
            {
                "cve": {
                    "id": "CVE-2024-0001",
                    "published": "2024-03-01T12:00:00.000",
                    "descriptions": [
                        {"lang": "en", "value": "A use-after-free in the linux kernel allows privilege escalation"}
                    ],
                    "references": [{"url": "https://example.com/cve-2024-0001"}],
                    "metrics": {
                        "cvssMetricV31": [{"cvssData": {"baseScore": 9.8}}]
                    }
                }
            },
            {
                "cve": {
                    "id": "CVE-2023-9999",
                    "published": "2024-02-28T08:00:00.000",
                    "descriptions": [
                        {"lang": "en", "value": "Issue in an unrelated appliance firmware"}
                    ],
                    "references": []
                }
            }
        ]
    })
}

async fn mount_feed(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn end_to_end_run_inserts_correlates_and_alerts() {
    let (_dir, store) = setup_store().await;

    // One record of the feed batch is already stored from a previous run.
    let now = Utc::now();
    store
        .insert_vulnerability(&VulnerabilityRow {
            id: "v-old".to_string(),
            cve_id: "CVE-2023-9999".to_string(),
            description: "Issue in an unrelated appliance firmware".to_string(),
            cvss_score: None,
            severity: "low".to_string(),
            published_at: now - Duration::days(2),
            reference_links: vec![],
            affected_products: vec![],
            created_at: now - Duration::days(2),
            updated_at: now - Duration::days(2),
        })
        .await
        .unwrap();

    seed_asset(&store, "asset-linux", "linux", true).await;
    seed_asset(&store, "asset-windows", "windows", false).await;

    let server = MockServer::start().await;
    mount_feed(&server, feed_body()).await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.alerts_created, 1);

    // The alert references the new vulnerability and the active linux asset.
    let recent = store
        .list_vulnerabilities_created_since(now - Duration::hours(1))
        .await
        .unwrap();
    let new_vuln = recent
        .iter()
        .find(|v| v.cve_id == "CVE-2024-0001")
        .expect("new CVE should be stored");
    assert_eq!(new_vuln.severity, "critical");
    assert_eq!(new_vuln.affected_products, vec!["linux"]);

    let alert = store
        .get_alert("asset-linux", &new_vuln.id)
        .await
        .unwrap()
        .expect("alert should exist for the linux asset");
    assert_eq!(alert.status, "new");
    assert!(!alert.notified);

    // The inactive asset never gets an alert.
    assert!(!store
        .alert_exists("asset-windows", &new_vuln.id)
        .await
        .unwrap());
    assert_eq!(store.count_alerts().await.unwrap(), 1);
}

#[tokio::test]
async fn second_run_with_unchanged_feed_is_fully_idempotent() {
    let (_dir, store) = setup_store().await;
    seed_asset(&store, "asset-linux", "linux", true).await;

    let server = MockServer::start().await;
    mount_feed(&server, feed_body()).await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let first = pipeline.run_once().await.unwrap();
    assert_eq!(first.fetched, 2);
    assert_eq!(first.inserted, 2);
    assert_eq!(first.alerts_created, 1);

    let second = pipeline.run_once().await.unwrap();
    assert_eq!(second.fetched, 2);
    assert_eq!(second.inserted, 0);
    assert_eq!(second.skipped, 2);
    assert_eq!(second.alerts_created, 0);

    assert_eq!(store.count_alerts().await.unwrap(), 1);
}

#[tokio::test]
async fn fetch_failure_aborts_the_run_without_writes() {
    let (_dir, store) = setup_store().await;
    seed_asset(&store, "asset-linux", "linux", true).await;

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let err = pipeline.run_once().await.unwrap_err();
    assert!(err.to_string().contains("Feed fetch failed"));
    assert!(!store.vulnerability_exists("CVE-2024-0001").await.unwrap());
    assert_eq!(store.count_alerts().await.unwrap(), 0);
}

#[tokio::test]
async fn empty_feed_window_is_a_successful_run() {
    let (_dir, store) = setup_store().await;
    seed_asset(&store, "asset-linux", "linux", true).await;

    let server = MockServer::start().await;
    mount_feed(
        &server,
        serde_json::json!({"totalResults": 0, "vulnerabilities": []}),
    )
    .await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 0);
    assert_eq!(summary.inserted, 0);
    assert_eq!(summary.skipped, 0);
    assert_eq!(summary.alerts_created, 0);
}

#[tokio::test]
async fn run_without_active_assets_still_ingests_but_skips_correlation() {
    let (_dir, store) = setup_store().await;

    let server = MockServer::start().await;
    mount_feed(&server, feed_body()).await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.inserted, 2);
    assert_eq!(summary.alerts_created, 0);
    assert_eq!(store.count_alerts().await.unwrap(), 0);
}

#[tokio::test]
async fn unusable_records_count_as_skipped_without_failing_the_batch() {
    let (_dir, store) = setup_store().await;

    let body = serde_json::json!({
        "totalResults": 2,
        "vulnerabilities": [
            {"cve": {"published": "2024-03-01T12:00:00.000", "descriptions": [], "references": []}},
            {
                "cve": {
                    "id": "CVE-2024-0002",
                    "published": "2024-03-01T12:00:00.000",
                    "descriptions": [{"lang": "en", "value": "Overflow in nginx"}],
                    "references": []
                }
            }
        ]
    });

    let server = MockServer::start().await;
    mount_feed(&server, body).await;
    let pipeline = pipeline_for(store.clone(), &server.uri());

    let summary = pipeline.run_once().await.unwrap();
    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.inserted, 1);
    assert_eq!(summary.skipped, 1);
    assert!(store.vulnerability_exists("CVE-2024-0002").await.unwrap());
}
