use crate::{AlertRow, AssetRow, Store, VulnerabilityRow};
use chrono::{Duration, Utc};
use tempfile::TempDir;

async fn setup() -> (TempDir, Store) {
    let dir = TempDir::new().unwrap();
    let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());
    let store = Store::new(&db_url).await.unwrap();
    (dir, store)
}

fn make_vuln(id: &str, cve_id: &str, published_secs_ago: i64) -> VulnerabilityRow {
    let now = Utc::now();
    VulnerabilityRow {
        id: id.to_string(),
        cve_id: cve_id.to_string(),
        description: "A flaw in the Linux kernel".to_string(),
        cvss_score: Some(9.8),
        severity: "critical".to_string(),
        published_at: now - Duration::seconds(published_secs_ago),
        reference_links: vec!["https://example.com/advisory".to_string()],
        affected_products: vec!["linux".to_string()],
        created_at: now,
        updated_at: now,
    }
}

fn make_asset(id: &str, asset_type: &str, is_active: bool) -> AssetRow {
    let now = Utc::now();
    AssetRow {
        id: id.to_string(),
        name: format!("{asset_type}-host"),
        asset_type: asset_type.to_string(),
        vendor: Some("Dell".to_string()),
        os_version: None,
        is_active,
        created_at: now,
        updated_at: now,
    }
}

fn make_alert(id: &str, asset_id: &str, vulnerability_id: &str) -> AlertRow {
    let now = Utc::now();
    AlertRow {
        id: id.to_string(),
        asset_id: asset_id.to_string(),
        vulnerability_id: vulnerability_id.to_string(),
        status: "new".to_string(),
        notified: false,
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn insert_and_check_vulnerability_existence() {
    let (_dir, store) = setup().await;

    assert!(!store.vulnerability_exists("CVE-2024-0001").await.unwrap());
    store
        .insert_vulnerability(&make_vuln("v1", "CVE-2024-0001", 60))
        .await
        .unwrap();
    assert!(store.vulnerability_exists("CVE-2024-0001").await.unwrap());
}

#[tokio::test]
async fn vulnerability_row_round_trips_json_columns() {
    let (_dir, store) = setup().await;

    let inserted = store
        .insert_vulnerability(&make_vuln("v1", "CVE-2024-0001", 60))
        .await
        .unwrap();
    assert_eq!(inserted.reference_links, vec!["https://example.com/advisory"]);
    assert_eq!(inserted.affected_products, vec!["linux"]);
    assert_eq!(inserted.severity, "critical");
    assert_eq!(inserted.cvss_score, Some(9.8));
}

#[tokio::test]
async fn duplicate_cve_id_insert_is_rejected() {
    let (_dir, store) = setup().await;

    store
        .insert_vulnerability(&make_vuln("v1", "CVE-2024-0001", 60))
        .await
        .unwrap();
    let result = store
        .insert_vulnerability(&make_vuln("v2", "CVE-2024-0001", 30))
        .await;
    assert!(result.is_err(), "UNIQUE(cve_id) should reject the second row");
}

#[tokio::test]
async fn latest_published_at_returns_most_recent() {
    let (_dir, store) = setup().await;

    assert!(store.latest_published_at().await.unwrap().is_none());

    store
        .insert_vulnerability(&make_vuln("v1", "CVE-2024-0001", 3600))
        .await
        .unwrap();
    let newest = make_vuln("v2", "CVE-2024-0002", 60);
    store.insert_vulnerability(&newest).await.unwrap();
    store
        .insert_vulnerability(&make_vuln("v3", "CVE-2024-0003", 7200))
        .await
        .unwrap();

    let latest = store.latest_published_at().await.unwrap().unwrap();
    assert_eq!(latest.timestamp(), newest.published_at.timestamp());
}

#[tokio::test]
async fn created_since_filters_out_older_rows() {
    let (_dir, store) = setup().await;

    let mut old = make_vuln("v1", "CVE-2023-9999", 60);
    old.created_at = Utc::now() - Duration::days(3);
    store.insert_vulnerability(&old).await.unwrap();
    store
        .insert_vulnerability(&make_vuln("v2", "CVE-2024-0001", 60))
        .await
        .unwrap();

    let recent = store
        .list_vulnerabilities_created_since(Utc::now() - Duration::hours(24))
        .await
        .unwrap();
    assert_eq!(recent.len(), 1);
    assert_eq!(recent[0].cve_id, "CVE-2024-0001");
}

#[tokio::test]
async fn list_active_assets_excludes_inactive() {
    let (_dir, store) = setup().await;

    store
        .insert_asset(&make_asset("a1", "linux", true))
        .await
        .unwrap();
    store
        .insert_asset(&make_asset("a2", "windows", false))
        .await
        .unwrap();

    let active = store.list_active_assets().await.unwrap();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, "a1");
    assert_eq!(active[0].vendor.as_deref(), Some("Dell"));
}

#[tokio::test]
async fn alert_existence_and_insert_round_trip() {
    let (_dir, store) = setup().await;

    assert!(!store.alert_exists("a1", "v1").await.unwrap());
    store.insert_alert(&make_alert("al1", "a1", "v1")).await.unwrap();
    assert!(store.alert_exists("a1", "v1").await.unwrap());

    let alert = store.get_alert("a1", "v1").await.unwrap().unwrap();
    assert_eq!(alert.status, "new");
    assert!(!alert.notified);
    assert_eq!(store.count_alerts().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_alert_pair_is_rejected() {
    let (_dir, store) = setup().await;

    store.insert_alert(&make_alert("al1", "a1", "v1")).await.unwrap();
    let result = store.insert_alert(&make_alert("al2", "a1", "v1")).await;
    assert!(
        result.is_err(),
        "UNIQUE(asset_id, vulnerability_id) should reject the second row"
    );
    assert_eq!(store.count_alerts().await.unwrap(), 1);
}
