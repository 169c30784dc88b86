use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, Order, PaginatorTrait,
    QueryFilter, QueryOrder,
};
use serde::{Deserialize, Serialize};

use crate::entities::vulnerability::{self, Column, Entity};
use crate::store::Store;

/// Vulnerability data row (from the `vulnerabilities` table).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerabilityRow {
    pub id: String,
    pub cve_id: String,
    pub description: String,
    pub cvss_score: Option<f64>,
    pub severity: String,
    pub published_at: DateTime<Utc>,
    pub reference_links: Vec<String>,
    pub affected_products: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_row(m: vulnerability::Model) -> VulnerabilityRow {
    let reference_links: Vec<String> = serde_json::from_str(&m.reference_links).unwrap_or_default();
    let affected_products: Vec<String> =
        serde_json::from_str(&m.affected_products).unwrap_or_default();
    VulnerabilityRow {
        id: m.id,
        cve_id: m.cve_id,
        description: m.description,
        cvss_score: m.cvss_score,
        severity: m.severity,
        published_at: m.published_at.with_timezone(&Utc),
        reference_links,
        affected_products,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    /// The most recent publication timestamp currently stored, if any.
    /// Feeds the window calculator at the start of each run.
    pub async fn latest_published_at(&self) -> Result<Option<DateTime<Utc>>> {
        let model = Entity::find()
            .order_by(Column::PublishedAt, Order::Desc)
            .one(self.db())
            .await?;
        Ok(model.map(|m| m.published_at.with_timezone(&Utc)))
    }

    /// Existence check by natural key.
    pub async fn vulnerability_exists(&self, cve_id: &str) -> Result<bool> {
        let count = Entity::find()
            .filter(Column::CveId.eq(cve_id))
            .count(self.db())
            .await?;
        Ok(count > 0)
    }

    /// Insert a normalized record. The UNIQUE constraint on `cve_id` makes a
    /// concurrent duplicate surface as an error here.
    pub async fn insert_vulnerability(&self, row: &VulnerabilityRow) -> Result<VulnerabilityRow> {
        let am = vulnerability::ActiveModel {
            id: Set(row.id.clone()),
            cve_id: Set(row.cve_id.clone()),
            description: Set(row.description.clone()),
            cvss_score: Set(row.cvss_score),
            severity: Set(row.severity.clone()),
            published_at: Set(row.published_at.fixed_offset()),
            reference_links: Set(serde_json::to_string(&row.reference_links)?),
            affected_products: Set(serde_json::to_string(&row.affected_products)?),
            created_at: Set(row.created_at.fixed_offset()),
            updated_at: Set(row.updated_at.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    /// Vulnerabilities first stored at or after `since`, the correlation
    /// batch for one run.
    pub async fn list_vulnerabilities_created_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<VulnerabilityRow>> {
        let rows = Entity::find()
            .filter(Column::CreatedAt.gte(since.fixed_offset()))
            .order_by(Column::CreatedAt, Order::Asc)
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }
}
