use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter,
};
use serde::{Deserialize, Serialize};

use crate::entities::alert::{self, Column, Entity};
use crate::store::Store;

/// Alert data row (from the `alerts` table).
///
/// One row per flagged (asset, vulnerability) pair, created exactly once.
/// Downstream status transitions belong to the alert-management surface,
/// not to this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertRow {
    pub id: String,
    pub asset_id: String,
    pub vulnerability_id: String,
    pub status: String,
    pub notified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_row(m: alert::Model) -> AlertRow {
    AlertRow {
        id: m.id,
        asset_id: m.asset_id,
        vulnerability_id: m.vulnerability_id,
        status: m.status,
        notified: m.notified,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    /// Existence check by the composite natural key.
    pub async fn alert_exists(&self, asset_id: &str, vulnerability_id: &str) -> Result<bool> {
        let count = Entity::find()
            .filter(Column::AssetId.eq(asset_id))
            .filter(Column::VulnerabilityId.eq(vulnerability_id))
            .count(self.db())
            .await?;
        Ok(count > 0)
    }

    pub async fn get_alert(
        &self,
        asset_id: &str,
        vulnerability_id: &str,
    ) -> Result<Option<AlertRow>> {
        let model = Entity::find()
            .filter(Column::AssetId.eq(asset_id))
            .filter(Column::VulnerabilityId.eq(vulnerability_id))
            .one(self.db())
            .await?;
        Ok(model.map(to_row))
    }

    /// Insert one alert. The UNIQUE(asset_id, vulnerability_id) constraint
    /// makes a concurrent duplicate surface as an error here.
    pub async fn insert_alert(&self, row: &AlertRow) -> Result<AlertRow> {
        let am = alert::ActiveModel {
            id: Set(row.id.clone()),
            asset_id: Set(row.asset_id.clone()),
            vulnerability_id: Set(row.vulnerability_id.clone()),
            status: Set(row.status.clone()),
            notified: Set(row.notified),
            created_at: Set(row.created_at.fixed_offset()),
            updated_at: Set(row.updated_at.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    pub async fn count_alerts(&self) -> Result<u64> {
        Ok(Entity::find().count(self.db()).await?)
    }
}
