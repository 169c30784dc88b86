use anyhow::Result;
use chrono::{DateTime, Utc};
use sea_orm::{ActiveModelTrait, ActiveValue::Set, ColumnTrait, EntityTrait, QueryFilter};
use serde::{Deserialize, Serialize};

use crate::entities::asset::{self, Column, Entity};
use crate::store::Store;

/// Monitored asset data row (from the `assets` table).
///
/// Asset lifecycle belongs to the inventory component; the pipeline only
/// reads active rows. Inserts exist for inventory seeding and tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetRow {
    pub id: String,
    pub name: String,
    pub asset_type: String,
    pub vendor: Option<String>,
    pub os_version: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn to_row(m: asset::Model) -> AssetRow {
    AssetRow {
        id: m.id,
        name: m.name,
        asset_type: m.asset_type,
        vendor: m.vendor,
        os_version: m.os_version,
        is_active: m.is_active,
        created_at: m.created_at.with_timezone(&Utc),
        updated_at: m.updated_at.with_timezone(&Utc),
    }
}

impl Store {
    pub async fn insert_asset(&self, row: &AssetRow) -> Result<AssetRow> {
        let am = asset::ActiveModel {
            id: Set(row.id.clone()),
            name: Set(row.name.clone()),
            asset_type: Set(row.asset_type.clone()),
            vendor: Set(row.vendor.clone()),
            os_version: Set(row.os_version.clone()),
            is_active: Set(row.is_active),
            created_at: Set(row.created_at.fixed_offset()),
            updated_at: Set(row.updated_at.fixed_offset()),
        };
        let model = am.insert(self.db()).await?;
        Ok(to_row(model))
    }

    /// All assets eligible for correlation.
    pub async fn list_active_assets(&self) -> Result<Vec<AssetRow>> {
        let rows = Entity::find()
            .filter(Column::IsActive.eq(true))
            .all(self.db())
            .await?;
        Ok(rows.into_iter().map(to_row).collect())
    }
}
