use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "vulnerabilities")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    #[sea_orm(unique)]
    pub cve_id: String,
    pub description: String,
    pub cvss_score: Option<f64>,
    pub severity: String,
    pub published_at: DateTimeWithTimeZone,
    /// JSON array of URLs.
    pub reference_links: String,
    /// JSON array of lowercase keyword strings.
    pub affected_products: String,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
