use anyhow::Result;
use migration::{Migrator, MigratorTrait};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection};

pub mod alert;
pub mod asset;
pub mod vulnerability;

pub use alert::AlertRow;
pub use asset::AssetRow;
pub use vulnerability::VulnerabilityRow;

/// Unified access layer over the pipeline's three tables.
///
/// All methods are `async fn` on top of SeaORM. SQLite example URL:
/// `sqlite:///data/threatpulse.db?mode=rwc`.
pub struct Store {
    pub(crate) db: DatabaseConnection,
}

impl Store {
    /// Connect and initialize the database, running all pending migrations.
    pub async fn new(db_url: &str) -> Result<Self> {
        let db = Database::connect(db_url).await?;

        // WAL mode only applies to SQLite
        if db_url.starts_with("sqlite://") {
            db.execute_unprepared("PRAGMA journal_mode=WAL;").await?;
        }

        Migrator::up(&db, None).await?;

        tracing::info!(db_url = %db_url, "Initialized store");
        Ok(Self { db })
    }

    pub(crate) fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
