//! Persistence layer for the ingestion-and-correlation pipeline.
//!
//! [`store::Store`] wraps a SeaORM connection (SQLite with WAL by default)
//! and exposes the handful of reads and idempotent writes the pipeline
//! needs. Natural-key uniqueness (`cve_id`, `(asset_id, vulnerability_id)`)
//! is enforced at the schema level, so a concurrent duplicate insert
//! surfaces as a constraint error rather than a second row.

pub mod entities;
pub mod store;

#[cfg(test)]
mod tests;

pub use store::{AlertRow, AssetRow, Store, VulnerabilityRow};
