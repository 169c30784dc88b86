use snowflake::SnowflakeIdBucket;
use std::sync::Mutex;

/// Snowflake ID source for stored rows.
///
/// Every table uses TEXT primary keys, so IDs are handed out as strings.
/// The bucket sits behind a mutex because `get_id` needs exclusive access;
/// contention at feed-run insert rates is negligible.
pub struct IdGenerator {
    bucket: Mutex<SnowflakeIdBucket>,
}

impl IdGenerator {
    /// `machine_id` and `node_id` each range 0-31 and keep concurrent
    /// deployments writing to the same database from colliding.
    pub fn new(machine_id: i32, node_id: i32) -> Self {
        Self {
            bucket: Mutex::new(SnowflakeIdBucket::new(machine_id, node_id)),
        }
    }

    pub fn next(&self) -> String {
        let mut bucket = self.bucket.lock().unwrap_or_else(|e| e.into_inner());
        bucket.get_id().to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new(1, 1)
    }
}
