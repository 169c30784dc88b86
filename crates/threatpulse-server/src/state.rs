use crate::pipeline::FeedPipeline;
use chrono::{DateTime, Utc};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<FeedPipeline>,
    pub start_time: DateTime<Utc>,
}
