use crate::logging::TraceId;
use crate::state::AppState;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use threatpulse_common::types::RunSummary;

/// Uniform API response envelope.
#[derive(Serialize)]
pub struct ApiResponse<T>
where
    T: Serialize,
{
    /// Error code (0 on success).
    pub err_code: i32,
    /// Error message ("success" on success).
    pub err_msg: String,
    /// Per-request trace ID.
    pub trace_id: String,
    /// Payload, present on success.
    pub data: Option<T>,
}

pub fn success_response<T>(status: StatusCode, trace_id: &str, data: T) -> Response
where
    T: Serialize,
{
    (
        status,
        Json(ApiResponse {
            err_code: 0,
            err_msg: "success".to_string(),
            trace_id: trace_id.to_string(),
            data: Some(data),
        }),
    )
        .into_response()
}

pub fn error_response(status: StatusCode, trace_id: &str, message: &str) -> Response {
    (
        status,
        Json(ApiResponse::<()> {
            err_code: status.as_u16() as i32,
            err_msg: message.to_string(),
            trace_id: trace_id.to_string(),
            data: None,
        }),
    )
        .into_response()
}

#[derive(Serialize)]
struct HealthData {
    status: &'static str,
    uptime_secs: i64,
}

/// Summary of one manually triggered feed run.
#[derive(Serialize)]
struct RunReport {
    success: bool,
    fetched: u64,
    inserted: u64,
    skipped: u64,
    alerts_created: u64,
}

impl From<RunSummary> for RunReport {
    fn from(s: RunSummary) -> Self {
        Self {
            success: true,
            fetched: s.fetched,
            inserted: s.inserted,
            skipped: s.skipped,
            alerts_created: s.alerts_created,
        }
    }
}

/// GET /v1/health
pub async fn health(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    let uptime_secs = (Utc::now() - state.start_time).num_seconds();
    success_response(
        StatusCode::OK,
        &trace_id,
        HealthData {
            status: "ok",
            uptime_secs,
        },
    )
}

/// POST /v1/feed/run — trigger one feed run and wait for its summary.
pub async fn trigger_feed_run(
    Extension(trace_id): Extension<TraceId>,
    State(state): State<AppState>,
) -> Response {
    match state.pipeline.run_once().await {
        Ok(summary) => success_response(StatusCode::OK, &trace_id, RunReport::from(summary)),
        Err(e) => {
            tracing::error!(error = %e, "Manual feed run failed");
            error_response(
                StatusCode::BAD_GATEWAY,
                &trace_id,
                &format!("feed run failed: {e:#}"),
            )
        }
    }
}
