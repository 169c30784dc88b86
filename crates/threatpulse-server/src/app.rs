use crate::state::AppState;
use crate::{api, logging};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};

pub fn build_http_app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/health", get(api::health))
        .route("/v1/feed/run", post(api::trigger_feed_run))
        .layer(middleware::from_fn(logging::request_logging))
        .layer(cors)
        .with_state(state)
}
