use anyhow::Result;
use chrono::Utc;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use threatpulse_common::id::IdGenerator;
use threatpulse_feed::client::FeedClient;
use threatpulse_server::app;
use threatpulse_server::config::ServerConfig;
use threatpulse_server::pipeline::FeedPipeline;
use threatpulse_server::scheduler::FeedScheduler;
use threatpulse_server::state::AppState;
use threatpulse_storage::Store;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("threatpulse=info".parse()?))
        .init();

    let args: Vec<String> = std::env::args().collect();
    let config_path = args
        .get(1)
        .map(|s| s.as_str())
        .unwrap_or("config/server.toml");

    let config = if Path::new(config_path).exists() {
        ServerConfig::load(config_path)?
    } else {
        tracing::warn!(path = config_path, "Config file not found, using defaults");
        ServerConfig::default()
    };

    tracing::info!(
        http_port = config.http_port,
        db = %config.database.connection_url(),
        feed_endpoint = %config.feed.endpoint,
        poll_interval_secs = config.feed.poll_interval_secs,
        "threatpulse-server starting"
    );

    std::fs::create_dir_all(&config.database.data_dir)?;
    let store = Arc::new(Store::new(&config.database.connection_url()).await?);

    let client = FeedClient::new(
        &config.feed.endpoint,
        config.feed.page_size,
        config.feed.request_timeout_secs,
    )?;
    let pipeline = Arc::new(FeedPipeline::new(
        store,
        client,
        IdGenerator::new(1, 1),
        config.feed.correlation_window_hours,
    ));

    let scheduler = FeedScheduler::new(pipeline.clone(), config.feed.poll_interval_secs);
    tokio::spawn(async move { scheduler.run().await });

    let state = AppState {
        pipeline,
        start_time: Utc::now(),
    };
    let router = app::build_http_app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.http_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "HTTP server listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("Shutdown signal received");
}
