//! Spoilage Sentry API Server
//!
//! REST API over the spoilage assessment engine
//!
//! Usage:
//!   cargo run --bin spoilage_api
//!
//! Environment:
//!   PORT / SPOILAGE_PORT - Server port (default: 8080)
//!   SPOILAGE_HOST        - Server host (default: 0.0.0.0)
//!   RUST_LOG             - Log filter (default: info)
//!   plus every EngineConfig variable

use spoilage_sentry::api::{create_router, start_cleanup_task, AppState};
use spoilage_sentry::{EngineConfig, ServerConfig, SpoilageEngine};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let engine_config = EngineConfig::from_env()?;
    let server_config = ServerConfig::from_env()?;

    let engine = Arc::new(SpoilageEngine::from_config(&engine_config)?);
    let telemetry = Arc::clone(engine.telemetry());
    info!("🗺️ Route catalog: {} routes", engine.catalog().len());

    let state = Arc::new(AppState::new(engine));

    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    let addr: SocketAddr = server_config.bind_address().parse()?;

    info!("🧊 Spoilage Sentry API starting on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /v1/routes                  - Route catalog with latest tiers");
    info!("  POST /v1/assess/:route_id        - Assess a catalog route");
    info!("  GET  /v1/assessments/:route_id   - Latest assessment for a route");
    info!("  POST /v1/assess/manual           - Score a manual reading");
    info!("  POST /v1/assess/batch            - Assess several routes");
    info!("  GET  /v1/stats                   - Assessment statistics");
    info!("  GET  /v1/health                  - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received, exporting telemetry...");
    let stats = telemetry.get_stats();
    info!("   Total assessed: {}", stats.total_assessed);
    info!("   High risk: {}", stats.high_risk_detected);

    match telemetry.flush() {
        Ok(0) => {}
        Ok(count) => info!("   ✅ Flushed {} high-risk events", count),
        Err(e) => warn!("   ⚠️ Failed to flush high-risk events: {}", e),
    }
    match telemetry.export_stats_json() {
        Ok(path) => info!("   ✅ Stats exported to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to export stats: {}", e),
    }
    match telemetry.export_stats_csv() {
        Ok(path) => info!("   ✅ History appended to: {}", path.display()),
        Err(e) => warn!("   ⚠️ Failed to append history: {}", e),
    }

    info!("👋 Spoilage Sentry API shutdown complete");

    Ok(())
}
