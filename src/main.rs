//! locfinder - IP geolocation service with Hexagonal Architecture
//!
//! This is the composition root that wires together all the components.

use locfinder::adapters::inbound::ApiServer;
use locfinder::adapters::outbound::{
    DashMapLocationRepository, IpApiGeoProvider, IpifyPublicIpResolver, SqliteLocationRepository,
};
use locfinder::config::{load_config, StorageKind};
use locfinder::infrastructure::{shutdown_signal, ShutdownController};
use locfinder::{LocationRepository, LocationService};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::fmt::format::FmtSpan;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let cfg = load_config()?;

    // Setup logging
    let log_level = if cfg.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(log_level)
        .with_span_events(FmtSpan::CLOSE)
        .init();

    tracing::info!(
        "starting locfinder listen={} storage={:?}",
        cfg.listen_addr,
        cfg.storage
    );

    // ===== COMPOSITION ROOT =====

    // 1. Create outbound adapters
    let repo: Arc<dyn LocationRepository> = match cfg.storage {
        StorageKind::Sqlite => {
            let repo = SqliteLocationRepository::open(&cfg.db_path)?;
            tracing::info!("location store opened at {}", cfg.db_path);
            Arc::new(repo)
        }
        StorageKind::Memory => {
            tracing::warn!("using in-memory location store, cache is lost on exit");
            Arc::new(DashMapLocationRepository::new())
        }
    };

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(cfg.http_timeout_secs))
        .build()?;

    let provider = Arc::new(IpApiGeoProvider::new(http.clone(), cfg.geo_api_url.clone()));
    let public_ip = Arc::new(IpifyPublicIpResolver::new(http, cfg.public_ip_url.clone()));

    // 2. Create application service
    let service = Arc::new(LocationService::new(repo, provider, public_ip));

    // 3. Create inbound adapter and run until a shutdown signal
    let shutdown = ShutdownController::new();
    tokio::spawn(shutdown_signal(shutdown.clone()));

    let server = ApiServer::new(cfg.listen_addr, service, cfg.cors_origins);
    server.run(shutdown).await
}
