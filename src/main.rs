//! donorsrv - blood donation dashboard synchronization service
//!
//! Polls the appointment and inventory feeds on a fixed cadence and serves
//! the dashboard API.

use anyhow::Context;
use donorsrv::api::{self, ApiState};
use donorsrv::config::Config;
use donorsrv::fetcher::HttpFeedSource;
use donorsrv::reconciler::{StubSheetWriter, UpdateReconciler};
use donorsrv::sync::SyncEngine;
use donorsrv::{SERVICE_NAME, SERVICE_VERSION};
use std::sync::Arc;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::load().context("configuration load failed")?;
    config.validate().context("configuration invalid")?;

    tracing::info!(
        "Starting {} v{} - poll interval {:?}",
        SERVICE_NAME,
        SERVICE_VERSION,
        config.service.poll_interval
    );

    let source = HttpFeedSource::new(&config.feeds).context("feed client setup failed")?;
    let engine = Arc::new(SyncEngine::new(
        Arc::new(source),
        config.service.poll_interval,
    ));
    let reconciler = Arc::new(UpdateReconciler::new(Box::new(StubSheetWriter::new())));

    // API server (optional)
    let api_handle = if config.service.enable_api {
        let state = ApiState {
            engine: engine.clone(),
            reconciler: reconciler.clone(),
        };
        let app = api::create_router(state);
        let addr = std::net::SocketAddr::from(([0, 0, 0, 0], config.service.api_port));

        tracing::info!("Starting dashboard API server on {}", addr);

        Some(tokio::spawn(async move {
            let listener = match tokio::net::TcpListener::bind(addr).await {
                Ok(listener) => listener,
                Err(e) => {
                    tracing::error!("Failed to bind API server: {}", e);
                    return;
                }
            };

            if let Err(e) = axum::serve(listener, app.into_make_service()).await {
                tracing::error!("API server error: {}", e);
            }
        }))
    } else {
        None
    };

    // Sync engine loop
    let engine_handle = {
        let engine = engine.clone();
        tokio::spawn(async move { engine.run().await })
    };

    match signal::ctrl_c().await {
        Ok(()) => tracing::info!("Received shutdown signal"),
        Err(e) => tracing::error!("Failed to listen for shutdown signal: {}", e),
    }

    // The periodic timer must not outlive the session.
    engine.stop();
    let _ = engine_handle.await;

    if let Some(api_handle) = api_handle {
        api_handle.abort();
        let _ = api_handle.await;
    }

    tracing::info!("{} stopped", SERVICE_NAME);
    Ok(())
}

/// Initialize the logging system
fn init_logging() {
    let log_level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")));

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();
}
