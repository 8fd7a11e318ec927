use anyhow::{Context, Result};
use axum::{Router, extract::State, routing::get};
use log::{debug, info};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;

use crate::exporter;
use crate::procfs_reader::StatReader;

/// Read-only state shared by every request.
#[derive(Debug, Clone)]
pub struct AppState {
    pub started_at: Instant,
    pub reader: StatReader,
}

impl AppState {
    /// State for a process that starts now.
    pub fn new(reader: StatReader) -> Self {
        Self::with_start(Instant::now(), reader)
    }

    pub fn with_start(started_at: Instant, reader: StatReader) -> Self {
        Self { started_at, reader }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .with_state(state)
}

async fn health_handler() -> &'static str {
    "ok"
}

async fn metrics_handler(State(state): State<Arc<AppState>>) -> String {
    debug!("[http] GET /metrics");
    exporter::render_metrics(&state).await
}

/// Serve until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: Arc<AppState>, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("[http] serving on {}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("http server failed")?;

    info!("[http] server on {} stopped", addr);
    Ok(())
}
