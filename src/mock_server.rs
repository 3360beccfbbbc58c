//! HTTP front for [`MockBackend`], serving the same routes as the real backend.

use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

use anyhow::Context;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};

use crate::mock::MockBackend;
use crate::models::dto::{AlertDto, MonitoringAckDto, StatusDto};

pub type SharedBackend = Arc<MockBackend>;

async fn api_status(State(backend): State<SharedBackend>) -> Json<StatusDto> {
    Json(StatusDto::from(&backend.poll_status()))
}

async fn api_alerts(State(backend): State<SharedBackend>) -> Json<Vec<AlertDto>> {
    Json(backend.recent_alerts().iter().map(AlertDto::from).collect())
}

async fn api_start_monitoring(State(backend): State<SharedBackend>) -> Json<MonitoringAckDto> {
    let ack = backend.set_monitoring(true);
    tracing::info!(status = %ack.status, "start requested");
    Json(MonitoringAckDto::from(&ack))
}

async fn api_stop_monitoring(State(backend): State<SharedBackend>) -> Json<MonitoringAckDto> {
    let ack = backend.set_monitoring(false);
    tracing::info!(status = %ack.status, "stop requested");
    Json(MonitoringAckDto::from(&ack))
}

pub fn router(backend: SharedBackend) -> Router {
    Router::new()
        .route("/api/status", get(api_status))
        .route("/api/alerts", get(api_alerts))
        .route("/api/start_monitoring", post(api_start_monitoring))
        .route("/api/stop_monitoring", post(api_stop_monitoring))
        .with_state(backend)
}

/// Serve on an already-bound listener until the future is dropped or fails.
pub async fn serve(listener: TcpListener, backend: SharedBackend) -> anyhow::Result<()> {
    let addr: SocketAddr = listener
        .local_addr()
        .context("cannot read listener address")?;
    tracing::info!(%addr, "mock backend listening");
    axum::Server::from_tcp(listener)
        .context("cannot adopt listener")?
        .serve(router(backend).into_make_service())
        .await
        .context("mock backend server failed")
}
