use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::crypto::Algorithm;
use crate::device::{DeviceView, SignatureRecord};
use crate::error::{ApiError, ServiceError};
use crate::service::SigningService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<SigningService>,
}

/// Envelope of every successful response body.
#[derive(Debug, Serialize)]
pub struct Response<T> {
    pub data: T,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Deserialize)]
pub struct CreateDeviceRequest {
    #[serde(default)]
    pub id: Option<String>,
    pub algorithm: String,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SignTransactionRequest {
    pub data: String,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/health", get(health))
        .route("/devices", post(create_device).get(list_devices))
        .route("/devices/{id}", get(get_device).delete(delete_device))
        .route("/devices/{id}/sign", post(sign_transaction));

    Router::new().nest("/api/v0", api).with_state(state)
}

pub async fn run(host: String, port: u16, service: Arc<SigningService>) -> Result<()> {
    let addr: SocketAddr = format!("{host}:{port}")
        .parse()
        .with_context(|| format!("invalid listen address {host}:{port}"))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    info!(%addr, algorithms = ?service.registry().algorithms(), "signing service listening");

    axum::serve(listener, router(AppState { service }))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn health() -> Json<Response<HealthResponse>> {
    Json(Response {
        data: HealthResponse {
            status: "pass",
            version: "v0",
        },
    })
}

async fn create_device(
    State(state): State<AppState>,
    payload: Result<Json<CreateDeviceRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Response<DeviceView>>), ApiError> {
    let Json(request) = payload?;
    let algorithm: Algorithm = request.algorithm.parse().map_err(ServiceError::from)?;

    let service = Arc::clone(&state.service);
    let view = blocking(move || service.create_device(request.id, algorithm, request.label)).await?;

    Ok((StatusCode::CREATED, Json(Response { data: view })))
}

async fn list_devices(State(state): State<AppState>) -> Json<Response<Vec<DeviceView>>> {
    Json(Response {
        data: state.service.list_devices(),
    })
}

async fn get_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Response<DeviceView>>, ApiError> {
    let view = state.service.get_device(&id)?;
    Ok(Json(Response { data: view }))
}

async fn delete_device(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    state.service.delete_device(&id)?;
    Ok(StatusCode::NO_CONTENT)
}

async fn sign_transaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SignTransactionRequest>, JsonRejection>,
) -> Result<Json<Response<SignatureRecord>>, ApiError> {
    let Json(request) = payload?;
    if request.data.is_empty() {
        return Err(ApiError::BadRequest("data must not be empty".to_string()));
    }

    let service = Arc::clone(&state.service);
    let record = blocking(move || service.sign_transaction(&id, &request.data)).await?;

    Ok(Json(Response { data: record }))
}

// Key generation and signing hold a device lock across CPU-bound work.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ServiceError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| ApiError::Internal(format!("blocking task failed: {err}")))?
        .map_err(ApiError::from)
}
