//! HTTP API server.
//!
//! JSON in/out over axum. Handlers hop onto the blocking thread pool to
//! call into the synchronous service; CORS is wide open so editor
//! integrations can talk to the local daemon directly.

use crate::error::Error;
use crate::memory::MemoryService;
use crate::types::{AddMemoryRequest, IndexRequest, SearchRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Configures the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3456,
        }
    }
}

/// Runs the HTTP server until ctrl-c.
pub async fn serve(svc: Arc<MemoryService>, cfg: ServerConfig) -> anyhow::Result<()> {
    let addr = format!("{}:{}", cfg.host, cfg.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("listening on http://{addr}");

    axum::serve(listener, router(svc))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}

pub fn router(svc: Arc<MemoryService>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    Router::new()
        .route("/memory", post(add_memory))
        .route("/memory/:id", get(get_memory).delete(delete_memory))
        .route("/search", post(search))
        .route("/index", post(index))
        .route("/stats", get(stats))
        .route("/health", get(health))
        .route("/projects", get(projects))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(svc)
}

/// Error envelope: every failure is `{"error": message}` with a status
/// derived from the error kind.
struct ApiError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self {
            status,
            message: e.to_string(),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
        }
    }
}

impl From<JoinError> for ApiError {
    fn from(e: JoinError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: e.to_string(),
        }
    }
}

async fn add_memory(
    State(svc): State<Arc<MemoryService>>,
    payload: Result<Json<AddMemoryRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let memory = tokio::task::spawn_blocking(move || svc.add(req)).await??;
    Ok((StatusCode::CREATED, Json(memory)))
}

async fn get_memory(
    State(svc): State<Arc<MemoryService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let memory = tokio::task::spawn_blocking(move || svc.get(&id)).await??;
    Ok(Json(memory))
}

async fn delete_memory(
    State(svc): State<Arc<MemoryService>>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    tokio::task::spawn_blocking(move || svc.delete(&id)).await??;
    Ok(Json(json!({ "deleted": true })))
}

async fn search(
    State(svc): State<Arc<MemoryService>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let response = tokio::task::spawn_blocking(move || svc.search(req)).await??;
    Ok(Json(response))
}

async fn index(
    State(svc): State<Arc<MemoryService>>,
    payload: Result<Json<IndexRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let indexed = tokio::task::spawn_blocking(move || svc.index(req)).await??;
    Ok(Json(json!({ "indexed": indexed })))
}

async fn stats(State(svc): State<Arc<MemoryService>>) -> Result<impl IntoResponse, ApiError> {
    let stats = tokio::task::spawn_blocking(move || svc.stats()).await??;
    Ok(Json(stats))
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok", "version": env!("CARGO_PKG_VERSION") }))
}

async fn projects(State(svc): State<Arc<MemoryService>>) -> Result<impl IntoResponse, ApiError> {
    let projects = tokio::task::spawn_blocking(move || svc.projects()).await??;
    Ok(Json(json!({ "projects": projects })))
}
