// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! REST surface over a [`RecordStore`].
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `GET /api/{resource}` | 200 array | 400 |
//! | `GET /api/{resource}/{id}` | 200 object | 404, 400 |
//! | `POST /api/{resource}` | 201 object | 400, 500 |
//! | `PUT /api/{resource}/{id}` | 200 object | 404, 400, 500 |
//! | `DELETE /api/{resource}/{id}` | 204 | 404, 400, 500 |
//! | `DELETE /api/{resource}` | 204 | 400, 500 |

use crate::error::FinError;
use crate::models::{NewRecord, Record, RecordKind, RecordPatch};
use crate::store::RecordStore;
use anyhow::Context;
use axum::Router;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use serde_json::json;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RecordStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        AppState { store }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: &'static str,
}

impl ApiError {
    fn new(status: StatusCode, message: &'static str) -> Self {
        ApiError { status, message }
    }

    fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "Not found")
    }

    fn invalid_payload() -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Invalid payload")
    }

    /// Classify a store error; persistence failures become a 500 with `failure`.
    fn from_store(err: FinError, failure: &'static str) -> Self {
        match err {
            FinError::UnknownResource(_) => Self::new(StatusCode::BAD_REQUEST, "Invalid resource"),
            FinError::InvalidPayload(reason) => {
                debug!(%reason, "rejected payload");
                Self::invalid_payload()
            }
            other => {
                error!(error = %other, "{}", failure);
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_kind(resource: &str) -> ApiResult<RecordKind> {
    resource
        .parse()
        .map_err(|e| ApiError::from_store(e, "Invalid resource"))
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/api/:resource",
            get(list_records).post(create_record).delete(clear_records),
        )
        .route(
            "/api/:resource/:id",
            get(get_record).put(update_record).delete(delete_record),
        )
        .with_state(state)
}

// Store backends block on SQLite, files or HTTP, so calls leave the async workers.
async fn on_store<T, F>(state: &AppState, failure: &'static str, f: F) -> ApiResult<T>
where
    F: FnOnce(&dyn RecordStore) -> crate::error::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let store = Arc::clone(&state.store);
    tokio::task::spawn_blocking(move || f(store.as_ref()))
        .await
        .map_err(|e| {
            error!(error = %e, "store task did not complete");
            ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, failure)
        })?
        .map_err(|e| ApiError::from_store(e, failure))
}

async fn list_records(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> ApiResult<Json<Vec<Record>>> {
    let kind = parse_kind(&resource)?;
    let items = on_store(&state, "Failed to fetch", move |store| store.get_all(kind)).await?;
    debug!(kind = %kind, count = items.len(), "list");
    Ok(Json(items))
}

async fn get_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<Json<Record>> {
    let kind = parse_kind(&resource)?;
    on_store(&state, "Failed to fetch", move |store| store.get_by_id(kind, &id))
        .await?
        .map(Json)
        .ok_or_else(ApiError::not_found)
}

async fn create_record(
    State(state): State<AppState>,
    Path(resource): Path<String>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<Record>)> {
    let kind = parse_kind(&resource)?;
    let payload: NewRecord = serde_json::from_slice(&body).map_err(|e| {
        debug!(error = %e, "create body did not parse");
        ApiError::invalid_payload()
    })?;
    let created = on_store(&state, "Failed to create", move |store| {
        store.create(kind, payload)
    })
    .await?;
    info!(kind = %kind, id = %created.id, "created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
    body: Bytes,
) -> ApiResult<Json<Record>> {
    let kind = parse_kind(&resource)?;
    let patch: RecordPatch = if body.iter().all(u8::is_ascii_whitespace) {
        RecordPatch::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| {
            debug!(error = %e, "update body did not parse");
            ApiError::invalid_payload()
        })?
    };
    on_store(&state, "Failed to update", move |store| {
        store.update(kind, &id, &patch)
    })
    .await?
    .map(Json)
    .ok_or_else(ApiError::not_found)
}

async fn delete_record(
    State(state): State<AppState>,
    Path((resource, id)): Path<(String, String)>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&resource)?;
    let target = id.clone();
    let removed = on_store(&state, "Failed to delete", move |store| {
        store.delete(kind, &target)
    })
    .await?;
    if !removed {
        return Err(ApiError::not_found());
    }
    info!(kind = %kind, id, "deleted");
    Ok(StatusCode::NO_CONTENT)
}

async fn clear_records(
    State(state): State<AppState>,
    Path(resource): Path<String>,
) -> ApiResult<StatusCode> {
    let kind = parse_kind(&resource)?;
    on_store(&state, "Failed to clear", move |store| store.clear(kind)).await?;
    info!(kind = %kind, "cleared");
    Ok(StatusCode::NO_CONTENT)
}

/// Serve on an already-bound listener until ctrl-c.
pub async fn serve_on(listener: TcpListener, store: Arc<dyn RecordStore>) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, router(AppState::new(store)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server failed")?;
    info!("server stopped");
    Ok(())
}

pub async fn serve(store: Arc<dyn RecordStore>, port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Bind {}", addr))?;
    serve_on(listener, store).await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for ctrl-c");
        std::future::pending::<()>().await;
    }
}
