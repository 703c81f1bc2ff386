//! HTTP handlers for the ingestion API.
//!
//! Handlers are thin: they decode the request, call `IngestionService` and let
//! `IngestError` pick the status code.

use super::service::IngestionService;
use super::types::*;
use crate::error::IngestError;
use crate::storage::types::IngestionId;

use axum::extract::rejection::JsonRejection;
use axum::extract::Path;
use axum::{Extension, Json};
use std::sync::Arc;

/// `GET /`: liveness check.
pub async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Ingestion API is live!".to_string(),
    })
}

/// `POST /ingest`: validates the body, splits it into batches and enqueues them.
///
/// Any body rejection (bad JSON, wrong types, missing fields) is answered with 422.
pub async fn handle_ingest(
    Extension(service): Extension<Arc<IngestionService>>,
    payload: Result<Json<IngestRequest>, JsonRejection>,
) -> Result<Json<IngestResponse>, IngestError> {
    let Json(req) = payload.map_err(|rejection| {
        tracing::debug!("Rejected ingest body: {}", rejection.body_text());
        IngestError::InvalidInput(rejection.body_text())
    })?;

    match service.submit(req) {
        Ok(ingestion_id) => Ok(Json(IngestResponse { ingestion_id })),
        Err(e) => {
            tracing::warn!("Failed to accept ingestion: {}", e);
            Err(e)
        }
    }
}

/// `GET /status/:ingestion_id`: the aggregate status and every batch, or 404.
pub async fn handle_ingest_status(
    Extension(service): Extension<Arc<IngestionService>>,
    Path(ingestion_id): Path<String>,
) -> Result<Json<IngestionStatusResponse>, IngestError> {
    let ingestion_id = IngestionId(ingestion_id);
    let status = service.status(&ingestion_id)?;

    tracing::debug!("Status query: {} -> {:?}", ingestion_id, status.status);
    Ok(Json(status))
}
