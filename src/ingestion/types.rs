//! Ingestion Data Types
//!
//! Request and response bodies of the public API.

use crate::executor::types::Priority;
use crate::storage::types::{BatchId, BatchStatus, IngestionId, IngestionRecord};
use serde::{Deserialize, Serialize};

/// Smallest accepted item id.
pub const MIN_ITEM_ID: u64 = 1;
/// Largest accepted item id (10^9 + 7).
pub const MAX_ITEM_ID: u64 = 1_000_000_007;

/// Body of `POST /ingest`.
///
/// `priority` stays a string here so an unknown value is reported by validation with a
/// readable message instead of a serde error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestRequest {
    pub ids: Vec<u64>,
    pub priority: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestResponse {
    pub ingestion_id: IngestionId,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BatchStatusView {
    pub batch_id: BatchId,
    pub ids: Vec<u64>,
    pub status: BatchStatus,
}

/// Body of `GET /status/:ingestion_id`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionStatusResponse {
    pub ingestion_id: IngestionId,
    pub status: BatchStatus,
    pub batches: Vec<BatchStatusView>,
}

impl From<IngestionRecord> for IngestionStatusResponse {
    fn from(record: IngestionRecord) -> Self {
        Self {
            ingestion_id: record.ingestion_id,
            status: record.status,
            batches: record
                .batches
                .into_iter()
                .map(|b| BatchStatusView {
                    batch_id: b.batch_id,
                    ids: b.ids,
                    status: b.status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootResponse {
    pub message: String,
}

/// A submission that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedIngest {
    pub ids: Vec<u64>,
    pub priority: Priority,
}
