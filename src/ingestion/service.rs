//! Submission intake and status lookup.
//!
//! Everything is validated before the first write, so a rejected submission leaves no record
//! in the store and nothing in the queue.

use super::splitter::split_batches;
use super::types::*;
use crate::config::SchedulerConfig;
use crate::error::{IngestError, Result};
use crate::executor::queue::BatchQueue;
use crate::executor::types::{Priority, ScheduledTask};
use crate::storage::memory::StatusStore;
use crate::storage::types::{Batch, IngestionId, IngestionRecord};

use std::sync::Arc;
use tokio::time::Instant;

/// Accepts submissions and answers status queries.
pub struct IngestionService {
    /// Where new records are created.
    store: Arc<StatusStore>,
    /// Where the batches of a new record are pushed.
    queue: Arc<BatchQueue>,
    /// Maximum ids per batch.
    batch_size: usize,
}

impl IngestionService {
    /// Creates a new intake service.
    ///
    /// # Arguments
    /// * `store` - Shared status store.
    /// * `queue` - Shared batch queue the worker loop drains.
    /// * `config` - Source of the batch size.
    pub fn new(store: Arc<StatusStore>, queue: Arc<BatchQueue>, config: &SchedulerConfig) -> Self {
        Self {
            store,
            queue,
            batch_size: config.batch_size,
        }
    }

    /// Checks the id list and priority of a raw request.
    pub fn validate(request: IngestRequest) -> Result<ValidatedIngest> {
        if request.ids.is_empty() {
            return Err(IngestError::InvalidInput("ids must not be empty".to_string()));
        }

        if let Some(bad) = request
            .ids
            .iter()
            .find(|id| !(MIN_ITEM_ID..=MAX_ITEM_ID).contains(*id))
        {
            return Err(IngestError::InvalidInput(format!(
                "id {} is outside [{}, {}]",
                bad, MIN_ITEM_ID, MAX_ITEM_ID
            )));
        }

        let priority: Priority = request.priority.parse().map_err(IngestError::InvalidInput)?;

        Ok(ValidatedIngest {
            ids: request.ids,
            priority,
        })
    }

    /// Validates, splits, records and enqueues a submission.
    pub fn submit(&self, request: IngestRequest) -> Result<IngestionId> {
        let ValidatedIngest { ids, priority } = Self::validate(request)?;

        let chunks = split_batches(&ids, self.batch_size)?;
        let batches: Vec<Batch> = chunks.into_iter().map(Batch::new).collect();

        let ingestion_id = IngestionId::new();
        let enqueued_at = Instant::now();
        let tasks: Vec<ScheduledTask> = batches
            .iter()
            .map(|b| {
                ScheduledTask::new(
                    priority,
                    enqueued_at,
                    ingestion_id.clone(),
                    b.batch_id.clone(),
                )
            })
            .collect();
        let batch_count = batches.len();

        // The record must exist before the worker can see its tasks.
        self.store
            .create(IngestionRecord::new(ingestion_id.clone(), priority, batches))?;
        self.queue.push_all(tasks);

        tracing::info!(
            "Accepted ingestion {} ({} ids, {} batches, priority {:?})",
            ingestion_id,
            ids.len(),
            batch_count,
            priority
        );

        Ok(ingestion_id)
    }

    pub fn status(&self, ingestion_id: &IngestionId) -> Result<IngestionStatusResponse> {
        self.store.require(ingestion_id).map(Into::into)
    }
}
