//! In-memory status store.
//!
//! Holds one `IngestionRecord` per submission. Every mutation goes through a `DashMap`
//! entry guard, so the batch write and the aggregate recompute land together and
//! writers on different records only contend when they hash to the same shard.

use super::types::*;
use crate::error::{IngestError, Result};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Thread-safe store of ingestion records, shared by the handlers and the worker loop.
#[derive(Default)]
pub struct StatusStore {
    /// One record per ingestion, keyed by its id.
    records: DashMap<IngestionId, IngestionRecord>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Registers a new ingestion. All batches start out `Pending`.
    pub fn create(&self, record: IngestionRecord) -> Result<()> {
        if record.batches.is_empty() {
            return Err(IngestError::InvalidInput(
                "an ingestion needs at least one batch".to_string(),
            ));
        }

        match self.records.entry(record.ingestion_id.clone()) {
            Entry::Occupied(entry) => Err(IngestError::DuplicateId(entry.key().0.clone())),
            Entry::Vacant(entry) => {
                let mut record = record;
                for batch in record.batches.iter_mut() {
                    batch.status = BatchStatus::Pending;
                }
                record.refresh_status();

                tracing::debug!(
                    "Stored ingestion {} with {} batches",
                    record.ingestion_id,
                    record.batches.len()
                );
                entry.insert(record);
                Ok(())
            }
        }
    }

    /// Returns a snapshot of the record. The clone is taken under the entry's read lock.
    pub fn get(&self, ingestion_id: &IngestionId) -> Option<IngestionRecord> {
        self.records
            .get(ingestion_id)
            .map(|record| record.value().clone())
    }

    /// Same as [`get`](Self::get) but surfaces absence as `NotFound`.
    pub fn require(&self, ingestion_id: &IngestionId) -> Result<IngestionRecord> {
        self.get(ingestion_id)
            .ok_or_else(|| IngestError::NotFound(ingestion_id.0.clone()))
    }

    pub fn contains_batch(&self, ingestion_id: &IngestionId, batch_id: &BatchId) -> bool {
        self.records
            .get(ingestion_id)
            .map(|record| record.batch(batch_id).is_some())
            .unwrap_or(false)
    }

    /// Moves one batch to `status` and recomputes the parent aggregate in the same
    /// critical section.
    ///
    /// Unknown ingestion or batch ids are ignored. Returns whether a batch was updated.
    pub fn update_batch_status(
        &self,
        ingestion_id: &IngestionId,
        batch_id: &BatchId,
        status: BatchStatus,
    ) -> bool {
        let Some(mut record) = self.records.get_mut(ingestion_id) else {
            tracing::debug!("Ignoring status update for unknown ingestion {}", ingestion_id);
            return false;
        };

        let Some(batch) = record.batches.iter_mut().find(|b| &b.batch_id == batch_id) else {
            tracing::debug!(
                "Ignoring status update for unknown batch {} of ingestion {}",
                batch_id,
                ingestion_id
            );
            return false;
        };

        batch.status = status;
        record.refresh_status();

        tracing::trace!(
            "Batch {} -> {:?}, ingestion {} -> {:?}",
            batch_id,
            status,
            ingestion_id,
            record.status
        );
        true
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Counts ingestions per aggregate status: (pending, triggered, completed, failed).
    pub fn status_counts(&self) -> (usize, usize, usize, usize) {
        let mut pending = 0;
        let mut triggered = 0;
        let mut completed = 0;
        let mut failed = 0;

        for record in self.records.iter() {
            match record.status {
                BatchStatus::Pending => pending += 1,
                BatchStatus::Triggered => triggered += 1,
                BatchStatus::Completed => completed += 1,
                BatchStatus::Failed => failed += 1,
            }
        }

        (pending, triggered, completed, failed)
    }
}
