use crate::executor::types::Priority;
use serde::{Deserialize, Serialize};

/// Unique identifier of one client submission.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct IngestionId(pub String);

impl IngestionId {
    /// Generates a new random UUID v4-based IngestionId.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for IngestionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for IngestionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier of a batch. Assigned when the submission is split.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct BatchId(pub String);

impl BatchId {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }
}

impl Default for BatchId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BatchId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Processing state of a batch, and the aggregate state of an ingestion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Queued, not yet admitted by the worker.
    #[serde(rename = "yet_to_start")]
    Pending,
    /// Admitted; the processing step is in flight.
    Triggered,
    Completed,
    /// Terminal. Only reachable when an injected processor returns an error.
    Failed,
}

impl BatchStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, BatchStatus::Completed | BatchStatus::Failed)
    }
}

/// A chunk of item ids processed as one unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Batch {
    pub batch_id: BatchId,
    pub ids: Vec<u64>,
    pub status: BatchStatus,
    /// Timestamp (ms) when the batch record was created.
    pub created_at: u64,
}

impl Batch {
    /// Creates a `Pending` batch with a fresh id.
    pub fn new(ids: Vec<u64>) -> Self {
        Self {
            batch_id: BatchId::new(),
            ids,
            status: BatchStatus::Pending,
            created_at: now_ms(),
        }
    }
}

/// Everything the status store knows about one submission.
///
/// `status` is derived from `batches` and is only ever written through
/// [`IngestionRecord::refresh_status`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IngestionRecord {
    pub ingestion_id: IngestionId,
    pub priority: Priority,
    pub status: BatchStatus,
    pub batches: Vec<Batch>,
    /// Timestamp (ms) when the ingestion was accepted.
    pub created_at: u64,
}

impl IngestionRecord {
    pub fn new(ingestion_id: IngestionId, priority: Priority, batches: Vec<Batch>) -> Self {
        let mut record = Self {
            ingestion_id,
            priority,
            status: BatchStatus::Pending,
            batches,
            created_at: now_ms(),
        };
        record.refresh_status();
        record
    }

    pub fn batch(&self, batch_id: &BatchId) -> Option<&Batch> {
        self.batches.iter().find(|b| &b.batch_id == batch_id)
    }

    /// Recomputes the aggregate status from the batch statuses.
    pub fn refresh_status(&mut self) {
        self.status = aggregate_status(self.batches.iter().map(|b| b.status));
    }
}

/// Derives the ingestion status from its batches.
///
/// `Completed` when every batch completed, otherwise `Triggered` when any batch is in
/// flight, otherwise `Pending`. A batch that failed makes the ingestion `Failed` once
/// nothing else is left to run.
pub fn aggregate_status<I>(statuses: I) -> BatchStatus
where
    I: IntoIterator<Item = BatchStatus>,
{
    let mut all_completed = true;
    let mut all_terminal = true;
    let mut any_triggered = false;
    let mut any_failed = false;

    for status in statuses {
        all_completed &= status == BatchStatus::Completed;
        all_terminal &= status.is_terminal();
        any_triggered |= status == BatchStatus::Triggered;
        any_failed |= status == BatchStatus::Failed;
    }

    if all_completed {
        BatchStatus::Completed
    } else if any_triggered {
        BatchStatus::Triggered
    } else if any_failed && all_terminal {
        BatchStatus::Failed
    } else {
        BatchStatus::Pending
    }
}

/// Helper to get the current system time in milliseconds.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}
