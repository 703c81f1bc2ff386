use crate::storage::types::{BatchId, IngestionId};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tokio::time::Instant;

/// Submission priority. Lower rank is processed first.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn rank(self) -> u8 {
        match self {
            Priority::High => 0,
            Priority::Medium => 1,
            Priority::Low => 2,
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "HIGH" => Ok(Priority::High),
            "MEDIUM" => Ok(Priority::Medium),
            "LOW" => Ok(Priority::Low),
            other => Err(format!(
                "unknown priority '{}', expected one of HIGH, MEDIUM, LOW",
                other
            )),
        }
    }
}

/// A queue entry pointing at one batch in the status store.
///
/// Ordered by `(priority_rank, enqueued_at, sequence)`, smallest first. `sequence` is
/// assigned by the queue on push and keeps batches that share an `enqueued_at` in split order.
#[derive(Debug, Clone)]
pub struct ScheduledTask {
    pub priority_rank: u8,
    pub enqueued_at: Instant,
    pub sequence: u64,
    pub ingestion_id: IngestionId,
    pub batch_id: BatchId,
}

impl ScheduledTask {
    pub fn new(
        priority: Priority,
        enqueued_at: Instant,
        ingestion_id: IngestionId,
        batch_id: BatchId,
    ) -> Self {
        Self {
            priority_rank: priority.rank(),
            enqueued_at,
            sequence: 0,
            ingestion_id,
            batch_id,
        }
    }

    fn key(&self) -> (u8, Instant, u64) {
        (self.priority_rank, self.enqueued_at, self.sequence)
    }
}

impl PartialEq for ScheduledTask {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for ScheduledTask {}

impl PartialOrd for ScheduledTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTask {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// What the processing step receives for one admitted batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchJob {
    pub ingestion_id: IngestionId,
    pub batch_id: BatchId,
    pub ids: Vec<u64>,
}
