//! Worker Loop Implementation
//!
//! A single consumer drains the `BatchQueue` one batch at a time.
//!
//! ## Responsibilities
//! - **Admission**: only the queue head is ever considered. It becomes eligible once it has
//!   waited `rate_limit_window` since it was enqueued; until then the loop sleeps and re-peeks.
//! - **Execution**: marks the batch `Triggered`, runs the `BatchProcessor` on its own task,
//!   marks it `Completed` (or `Failed`, also when the processor panics), then removes the task.
//! - **Cleanup**: tasks whose batch has no status record are dropped.

use super::processor::BatchProcessor;
use super::queue::BatchQueue;
use super::types::*;
use crate::config::SchedulerConfig;
use crate::error::IngestError;
use crate::storage::memory::StatusStore;
use crate::storage::types::BatchStatus;

use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// What the loop found at the head of the queue.
#[derive(Debug)]
enum Admission {
    Empty,
    Orphaned(ScheduledTask),
    NotYet(Duration),
    Ready(ScheduledTask),
}

/// The engine that drives batch processing.
pub struct BatchScheduler {
    /// Pending tasks; the head is the only admission candidate.
    queue: Arc<BatchQueue>,
    /// Status records the worker reads ids from and writes transitions to.
    store: Arc<StatusStore>,
    /// The processing step run for each admitted batch.
    processor: BatchProcessor,
    /// Window, idle poll and admission wait settings.
    config: SchedulerConfig,
}

impl BatchScheduler {
    /// Creates a new scheduler.
    ///
    /// # Arguments
    /// * `queue` - Shared queue filled by the ingestion service.
    /// * `store` - Shared status store.
    /// * `processor` - Processing step invoked once per admitted batch.
    /// * `config` - Pacing settings.
    pub fn new(
        queue: Arc<BatchQueue>,
        store: Arc<StatusStore>,
        processor: BatchProcessor,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            queue,
            store,
            processor,
            config,
        })
    }

    /// Spawns the worker loop and returns immediately.
    pub fn start(self: Arc<Self>, shutdown: CancellationToken) -> JoinHandle<()> {
        tracing::info!(
            "Starting batch worker (processor: {}, window: {:?})",
            self.processor.name(),
            self.config.rate_limit_window()
        );

        tokio::spawn(async move {
            self.run(shutdown).await;
        })
    }

    /// Runs until `shutdown` is cancelled.
    ///
    /// Cancellation is only observed while waiting. A batch that has been triggered is always
    /// taken through to a terminal status first.
    pub async fn run(&self, shutdown: CancellationToken) {
        loop {
            if shutdown.is_cancelled() {
                break;
            }

            match self.inspect_head() {
                Admission::Empty => {
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = self.queue.wait_for_push(self.config.idle_poll()) => {}
                    }
                }
                Admission::Orphaned(task) => {
                    let err = IngestError::InconsistentState {
                        ingestion_id: task.ingestion_id.0.clone(),
                        batch_id: task.batch_id.0.clone(),
                    };
                    tracing::warn!("Discarding queued task: {}", err);
                    self.queue.remove(&task);
                }
                Admission::NotYet(remaining) => {
                    let wait = remaining.min(self.config.max_admission_wait());
                    tracing::trace!("Queue head not eligible yet, sleeping {:?}", wait);
                    tokio::select! {
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(wait) => {}
                    }
                }
                Admission::Ready(task) => {
                    self.process(task).await;
                }
            }
        }

        tracing::info!("Batch worker stopped ({} tasks left in queue)", self.queue.len());
    }

    /// Looks at the queue head and decides what the loop does next.
    fn inspect_head(&self) -> Admission {
        let Some(task) = self.queue.peek() else {
            return Admission::Empty;
        };

        if !self.store.contains_batch(&task.ingestion_id, &task.batch_id) {
            return Admission::Orphaned(task);
        }

        let window = self.config.rate_limit_window();
        let elapsed = Instant::now().saturating_duration_since(task.enqueued_at);
        if elapsed < window {
            return Admission::NotYet(window - elapsed);
        }

        Admission::Ready(task)
    }

    /// Takes an eligible task through Triggered -> Completed -> removed.
    async fn process(&self, task: ScheduledTask) {
        let ids = self
            .store
            .get(&task.ingestion_id)
            .and_then(|record| record.batch(&task.batch_id).map(|b| b.ids.clone()));

        let Some(ids) = ids else {
            tracing::warn!(
                "Batch {} of ingestion {} vanished before admission",
                task.batch_id,
                task.ingestion_id
            );
            self.queue.remove(&task);
            return;
        };

        self.store
            .update_batch_status(&task.ingestion_id, &task.batch_id, BatchStatus::Triggered);
        tracing::info!(
            "Triggered batch {} of ingestion {} ({} ids, rank {})",
            task.batch_id,
            task.ingestion_id,
            ids.len(),
            task.priority_rank
        );

        let job = BatchJob {
            ingestion_id: task.ingestion_id.clone(),
            batch_id: task.batch_id.clone(),
            ids,
        };

        // Run on its own task so a panicking processor fails the batch, not the worker.
        let processor = self.processor.clone();
        let outcome = tokio::spawn(async move { processor.process(job).await }).await;

        let final_status = match outcome {
            Ok(Ok(())) => BatchStatus::Completed,
            Ok(Err(e)) => {
                tracing::error!(
                    "Batch {} of ingestion {} failed: {:#}",
                    task.batch_id,
                    task.ingestion_id,
                    e
                );
                BatchStatus::Failed
            }
            Err(join_err) => {
                tracing::error!(
                    "Processor panicked on batch {} of ingestion {}: {}",
                    task.batch_id,
                    task.ingestion_id,
                    join_err
                );
                BatchStatus::Failed
            }
        };

        self.store
            .update_batch_status(&task.ingestion_id, &task.batch_id, final_status);
        self.queue.remove(&task);

        tracing::info!(
            "Batch {} of ingestion {} finished: {:?}",
            task.batch_id,
            task.ingestion_id,
            final_status
        );
    }
}

/// Spawns a background task that periodically logs queue depth and store counts.
pub fn spawn_stats_reporter(
    queue: Arc<BatchQueue>,
    store: Arc<StatusStore>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => break,
                _ = interval.tick() => {}
            }

            let (pending, triggered, completed, failed) = store.status_counts();
            tracing::info!(
                "Stats: {} queued batches, {} ingestions (pending={} triggered={} completed={} failed={})",
                queue.len(),
                store.len(),
                pending,
                triggered,
                completed,
                failed
            );
        }
    })
}
