//! Batch Processor
//!
//! The processing stage of the worker loop, held as a type-erased async closure. The
//! scheduler only sees `BatchProcessor::process`, so a real external call (with its own
//! timeouts and retries) can replace the simulated one without touching the scheduling logic.

use super::types::BatchJob;

use anyhow::Result;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

/// Type alias for a thread-safe, asynchronous batch handler function.
pub type BatchProcessorFn =
    Arc<dyn Fn(BatchJob) -> Pin<Box<dyn Future<Output = Result<()>> + Send>> + Send + Sync>;

/// Named, cloneable processing step.
#[derive(Clone)]
pub struct BatchProcessor {
    /// Label used in logs.
    name: String,
    /// The type-erased async closure.
    handler: BatchProcessorFn,
}

impl BatchProcessor {
    /// Wraps an async closure as the processing step.
    ///
    /// # Arguments
    /// * `name` - Label used in logs.
    /// * `handler` - Async closure called once per admitted batch. An `Err` (or a panic) marks
    ///   the batch `Failed`.
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(BatchJob) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        // Box::pin erases the concrete future type.
        let handler: BatchProcessorFn = Arc::new(move |job: BatchJob| {
            Box::pin(handler(job)) as Pin<Box<dyn Future<Output = Result<()>> + Send>>
        });

        Self {
            name: name.to_string(),
            handler,
        }
    }

    /// Stand-in for the external API call: sleeps for `latency` and succeeds.
    pub fn simulated(latency: Duration) -> Self {
        Self::new("simulated", move |job: BatchJob| async move {
            tokio::time::sleep(latency).await;
            tracing::debug!(
                "Simulated fetch of {} ids for batch {}",
                job.ids.len(),
                job.batch_id
            );
            Ok(())
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn process(&self, job: BatchJob) -> Result<()> {
        (self.handler)(job).await
    }
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("name", &self.name)
            .finish()
    }
}
