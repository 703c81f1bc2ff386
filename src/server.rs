//! HTTP Surface
//!
//! Wires the shared state into an axum `Router`. The state is created once per process
//! and handed to both the handlers (via `Extension`) and the worker loop.

use crate::config::SchedulerConfig;
use crate::executor::executor::{BatchScheduler, spawn_stats_reporter};
use crate::executor::processor::BatchProcessor;
use crate::executor::queue::BatchQueue;
use crate::ingestion::handlers::{handle_ingest, handle_ingest_status, handle_root};
use crate::ingestion::service::IngestionService;
use crate::storage::memory::StatusStore;

use axum::extract::Extension;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const ENDPOINT_ROOT: &str = "/";
pub const ENDPOINT_INGEST: &str = "/ingest";
pub const ENDPOINT_STATUS: &str = "/status/:ingestion_id";

/// Shared process state: the status store, the queue and the intake service on top of them.
#[derive(Clone)]
pub struct AppState {
    /// Per-ingestion status records.
    pub store: Arc<StatusStore>,
    /// Batches waiting for admission.
    pub queue: Arc<BatchQueue>,
    /// Validation, splitting and enqueueing for `POST /ingest`.
    pub service: Arc<IngestionService>,
    /// Settings the worker loop and the service were built with.
    pub config: SchedulerConfig,
}

impl AppState {
    /// Builds an empty store and queue and the intake service over them.
    pub fn new(config: SchedulerConfig) -> Self {
        let store = Arc::new(StatusStore::new());
        let queue = Arc::new(BatchQueue::new());
        let service = Arc::new(IngestionService::new(
            store.clone(),
            queue.clone(),
            &config,
        ));

        Self {
            store,
            queue,
            service,
            config,
        }
    }

    /// Routes `/`, `/ingest` and `/status/:ingestion_id`, with the service as an `Extension`.
    pub fn router(&self) -> Router {
        Router::new()
            .route(ENDPOINT_ROOT, get(handle_root))
            .route(ENDPOINT_INGEST, post(handle_ingest))
            .route(ENDPOINT_STATUS, get(handle_ingest_status))
            .layer(Extension(self.service.clone()))
    }

    /// Spawns the worker loop with the given processing step.
    pub fn start_worker(
        &self,
        processor: BatchProcessor,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        BatchScheduler::new(
            self.queue.clone(),
            self.store.clone(),
            processor,
            self.config.clone(),
        )
        .start(shutdown)
    }

    /// Spawns the worker loop with the simulated fixed-latency processor.
    pub fn start_simulated_worker(&self, shutdown: CancellationToken) -> JoinHandle<()> {
        self.start_worker(
            BatchProcessor::simulated(self.config.processing_latency()),
            shutdown,
        )
    }

    /// Spawns the periodic stats log, unless disabled in the config.
    pub fn start_stats_reporter(&self, shutdown: CancellationToken) -> Option<JoinHandle<()>> {
        let every = self.config.stats_interval()?;
        Some(spawn_stats_reporter(
            self.queue.clone(),
            self.store.clone(),
            every,
            shutdown,
        ))
    }
}
