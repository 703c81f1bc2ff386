//! Batch Ingestion Service Library
//!
//! Accepts lists of item ids, splits them into batches, schedules the batches under a
//! priority and rate-limiting policy and reports per-submission progress.
//!
//! ## Modules
//! - **`executor`**: the scheduling core. A priority queue of batch tasks and the single
//!   rate-limited worker loop that drains it.
//! - **`storage`**: the in-memory status store holding every ingestion and its batches,
//!   including the derived aggregate status.
//! - **`ingestion`**: request validation, batch splitting and the HTTP handlers.
//! - **`server`**: shared state construction and the axum router.
//! - **`config`** / **`error`**: scheduler settings and the error taxonomy.

pub mod config;
pub mod error;
pub mod executor;
pub mod ingestion;
pub mod server;
pub mod storage;
