//! Status Storage Module
//!
//! The single source of truth for ingestion and batch state.
//!
//! ## Core Concepts
//! - **Records**: one `IngestionRecord` per submission, owning its batches.
//! - **Aggregate status**: derived from the batch statuses and recomputed on every batch write.
//! - **Atomicity**: a batch update and its aggregate recompute happen under one entry lock.

pub mod memory;
pub mod types;
