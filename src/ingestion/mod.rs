//! Ingestion Service Module
//!
//! Accepts id lists, turns them into scheduled batches and answers status queries.
//!
//! ## Workflow
//! 1. **Validate**: non-empty ids, each in `[1, 10^9+7]`, priority HIGH/MEDIUM/LOW.
//! 2. **Split**: the ids are chunked into batches of the configured size.
//! 3. **Record**: one `IngestionRecord` with every batch `Pending` goes into the `StatusStore`.
//! 4. **Enqueue**: one `ScheduledTask` per batch is pushed onto the `BatchQueue`.

pub mod handlers;
pub mod service;
pub mod splitter;
pub mod types;
