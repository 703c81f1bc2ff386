//! Batch Scheduling Module
//!
//! Schedules batch-processing tasks under a priority and rate-limiting policy.
//!
//! ## Architecture Overview
//! 1. **Submission**: each batch of an ingestion becomes one `ScheduledTask` in the `BatchQueue`,
//!    all sharing the submission's enqueue instant.
//! 2. **Ordering**: the queue yields tasks by `(priority_rank, enqueued_at)`, FIFO within a rank.
//! 3. **Pacing**: the single worker only admits the queue head, and only after it has dwelt in
//!    the queue for the rate-limit window.
//! 4. **Execution**: one batch in flight at a time; status changes are written to the
//!    `StatusStore`.
//!
//! ## Submodules
//! - **`queue`**: the lock-protected priority heap.
//! - **`executor`**: the worker loop (peek -> wait -> trigger -> process -> complete -> remove).
//! - **`processor`**: the injectable processing step and its simulated default.
//! - **`types`**: priorities and queue entries.

pub mod executor;
pub mod processor;
pub mod queue;
pub mod types;
