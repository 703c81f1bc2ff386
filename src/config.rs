//! Scheduler configuration.
//!
//! All timings are stored in milliseconds so the values map one-to-one onto CLI flags
//! and environment variables. Accessors hand out `Duration`s to the rest of the crate.
//! The `DEFAULT_*` constants are the single source of the default values: both the clap
//! flags and `Default` read them.

use clap::Args;
use std::time::Duration;

use crate::error::{IngestError, Result};

pub const DEFAULT_BATCH_SIZE: usize = 3;
pub const DEFAULT_RATE_LIMIT_WINDOW_MS: u64 = 5_000;
pub const DEFAULT_PROCESSING_LATENCY_MS: u64 = 1_000;
pub const DEFAULT_IDLE_POLL_MS: u64 = 100;
pub const DEFAULT_MAX_ADMISSION_WAIT_MS: u64 = 1_000;
pub const DEFAULT_STATS_INTERVAL_SECS: u64 = 5;

/// Tuning knobs for splitting and pacing.
///
/// Flattened into the binary's CLI; every field is also readable from an `INGEST_*`
/// environment variable.
#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct SchedulerConfig {
    /// Maximum number of item ids per batch.
    #[arg(long, env = "INGEST_BATCH_SIZE", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Minimum time a batch has to sit in the queue before it may be admitted.
    #[arg(long, env = "INGEST_RATE_LIMIT_WINDOW_MS", default_value_t = DEFAULT_RATE_LIMIT_WINDOW_MS)]
    pub rate_limit_window_ms: u64,

    /// Latency of the simulated external call.
    #[arg(long, env = "INGEST_PROCESSING_LATENCY_MS", default_value_t = DEFAULT_PROCESSING_LATENCY_MS)]
    pub processing_latency_ms: u64,

    /// Upper bound on how long the worker sleeps on an empty queue.
    #[arg(long, env = "INGEST_IDLE_POLL_MS", default_value_t = DEFAULT_IDLE_POLL_MS)]
    pub idle_poll_ms: u64,

    /// Upper bound on a single rate-limit sleep. The queue head is re-inspected after each one.
    #[arg(long, env = "INGEST_MAX_ADMISSION_WAIT_MS", default_value_t = DEFAULT_MAX_ADMISSION_WAIT_MS)]
    pub max_admission_wait_ms: u64,

    /// Interval of the queue/store stats log line in seconds. `0` disables the reporter.
    #[arg(long, env = "INGEST_STATS_INTERVAL_SECS", default_value_t = DEFAULT_STATS_INTERVAL_SECS)]
    pub stats_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            rate_limit_window_ms: DEFAULT_RATE_LIMIT_WINDOW_MS,
            processing_latency_ms: DEFAULT_PROCESSING_LATENCY_MS,
            idle_poll_ms: DEFAULT_IDLE_POLL_MS,
            max_admission_wait_ms: DEFAULT_MAX_ADMISSION_WAIT_MS,
            stats_interval_secs: DEFAULT_STATS_INTERVAL_SECS,
        }
    }
}

impl SchedulerConfig {
    /// Rejects configurations the worker loop cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(IngestError::InvalidInput(
                "batch_size must be at least 1".to_string(),
            ));
        }
        if self.rate_limit_window_ms == 0 {
            return Err(IngestError::InvalidInput(
                "rate_limit_window_ms must be positive".to_string(),
            ));
        }
        if self.idle_poll_ms == 0 || self.max_admission_wait_ms == 0 {
            return Err(IngestError::InvalidInput(
                "idle_poll_ms and max_admission_wait_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_millis(self.rate_limit_window_ms)
    }

    pub fn processing_latency(&self) -> Duration {
        Duration::from_millis(self.processing_latency_ms)
    }

    pub fn idle_poll(&self) -> Duration {
        Duration::from_millis(self.idle_poll_ms)
    }

    pub fn max_admission_wait(&self) -> Duration {
        Duration::from_millis(self.max_admission_wait_ms)
    }

    pub fn stats_interval(&self) -> Option<Duration> {
        (self.stats_interval_secs > 0).then(|| Duration::from_secs(self.stats_interval_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Debug, Parser)]
    struct TestCli {
        #[command(flatten)]
        scheduler: SchedulerConfig,
    }

    #[test]
    fn test_defaults_match_documented_values() {
        let config = SchedulerConfig::default();

        assert_eq!(config.batch_size, 3);
        assert_eq!(config.rate_limit_window(), Duration::from_secs(5));
        assert_eq!(config.processing_latency(), Duration::from_secs(1));
        assert_eq!(config.idle_poll(), Duration::from_millis(100));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_cli_defaults_equal_default_impl() {
        let cli = TestCli::try_parse_from(["batch-ingest"]).expect("no flags should parse");

        assert_eq!(cli.scheduler, SchedulerConfig::default());
    }

    #[test]
    fn test_cli_flags_override_defaults() {
        let cli = TestCli::try_parse_from([
            "batch-ingest",
            "--batch-size",
            "10",
            "--rate-limit-window-ms",
            "250",
        ])
        .expect("flags should parse");

        assert_eq!(cli.scheduler.batch_size, 10);
        assert_eq!(cli.scheduler.rate_limit_window(), Duration::from_millis(250));
        assert_eq!(
            cli.scheduler.processing_latency_ms,
            DEFAULT_PROCESSING_LATENCY_MS
        );
    }

    #[test]
    fn test_zero_batch_size_is_rejected() {
        let config = SchedulerConfig {
            batch_size: 0,
            ..SchedulerConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(IngestError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_zero_stats_interval_disables_reporter() {
        let config = SchedulerConfig {
            stats_interval_secs: 0,
            ..SchedulerConfig::default()
        };

        assert!(config.stats_interval().is_none());
    }
}
