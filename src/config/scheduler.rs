//! Deferred job scheduler configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Scheduler configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SchedulerConfig {
    /// Seconds between polls of the job table
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,

    /// Maximum jobs claimed per poll
    #[serde(default = "default_claim_batch")]
    pub claim_batch: u32,

    /// Days processed webhook event records are kept before deletion
    #[serde(default = "default_event_retention_days")]
    pub event_retention_days: u32,
}

impl SchedulerConfig {
    /// Get poll interval as Duration
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Get the webhook event retention window
    pub fn event_retention(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.event_retention_days))
    }

    /// Validate scheduler configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.poll_interval_secs == 0 || self.poll_interval_secs > 3600 {
            return Err(ValidationError::InvalidPollInterval);
        }
        if self.claim_batch == 0 || self.claim_batch > 1000 {
            return Err(ValidationError::InvalidClaimBatch);
        }
        if self.event_retention_days == 0 {
            return Err(ValidationError::InvalidEventRetention);
        }
        Ok(())
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            claim_batch: default_claim_batch(),
            event_retention_days: default_event_retention_days(),
        }
    }
}

fn default_poll_interval() -> u64 {
    15
}

fn default_claim_batch() -> u32 {
    50
}

fn default_event_retention_days() -> u32 {
    30
}
