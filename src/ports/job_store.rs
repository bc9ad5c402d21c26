//! JobStore port - durable one-shot deferred actions.
//!
//! Replaces in-process timers with a persisted job table so deferred
//! actions survive process restarts. The requirement: perform action A
//! at/after time T, exactly once, survivable across restarts.
//!
//! At-most-once execution is enforced by a compare-and-swap status
//! transition (`pending` → `claimed`): of any number of concurrent
//! runners, only the one whose claim succeeds executes the job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::PlanTier;
use crate::domain::foundation::{DomainError, JobId, RaffleId, UserId};

/// The action a deferred job performs when it comes due.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobKind {
    /// Revoke a time-limited entitlement if the user's tier is unchanged.
    EntitlementExpiry { user_id: UserId, tier: PlanTier },

    /// Flip a raffle from scheduled to completed.
    CompleteRaffle { raffle_id: RaffleId },
}

/// Lifecycle status of a deferred job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting for its due time.
    Pending,
    /// Claimed by a runner; being executed.
    Claimed,
    /// Executed successfully.
    Done,
    /// Execution failed; error recorded.
    Failed,
}

/// A persisted one-shot deferred action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: JobId,
    pub kind: JobKind,
    /// Wall-clock time at/after which the job fires.
    pub due_at: DateTime<Utc>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    /// Error message from the last failed execution, if any.
    pub error_message: Option<String>,
}

impl JobRecord {
    /// Creates a new pending job due at the given time.
    pub fn new(kind: JobKind, due_at: DateTime<Utc>) -> Self {
        Self {
            id: JobId::new(),
            kind,
            due_at,
            status: JobStatus::Pending,
            created_at: Utc::now(),
            error_message: None,
        }
    }
}

/// Port for persisting and claiming deferred jobs.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persists a new pending job.
    async fn schedule(&self, job: JobRecord) -> Result<(), DomainError>;

    /// Atomically claims up to `limit` jobs due at or before `now`.
    ///
    /// Each returned job has been transitioned `pending` → `claimed` by
    /// this call; a job claimed here is invisible to concurrent claimers.
    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<JobRecord>, DomainError>;

    /// Marks a claimed job as executed.
    async fn mark_done(&self, id: &JobId) -> Result<(), DomainError>;

    /// Marks a claimed job as failed, recording the error.
    async fn mark_failed(&self, id: &JobId, error: &str) -> Result<(), DomainError>;

    /// Counts jobs still pending (used by tests and health reporting).
    async fn count_pending(&self) -> Result<u64, DomainError>;
}
