//! In-memory implementation of JobStore.
//!
//! The claim transition holds the write lock for the whole scan, so a
//! job can be claimed by at most one caller, mirroring the row-level
//! compare-and-swap of the PostgreSQL adapter.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, JobId};
use crate::ports::{JobRecord, JobStatus, JobStore};

/// In-memory deferred job store keyed by job id.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Arc<RwLock<HashMap<JobId, JobRecord>>>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all jobs (test convenience).
    pub async fn all(&self) -> Vec<JobRecord> {
        self.jobs.read().await.values().cloned().collect()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn schedule(&self, job: JobRecord) -> Result<(), DomainError> {
        self.jobs.write().await.insert(job.id, job);
        Ok(())
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<JobRecord>, DomainError> {
        let mut jobs = self.jobs.write().await;

        let mut due: Vec<JobId> = jobs
            .values()
            .filter(|j| j.status == JobStatus::Pending && j.due_at <= now)
            .map(|j| j.id)
            .collect();
        due.sort_by_key(|id| jobs[id].due_at);
        due.truncate(limit as usize);

        let mut claimed = Vec::with_capacity(due.len());
        for id in due {
            if let Some(job) = jobs.get_mut(&id) {
                job.status = JobStatus::Claimed;
                claimed.push(job.clone());
            }
        }
        Ok(claimed)
    }

    async fn mark_done(&self, id: &JobId) -> Result<(), DomainError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::JobNotFound, "Job not found"))?;
        job.status = JobStatus::Done;
        Ok(())
    }

    async fn mark_failed(&self, id: &JobId, error: &str) -> Result<(), DomainError> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id)
            .ok_or_else(|| DomainError::new(ErrorCode::JobNotFound, "Job not found"))?;
        job.status = JobStatus::Failed;
        job.error_message = Some(error.to_string());
        Ok(())
    }

    async fn count_pending(&self) -> Result<u64, DomainError> {
        Ok(self
            .jobs
            .read()
            .await
            .values()
            .filter(|j| j.status == JobStatus::Pending)
            .count() as u64)
    }
}
