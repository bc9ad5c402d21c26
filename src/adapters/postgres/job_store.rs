//! PostgreSQL implementation of JobStore.
//!
//! Claiming uses `FOR UPDATE SKIP LOCKED` inside a single UPDATE so
//! concurrent runners never claim the same job: the row transition
//! `pending` → `claimed` happens exactly once per job.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, JobId};
use crate::ports::{JobKind, JobRecord, JobStatus, JobStore};

/// PostgreSQL implementation of the JobStore port.
pub struct PostgresJobStore {
    pool: PgPool,
}

impl PostgresJobStore {
    /// Creates a new PostgresJobStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a deferred job.
#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: Uuid,
    kind: serde_json::Value,
    due_at: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
    error_message: Option<String>,
}

impl TryFrom<JobRow> for JobRecord {
    type Error = DomainError;

    fn try_from(row: JobRow) -> Result<Self, Self::Error> {
        let kind: JobKind = serde_json::from_value(row.kind).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Invalid job kind value: {}", e))
        })?;
        let status = parse_status(&row.status)?;

        Ok(JobRecord {
            id: JobId::from_uuid(row.id),
            kind,
            due_at: row.due_at,
            status,
            created_at: row.created_at,
            error_message: row.error_message,
        })
    }
}

fn parse_status(s: &str) -> Result<JobStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(JobStatus::Pending),
        "claimed" => Ok(JobStatus::Claimed),
        "done" => Ok(JobStatus::Done),
        "failed" => Ok(JobStatus::Failed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid job status value: {}", s),
        )),
    }
}

fn status_to_string(status: &JobStatus) -> &'static str {
    match status {
        JobStatus::Pending => "pending",
        JobStatus::Claimed => "claimed",
        JobStatus::Done => "done",
        JobStatus::Failed => "failed",
    }
}

#[async_trait]
impl JobStore for PostgresJobStore {
    async fn schedule(&self, job: JobRecord) -> Result<(), DomainError> {
        let kind = serde_json::to_value(&job.kind).map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to encode job kind: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO jobs (id, kind, due_at, status, created_at, error_message)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(job.id.as_uuid())
        .bind(kind)
        .bind(job.due_at)
        .bind(status_to_string(&job.status))
        .bind(job.created_at)
        .bind(&job.error_message)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to schedule job: {}", e))
        })?;

        Ok(())
    }

    async fn claim_due(
        &self,
        now: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<JobRecord>, DomainError> {
        let rows: Vec<JobRow> = sqlx::query_as(
            r#"
            UPDATE jobs SET status = 'claimed'
            WHERE id IN (
                SELECT id FROM jobs
                WHERE status = 'pending' AND due_at <= $1
                ORDER BY due_at ASC
                LIMIT $2
                FOR UPDATE SKIP LOCKED
            )
            RETURNING id, kind, due_at, status, created_at, error_message
            "#,
        )
        .bind(now)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to claim jobs: {}", e))
        })?;

        rows.into_iter().map(JobRecord::try_from).collect()
    }

    async fn mark_done(&self, id: &JobId) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE jobs SET status = 'done' WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to mark job done: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::JobNotFound, "Job not found"));
        }

        Ok(())
    }

    async fn mark_failed(&self, id: &JobId, error: &str) -> Result<(), DomainError> {
        let result = sqlx::query("UPDATE jobs SET status = 'failed', error_message = $2 WHERE id = $1")
            .bind(id.as_uuid())
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to mark job failed: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::JobNotFound, "Job not found"));
        }

        Ok(())
    }

    async fn count_pending(&self) -> Result<u64, DomainError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM jobs WHERE status = 'pending'")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to count pending jobs: {}", e),
                )
            })?;

        Ok(count.0 as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_status_works_for_all_values() {
        assert_eq!(parse_status("pending").unwrap(), JobStatus::Pending);
        assert_eq!(parse_status("claimed").unwrap(), JobStatus::Claimed);
        assert_eq!(parse_status("done").unwrap(), JobStatus::Done);
        assert_eq!(parse_status("failed").unwrap(), JobStatus::Failed);
    }

    #[test]
    fn parse_status_rejects_invalid_values() {
        assert!(parse_status("running").is_err());
        assert!(parse_status("").is_err());
    }

    #[test]
    fn roundtrip_status_conversion() {
        for status in [
            JobStatus::Pending,
            JobStatus::Claimed,
            JobStatus::Done,
            JobStatus::Failed,
        ] {
            let s = status_to_string(&status);
            assert_eq!(parse_status(s).unwrap(), status);
        }
    }
}
