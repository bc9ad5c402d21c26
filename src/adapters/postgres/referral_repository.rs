//! PostgreSQL implementation of ReferralRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, ReferralId, UserId};
use crate::domain::referral::{Referral, ReferralStatus};
use crate::ports::ReferralRepository;

/// PostgreSQL implementation of the ReferralRepository port.
pub struct PostgresReferralRepository {
    pool: PgPool,
}

impl PostgresReferralRepository {
    /// Creates a new PostgresReferralRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a referral edge.
#[derive(Debug, sqlx::FromRow)]
struct ReferralRow {
    id: Uuid,
    referrer_id: Uuid,
    referred_id: Uuid,
    status: String,
    commission: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<ReferralRow> for Referral {
    type Error = DomainError;

    fn try_from(row: ReferralRow) -> Result<Self, Self::Error> {
        let status = parse_status(&row.status)?;

        Ok(Referral {
            id: ReferralId::from_uuid(row.id),
            referrer: UserId::from_uuid(row.referrer_id),
            referred: UserId::from_uuid(row.referred_id),
            status,
            commission: row.commission,
            created_at: row.created_at,
        })
    }
}

fn parse_status(s: &str) -> Result<ReferralStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "pending" => Ok(ReferralStatus::Pending),
        "completed" => Ok(ReferralStatus::Completed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid referral status value: {}", s),
        )),
    }
}

fn status_to_string(status: &ReferralStatus) -> &'static str {
    match status {
        ReferralStatus::Pending => "pending",
        ReferralStatus::Completed => "completed",
    }
}

#[async_trait]
impl ReferralRepository for PostgresReferralRepository {
    async fn save(&self, referral: &Referral) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO referrals (id, referrer_id, referred_id, status, commission, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(referral.id.as_uuid())
        .bind(referral.referrer.as_uuid())
        .bind(referral.referred.as_uuid())
        .bind(status_to_string(&referral.status))
        .bind(referral.commission)
        .bind(referral.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save referral: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, referral: &Referral) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE referrals SET
                status = $2,
                commission = $3
            WHERE id = $1
            "#,
        )
        .bind(referral.id.as_uuid())
        .bind(status_to_string(&referral.status))
        .bind(referral.commission)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update referral: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::ReferralNotFound,
                "Referral not found",
            ));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &ReferralId) -> Result<Option<Referral>, DomainError> {
        let row: Option<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referrer_id, referred_id, status, commission, created_at
            FROM referrals
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find referral: {}", e))
        })?;

        row.map(Referral::try_from).transpose()
    }

    async fn find_by_referred(&self, referred: &UserId) -> Result<Option<Referral>, DomainError> {
        let row: Option<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referrer_id, referred_id, status, commission, created_at
            FROM referrals
            WHERE referred_id = $1
            ORDER BY created_at ASC
            LIMIT 1
            "#,
        )
        .bind(referred.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find referral: {}", e))
        })?;

        row.map(Referral::try_from).transpose()
    }

    async fn list_by_referrer(&self, referrer: &UserId) -> Result<Vec<Referral>, DomainError> {
        let rows: Vec<ReferralRow> = sqlx::query_as(
            r#"
            SELECT id, referrer_id, referred_id, status, commission, created_at
            FROM referrals
            WHERE referrer_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(referrer.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list referrals: {}", e))
        })?;

        rows.into_iter().map(Referral::try_from).collect()
    }
}
