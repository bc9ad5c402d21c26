//! PostgreSQL implementation of RaffleRepository.
//!
//! Raffle rows hold the prizes, schedule, and outcome; entries live in a
//! companion `raffle_entries` table with one row per entry, ordered by a
//! serial key so the in-memory pool is reconstructed deterministically.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, RaffleId, UserId};
use crate::domain::raffle::{Raffle, RaffleStatus};
use crate::ports::RaffleRepository;

/// PostgreSQL implementation of the RaffleRepository port.
pub struct PostgresRaffleRepository {
    pool: PgPool,
}

impl PostgresRaffleRepository {
    /// Creates a new PostgresRaffleRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn load_entries(&self, raffle_id: &Uuid) -> Result<Vec<UserId>, DomainError> {
        let rows: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT user_id FROM raffle_entries WHERE raffle_id = $1 ORDER BY id ASC",
        )
        .bind(raffle_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to load raffle entries: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(|(id,)| UserId::from_uuid(id)).collect())
    }

    async fn hydrate(&self, row: RaffleRow) -> Result<Raffle, DomainError> {
        let participants = self.load_entries(&row.id).await?;
        raffle_from_row(row, participants)
    }
}

/// Database row representation of a raffle, without its entries.
#[derive(Debug, sqlx::FromRow)]
struct RaffleRow {
    id: Uuid,
    prizes: serde_json::Value,
    winner: Option<Uuid>,
    scheduled_at: DateTime<Utc>,
    status: String,
    created_at: DateTime<Utc>,
}

fn raffle_from_row(row: RaffleRow, participants: Vec<UserId>) -> Result<Raffle, DomainError> {
    let prizes: Vec<String> = serde_json::from_value(row.prizes).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Invalid prizes value: {}", e))
    })?;
    let status = parse_status(&row.status)?;

    Ok(Raffle {
        id: RaffleId::from_uuid(row.id),
        prizes,
        participants,
        winner: row.winner.map(UserId::from_uuid),
        scheduled_at: row.scheduled_at,
        status,
        created_at: row.created_at,
    })
}

fn parse_status(s: &str) -> Result<RaffleStatus, DomainError> {
    match s.to_lowercase().as_str() {
        "scheduled" => Ok(RaffleStatus::Scheduled),
        "completed" => Ok(RaffleStatus::Completed),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid raffle status value: {}", s),
        )),
    }
}

fn status_to_string(status: &RaffleStatus) -> &'static str {
    match status {
        RaffleStatus::Scheduled => "scheduled",
        RaffleStatus::Completed => "completed",
    }
}

fn prizes_to_json(prizes: &[String]) -> Result<serde_json::Value, DomainError> {
    serde_json::to_value(prizes).map_err(|e| {
        DomainError::new(ErrorCode::DatabaseError, format!("Failed to encode prizes: {}", e))
    })
}

const SELECT_COLUMNS: &str = "id, prizes, winner, scheduled_at, status, created_at";

#[async_trait]
impl RaffleRepository for PostgresRaffleRepository {
    async fn save(&self, raffle: &Raffle) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to begin transaction: {}", e))
        })?;

        sqlx::query(
            r#"
            INSERT INTO raffles (id, prizes, winner, scheduled_at, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(raffle.id.as_uuid())
        .bind(prizes_to_json(&raffle.prizes)?)
        .bind(raffle.winner.map(|w| *w.as_uuid()))
        .bind(raffle.scheduled_at)
        .bind(status_to_string(&raffle.status))
        .bind(raffle.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save raffle: {}", e))
        })?;

        for participant in &raffle.participants {
            sqlx::query("INSERT INTO raffle_entries (raffle_id, user_id) VALUES ($1, $2)")
                .bind(raffle.id.as_uuid())
                .bind(participant.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to save raffle entry: {}", e),
                    )
                })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to commit raffle: {}", e))
        })
    }

    async fn update(&self, raffle: &Raffle) -> Result<(), DomainError> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to begin transaction: {}", e))
        })?;

        let result = sqlx::query(
            r#"
            UPDATE raffles SET
                prizes = $2,
                winner = $3,
                scheduled_at = $4,
                status = $5
            WHERE id = $1
            "#,
        )
        .bind(raffle.id.as_uuid())
        .bind(prizes_to_json(&raffle.prizes)?)
        .bind(raffle.winner.map(|w| *w.as_uuid()))
        .bind(raffle.scheduled_at)
        .bind(status_to_string(&raffle.status))
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update raffle: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::RaffleNotFound, "Raffle not found"));
        }

        // The pool is replaced wholesale; entry rows carry no state of
        // their own beyond membership.
        sqlx::query("DELETE FROM raffle_entries WHERE raffle_id = $1")
            .bind(raffle.id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to clear raffle entries: {}", e),
                )
            })?;

        for participant in &raffle.participants {
            sqlx::query("INSERT INTO raffle_entries (raffle_id, user_id) VALUES ($1, $2)")
                .bind(raffle.id.as_uuid())
                .bind(participant.as_uuid())
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to save raffle entry: {}", e),
                    )
                })?;
        }

        tx.commit().await.map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to commit raffle: {}", e))
        })
    }

    async fn find_by_id(&self, id: &RaffleId) -> Result<Option<Raffle>, DomainError> {
        let row: Option<RaffleRow> =
            sqlx::query_as(&format!("SELECT {} FROM raffles WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to find raffle: {}", e),
                    )
                })?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn find_open(&self) -> Result<Option<Raffle>, DomainError> {
        let row: Option<RaffleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM raffles WHERE status = 'scheduled' ORDER BY scheduled_at ASC LIMIT 1",
            SELECT_COLUMNS
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to find open raffle: {}", e))
        })?;

        match row {
            Some(row) => Ok(Some(self.hydrate(row).await?)),
            None => Ok(None),
        }
    }

    async fn list(&self) -> Result<Vec<Raffle>, DomainError> {
        let rows: Vec<RaffleRow> = sqlx::query_as(&format!(
            "SELECT {} FROM raffles ORDER BY created_at DESC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to list raffles: {}", e))
        })?;

        let mut raffles = Vec::with_capacity(rows.len());
        for row in rows {
            raffles.push(self.hydrate(row).await?);
        }
        Ok(raffles)
    }

    async fn add_entries(
        &self,
        raffle_id: &RaffleId,
        user_id: &UserId,
        count: u32,
    ) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO raffle_entries (raffle_id, user_id)
            SELECT $1, $2 FROM generate_series(1, $3)
            "#,
        )
        .bind(raffle_id.as_uuid())
        .bind(user_id.as_uuid())
        .bind(count as i32)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to add raffle entries: {}", e),
            )
        })?;

        Ok(())
    }

    async fn remove_participant(&self, user_id: &UserId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM raffle_entries WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to remove raffle participant: {}", e),
                )
            })?;

        Ok(())
    }

    async fn delete(&self, id: &RaffleId) -> Result<(), DomainError> {
        // Entries cascade via the foreign key.
        let result = sqlx::query("DELETE FROM raffles WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to delete raffle: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::RaffleNotFound, "Raffle not found"));
        }

        Ok(())
    }
}
