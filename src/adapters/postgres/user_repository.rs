//! PostgreSQL implementation of UserRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entitlement::PlanTier;
use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// PostgreSQL implementation of the UserRepository port.
///
/// Email and phone uniqueness is enforced by unique indexes; constraint
/// violations surface as `ErrorCode::UserExists`.
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    /// Creates a new PostgresUserRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Database row representation of a user.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    phone: String,
    password_hash: String,
    tier: String,
    paid: bool,
    paid_at: Option<DateTime<Utc>>,
    points: i64,
    referral_code: String,
    spin_count: i32,
    first_spin_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = DomainError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let tier = parse_tier(&row.tier)?;
        let spin_count = u32::try_from(row.spin_count).map_err(|_| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Invalid spin_count value: {}", row.spin_count),
            )
        })?;

        Ok(User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            phone: row.phone,
            password_hash: row.password_hash,
            tier,
            paid: row.paid,
            paid_at: row.paid_at,
            points: row.points,
            referral_code: row.referral_code,
            spin_count,
            first_spin_at: row.first_spin_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_tier(s: &str) -> Result<PlanTier, DomainError> {
    match s.to_lowercase().as_str() {
        "none" => Ok(PlanTier::None),
        "basic" => Ok(PlanTier::Basic),
        "premium" => Ok(PlanTier::Premium),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid tier value: {}", s),
        )),
    }
}

fn tier_to_string(tier: &PlanTier) -> &'static str {
    match tier {
        PlanTier::None => "none",
        PlanTier::Basic => "basic",
        PlanTier::Premium => "premium",
    }
}

const SELECT_COLUMNS: &str = "id, email, phone, password_hash, tier, paid, paid_at, \
     points, referral_code, spin_count, first_spin_at, created_at, updated_at";

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, email, phone, password_hash, tier, paid, paid_at,
                points, referral_code, spin_count, first_spin_at, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(tier_to_string(&user.tier))
        .bind(user.paid)
        .bind(user.paid_at)
        .bind(user.points)
        .bind(&user.referral_code)
        .bind(user.spin_count as i32)
        .bind(user.first_spin_at)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if matches!(
                    db_err.constraint(),
                    Some("users_email_key") | Some("users_phone_key")
                ) {
                    return DomainError::new(
                        ErrorCode::UserExists,
                        "A user with this email or phone already exists",
                    );
                }
            }
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to save user: {}", e))
        })?;

        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = $2,
                phone = $3,
                password_hash = $4,
                tier = $5,
                paid = $6,
                paid_at = $7,
                points = $8,
                referral_code = $9,
                spin_count = $10,
                first_spin_at = $11,
                updated_at = $12
            WHERE id = $1
            "#,
        )
        .bind(user.id.as_uuid())
        .bind(&user.email)
        .bind(&user.phone)
        .bind(&user.password_hash)
        .bind(tier_to_string(&user.tier))
        .bind(user.paid)
        .bind(user.paid_at)
        .bind(user.points)
        .bind(&user.referral_code)
        .bind(user.spin_count as i32)
        .bind(user.first_spin_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(ErrorCode::DatabaseError, format!("Failed to update user: {}", e))
        })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE id = $1", SELECT_COLUMNS))
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
                })?;

        row.map(User::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        let row: Option<UserRow> =
            sqlx::query_as(&format!("SELECT {} FROM users WHERE email = $1", SELECT_COLUMNS))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(ErrorCode::DatabaseError, format!("Failed to find user: {}", e))
                })?;

        row.map(User::try_from).transpose()
    }

    async fn list_paid(&self) -> Result<Vec<User>, DomainError> {
        let rows: Vec<UserRow> = sqlx::query_as(&format!(
            "SELECT {} FROM users WHERE paid = TRUE ORDER BY created_at ASC",
            SELECT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list paid users: {}", e),
            )
        })?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::DatabaseError, format!("Failed to delete user: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_tier_works_for_all_values() {
        assert_eq!(parse_tier("none").unwrap(), PlanTier::None);
        assert_eq!(parse_tier("basic").unwrap(), PlanTier::Basic);
        assert_eq!(parse_tier("premium").unwrap(), PlanTier::Premium);
        assert_eq!(parse_tier("PREMIUM").unwrap(), PlanTier::Premium);
    }

    #[test]
    fn parse_tier_rejects_invalid_values() {
        assert!(parse_tier("gold").is_err());
        assert!(parse_tier("").is_err());
    }

    #[test]
    fn roundtrip_tier_conversion() {
        for tier in [PlanTier::None, PlanTier::Basic, PlanTier::Premium] {
            let s = tier_to_string(&tier);
            assert_eq!(parse_tier(s).unwrap(), tier);
        }
    }
}
