//! UserRepository port - persistence interface for User aggregates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::user::User;

/// Port for storing and retrieving users.
///
/// Email and phone uniqueness is enforced by the storage layer.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persists a new user.
    ///
    /// Fails with `ErrorCode::UserExists` if the email or phone is taken.
    async fn save(&self, user: &User) -> Result<(), DomainError>;

    /// Updates an existing user.
    async fn update(&self, user: &User) -> Result<(), DomainError>;

    /// Finds a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError>;

    /// Finds a user by email.
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError>;

    /// Lists all currently paid users (used to seed raffle pools).
    async fn list_paid(&self) -> Result<Vec<User>, DomainError>;

    /// Deletes a user. Raffle participation cascade is the caller's job.
    async fn delete(&self, id: &UserId) -> Result<(), DomainError>;
}
