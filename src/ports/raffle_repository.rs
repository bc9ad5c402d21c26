//! RaffleRepository port - persistence interface for Raffle aggregates.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, RaffleId, UserId};
use crate::domain::raffle::Raffle;

/// Port for storing and retrieving raffles.
#[async_trait]
pub trait RaffleRepository: Send + Sync {
    /// Persists a new raffle.
    async fn save(&self, raffle: &Raffle) -> Result<(), DomainError>;

    /// Updates an existing raffle.
    async fn update(&self, raffle: &Raffle) -> Result<(), DomainError>;

    /// Finds a raffle by identifier.
    async fn find_by_id(&self, id: &RaffleId) -> Result<Option<Raffle>, DomainError>;

    /// Finds the current open (scheduled) raffle pool, if any.
    ///
    /// When several raffles are open, the one drawing soonest wins.
    async fn find_open(&self) -> Result<Option<Raffle>, DomainError>;

    /// Lists all raffles, newest first.
    async fn list(&self) -> Result<Vec<Raffle>, DomainError>;

    /// Adds entries for a user to a raffle's participant pool.
    async fn add_entries(
        &self,
        raffle_id: &RaffleId,
        user_id: &UserId,
        count: u32,
    ) -> Result<(), DomainError>;

    /// Removes a user's entries from every raffle (cascade on user delete).
    async fn remove_participant(&self, user_id: &UserId) -> Result<(), DomainError>;

    /// Deletes a raffle outright. Used for past-due raffles at creation.
    async fn delete(&self, id: &RaffleId) -> Result<(), DomainError>;
}
