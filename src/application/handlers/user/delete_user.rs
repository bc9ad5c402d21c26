//! DeleteUserHandler - Command handler for removing a user.
//!
//! Raffle participation cascades: every entry the user holds in any
//! raffle is removed before the user record is deleted.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::{RaffleRepository, UserRepository};

/// Handler for user deletion.
pub struct DeleteUserHandler {
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
}

impl DeleteUserHandler {
    pub fn new(users: Arc<dyn UserRepository>, raffles: Arc<dyn RaffleRepository>) -> Self {
        Self { users, raffles }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<(), DomainError> {
        if self.users.find_by_id(&user_id).await?.is_none() {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }

        self.raffles.remove_participant(&user_id).await?;
        self.users.delete(&user_id).await?;

        tracing::info!(user_id = %user_id, "user deleted with raffle cascade");
        Ok(())
    }
}
