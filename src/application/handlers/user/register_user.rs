//! RegisterUserHandler - Command handler for user signup.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// Command to register a new user.
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub phone: String,
    /// Credential hashing happens upstream; this aggregate stores the hash.
    pub password_hash: String,
}

/// Handler for user registration.
pub struct RegisterUserHandler {
    users: Arc<dyn UserRepository>,
}

impl RegisterUserHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    pub async fn handle(&self, cmd: RegisterUserCommand) -> Result<User, DomainError> {
        if self.users.find_by_email(&cmd.email).await?.is_some() {
            return Err(DomainError::new(
                ErrorCode::UserExists,
                "Email already registered",
            ));
        }

        let referral_code = generate_referral_code();
        let user = User::register(cmd.email, cmd.phone, cmd.password_hash, referral_code)
            .map_err(|e| {
                DomainError::new(ErrorCode::ValidationFailed, e.to_string())
            })?;

        self.users.save(&user).await?;

        tracing::info!(user_id = %user.id, "user registered");
        Ok(user)
    }
}

/// Generates a short shareable referral code.
fn generate_referral_code() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
