//! CreateReferralHandler - Command handler for recording a referral edge.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::referral::Referral;
use crate::ports::{ReferralRepository, UserRepository};

/// Command to record a referrer→referred edge.
#[derive(Debug, Clone)]
pub struct CreateReferralCommand {
    pub referrer: UserId,
    pub referred: UserId,
}

/// Handler for referral creation.
pub struct CreateReferralHandler {
    users: Arc<dyn UserRepository>,
    referrals: Arc<dyn ReferralRepository>,
}

impl CreateReferralHandler {
    pub fn new(users: Arc<dyn UserRepository>, referrals: Arc<dyn ReferralRepository>) -> Self {
        Self { users, referrals }
    }

    pub async fn handle(&self, cmd: CreateReferralCommand) -> Result<Referral, DomainError> {
        if cmd.referrer == cmd.referred {
            return Err(DomainError::validation(
                "referred",
                "A user cannot refer themselves",
            ));
        }
        for id in [&cmd.referrer, &cmd.referred] {
            if self.users.find_by_id(id).await?.is_none() {
                return Err(DomainError::new(ErrorCode::UserNotFound, "User not found")
                    .with_detail("user_id", id.to_string()));
            }
        }

        let referral = Referral::new(cmd.referrer, cmd.referred);
        self.referrals.save(&referral).await?;

        tracing::info!(referral_id = %referral.id, referrer = %cmd.referrer, "referral recorded");
        Ok(referral)
    }
}
