//! CreateRaffleHandler - Command handler for scheduling a new raffle.
//!
//! A new raffle is seeded with one entry per currently paid user and its
//! completion is armed as a durable deferred job. A raffle whose drawing
//! time already elapsed at creation is deleted rather than drawn.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::foundation::{DomainError, RaffleId};
use crate::domain::raffle::Raffle;
use crate::ports::{JobKind, JobRecord, JobStore, RaffleRepository, UserRepository};

/// Command to create a scheduled raffle.
#[derive(Debug, Clone)]
pub struct CreateRaffleCommand {
    /// Prizes awarded to the winner.
    pub prizes: Vec<String>,
    /// When the drawing fires.
    pub scheduled_at: DateTime<Utc>,
}

/// Result of raffle creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRaffleResult {
    /// Raffle stored and its completion job armed.
    Scheduled { raffle_id: RaffleId },
    /// Drawing time already elapsed; the raffle was removed.
    DeletedPastDue { raffle_id: RaffleId },
}

/// Handler for raffle creation.
pub struct CreateRaffleHandler {
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
    jobs: Arc<dyn JobStore>,
}

impl CreateRaffleHandler {
    pub fn new(
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            users,
            raffles,
            jobs,
        }
    }

    pub async fn handle(
        &self,
        cmd: CreateRaffleCommand,
    ) -> Result<CreateRaffleResult, DomainError> {
        // One seed entry per currently paid user; webhook-granted entries
        // accumulate on top of these.
        let participants = self
            .users
            .list_paid()
            .await?
            .into_iter()
            .map(|u| u.id)
            .collect();

        let raffle = Raffle::schedule(cmd.prizes, participants, cmd.scheduled_at);
        self.raffles.save(&raffle).await?;

        if raffle.is_past_due(Utc::now()) {
            // An elapsed drawing time never fires; the raffle is removed
            // instead of drawn immediately.
            self.raffles.delete(&raffle.id).await?;
            tracing::warn!(raffle_id = %raffle.id, scheduled_at = %raffle.scheduled_at,
                "past-due raffle deleted at creation");
            return Ok(CreateRaffleResult::DeletedPastDue {
                raffle_id: raffle.id,
            });
        }

        self.jobs
            .schedule(JobRecord::new(
                JobKind::CompleteRaffle {
                    raffle_id: raffle.id,
                },
                raffle.scheduled_at,
            ))
            .await?;

        tracing::info!(raffle_id = %raffle.id, scheduled_at = %raffle.scheduled_at,
            "raffle scheduled");

        Ok(CreateRaffleResult::Scheduled {
            raffle_id: raffle.id,
        })
    }
}
