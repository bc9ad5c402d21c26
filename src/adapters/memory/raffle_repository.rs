//! In-memory implementation of RaffleRepository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, RaffleId, UserId};
use crate::domain::raffle::{Raffle, RaffleStatus};
use crate::ports::RaffleRepository;

/// In-memory raffle store keyed by id.
#[derive(Default)]
pub struct InMemoryRaffleRepository {
    raffles: Arc<RwLock<HashMap<RaffleId, Raffle>>>,
}

impl InMemoryRaffleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RaffleRepository for InMemoryRaffleRepository {
    async fn save(&self, raffle: &Raffle) -> Result<(), DomainError> {
        self.raffles.write().await.insert(raffle.id, raffle.clone());
        Ok(())
    }

    async fn update(&self, raffle: &Raffle) -> Result<(), DomainError> {
        let mut raffles = self.raffles.write().await;
        if !raffles.contains_key(&raffle.id) {
            return Err(DomainError::new(
                ErrorCode::RaffleNotFound,
                "Raffle not found",
            ));
        }
        raffles.insert(raffle.id, raffle.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &RaffleId) -> Result<Option<Raffle>, DomainError> {
        Ok(self.raffles.read().await.get(id).cloned())
    }

    async fn find_open(&self) -> Result<Option<Raffle>, DomainError> {
        Ok(self
            .raffles
            .read()
            .await
            .values()
            .filter(|r| r.status == RaffleStatus::Scheduled)
            .min_by_key(|r| r.scheduled_at)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Raffle>, DomainError> {
        let mut all: Vec<Raffle> = self.raffles.read().await.values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }

    async fn add_entries(
        &self,
        raffle_id: &RaffleId,
        user_id: &UserId,
        count: u32,
    ) -> Result<(), DomainError> {
        let mut raffles = self.raffles.write().await;
        let raffle = raffles.get_mut(raffle_id).ok_or_else(|| {
            DomainError::new(ErrorCode::RaffleNotFound, "Raffle not found")
        })?;
        raffle.add_entries(*user_id, count);
        Ok(())
    }

    async fn remove_participant(&self, user_id: &UserId) -> Result<(), DomainError> {
        let mut raffles = self.raffles.write().await;
        for raffle in raffles.values_mut() {
            raffle.remove_participant(user_id);
        }
        Ok(())
    }

    async fn delete(&self, id: &RaffleId) -> Result<(), DomainError> {
        self.raffles.write().await.remove(id);
        Ok(())
    }
}
