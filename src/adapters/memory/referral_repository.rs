//! In-memory implementation of ReferralRepository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, ReferralId, UserId};
use crate::domain::referral::Referral;
use crate::ports::ReferralRepository;

/// In-memory referral store keyed by id.
#[derive(Default)]
pub struct InMemoryReferralRepository {
    referrals: Arc<RwLock<HashMap<ReferralId, Referral>>>,
}

impl InMemoryReferralRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReferralRepository for InMemoryReferralRepository {
    async fn save(&self, referral: &Referral) -> Result<(), DomainError> {
        self.referrals
            .write()
            .await
            .insert(referral.id, referral.clone());
        Ok(())
    }

    async fn update(&self, referral: &Referral) -> Result<(), DomainError> {
        let mut referrals = self.referrals.write().await;
        if !referrals.contains_key(&referral.id) {
            return Err(DomainError::new(
                ErrorCode::ReferralNotFound,
                "Referral not found",
            ));
        }
        referrals.insert(referral.id, referral.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &ReferralId) -> Result<Option<Referral>, DomainError> {
        Ok(self.referrals.read().await.get(id).cloned())
    }

    async fn find_by_referred(&self, referred: &UserId) -> Result<Option<Referral>, DomainError> {
        Ok(self
            .referrals
            .read()
            .await
            .values()
            .find(|r| &r.referred == referred)
            .cloned())
    }

    async fn list_by_referrer(&self, referrer: &UserId) -> Result<Vec<Referral>, DomainError> {
        Ok(self
            .referrals
            .read()
            .await
            .values()
            .filter(|r| &r.referrer == referrer)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_and_list_by_referrer() {
        let repo = InMemoryReferralRepository::new();
        let referrer = UserId::new();
        repo.save(&Referral::new(referrer, UserId::new())).await.unwrap();
        repo.save(&Referral::new(referrer, UserId::new())).await.unwrap();
        repo.save(&Referral::new(UserId::new(), UserId::new())).await.unwrap();

        let listed = repo.list_by_referrer(&referrer).await.unwrap();

        assert_eq!(listed.len(), 2);
    }

    #[tokio::test]
    async fn find_by_referred_returns_the_matching_edge() {
        let repo = InMemoryReferralRepository::new();
        let referred = UserId::new();
        let referral = Referral::new(UserId::new(), referred);
        repo.save(&referral).await.unwrap();
        repo.save(&Referral::new(UserId::new(), UserId::new())).await.unwrap();

        let found = repo.find_by_referred(&referred).await.unwrap().unwrap();

        assert_eq!(found.id, referral.id);
        assert!(repo.find_by_referred(&UserId::new()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn update_unknown_referral_fails() {
        let repo = InMemoryReferralRepository::new();

        let result = repo.update(&Referral::new(UserId::new(), UserId::new())).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::ReferralNotFound));
    }
}
