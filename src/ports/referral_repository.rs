//! ReferralRepository port - persistence interface for referral edges.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ReferralId, UserId};
use crate::domain::referral::Referral;

/// Port for storing and retrieving referrals.
#[async_trait]
pub trait ReferralRepository: Send + Sync {
    /// Persists a new referral edge.
    async fn save(&self, referral: &Referral) -> Result<(), DomainError>;

    /// Updates an existing referral.
    async fn update(&self, referral: &Referral) -> Result<(), DomainError>;

    /// Finds a referral by identifier.
    async fn find_by_id(&self, id: &ReferralId) -> Result<Option<Referral>, DomainError>;

    /// Finds the referral edge pointing at a referred user, if any.
    async fn find_by_referred(&self, referred: &UserId) -> Result<Option<Referral>, DomainError>;

    /// Lists referrals made by a referrer.
    async fn list_by_referrer(&self, referrer: &UserId) -> Result<Vec<Referral>, DomainError>;
}
