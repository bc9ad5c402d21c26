//! User aggregate.
//!
//! Tracks a participant's contact details, accumulated points, prize-wheel
//! spins, and the entitlement granted by the payment pipeline. The paid
//! flag is true only while the most recent entitlement has not expired or
//! been superseded.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entitlement::PlanTier;
use crate::domain::foundation::{UserId, ValidationError};

/// A platform participant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    /// Unique contact email.
    pub email: String,
    /// Unique phone number.
    pub phone: String,
    /// Hashed password; hashing happens upstream of this aggregate.
    pub password_hash: String,
    /// Current plan tier.
    pub tier: PlanTier,
    /// True only while the current entitlement is live.
    pub paid: bool,
    /// When the current entitlement was granted, for time-limited tiers.
    pub paid_at: Option<DateTime<Utc>>,
    /// Accumulated reward points.
    pub points: i64,
    /// Code shared with referred users.
    pub referral_code: String,
    /// Number of prize-wheel spins taken.
    pub spin_count: u32,
    /// Timestamp of the first spin, if any.
    pub first_spin_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new unpaid user at signup.
    ///
    /// # Errors
    ///
    /// Returns a `ValidationError` if email or phone is empty.
    pub fn register(
        email: impl Into<String>,
        phone: impl Into<String>,
        password_hash: impl Into<String>,
        referral_code: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let email = email.into();
        let phone = phone.into();

        if email.trim().is_empty() {
            return Err(ValidationError::empty_field("email"));
        }
        if !email.contains('@') {
            return Err(ValidationError::invalid_format("email", "missing @"));
        }
        if phone.trim().is_empty() {
            return Err(ValidationError::empty_field("phone"));
        }

        let now = Utc::now();
        Ok(Self {
            id: UserId::new(),
            email,
            phone,
            password_hash: password_hash.into(),
            tier: PlanTier::None,
            paid: false,
            paid_at: None,
            points: 0,
            referral_code: referral_code.into(),
            spin_count: 0,
            first_spin_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a resolved entitlement to this user.
    ///
    /// Sets the paid flag, the tier, and (for time-limited tiers) the grant
    /// timestamp. Re-applying the same entitlement produces the same end
    /// state.
    pub fn grant_entitlement(&mut self, tier: PlanTier, granted_at: DateTime<Utc>) {
        self.paid = true;
        self.tier = tier;
        self.paid_at = Some(granted_at);
        self.updated_at = granted_at;
    }

    /// Revokes a time-limited entitlement if it is still in effect.
    ///
    /// Returns true if the entitlement was revoked. If the tier has changed
    /// since the grant (upgraded or re-granted), the revocation is a no-op
    /// and the newer entitlement persists.
    pub fn revoke_entitlement_if_still(&mut self, granted_tier: PlanTier) -> bool {
        if self.tier != granted_tier {
            return false;
        }
        self.paid = false;
        self.tier = PlanTier::None;
        self.paid_at = None;
        self.updated_at = Utc::now();
        true
    }

    /// Records a prize-wheel spin.
    pub fn record_spin(&mut self, at: DateTime<Utc>) {
        if self.first_spin_at.is_none() {
            self.first_spin_at = Some(at);
        }
        self.spin_count += 1;
        self.updated_at = at;
    }

    /// Adds reward points.
    pub fn add_points(&mut self, points: i64) {
        self.points += points;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user() -> User {
        User::register("sam@example.com", "15550001111", "hash", "REF123").unwrap()
    }

    // ══════════════════════════════════════════════════════════════
    // Registration Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn register_starts_unpaid_with_no_tier() {
        let user = test_user();

        assert!(!user.paid);
        assert_eq!(user.tier, PlanTier::None);
        assert!(user.paid_at.is_none());
        assert_eq!(user.spin_count, 0);
    }

    #[test]
    fn register_rejects_empty_email() {
        let result = User::register("", "15550001111", "hash", "REF123");
        assert!(result.is_err());
    }

    #[test]
    fn register_rejects_email_without_at() {
        let result = User::register("sam.example.com", "15550001111", "hash", "REF123");
        assert!(result.is_err());
    }

    #[test]
    fn register_rejects_empty_phone() {
        let result = User::register("sam@example.com", "  ", "hash", "REF123");
        assert!(result.is_err());
    }

    // ══════════════════════════════════════════════════════════════
    // Entitlement Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn grant_entitlement_sets_paid_tier_and_timestamp() {
        let mut user = test_user();
        let at = Utc::now();

        user.grant_entitlement(PlanTier::Basic, at);

        assert!(user.paid);
        assert_eq!(user.tier, PlanTier::Basic);
        assert_eq!(user.paid_at, Some(at));
    }

    #[test]
    fn regrant_produces_same_end_state() {
        let mut user = test_user();
        let at = Utc::now();

        user.grant_entitlement(PlanTier::Premium, at);
        user.grant_entitlement(PlanTier::Premium, at);

        assert!(user.paid);
        assert_eq!(user.tier, PlanTier::Premium);
        assert_eq!(user.paid_at, Some(at));
    }

    #[test]
    fn revoke_clears_paid_when_tier_unchanged() {
        let mut user = test_user();
        user.grant_entitlement(PlanTier::Basic, Utc::now());

        let revoked = user.revoke_entitlement_if_still(PlanTier::Basic);

        assert!(revoked);
        assert!(!user.paid);
        assert_eq!(user.tier, PlanTier::None);
        assert!(user.paid_at.is_none());
    }

    #[test]
    fn revoke_is_noop_when_tier_superseded() {
        let mut user = test_user();
        user.grant_entitlement(PlanTier::Basic, Utc::now());
        user.grant_entitlement(PlanTier::Premium, Utc::now());

        let revoked = user.revoke_entitlement_if_still(PlanTier::Basic);

        assert!(!revoked);
        assert!(user.paid);
        assert_eq!(user.tier, PlanTier::Premium);
    }

    // ══════════════════════════════════════════════════════════════
    // Spin Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn first_spin_sets_first_spin_timestamp() {
        let mut user = test_user();
        let at = Utc::now();

        user.record_spin(at);

        assert_eq!(user.spin_count, 1);
        assert_eq!(user.first_spin_at, Some(at));
    }

    #[test]
    fn later_spins_keep_first_spin_timestamp() {
        let mut user = test_user();
        let first = Utc::now();

        user.record_spin(first);
        user.record_spin(Utc::now());
        user.record_spin(Utc::now());

        assert_eq!(user.spin_count, 3);
        assert_eq!(user.first_spin_at, Some(first));
    }

    #[test]
    fn add_points_accumulates() {
        let mut user = test_user();

        user.add_points(50);
        user.add_points(25);

        assert_eq!(user.points, 75);
    }
}
