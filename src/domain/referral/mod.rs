//! Referral domain - directed referrer/referred edges.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ReferralId, UserId};

/// Share of a referred payment that accrues to the referrer, in percent.
pub const REFERRAL_COMMISSION_PERCENT: i64 = 10;

/// Status of a referral edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferralStatus {
    /// Referred user has signed up but not yet paid.
    Pending,
    /// Referred user completed a payment; commission accrued.
    Completed,
}

/// A directed edge from referrer to referred user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Referral {
    pub id: ReferralId,
    pub referrer: UserId,
    pub referred: UserId,
    pub status: ReferralStatus,
    /// Commission accrued, in minor currency units.
    pub commission: i64,
    pub created_at: DateTime<Utc>,
}

impl Referral {
    /// Creates a pending referral edge.
    pub fn new(referrer: UserId, referred: UserId) -> Self {
        Self {
            id: ReferralId::new(),
            referrer,
            referred,
            status: ReferralStatus::Pending,
            commission: 0,
            created_at: Utc::now(),
        }
    }

    /// Marks the referral complete and accrues the commission.
    pub fn complete(&mut self, commission: i64) {
        self.status = ReferralStatus::Completed;
        self.commission += commission;
    }

    /// Commission owed to the referrer for a payment of `amount` minor units.
    pub fn commission_for(amount: i64) -> i64 {
        amount * REFERRAL_COMMISSION_PERCENT / 100
    }
}
