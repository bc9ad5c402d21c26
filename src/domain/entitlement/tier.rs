//! Plan tier definitions.
//!
//! Represents the payment brackets a user can occupy on the platform.

use serde::{Deserialize, Serialize};

/// Plan tier unlocked by a confirmed payment.
///
/// Determines raffle entry counts and whether the entitlement expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    /// No entitlement - the signup default.
    None,

    /// Basic tier - one raffle entry, entitlement expires after one hour.
    Basic,

    /// Premium tier - ten raffle entries, perpetual entitlement.
    Premium,
}

impl PlanTier {
    /// Returns true if this tier is a paid tier.
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::None)
    }

    /// Returns the display name for this tier.
    pub fn display_name(&self) -> &'static str {
        match self {
            PlanTier::None => "None",
            PlanTier::Basic => "Basic",
            PlanTier::Premium => "Premium",
        }
    }

}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display_name())
    }
}
