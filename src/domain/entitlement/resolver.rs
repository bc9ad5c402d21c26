//! Entitlement resolution.
//!
//! Pure mapping from a payment amount to the entitlement it purchases.
//! No I/O: the resolver never guesses or rounds, and any amount outside
//! the two recognized brackets is rejected.

use thiserror::Error;

use super::tier::PlanTier;

/// Entitlement TTL for time-limited tiers (1 hour).
pub const BASIC_ENTITLEMENT_TTL_SECS: i64 = 3600;

/// Raffle entries granted by the premium tier.
const PREMIUM_RAFFLE_ENTRIES: u32 = 10;

/// Raffle entries granted by the basic tier.
const BASIC_RAFFLE_ENTRIES: u32 = 1;

/// The entitlement purchased by a confirmed payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Entitlement {
    /// Plan tier the payment unlocks.
    pub tier: PlanTier,
    /// Number of raffle entries to grant.
    pub raffle_entries: u32,
    /// Whether the entitlement must be revoked after the fixed TTL.
    pub has_expiry: bool,
}

/// Error raised when a payment amount matches no recognized bracket.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized payment amount: {amount}")]
pub struct InvalidAmount {
    /// The rejected amount, in minor currency units.
    pub amount: i64,
}

/// Maps payment amounts to entitlements.
///
/// Amounts are in minor currency units (cents) to keep the comparison
/// exact. The two recognized amounts come from configuration.
#[derive(Debug, Clone, Copy)]
pub struct EntitlementResolver {
    basic_amount: i64,
    premium_amount: i64,
}

impl EntitlementResolver {
    /// Creates a resolver for the two configured payment amounts.
    pub fn new(basic_amount: i64, premium_amount: i64) -> Self {
        Self {
            basic_amount,
            premium_amount,
        }
    }

    /// Resolves a payment amount to its entitlement.
    ///
    /// # Errors
    ///
    /// Returns `InvalidAmount` for any amount other than the two
    /// configured brackets. Callers must halt the pipeline on error;
    /// no partial entitlement is ever derived.
    pub fn resolve(&self, amount: i64) -> Result<Entitlement, InvalidAmount> {
        if amount == self.premium_amount {
            Ok(Entitlement {
                tier: PlanTier::Premium,
                raffle_entries: PREMIUM_RAFFLE_ENTRIES,
                has_expiry: false,
            })
        } else if amount == self.basic_amount {
            Ok(Entitlement {
                tier: PlanTier::Basic,
                raffle_entries: BASIC_RAFFLE_ENTRIES,
                has_expiry: true,
            })
        } else {
            Err(InvalidAmount { amount })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> EntitlementResolver {
        EntitlementResolver::new(1000, 10000)
    }

    #[test]
    fn premium_amount_resolves_to_premium() {
        let entitlement = resolver().resolve(10000).unwrap();

        assert_eq!(entitlement.tier, PlanTier::Premium);
        assert_eq!(entitlement.raffle_entries, 10);
        assert!(!entitlement.has_expiry);
    }

    #[test]
    fn basic_amount_resolves_to_basic() {
        let entitlement = resolver().resolve(1000).unwrap();

        assert_eq!(entitlement.tier, PlanTier::Basic);
        assert_eq!(entitlement.raffle_entries, 1);
        assert!(entitlement.has_expiry);
    }

    #[test]
    fn unrecognized_amount_is_rejected() {
        let result = resolver().resolve(4999);

        assert_eq!(result, Err(InvalidAmount { amount: 4999 }));
    }

    #[test]
    fn near_miss_amounts_are_never_rounded() {
        // One cent off either bracket must not resolve.
        assert!(resolver().resolve(999).is_err());
        assert!(resolver().resolve(1001).is_err());
        assert!(resolver().resolve(9999).is_err());
        assert!(resolver().resolve(10001).is_err());
    }

    #[test]
    fn zero_and_negative_amounts_are_rejected() {
        assert!(resolver().resolve(0).is_err());
        assert!(resolver().resolve(-1000).is_err());
    }

    #[test]
    fn invalid_amount_displays_the_amount() {
        let err = resolver().resolve(123).unwrap_err();
        assert_eq!(format!("{}", err), "Unrecognized payment amount: 123");
    }
}
