//! Entitlement pipeline - orchestrates idempotent payment confirmation.
//!
//! Runs after signature verification (checkout path) or payload
//! validation (bank path). Steps, each short-circuiting on failure:
//!
//! 1. Claim the gateway event id (idempotency; duplicates stop here)
//! 2. Resolve the payment amount to an entitlement
//! 3. Apply the entitlement to the user's stored record
//! 4. Enroll the granted raffle entries (best-effort, never fatal)
//! 5. Complete a pending referral for the payer (best-effort)
//! 6. For time-limited tiers, schedule the deferred expiry job
//! 7. Settle the claim: success, terminal failure, or released
//!
//! ## Race Condition Handling
//!
//! The claim is inserted BEFORE any side effects run. When the same
//! event arrives on two connections at once:
//! - First to claim wins (storage uniqueness constraint on event id)
//! - The loser gets `AlreadyExists` and reports `AlreadyProcessed`
//!
//! ## Transient vs Terminal Failures
//!
//! A retryable failure (storage outage mid-pipeline) releases the claim,
//! so the gateway's redelivery gets a fresh attempt instead of being
//! acknowledged as a duplicate. Permanent failures (bad amount, unknown
//! user) are recorded terminally and redeliveries short-circuit.

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::domain::foundation::{DomainError, UserId};
use crate::domain::referral::{Referral, ReferralStatus};
use crate::ports::{
    JobKind, JobRecord, JobStore, RaffleRepository, ReferralRepository, SaveResult,
    UserRepository, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};

use super::resolver::{EntitlementResolver, BASIC_ENTITLEMENT_TTL_SECS};
use super::webhook_errors::WebhookError;

/// Originating payment gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentGateway {
    /// Hosted checkout with signed webhooks.
    Checkout,
    /// Bank transfer with result-code notifications.
    BankTransfer,
}

impl PaymentGateway {
    /// Storage tag for this gateway.
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentGateway::Checkout => "checkout",
            PaymentGateway::BankTransfer => "bank",
        }
    }
}

/// A validated payment confirmation, normalized across gateways.
#[derive(Debug, Clone)]
pub struct PaymentConfirmation {
    /// Gateway event/transaction identifier; the idempotency key.
    pub event_id: String,
    pub gateway: PaymentGateway,
    /// Raw user reference from the payload; validated by the pipeline.
    pub user_id: String,
    /// Paid amount in minor currency units.
    pub amount: i64,
    /// Original payload, stored with the processing record.
    pub payload: serde_json::Value,
}

/// Processes payment confirmations exactly once.
pub struct EntitlementPipeline {
    resolver: EntitlementResolver,
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
    referrals: Arc<dyn ReferralRepository>,
    events: Arc<dyn WebhookEventRepository>,
    jobs: Arc<dyn JobStore>,
}

impl EntitlementPipeline {
    pub fn new(
        resolver: EntitlementResolver,
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        referrals: Arc<dyn ReferralRepository>,
        events: Arc<dyn WebhookEventRepository>,
        jobs: Arc<dyn JobStore>,
    ) -> Self {
        Self {
            resolver,
            users,
            raffles,
            referrals,
            events,
            jobs,
        }
    }

    /// Processes a payment confirmation exactly once.
    ///
    /// # Returns
    ///
    /// - `Ok(WebhookResult::Processed)` - entitlement applied
    /// - `Ok(WebhookResult::AlreadyProcessed)` - duplicate delivery,
    ///   acknowledged without re-granting
    /// - `Err(_)` - processing failed; retryable failures leave no
    ///   record, so the gateway's redelivery re-runs the pipeline
    pub async fn process(
        &self,
        confirmation: PaymentConfirmation,
    ) -> Result<WebhookResult, WebhookError> {
        let claim = WebhookEventRecord::processing(
            &confirmation.event_id,
            confirmation.gateway.as_str(),
            confirmation.payload.clone(),
        );
        if self.events.save(claim).await? == SaveResult::AlreadyExists {
            tracing::info!(
                event_id = %confirmation.event_id,
                gateway = confirmation.gateway.as_str(),
                "duplicate webhook delivery skipped"
            );
            return Ok(WebhookResult::AlreadyProcessed);
        }

        match self.apply(&confirmation).await {
            Ok(()) => {
                self.events.mark_succeeded(&confirmation.event_id).await?;
                Ok(WebhookResult::Processed)
            }
            Err(e) if e.is_retryable() => {
                // Free the claim so the redelivery gets a fresh attempt
                // instead of a duplicate acknowledgment.
                if let Err(release_err) = self.events.release(&confirmation.event_id).await {
                    tracing::error!(
                        event_id = %confirmation.event_id,
                        error = %release_err,
                        "failed to release webhook claim"
                    );
                }
                Err(e)
            }
            Err(e) => {
                self.events
                    .mark_failed(&confirmation.event_id, &e.to_string())
                    .await?;
                Err(e)
            }
        }
    }

    /// Resolve → write → enroll → referral → schedule expiry.
    async fn apply(&self, confirmation: &PaymentConfirmation) -> Result<(), WebhookError> {
        let entitlement = self
            .resolver
            .resolve(confirmation.amount)
            .map_err(|e| WebhookError::InvalidAmount(e.amount))?;

        let user_id: UserId = confirmation
            .user_id
            .parse()
            .map_err(|_| WebhookError::MalformedUserId(confirmation.user_id.clone()))?;

        let mut user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or(WebhookError::UserNotFound)?;

        let granted_at = Utc::now();
        user.grant_entitlement(entitlement.tier, granted_at);
        self.users.update(&user).await?;

        tracing::info!(
            user_id = %user_id,
            tier = %entitlement.tier,
            entries = entitlement.raffle_entries,
            "entitlement granted"
        );

        // Best-effort: the entitlement write already succeeded and the
        // gateway expects acknowledgment, so enrollment failure must not
        // fail the webhook response.
        if let Err(e) = self
            .enroll_entries(&user_id, entitlement.raffle_entries)
            .await
        {
            tracing::warn!(user_id = %user_id, error = %e, "raffle enrollment failed");
        }

        // Same policy for referral commission.
        if let Err(e) = self.complete_referral(&user_id, confirmation.amount).await {
            tracing::warn!(user_id = %user_id, error = %e, "referral completion failed");
        }

        if entitlement.has_expiry {
            let job = JobRecord::new(
                JobKind::EntitlementExpiry {
                    user_id,
                    tier: entitlement.tier,
                },
                granted_at + Duration::seconds(BASIC_ENTITLEMENT_TTL_SECS),
            );
            self.jobs.schedule(job).await?;
        }

        Ok(())
    }

    /// Adds entries for the user to the current open raffle pool.
    async fn enroll_entries(&self, user_id: &UserId, count: u32) -> Result<(), DomainError> {
        match self.raffles.find_open().await? {
            Some(raffle) => self.raffles.add_entries(&raffle.id, user_id, count).await,
            None => {
                tracing::warn!(user_id = %user_id, "no open raffle to enroll entries into");
                Ok(())
            }
        }
    }

    /// Completes the payer's pending referral, accruing commission to the
    /// referrer. Commission accrues on the first payment only.
    async fn complete_referral(&self, user_id: &UserId, amount: i64) -> Result<(), DomainError> {
        let Some(mut referral) = self.referrals.find_by_referred(user_id).await? else {
            return Ok(());
        };
        if referral.status == ReferralStatus::Completed {
            return Ok(());
        }

        referral.complete(Referral::commission_for(amount));
        self.referrals.update(&referral).await?;

        tracing::info!(
            referral_id = %referral.id,
            referrer = %referral.referrer,
            commission = referral.commission,
            "referral completed"
        );
        Ok(())
    }
}

impl From<DomainError> for WebhookError {
    fn from(err: DomainError) -> Self {
        WebhookError::Database(err.to_string())
    }
}
