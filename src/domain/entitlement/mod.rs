//! Entitlement domain - the payment-confirmation pipeline.
//!
//! Covers webhook signature verification, amount-to-tier resolution,
//! idempotent entitlement application, raffle enrollment, and the
//! scheduling of deferred expiry.

mod processor;
mod resolver;
mod tier;
mod webhook_errors;
mod webhook_event;
mod webhook_verifier;

pub use processor::{EntitlementPipeline, PaymentConfirmation, PaymentGateway};
pub use resolver::{Entitlement, EntitlementResolver, InvalidAmount, BASIC_ENTITLEMENT_TTL_SECS};
pub use tier::PlanTier;
pub use webhook_errors::WebhookError;
pub use webhook_event::{
    BankCustomParameters, BankTransferNotice, CheckoutEvent, CheckoutEventType,
};
pub use webhook_verifier::CheckoutWebhookVerifier;
