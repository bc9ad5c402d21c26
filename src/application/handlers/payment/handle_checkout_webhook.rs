//! HandleCheckoutWebhookHandler - Command handler for signed checkout gateway webhooks.

use std::sync::Arc;

use crate::domain::entitlement::{
    CheckoutEvent, CheckoutEventType, CheckoutWebhookVerifier, EntitlementPipeline,
    PaymentConfirmation, PaymentGateway, WebhookError,
};
use crate::ports::WebhookResult;

/// Command to handle a checkout gateway webhook.
#[derive(Debug, Clone)]
pub struct HandleCheckoutWebhookCommand {
    /// `X-Request-Id` header value.
    pub request_id: String,
    /// `X-Webhook-Timestamp` header value (unix seconds).
    pub timestamp: String,
    /// `X-Webhook-Signature` header value (hex-encoded HMAC-SHA256).
    pub signature: String,
    /// Raw request body, byte-for-byte as signed by the gateway.
    pub payload: Vec<u8>,
}

/// Result of checkout webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutWebhookResult {
    /// Entitlement applied.
    Processed,
    /// Duplicate delivery, acknowledged without re-granting.
    AlreadyProcessed,
    /// Unhandled event type, acknowledged without action.
    Ignored,
}

/// Handler for the signed checkout webhook path.
///
/// Verification runs first and gates everything else: a request that
/// fails the signature or freshness check mutates nothing.
pub struct HandleCheckoutWebhookHandler {
    verifier: CheckoutWebhookVerifier,
    pipeline: Arc<EntitlementPipeline>,
}

impl HandleCheckoutWebhookHandler {
    pub fn new(verifier: CheckoutWebhookVerifier, pipeline: Arc<EntitlementPipeline>) -> Self {
        Self { verifier, pipeline }
    }

    pub async fn handle(
        &self,
        cmd: HandleCheckoutWebhookCommand,
    ) -> Result<CheckoutWebhookResult, WebhookError> {
        self.verifier
            .verify(&cmd.request_id, &cmd.timestamp, &cmd.signature, &cmd.payload)?;

        let event: CheckoutEvent = serde_json::from_slice(&cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        match event.parsed_type() {
            CheckoutEventType::Unknown => {
                tracing::info!(
                    event_id = %event.event_id,
                    event_type = %event.event_type,
                    "unhandled checkout event type acknowledged"
                );
                Ok(CheckoutWebhookResult::Ignored)
            }
            CheckoutEventType::PaymentCompleted => {
                let payload = serde_json::to_value(&event)
                    .map_err(|e| WebhookError::ParseError(e.to_string()))?;
                let confirmation = PaymentConfirmation {
                    event_id: event.event_id,
                    gateway: PaymentGateway::Checkout,
                    user_id: event.user_id,
                    amount: event.amount,
                    payload,
                };

                match self.pipeline.process(confirmation).await? {
                    WebhookResult::Processed => Ok(CheckoutWebhookResult::Processed),
                    WebhookResult::AlreadyProcessed => Ok(CheckoutWebhookResult::AlreadyProcessed),
                }
            }
        }
    }
}
