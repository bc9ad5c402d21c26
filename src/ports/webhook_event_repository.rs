//! WebhookEventRepository port - interface for tracking processed
//! payment gateway events.
//!
//! This port enables idempotent webhook handling by recording which
//! gateway events have already been claimed and applied. The full payload
//! and result are stored for debugging and auditing.
//!
//! ## Why Webhook Idempotency Matters
//!
//! Either gateway may deliver the same event multiple times:
//! - Network timeouts
//! - 5xx response from our endpoint (triggers redelivery)
//! - Our endpoint returning success that the gateway never receives
//!
//! Without this record, a replayed event would re-grant raffle entries.
//!
//! ## Claim Lifecycle
//!
//! A record is inserted in the `processing` state BEFORE any side effects
//! run, so two concurrent deliveries of the same event cannot both enter
//! the pipeline. The claim then moves to `success` or `failed`, or is
//! released (deleted) when the failure was transient and the gateway's
//! redelivery should get a fresh attempt.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::foundation::DomainError;

/// Record of a gateway event claim.
#[derive(Debug, Clone)]
pub struct WebhookEventRecord {
    /// Gateway-assigned event or transaction identifier.
    pub event_id: String,

    /// Originating gateway ("checkout" or "bank").
    pub gateway: String,

    /// When the claim was taken.
    pub processed_at: DateTime<Utc>,

    /// Claim state: "processing", "success", or "failed".
    pub result: String,

    /// Error message for terminally failed events.
    pub error_message: Option<String>,

    /// Original event payload for debugging.
    pub payload: serde_json::Value,
}

impl WebhookEventRecord {
    /// Creates a claim record in the `processing` state.
    pub fn processing(
        event_id: impl Into<String>,
        gateway: impl Into<String>,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            gateway: gateway.into(),
            processed_at: Utc::now(),
            result: "processing".to_string(),
            error_message: None,
            payload,
        }
    }
}

/// Result of attempting to save a webhook event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveResult {
    /// Record was inserted (first time seeing this event).
    Inserted,
    /// Record already exists (duplicate delivery).
    AlreadyExists,
}

/// Result of webhook processing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebhookResult {
    /// Event was processed.
    Processed,
    /// Event was already processed (idempotent skip).
    AlreadyProcessed,
}

/// Port for storing and retrieving processed webhook events.
///
/// Implementations should use a database constraint (PRIMARY KEY on
/// event_id) so concurrent deliveries cannot both insert.
#[async_trait]
pub trait WebhookEventRepository: Send + Sync {
    /// Finds a previously claimed event by its gateway identifier.
    async fn find_by_event_id(
        &self,
        event_id: &str,
    ) -> Result<Option<WebhookEventRecord>, DomainError>;

    /// Attempts to save a webhook event record.
    ///
    /// Uses `ON CONFLICT DO NOTHING` semantics: `Inserted` if this is the
    /// first time seeing the event, `AlreadyExists` if another delivery
    /// won the race.
    async fn save(&self, record: WebhookEventRecord) -> Result<SaveResult, DomainError>;

    /// Moves a claim to the `success` state.
    async fn mark_succeeded(&self, event_id: &str) -> Result<(), DomainError>;

    /// Moves a claim to the terminal `failed` state.
    async fn mark_failed(&self, event_id: &str, error: &str) -> Result<(), DomainError>;

    /// Releases a claim so the gateway's redelivery gets a fresh attempt.
    async fn release(&self, event_id: &str) -> Result<(), DomainError>;

    /// Deletes records older than the given timestamp (retention sweep).
    async fn delete_before(&self, timestamp: DateTime<Utc>) -> Result<u64, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn processing_record_has_correct_fields() {
        let record =
            WebhookEventRecord::processing("evt_123", "checkout", serde_json::json!({"id": "t"}));

        assert_eq!(record.event_id, "evt_123");
        assert_eq!(record.gateway, "checkout");
        assert_eq!(record.result, "processing");
        assert!(record.error_message.is_none());
    }

    #[test]
    fn processing_record_keeps_the_payload() {
        let payload = serde_json::json!({"amount": 1000});
        let record = WebhookEventRecord::processing("txn_456", "bank", payload.clone());

        assert_eq!(record.payload, payload);
    }
}
