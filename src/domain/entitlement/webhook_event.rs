//! Typed payment gateway event payloads.
//!
//! Each gateway's payload is parsed into an explicit shape at the boundary.
//! Required fields carry no defaults, so a payload missing any of them is
//! rejected instead of silently defaulting.

use serde::{Deserialize, Serialize};

// ════════════════════════════════════════════════════════════════════════════
// Gateway A - hosted checkout with signed webhooks
// ════════════════════════════════════════════════════════════════════════════

/// Webhook event from the hosted-checkout gateway.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CheckoutEvent {
    /// Gateway-assigned event identifier, used as the idempotency key.
    pub event_id: String,

    /// Type of event (e.g., "payment.completed").
    #[serde(rename = "type")]
    pub event_type: String,

    /// Identifier of the paying user, as supplied at checkout creation.
    pub user_id: String,

    /// Paid amount in minor currency units.
    pub amount: i64,

    /// ISO currency code.
    pub currency: String,
}

/// Known checkout event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutEventType {
    /// Payment completed successfully.
    PaymentCompleted,
    /// Unknown or unhandled event type.
    Unknown,
}

impl CheckoutEventType {
    /// Parse event type from its wire string.
    pub fn parse(s: &str) -> Self {
        match s {
            "payment.completed" => Self::PaymentCompleted,
            _ => Self::Unknown,
        }
    }

    /// Convert to the wire event type string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PaymentCompleted => "payment.completed",
            Self::Unknown => "unknown",
        }
    }
}

impl CheckoutEvent {
    /// Parse the event type into a known enum variant.
    pub fn parsed_type(&self) -> CheckoutEventType {
        CheckoutEventType::parse(&self.event_type)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Gateway B - bank transfer with result-code notifications
// ════════════════════════════════════════════════════════════════════════════

/// Success result code reported by the bank-transfer gateway.
const BANK_SUCCESS_RESULT_CODE: &str = "0000";

/// Notification from the bank-transfer gateway.
///
/// This path carries no signature scheme; the `transaction_id` still
/// serves as the idempotency key for duplicate deliveries.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BankTransferNotice {
    /// Gateway result code; "0000" indicates a settled payment.
    pub result_code: String,

    /// Gateway transaction identifier, used as the idempotency key.
    pub transaction_id: String,

    /// Paid amount in minor currency units.
    pub amount: i64,

    /// Merchant-supplied parameters echoed back by the gateway.
    pub custom_parameters: BankCustomParameters,
}

/// Custom parameters attached at payment creation.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BankCustomParameters {
    /// Identifier of the paying user.
    pub user_id: String,
}

impl BankTransferNotice {
    /// Returns true if the gateway reported a settled payment.
    pub fn is_success(&self) -> bool {
        self.result_code == BANK_SUCCESS_RESULT_CODE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ══════════════════════════════════════════════════════════════
    // CheckoutEvent Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deserialize_checkout_event() {
        let json = r#"{
            "event_id": "evt_8c1f2a",
            "type": "payment.completed",
            "user_id": "1f7a9d0e-35a4-4f5e-9c27-6f29c1b8a111",
            "amount": 10000,
            "currency": "usd"
        }"#;

        let event: CheckoutEvent = serde_json::from_str(json).unwrap();

        assert_eq!(event.event_id, "evt_8c1f2a");
        assert_eq!(event.parsed_type(), CheckoutEventType::PaymentCompleted);
        assert_eq!(event.amount, 10000);
    }

    #[test]
    fn checkout_event_missing_amount_is_rejected() {
        let json = r#"{
            "event_id": "evt_1",
            "type": "payment.completed",
            "user_id": "abc",
            "currency": "usd"
        }"#;

        let result: Result<CheckoutEvent, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }

    #[test]
    fn checkout_event_missing_user_id_is_rejected() {
        let json = r#"{
            "event_id": "evt_1",
            "type": "payment.completed",
            "amount": 1000,
            "currency": "usd"
        }"#;

        let result: Result<CheckoutEvent, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }

    #[test]
    fn unknown_checkout_event_type_parses_to_unknown() {
        assert_eq!(
            CheckoutEventType::parse("payment.refunded"),
            CheckoutEventType::Unknown
        );
    }

    #[test]
    fn checkout_event_type_roundtrips() {
        let t = CheckoutEventType::PaymentCompleted;
        assert_eq!(CheckoutEventType::parse(t.as_str()), t);
    }

    // ══════════════════════════════════════════════════════════════
    // BankTransferNotice Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn deserialize_bank_transfer_notice() {
        let json = r#"{
            "result_code": "0000",
            "transaction_id": "txn_55d2",
            "amount": 1000,
            "custom_parameters": {
                "user_id": "1f7a9d0e-35a4-4f5e-9c27-6f29c1b8a111"
            }
        }"#;

        let notice: BankTransferNotice = serde_json::from_str(json).unwrap();

        assert!(notice.is_success());
        assert_eq!(notice.transaction_id, "txn_55d2");
        assert_eq!(notice.custom_parameters.user_id.len(), 36);
    }

    #[test]
    fn non_zero_result_code_is_not_success() {
        let json = r#"{
            "result_code": "1001",
            "transaction_id": "txn_1",
            "amount": 1000,
            "custom_parameters": { "user_id": "u" }
        }"#;

        let notice: BankTransferNotice = serde_json::from_str(json).unwrap();

        assert!(!notice.is_success());
    }

    #[test]
    fn bank_notice_missing_custom_parameters_is_rejected() {
        let json = r#"{
            "result_code": "0000",
            "transaction_id": "txn_1",
            "amount": 1000
        }"#;

        let result: Result<BankTransferNotice, _> = serde_json::from_str(json);

        assert!(result.is_err());
    }
}
