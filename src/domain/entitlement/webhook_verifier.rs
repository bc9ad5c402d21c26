//! Checkout webhook signature verification.
//!
//! Implements verification of the hosted-checkout gateway's webhook
//! signatures using HMAC-SHA256 over `{request_id}.{timestamp}.{raw_body}`.
//! Includes timestamp freshness validation to prevent replay attacks.
//!
//! This is the sole replay/forgery defense on the checkout path and must
//! run before any other pipeline step.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;

/// Freshness window for webhook timestamps (180 seconds either side).
const FRESHNESS_WINDOW_SECS: i64 = 180;

/// Verifier for checkout gateway webhook signatures.
pub struct CheckoutWebhookVerifier {
    /// The shared signing secret from the gateway dashboard.
    secret: String,
}

impl CheckoutWebhookVerifier {
    /// Creates a new verifier with the given shared secret.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    /// Verifies a webhook's authenticity and freshness.
    ///
    /// # Verification Steps
    ///
    /// 1. Parse the declared timestamp
    /// 2. Validate the timestamp is within the 180-second freshness window
    /// 3. Compute the expected signature over `{request_id}.{timestamp}.{body}`
    /// 4. Compare signatures using constant-time comparison
    ///
    /// # Errors
    ///
    /// - `StaleTimestamp` - timestamp outside the freshness window
    /// - `InvalidSignature` - declared signature does not match
    /// - `ParseError` - timestamp or signature hex is malformed
    pub fn verify(
        &self,
        request_id: &str,
        timestamp: &str,
        signature: &str,
        body: &[u8],
    ) -> Result<(), WebhookError> {
        let timestamp: i64 = timestamp
            .parse()
            .map_err(|_| WebhookError::ParseError("invalid timestamp".to_string()))?;

        self.validate_timestamp(timestamp)?;

        let declared = hex::decode(signature)
            .map_err(|_| WebhookError::ParseError("invalid signature hex".to_string()))?;
        let expected = self.compute_signature(request_id, timestamp, body);

        if !constant_time_compare(&expected, &declared) {
            return Err(WebhookError::InvalidSignature);
        }

        Ok(())
    }

    /// Validates that the timestamp is within the freshness window.
    fn validate_timestamp(&self, timestamp: i64) -> Result<(), WebhookError> {
        let now = chrono::Utc::now().timestamp();

        if (now - timestamp).abs() > FRESHNESS_WINDOW_SECS {
            return Err(WebhookError::StaleTimestamp);
        }

        Ok(())
    }

    /// Computes the HMAC-SHA256 signature for the signed payload.
    fn compute_signature(&self, request_id: &str, timestamp: i64, body: &[u8]) -> Vec<u8> {
        let signed_payload = format!(
            "{}.{}.{}",
            request_id,
            timestamp,
            String::from_utf8_lossy(body)
        );

        let mut mac =
            Hmac::<Sha256>::new_from_slice(self.secret.as_bytes()).expect("HMAC accepts any key");
        mac.update(signed_payload.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// Prevents timing attacks that could leak information about the
/// expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

/// Computes a hex-encoded signature for use in test fixtures.
#[cfg(test)]
pub fn compute_test_signature(
    secret: &str,
    request_id: &str,
    timestamp: i64,
    body: &str,
) -> String {
    let signed_payload = format!("{}.{}.{}", request_id, timestamp, body);
    let mut mac =
        Hmac::<Sha256>::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key");
    mac.update(signed_payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEST_SECRET: &str = "whk_test_secret_12345";

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }

    // ══════════════════════════════════════════════════════════════
    // Signature Verification Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn verify_valid_signature() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);
        let body = r#"{"event_id":"evt_1","amount":10000}"#;
        let ts = now();
        let sig = compute_test_signature(TEST_SECRET, "req_abc", ts, body);

        let result = verifier.verify("req_abc", &ts.to_string(), &sig, body.as_bytes());

        assert!(result.is_ok());
    }

    #[test]
    fn verify_tampered_body_fails() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);
        let ts = now();
        let sig = compute_test_signature(TEST_SECRET, "req_abc", ts, r#"{"amount":1000}"#);

        let result = verifier.verify("req_abc", &ts.to_string(), &sig, br#"{"amount":10000}"#);

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_wrong_secret_fails() {
        let verifier = CheckoutWebhookVerifier::new("wrong_secret");
        let body = r#"{"event_id":"evt_1"}"#;
        let ts = now();
        let sig = compute_test_signature(TEST_SECRET, "req_abc", ts, body);

        let result = verifier.verify("req_abc", &ts.to_string(), &sig, body.as_bytes());

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_different_request_id_fails() {
        // The request id is part of the signed payload, so swapping it
        // invalidates the signature.
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);
        let body = r#"{"event_id":"evt_1"}"#;
        let ts = now();
        let sig = compute_test_signature(TEST_SECRET, "req_abc", ts, body);

        let result = verifier.verify("req_other", &ts.to_string(), &sig, body.as_bytes());

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
    }

    #[test]
    fn verify_garbage_signature_hex_fails() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);
        let ts = now().to_string();

        let result = verifier.verify("req_abc", &ts, "not-hex!", b"{}");

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    #[test]
    fn verify_non_numeric_timestamp_fails() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);

        let result = verifier.verify("req_abc", "yesterday", &"a".repeat(64), b"{}");

        assert!(matches!(result, Err(WebhookError::ParseError(_))));
    }

    // ══════════════════════════════════════════════════════════════
    // Timestamp Freshness Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn timestamp_within_window_succeeds() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);

        assert!(verifier.validate_timestamp(now() - 120).is_ok());
    }

    #[test]
    fn timestamp_at_boundary_succeeds() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);

        assert!(verifier.validate_timestamp(now() - 180).is_ok());
    }

    #[test]
    fn timestamp_too_old_fails() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);

        let result = verifier.validate_timestamp(now() - 181);

        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn timestamp_too_far_in_future_fails() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);

        let result = verifier.validate_timestamp(now() + 181);

        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    #[test]
    fn stale_timestamp_rejected_even_with_valid_signature() {
        let verifier = CheckoutWebhookVerifier::new(TEST_SECRET);
        let body = r#"{"event_id":"evt_1"}"#;
        let ts = now() - 600;
        let sig = compute_test_signature(TEST_SECRET, "req_abc", ts, body);

        let result = verifier.verify("req_abc", &ts.to_string(), &sig, body.as_bytes());

        assert!(matches!(result, Err(WebhookError::StaleTimestamp)));
    }

    // ══════════════════════════════════════════════════════════════
    // Constant Time Comparison Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn constant_time_compare_equal_values() {
        assert!(constant_time_compare(&[1, 2, 3], &[1, 2, 3]));
    }

    #[test]
    fn constant_time_compare_different_values() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 4]));
    }

    #[test]
    fn constant_time_compare_different_lengths() {
        assert!(!constant_time_compare(&[1, 2, 3], &[1, 2, 3, 4]));
    }
}
