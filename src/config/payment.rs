//! Payment configuration

use serde::Deserialize;

use super::error::ValidationError;

/// Payment configuration
///
/// Covers the signed checkout gateway (shared webhook secret and plan
/// pricing) plus the browser redirect targets used after a bank
/// transfer callback.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentConfig {
    /// Shared secret for checkout webhook signatures
    pub checkout_webhook_secret: String,

    /// Charge amount, in minor units, that grants the basic plan
    #[serde(default = "default_basic_amount")]
    pub basic_plan_amount: i64,

    /// Charge amount, in minor units, that grants the premium plan
    #[serde(default = "default_premium_amount")]
    pub premium_plan_amount: i64,

    /// Browser redirect target after a successful bank transfer
    #[serde(default = "default_success_redirect")]
    pub success_redirect_url: String,

    /// Browser redirect target after a failed bank transfer
    #[serde(default = "default_failure_redirect")]
    pub failure_redirect_url: String,
}

impl PaymentConfig {
    /// Validate payment configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.checkout_webhook_secret.is_empty() {
            return Err(ValidationError::MissingRequired(
                "PAYMENT_CHECKOUT_WEBHOOK_SECRET",
            ));
        }
        if self.basic_plan_amount <= 0 || self.premium_plan_amount <= 0 {
            return Err(ValidationError::InvalidPlanAmount);
        }
        if self.basic_plan_amount == self.premium_plan_amount {
            return Err(ValidationError::AmbiguousPlanAmounts);
        }
        for url in [&self.success_redirect_url, &self.failure_redirect_url] {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidRedirectUrl);
            }
        }
        Ok(())
    }
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            checkout_webhook_secret: String::new(),
            basic_plan_amount: default_basic_amount(),
            premium_plan_amount: default_premium_amount(),
            success_redirect_url: default_success_redirect(),
            failure_redirect_url: default_failure_redirect(),
        }
    }
}

fn default_basic_amount() -> i64 {
    1_000
}

fn default_premium_amount() -> i64 {
    10_000
}

fn default_success_redirect() -> String {
    "http://localhost:5173/payment/success".to_string()
}

fn default_failure_redirect() -> String {
    "http://localhost:5173/payment/failure".to_string()
}
