//! HandleBankWebhookHandler - Command handler for bank transfer gateway notices.
//!
//! This path carries no signature scheme; the gateway reports a result
//! code instead, and only "0000" grants anything. Non-success notices
//! are acknowledged so the gateway stops redelivering them.

use std::sync::Arc;

use crate::domain::entitlement::{
    BankTransferNotice, EntitlementPipeline, PaymentConfirmation, PaymentGateway, WebhookError,
};
use crate::ports::WebhookResult;

/// Command to handle a bank transfer notice.
#[derive(Debug, Clone)]
pub struct HandleBankWebhookCommand {
    /// Raw request body.
    pub payload: Vec<u8>,
}

/// Result of bank notice processing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BankWebhookResult {
    /// Entitlement applied.
    Processed,
    /// Duplicate delivery, acknowledged without re-granting.
    AlreadyProcessed,
    /// Non-success result code, acknowledged without action.
    Ignored { result_code: String },
}

/// Handler for the bank transfer notification path.
pub struct HandleBankWebhookHandler {
    pipeline: Arc<EntitlementPipeline>,
}

impl HandleBankWebhookHandler {
    pub fn new(pipeline: Arc<EntitlementPipeline>) -> Self {
        Self { pipeline }
    }

    pub async fn handle(
        &self,
        cmd: HandleBankWebhookCommand,
    ) -> Result<BankWebhookResult, WebhookError> {
        let notice: BankTransferNotice = serde_json::from_slice(&cmd.payload)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;

        if !notice.is_success() {
            tracing::info!(
                transaction_id = %notice.transaction_id,
                result_code = %notice.result_code,
                "non-success bank notice acknowledged"
            );
            return Ok(BankWebhookResult::Ignored {
                result_code: notice.result_code,
            });
        }

        let payload = serde_json::to_value(&notice)
            .map_err(|e| WebhookError::ParseError(e.to_string()))?;
        let confirmation = PaymentConfirmation {
            event_id: notice.transaction_id,
            gateway: PaymentGateway::BankTransfer,
            user_id: notice.custom_parameters.user_id,
            amount: notice.amount,
            payload,
        };

        match self.pipeline.process(confirmation).await? {
            WebhookResult::Processed => Ok(BankWebhookResult::Processed),
            WebhookResult::AlreadyProcessed => Ok(BankWebhookResult::AlreadyProcessed),
        }
    }
}
