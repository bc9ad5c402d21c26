//! Payment webhook command handlers.

mod handle_bank_webhook;
mod handle_checkout_webhook;

pub use handle_bank_webhook::{
    BankWebhookResult, HandleBankWebhookCommand, HandleBankWebhookHandler,
};
pub use handle_checkout_webhook::{
    CheckoutWebhookResult, HandleCheckoutWebhookCommand, HandleCheckoutWebhookHandler,
};
