//! Referral command handlers.

mod create_referral;

pub use create_referral::{CreateReferralCommand, CreateReferralHandler};
