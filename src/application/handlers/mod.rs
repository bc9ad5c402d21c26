//! Command handlers, one per operation the HTTP surface exposes.

pub mod payment;
pub mod raffle;
pub mod referral;
pub mod user;
