//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, errors)
//! - `entitlement` - Payment-confirmation pipeline: signature verification,
//!   amount resolution, idempotent processing
//! - `user` - Platform participant aggregate and entitlement state
//! - `raffle` - Scheduled prize drawings with one-way status transitions
//! - `referral` - Referrer/referred edges with commission tracking

pub mod entitlement;
pub mod foundation;
pub mod raffle;
pub mod referral;
pub mod user;
