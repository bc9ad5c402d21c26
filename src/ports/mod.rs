//! Ports - async trait interfaces at the hexagon's seams.
//!
//! Adapters implement these traits; domain and application code depend
//! only on the traits.

mod job_store;
mod raffle_repository;
mod referral_repository;
mod user_repository;
mod webhook_event_repository;

pub use job_store::{JobKind, JobRecord, JobStatus, JobStore};
pub use raffle_repository::RaffleRepository;
pub use referral_repository::ReferralRepository;
pub use user_repository::UserRepository;
pub use webhook_event_repository::{
    SaveResult, WebhookEventRecord, WebhookEventRepository, WebhookResult,
};
