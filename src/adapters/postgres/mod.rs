//! PostgreSQL adapter implementations.
//!
//! Each repository backs one port with sqlx queries over a shared
//! connection pool. Uniqueness and idempotency guarantees lean on
//! database constraints rather than application-level checks.

mod job_store;
mod raffle_repository;
mod referral_repository;
mod user_repository;
mod webhook_event_repository;

pub use job_store::PostgresJobStore;
pub use raffle_repository::PostgresRaffleRepository;
pub use referral_repository::PostgresReferralRepository;
pub use user_repository::PostgresUserRepository;
pub use webhook_event_repository::PostgresWebhookEventRepository;
