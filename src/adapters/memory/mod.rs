//! In-memory adapter implementations.
//!
//! Back the ports with `tokio::sync::RwLock`-guarded maps. Used by the
//! test suites and by local development without a database. Semantics
//! mirror the PostgreSQL adapters, including uniqueness conflicts and
//! compare-and-swap job claims.

mod job_store;
mod raffle_repository;
mod referral_repository;
mod user_repository;
mod webhook_event_repository;

pub use job_store::InMemoryJobStore;
pub use raffle_repository::InMemoryRaffleRepository;
pub use referral_repository::InMemoryReferralRepository;
pub use user_repository::InMemoryUserRepository;
pub use webhook_event_repository::InMemoryWebhookEventRepository;
