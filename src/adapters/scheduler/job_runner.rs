//! JobRunner - Background service executing durable deferred jobs.
//!
//! Deferred actions (entitlement expiry, raffle completion) are persisted
//! as job rows rather than armed as in-process timers, so they survive
//! restarts. The runner:
//!
//! 1. Sweeps once at startup, executing anything that came due while the
//!    process was down
//! 2. Polls on a fixed interval thereafter
//!
//! Claiming transitions a job `pending` → `claimed` atomically, so of any
//! number of concurrent runners only one executes a given job.
//!
//! ## Graceful Shutdown
//!
//! The service listens for a shutdown signal and completes the current
//! batch before stopping.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tokio::time;

use crate::domain::foundation::DomainError;
use crate::domain::raffle::RaffleError;
use crate::ports::{
    JobKind, JobRecord, JobStore, RaffleRepository, UserRepository, WebhookEventRepository,
};

/// Configuration for the JobRunner service.
#[derive(Debug, Clone)]
pub struct JobRunnerConfig {
    /// How often to poll for due jobs.
    pub poll_interval: Duration,

    /// Maximum jobs to claim per poll cycle.
    pub claim_batch: u32,

    /// How long processed webhook event records are kept before the
    /// retention sweep deletes them.
    pub event_retention: chrono::Duration,
}

impl Default for JobRunnerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(15),
            claim_batch: 50,
            event_retention: chrono::Duration::days(30),
        }
    }
}

type WinnerPicker = Box<dyn Fn(usize) -> usize + Send + Sync>;

/// Background service that claims and executes due deferred jobs.
pub struct JobRunner {
    jobs: Arc<dyn JobStore>,
    users: Arc<dyn UserRepository>,
    raffles: Arc<dyn RaffleRepository>,
    events: Arc<dyn WebhookEventRepository>,
    config: JobRunnerConfig,
    pick_winner: WinnerPicker,
}

impl JobRunner {
    /// Creates a runner with default configuration and a random draw.
    pub fn new(
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        events: Arc<dyn WebhookEventRepository>,
    ) -> Self {
        Self::with_config(jobs, users, raffles, events, JobRunnerConfig::default())
    }

    /// Creates a runner with custom configuration.
    pub fn with_config(
        jobs: Arc<dyn JobStore>,
        users: Arc<dyn UserRepository>,
        raffles: Arc<dyn RaffleRepository>,
        events: Arc<dyn WebhookEventRepository>,
        config: JobRunnerConfig,
    ) -> Self {
        Self {
            jobs,
            users,
            raffles,
            events,
            config,
            pick_winner: Box::new(|len| rand::thread_rng().gen_range(0..len)),
        }
    }

    /// Replaces the winner picker, keeping raffle draws deterministic in tests.
    #[cfg(test)]
    pub fn with_picker(mut self, pick: WinnerPicker) -> Self {
        self.pick_winner = pick;
        self
    }

    /// Run the job loop until the shutdown signal is received.
    ///
    /// Starts with a recovery sweep for jobs that came due while the
    /// process was down. Per-cycle failures are logged and retried on the
    /// next tick rather than killing the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if let Err(e) = self.process_due().await {
            tracing::warn!(error = %e, "startup job sweep failed");
        }
        if let Err(e) = self.sweep_expired_events().await {
            tracing::warn!(error = %e, "startup event retention sweep failed");
        }

        let mut interval = time::interval(self.config.poll_interval);
        interval.tick().await; // first tick fires immediately; sweep already ran

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        if let Err(e) = self.process_due().await {
                            tracing::warn!(error = %e, "final job sweep failed");
                        }
                        return;
                    }
                }

                _ = interval.tick() => {
                    if let Err(e) = self.process_due().await {
                        tracing::warn!(error = %e, "job poll cycle failed");
                    }
                    if let Err(e) = self.sweep_expired_events().await {
                        tracing::warn!(error = %e, "event retention sweep failed");
                    }
                }
            }
        }
    }

    /// Claims and executes one batch of due jobs.
    ///
    /// Returns the number of jobs executed successfully. Also useful for
    /// testing without running the full loop.
    pub async fn process_due(&self) -> Result<usize, DomainError> {
        let claimed = self
            .jobs
            .claim_due(Utc::now(), self.config.claim_batch)
            .await?;
        let mut executed = 0;

        for job in claimed {
            match self.execute(&job).await {
                Ok(()) => {
                    self.jobs.mark_done(&job.id).await?;
                    executed += 1;
                }
                Err(e) => {
                    tracing::warn!(job_id = %job.id, error = %e, "deferred job failed");
                    self.jobs.mark_failed(&job.id, &e.to_string()).await?;
                }
            }
        }

        Ok(executed)
    }

    /// Deletes webhook event records past the retention window.
    ///
    /// Returns the number of records deleted. Also useful for testing
    /// without running the full loop.
    pub async fn sweep_expired_events(&self) -> Result<u64, DomainError> {
        let cutoff = Utc::now() - self.config.event_retention;
        let deleted = self.events.delete_before(cutoff).await?;
        if deleted > 0 {
            tracing::info!(deleted, "expired webhook event records swept");
        }
        Ok(deleted)
    }

    async fn execute(&self, job: &JobRecord) -> Result<(), DomainError> {
        match job.kind {
            JobKind::EntitlementExpiry { user_id, tier } => {
                let Some(mut user) = self.users.find_by_id(&user_id).await? else {
                    // User deleted since the grant; nothing to revoke.
                    tracing::debug!(user_id = %user_id, "expiry target no longer exists");
                    return Ok(());
                };

                if user.revoke_entitlement_if_still(tier) {
                    self.users.update(&user).await?;
                    tracing::info!(user_id = %user_id, tier = %tier, "entitlement expired");
                } else {
                    // Superseded by a later grant; the stale expiry is a no-op.
                    tracing::debug!(user_id = %user_id, "expiry no-op, tier superseded");
                }
                Ok(())
            }

            JobKind::CompleteRaffle { raffle_id } => {
                let Some(mut raffle) = self.raffles.find_by_id(&raffle_id).await? else {
                    tracing::debug!(raffle_id = %raffle_id, "raffle no longer exists");
                    return Ok(());
                };

                match raffle.complete(&self.pick_winner) {
                    Ok(winner) => {
                        self.raffles.update(&raffle).await?;
                        tracing::info!(raffle_id = %raffle_id, winner = %winner, "raffle completed");
                        Ok(())
                    }
                    // A concurrent runner or operator already drew it.
                    Err(RaffleError::AlreadyCompleted(_)) => {
                        tracing::debug!(raffle_id = %raffle_id, "raffle already completed");
                        Ok(())
                    }
                    Err(e @ RaffleError::NoParticipants(_)) => {
                        Err(DomainError::new(
                            crate::domain::foundation::ErrorCode::InvalidStateTransition,
                            e.to_string(),
                        ))
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{
        InMemoryJobStore, InMemoryRaffleRepository, InMemoryUserRepository,
        InMemoryWebhookEventRepository,
    };
    use crate::domain::entitlement::PlanTier;
    use crate::domain::foundation::UserId;
    use crate::domain::raffle::{Raffle, RaffleStatus};
    use crate::domain::user::User;
    use crate::ports::{JobStatus, WebhookEventRecord, WebhookEventRepository};
    use chrono::Duration as ChronoDuration;

    struct Fixture {
        jobs: Arc<InMemoryJobStore>,
        users: Arc<InMemoryUserRepository>,
        raffles: Arc<InMemoryRaffleRepository>,
        events: Arc<InMemoryWebhookEventRepository>,
    }

    fn fixture() -> Fixture {
        Fixture {
            jobs: Arc::new(InMemoryJobStore::new()),
            users: Arc::new(InMemoryUserRepository::new()),
            raffles: Arc::new(InMemoryRaffleRepository::new()),
            events: Arc::new(InMemoryWebhookEventRepository::new()),
        }
    }

    fn runner(fx: &Fixture) -> JobRunner {
        JobRunner::new(
            fx.jobs.clone(),
            fx.users.clone(),
            fx.raffles.clone(),
            fx.events.clone(),
        )
        .with_picker(Box::new(|_| 0))
    }

    async fn seed_basic_user(fx: &Fixture) -> User {
        let mut user = User::register("due@example.com", "15550009999", "hash", "REF").unwrap();
        user.grant_entitlement(PlanTier::Basic, Utc::now() - ChronoDuration::hours(1));
        fx.users.insert(user.clone()).await;
        user
    }

    async fn schedule_expiry(fx: &Fixture, user_id: UserId, tier: PlanTier) {
        fx.jobs
            .schedule(JobRecord::new(
                JobKind::EntitlementExpiry { user_id, tier },
                Utc::now() - ChronoDuration::minutes(1),
            ))
            .await
            .unwrap();
    }

    // ══════════════════════════════════════════════════════════════
    // Entitlement Expiry Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn due_expiry_revokes_unchanged_tier() {
        let fx = fixture();
        let user = seed_basic_user(&fx).await;
        schedule_expiry(&fx, user.id, PlanTier::Basic).await;

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 1);
        let stored = fx.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(!stored.paid);
        assert_eq!(stored.tier, PlanTier::None);
    }

    #[tokio::test]
    async fn superseded_grant_makes_expiry_a_noop() {
        let fx = fixture();
        let mut user = seed_basic_user(&fx).await;
        schedule_expiry(&fx, user.id, PlanTier::Basic).await;

        // Upgrade lands before the expiry fires.
        user.grant_entitlement(PlanTier::Premium, Utc::now());
        fx.users.update(&user).await.unwrap();

        runner(&fx).process_due().await.unwrap();

        let stored = fx.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.paid);
        assert_eq!(stored.tier, PlanTier::Premium);

        // The stale job still completes rather than lingering.
        assert_eq!(fx.jobs.all().await[0].status, JobStatus::Done);
    }

    #[tokio::test]
    async fn expiry_for_deleted_user_completes_quietly() {
        let fx = fixture();
        schedule_expiry(&fx, UserId::new(), PlanTier::Basic).await;

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 1);
    }

    #[tokio::test]
    async fn future_jobs_are_untouched() {
        let fx = fixture();
        let user = seed_basic_user(&fx).await;
        fx.jobs
            .schedule(JobRecord::new(
                JobKind::EntitlementExpiry {
                    user_id: user.id,
                    tier: PlanTier::Basic,
                },
                Utc::now() + ChronoDuration::minutes(30),
            ))
            .await
            .unwrap();

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 0);
        let stored = fx.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(stored.paid);
    }

    // ══════════════════════════════════════════════════════════════
    // Raffle Completion Tests
    // ══════════════════════════════════════════════════════════════

    async fn seed_due_raffle(fx: &Fixture, participants: Vec<UserId>) -> Raffle {
        let raffle = Raffle::schedule(
            vec!["Prize".to_string()],
            participants,
            Utc::now() - ChronoDuration::minutes(1),
        );
        fx.raffles.save(&raffle).await.unwrap();
        fx.jobs
            .schedule(JobRecord::new(
                JobKind::CompleteRaffle {
                    raffle_id: raffle.id,
                },
                raffle.scheduled_at,
            ))
            .await
            .unwrap();
        raffle
    }

    #[tokio::test]
    async fn due_raffle_job_draws_winner_once() {
        let fx = fixture();
        let entrant = UserId::new();
        let raffle = seed_due_raffle(&fx, vec![entrant, UserId::new()]).await;

        runner(&fx).process_due().await.unwrap();

        let stored = fx.raffles.find_by_id(&raffle.id).await.unwrap().unwrap();
        assert_eq!(stored.status, RaffleStatus::Completed);
        assert_eq!(stored.winner, Some(entrant));
    }

    #[tokio::test]
    async fn already_completed_raffle_job_is_a_noop() {
        let fx = fixture();
        let raffle = seed_due_raffle(&fx, vec![UserId::new()]).await;

        let mut drawn = fx.raffles.find_by_id(&raffle.id).await.unwrap().unwrap();
        let winner = drawn.complete(|_| 0).unwrap();
        fx.raffles.update(&drawn).await.unwrap();

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 1);
        let stored = fx.raffles.find_by_id(&raffle.id).await.unwrap().unwrap();
        assert_eq!(stored.winner, Some(winner));
    }

    #[tokio::test]
    async fn empty_raffle_job_is_marked_failed() {
        let fx = fixture();
        seed_due_raffle(&fx, vec![]).await;

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 0);
        assert_eq!(fx.jobs.all().await[0].status, JobStatus::Failed);
    }

    #[tokio::test]
    async fn deleted_raffle_job_completes_quietly() {
        let fx = fixture();
        let raffle = seed_due_raffle(&fx, vec![UserId::new()]).await;
        fx.raffles.delete(&raffle.id).await.unwrap();

        let executed = runner(&fx).process_due().await.unwrap();

        assert_eq!(executed, 1);
        assert_eq!(fx.jobs.all().await[0].status, JobStatus::Done);
    }

    // ══════════════════════════════════════════════════════════════
    // Claim Exclusivity Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn concurrent_runners_execute_each_job_at_most_once() {
        let fx = fixture();
        let user = seed_basic_user(&fx).await;
        schedule_expiry(&fx, user.id, PlanTier::Basic).await;

        let a = runner(&fx);
        let b = runner(&fx);
        let (ra, rb) = tokio::join!(a.process_due(), b.process_due());

        assert_eq!(ra.unwrap() + rb.unwrap(), 1);
    }

    // ══════════════════════════════════════════════════════════════
    // Event Retention Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn retention_sweep_deletes_only_records_past_the_window() {
        let fx = fixture();
        let stale = WebhookEventRecord {
            event_id: "evt_stale".to_string(),
            gateway: "checkout".to_string(),
            processed_at: Utc::now() - ChronoDuration::days(45),
            result: "success".to_string(),
            error_message: None,
            payload: serde_json::json!({}),
        };
        fx.events.save(stale).await.unwrap();
        fx.events
            .save(WebhookEventRecord::processing(
                "evt_fresh",
                "bank",
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let deleted = runner(&fx).sweep_expired_events().await.unwrap();

        assert_eq!(deleted, 1);
        assert!(fx.events.find_by_event_id("evt_stale").await.unwrap().is_none());
        assert!(fx.events.find_by_event_id("evt_fresh").await.unwrap().is_some());
    }

    // ══════════════════════════════════════════════════════════════
    // Loop Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn run_sweeps_on_startup_and_stops_on_shutdown() {
        let fx = fixture();
        let user = seed_basic_user(&fx).await;
        schedule_expiry(&fx, user.id, PlanTier::Basic).await;

        let job_runner = JobRunner::with_config(
            fx.jobs.clone(),
            fx.users.clone(),
            fx.raffles.clone(),
            fx.events.clone(),
            JobRunnerConfig {
                poll_interval: Duration::from_millis(10),
                claim_batch: 10,
                ..Default::default()
            },
        );

        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { job_runner.run(rx).await });

        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();
        handle.await.unwrap();

        let stored = fx.users.find_by_id(&user.id).await.unwrap().unwrap();
        assert!(!stored.paid);
    }
}
