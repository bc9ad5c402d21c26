//! Raffle aggregate.
//!
//! A raffle collects entries from paid users and is drawn at a scheduled
//! time. The status transition is one-way: `scheduled` → `completed`,
//! never backward, and a winner is set only when the raffle completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::foundation::{RaffleId, UserId};

/// Lifecycle status of a raffle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RaffleStatus {
    /// Waiting for the scheduled drawing time.
    Scheduled,
    /// Drawn; winner recorded.
    Completed,
}

/// Errors raised by raffle state transitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RaffleError {
    /// The raffle has already been drawn.
    #[error("Raffle {0} is already completed")]
    AlreadyCompleted(RaffleId),

    /// The raffle has no participants to draw from.
    #[error("Raffle {0} has no participants")]
    NoParticipants(RaffleId),
}

/// A scheduled prize drawing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Raffle {
    pub id: RaffleId,
    /// Prizes awarded to the winner.
    pub prizes: Vec<String>,
    /// One element per granted entry; a user with N entries appears N times.
    pub participants: Vec<UserId>,
    /// Winning user, set only on completion.
    pub winner: Option<UserId>,
    /// When the drawing fires.
    pub scheduled_at: DateTime<Utc>,
    pub status: RaffleStatus,
    pub created_at: DateTime<Utc>,
}

impl Raffle {
    /// Creates a new scheduled raffle.
    pub fn schedule(
        prizes: Vec<String>,
        participants: Vec<UserId>,
        scheduled_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: RaffleId::new(),
            prizes,
            participants,
            winner: None,
            scheduled_at,
            status: RaffleStatus::Scheduled,
            created_at: Utc::now(),
        }
    }

    /// Returns true if the scheduled time was already in the past at `now`.
    pub fn is_past_due(&self, now: DateTime<Utc>) -> bool {
        self.scheduled_at <= now
    }

    /// Adds raffle entries for a user. N entries means N appearances
    /// in the participant pool.
    pub fn add_entries(&mut self, user_id: UserId, count: u32) {
        for _ in 0..count {
            self.participants.push(user_id);
        }
    }

    /// Removes every entry belonging to a user (cascade on user deletion).
    pub fn remove_participant(&mut self, user_id: &UserId) {
        self.participants.retain(|p| p != user_id);
    }

    /// Completes the raffle, selecting the winner with the supplied picker.
    ///
    /// The picker receives the participant count and returns an index into
    /// the pool; injecting it keeps the draw deterministic in tests.
    ///
    /// # Errors
    ///
    /// - `AlreadyCompleted` if the raffle was already drawn. The one-way
    ///   transition guards against double-completion when multiple deferred
    ///   actions race.
    /// - `NoParticipants` if the entry pool is empty.
    pub fn complete(&mut self, pick: impl FnOnce(usize) -> usize) -> Result<UserId, RaffleError> {
        if self.status == RaffleStatus::Completed {
            return Err(RaffleError::AlreadyCompleted(self.id));
        }
        if self.participants.is_empty() {
            return Err(RaffleError::NoParticipants(self.id));
        }

        let index = pick(self.participants.len()) % self.participants.len();
        let winner = self.participants[index];
        self.winner = Some(winner);
        self.status = RaffleStatus::Completed;
        Ok(winner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn future_raffle() -> Raffle {
        Raffle::schedule(
            vec!["Gift card".to_string()],
            vec![UserId::new(), UserId::new()],
            Utc::now() + Duration::hours(2),
        )
    }

    #[test]
    fn schedule_starts_in_scheduled_status_without_winner() {
        let raffle = future_raffle();

        assert_eq!(raffle.status, RaffleStatus::Scheduled);
        assert!(raffle.winner.is_none());
    }

    #[test]
    fn future_raffle_is_not_past_due() {
        assert!(!future_raffle().is_past_due(Utc::now()));
    }

    #[test]
    fn elapsed_raffle_is_past_due() {
        let raffle = Raffle::schedule(vec![], vec![], Utc::now() - Duration::minutes(1));
        assert!(raffle.is_past_due(Utc::now()));
    }

    #[test]
    fn add_entries_appends_one_element_per_entry() {
        let mut raffle = future_raffle();
        let user = UserId::new();

        raffle.add_entries(user, 10);

        assert_eq!(raffle.participants.iter().filter(|p| **p == user).count(), 10);
    }

    #[test]
    fn remove_participant_drops_all_entries_for_user() {
        let mut raffle = future_raffle();
        let user = UserId::new();
        raffle.add_entries(user, 5);

        raffle.remove_participant(&user);

        assert!(!raffle.participants.contains(&user));
        assert_eq!(raffle.participants.len(), 2);
    }

    #[test]
    fn complete_sets_winner_and_status() {
        let mut raffle = future_raffle();
        let expected = raffle.participants[1];

        let winner = raffle.complete(|_| 1).unwrap();

        assert_eq!(winner, expected);
        assert_eq!(raffle.winner, Some(expected));
        assert_eq!(raffle.status, RaffleStatus::Completed);
    }

    #[test]
    fn complete_twice_is_rejected() {
        let mut raffle = future_raffle();
        raffle.complete(|_| 0).unwrap();
        let first_winner = raffle.winner;

        let result = raffle.complete(|_| 1);

        assert!(matches!(result, Err(RaffleError::AlreadyCompleted(_))));
        assert_eq!(raffle.winner, first_winner);
    }

    #[test]
    fn complete_with_no_participants_is_rejected() {
        let mut raffle = Raffle::schedule(vec![], vec![], Utc::now() + Duration::hours(1));

        let result = raffle.complete(|_| 0);

        assert!(matches!(result, Err(RaffleError::NoParticipants(_))));
        assert_eq!(raffle.status, RaffleStatus::Scheduled);
    }

    #[test]
    fn complete_wraps_out_of_range_pick() {
        let mut raffle = future_raffle();

        let winner = raffle.complete(|len| len + 1).unwrap();

        assert!(raffle.participants.contains(&winner));
    }
}
