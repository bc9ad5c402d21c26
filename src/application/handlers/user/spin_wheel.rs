//! SpinWheelHandler - Command handler for the prize wheel.

use std::sync::Arc;

use chrono::Utc;
use rand::Rng;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::ports::UserRepository;

/// Point values on the wheel, one per segment.
pub const WHEEL_SEGMENTS: [i64; 8] = [5, 10, 15, 20, 30, 50, 75, 100];

/// Outcome of a spin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinResult {
    /// Points awarded by the landed segment.
    pub points_awarded: i64,
    /// The user's updated point balance.
    pub total_points: i64,
    /// Total spins the user has taken.
    pub spin_count: u32,
}

type SegmentPicker = Box<dyn Fn(usize) -> usize + Send + Sync>;

/// Handler for prize-wheel spins.
pub struct SpinWheelHandler {
    users: Arc<dyn UserRepository>,
    pick: SegmentPicker,
}

impl SpinWheelHandler {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self {
            users,
            pick: Box::new(|len| rand::thread_rng().gen_range(0..len)),
        }
    }

    /// Replaces the segment picker, keeping the draw deterministic in tests.
    #[cfg(test)]
    pub fn with_picker(users: Arc<dyn UserRepository>, pick: SegmentPicker) -> Self {
        Self { users, pick }
    }

    pub async fn handle(&self, user_id: UserId) -> Result<SpinResult, DomainError> {
        let mut user = self
            .users
            .find_by_id(&user_id)
            .await?
            .ok_or_else(|| DomainError::new(ErrorCode::UserNotFound, "User not found"))?;

        let index = (self.pick)(WHEEL_SEGMENTS.len()) % WHEEL_SEGMENTS.len();
        let points = WHEEL_SEGMENTS[index];

        user.record_spin(Utc::now());
        user.add_points(points);
        self.users.update(&user).await?;

        tracing::info!(user_id = %user_id, points, "prize wheel spin recorded");

        Ok(SpinResult {
            points_awarded: points,
            total_points: user.points,
            spin_count: user.spin_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryUserRepository;
    use crate::domain::user::User;

    async fn seed_user(users: &InMemoryUserRepository) -> User {
        let user = User::register("spin@example.com", "15550008888", "hash", "REF").unwrap();
        users.insert(user.clone()).await;
        user
    }

    #[tokio::test]
    async fn spin_awards_segment_points_and_records_spin() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed_user(&users).await;
        let handler = SpinWheelHandler::with_picker(users.clone(), Box::new(|_| 3));

        let result = handler.handle(user.id).await.unwrap();

        assert_eq!(result.points_awarded, WHEEL_SEGMENTS[3]);
        assert_eq!(result.total_points, WHEEL_SEGMENTS[3]);
        assert_eq!(result.spin_count, 1);

        let stored = users.find_by_id(&user.id).await.unwrap().unwrap();
        assert_eq!(stored.points, WHEEL_SEGMENTS[3]);
        assert!(stored.first_spin_at.is_some());
    }

    #[tokio::test]
    async fn repeated_spins_accumulate() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed_user(&users).await;
        let handler = SpinWheelHandler::with_picker(users.clone(), Box::new(|_| 0));

        handler.handle(user.id).await.unwrap();
        let result = handler.handle(user.id).await.unwrap();

        assert_eq!(result.spin_count, 2);
        assert_eq!(result.total_points, WHEEL_SEGMENTS[0] * 2);
    }

    #[tokio::test]
    async fn random_picker_lands_on_a_real_segment() {
        let users = Arc::new(InMemoryUserRepository::new());
        let user = seed_user(&users).await;
        let handler = SpinWheelHandler::new(users);

        let result = handler.handle(user.id).await.unwrap();

        assert!(WHEEL_SEGMENTS.contains(&result.points_awarded));
    }

    #[tokio::test]
    async fn spin_for_unknown_user_is_not_found() {
        let users = Arc::new(InMemoryUserRepository::new());
        let handler = SpinWheelHandler::new(users);

        let result = handler.handle(UserId::new()).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::UserNotFound));
    }
}
