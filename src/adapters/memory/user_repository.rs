//! In-memory implementation of UserRepository.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, UserId};
use crate::domain::user::User;
use crate::ports::UserRepository;

/// In-memory user store keyed by id, with email/phone uniqueness checks.
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<UserId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the store with a user (test convenience).
    pub async fn insert(&self, user: User) {
        self.users.write().await.insert(user.id, user);
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn save(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        let taken = users
            .values()
            .any(|u| u.email == user.email || u.phone == user.phone);
        if taken {
            return Err(DomainError::new(
                ErrorCode::UserExists,
                "Email or phone already registered",
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), DomainError> {
        let mut users = self.users.write().await;
        if !users.contains_key(&user.id) {
            return Err(DomainError::new(ErrorCode::UserNotFound, "User not found"));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, DomainError> {
        Ok(self.users.read().await.get(id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list_paid(&self) -> Result<Vec<User>, DomainError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .filter(|u| u.paid)
            .cloned()
            .collect())
    }

    async fn delete(&self, id: &UserId) -> Result<(), DomainError> {
        self.users.write().await.remove(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_user(email: &str, phone: &str) -> User {
        User::register(email, phone, "hash", "REF").unwrap()
    }

    #[tokio::test]
    async fn save_and_find_roundtrip() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("a@example.com", "1");

        repo.save(&user).await.unwrap();
        let found = repo.find_by_id(&user.id).await.unwrap().unwrap();

        assert_eq!(found.email, "a@example.com");
    }

    #[tokio::test]
    async fn save_rejects_duplicate_email() {
        let repo = InMemoryUserRepository::new();
        repo.save(&test_user("a@example.com", "1")).await.unwrap();

        let result = repo.save(&test_user("a@example.com", "2")).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::UserExists));
    }

    #[tokio::test]
    async fn save_rejects_duplicate_phone() {
        let repo = InMemoryUserRepository::new();
        repo.save(&test_user("a@example.com", "1")).await.unwrap();

        let result = repo.save(&test_user("b@example.com", "1")).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::UserExists));
    }

    #[tokio::test]
    async fn update_unknown_user_fails() {
        let repo = InMemoryUserRepository::new();

        let result = repo.update(&test_user("a@example.com", "1")).await;

        assert!(matches!(result, Err(e) if e.code == ErrorCode::UserNotFound));
    }

    #[tokio::test]
    async fn list_paid_filters_unpaid_users() {
        let repo = InMemoryUserRepository::new();
        let mut paid = test_user("a@example.com", "1");
        paid.grant_entitlement(crate::domain::entitlement::PlanTier::Premium, chrono::Utc::now());
        repo.save(&paid).await.unwrap();
        repo.save(&test_user("b@example.com", "2")).await.unwrap();

        let listed = repo.list_paid().await.unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, paid.id);
    }

    #[tokio::test]
    async fn delete_removes_user() {
        let repo = InMemoryUserRepository::new();
        let user = test_user("a@example.com", "1");
        repo.save(&user).await.unwrap();

        repo.delete(&user.id).await.unwrap();

        assert!(repo.find_by_id(&user.id).await.unwrap().is_none());
    }
}
