use std::sync::PoisonError;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::User;
use crate::domain::auth::models::Username;
use crate::domain::auth::ports::UserRepository;

/// In-process user store for tests and infrastructure-free development.
///
/// A single write lock spans the uniqueness check and the insert, giving the
/// same atomicity the database UNIQUE constraints provide.
pub struct InMemoryUserRepository {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, user: User) -> Result<User, AuthError> {
        let mut users = self.users.write().unwrap_or_else(PoisonError::into_inner);

        if users.iter().any(|u| u.username == user.username) {
            return Err(AuthError::UsernameAlreadyExists(
                user.username.as_str().to_string(),
            ));
        }
        if users.iter().any(|u| u.email == user.email) {
            return Err(AuthError::EmailAlreadyExists(user.email.as_str().to_string()));
        }

        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError> {
        let users = self.users.read().unwrap_or_else(PoisonError::into_inner);
        Ok(users.iter().find(|u| &u.username == username).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::domain::auth::models::EmailAddress;
    use crate::domain::auth::models::UserId;

    fn user(username: &str, email: &str) -> User {
        User {
            id: UserId::new(),
            username: Username::new(username.to_string()).unwrap(),
            email: EmailAddress::new(email.to_string()).unwrap(),
            password_hash: "$argon2id$test_hash".to_string(),
            roles: Vec::new(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn create_then_find_round_trip() {
        let repository = InMemoryUserRepository::new();

        repository
            .create(user("alice", "alice@x.com"))
            .await
            .unwrap();

        let username = Username::new("alice".to_string()).unwrap();
        let found = repository.find_by_username(&username).await.unwrap();
        assert_eq!(found.unwrap().email.as_str(), "alice@x.com");

        let missing = Username::new("nobody".to_string()).unwrap();
        assert!(repository.find_by_username(&missing).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn create_rejects_duplicate_username_and_email() {
        let repository = InMemoryUserRepository::new();
        repository
            .create(user("alice", "alice@x.com"))
            .await
            .unwrap();

        let result = repository.create(user("alice", "other@x.com")).await;
        assert!(matches!(result, Err(AuthError::UsernameAlreadyExists(_))));

        let result = repository.create(user("bob", "alice@x.com")).await;
        assert!(matches!(result, Err(AuthError::EmailAlreadyExists(_))));
    }

    #[tokio::test]
    async fn concurrent_registrations_have_a_single_winner() {
        let repository = Arc::new(InMemoryUserRepository::new());

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repository = Arc::clone(&repository);
                tokio::spawn(async move {
                    repository
                        .create(user("alice", &format!("alice{}@x.com", i)))
                        .await
                })
            })
            .collect();

        let mut created = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => created += 1,
                Err(AuthError::UsernameAlreadyExists(_)) => duplicates += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }

        assert_eq!(created, 1);
        assert_eq!(duplicates, 7);
    }
}
