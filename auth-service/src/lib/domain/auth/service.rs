use std::sync::Arc;

use async_trait::async_trait;
use auth::Claims;
use auth::JwtHandler;
use auth::PasswordHasher;
use chrono::Utc;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::UserId;
use crate::domain::auth::models::Username;
use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::UserRepository;

/// Authentication coordinator.
///
/// Orchestrates the credential store and the token handler for the
/// synchronous path: registration, login, and token validation.
pub struct AuthService<R>
where
    R: UserRepository,
{
    repository: Arc<R>,
    password_hasher: PasswordHasher,
    jwt_handler: Arc<JwtHandler>,
}

impl<R> AuthService<R>
where
    R: UserRepository,
{
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `jwt_handler` - Token handler sharing the process-wide signing key
    pub fn new(repository: Arc<R>, jwt_handler: Arc<JwtHandler>) -> Self {
        Self {
            repository,
            password_hasher: PasswordHasher::new(),
            jwt_handler,
        }
    }

    fn issue_token(&self, user: &User) -> Result<String, AuthError> {
        let claims = Claims::for_user(user.id, user.username.as_str());
        Ok(self.jwt_handler.issue(&claims)?)
    }
}

#[async_trait]
impl<R> AuthServicePort for AuthService<R>
where
    R: UserRepository,
{
    async fn register(&self, command: RegisterUserCommand) -> Result<String, AuthError> {
        let password_hash = self.password_hasher.hash(&command.password)?;

        let user = User {
            id: UserId::new(),
            username: command.username,
            email: command.email,
            password_hash,
            roles: Vec::new(),
            created_at: Utc::now(),
        };

        // Duplicate usernames/emails surface from the storage layer's
        // uniqueness constraint, so concurrent registrations cannot race.
        let created_user = self.repository.create(user).await?;

        tracing::info!(user_id = %created_user.id, "User registered");

        self.issue_token(&created_user)
    }

    async fn login(&self, username: &Username, password: &str) -> Result<String, AuthError> {
        let user = self
            .repository
            .find_by_username(username)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let password_matches = self.password_hasher.verify(password, &user.password_hash)?;
        if !password_matches {
            return Err(AuthError::InvalidCredentials);
        }

        tracing::info!(user_id = %user.id, "User logged in");

        self.issue_token(&user)
    }

    async fn validate_token(&self, token: &str) -> bool {
        match self.jwt_handler.verify(token) {
            Ok(_) => true,
            Err(e) => {
                // Expired vs malformed vs bad signature stays visible in the
                // logs; callers only see the boolean.
                tracing::debug!(error = %e, "Token rejected");
                false
            }
        }
    }
}
