use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::domain::auth::errors::AuthError;
use crate::domain::auth::errors::BrokerError;
use crate::domain::auth::models::RegisterUserCommand;
use crate::domain::auth::models::User;
use crate::domain::auth::models::Username;

/// Ordered sequence of message payloads from a single topic.
///
/// Consuming the stream sequentially gives the broker's per-topic delivery
/// guarantee: a payload is fully handled before the next one is polled.
pub type MessageStream = BoxStream<'static, Vec<u8>>;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new user and issue an access token for them.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` / `EmailAlreadyExists` - identity is taken
    /// * `Database` - storage operation failed
    async fn register(&self, command: RegisterUserCommand) -> Result<String, AuthError>;

    /// Verify credentials and issue an access token.
    ///
    /// Unknown usernames and wrong passwords are indistinguishable to the
    /// caller; both yield `InvalidCredentials`.
    ///
    /// # Errors
    /// * `InvalidCredentials` - no user/password match
    /// * `Database` - storage operation failed
    async fn login(&self, username: &Username, password: &str) -> Result<String, AuthError>;

    /// Answer whether a token is currently valid. Never fails: malformed,
    /// tampered and expired tokens all come back as `false`.
    async fn validate_token(&self, token: &str) -> bool;
}

/// Persistence operations for user records.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Persist a new user.
    ///
    /// Uniqueness of username and email is enforced atomically by the
    /// storage layer, never by a check-then-write in application code.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `EmailAlreadyExists` - Email is already registered
    /// * `Database` - storage operation failed
    async fn create(&self, user: User) -> Result<User, AuthError>;

    /// Retrieve a user by username (None if absent).
    ///
    /// # Errors
    /// * `Database` - storage operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, AuthError>;
}

/// Outbound half of the broker surface.
#[async_trait]
pub trait MessagePublisher: Send + Sync + 'static {
    /// Publish a payload to a topic with at-least-once semantics.
    ///
    /// # Errors
    /// * `PublishFailed` - delivery was not acknowledged after retries
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BrokerError>;
}

/// Inbound half of the broker surface.
#[async_trait]
pub trait MessageSubscriber: Send + Sync + 'static {
    /// Open a message stream for a topic.
    ///
    /// Delivery is at-least-once and in order per topic partition; consumers
    /// must tolerate duplicates.
    ///
    /// # Errors
    /// * `TopicAlreadySubscribed` - this process already consumes the topic
    /// * `ConnectionFailed` / `SubscribeFailed` - broker unavailable
    async fn subscribe(&self, topic: &str) -> Result<MessageStream, BrokerError>;
}
