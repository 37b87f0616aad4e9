use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use serde::Deserialize;
use serde::Serialize;

use crate::domain::auth::ports::AuthServicePort;
use crate::domain::auth::ports::MessagePublisher;
use crate::domain::auth::ports::MessageSubscriber;

/// Topic carrying raw token strings to validate. Part of the wire contract
/// with other services; never derived from configuration.
pub const VALIDATION_REQUEST_TOPIC: &str = "validate-token-request";

/// Topic carrying validation verdicts back to requesters.
pub const VALIDATION_RESPONSE_TOPIC: &str = "validate-token-response";

const INITIAL_SUBSCRIBE_BACKOFF: Duration = Duration::from_millis(500);
const MAX_SUBSCRIBE_BACKOFF: Duration = Duration::from_secs(30);

/// Verdict published on the response topic.
///
/// The token is echoed back as the only correlation key the protocol has:
/// requesters must treat duplicate responses for the same token as
/// idempotent, because nothing else disambiguates them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResponse {
    pub token: String,
    #[serde(rename = "isValid")]
    pub is_valid: bool,
}

/// Long-lived subscriber answering token-validation requests from other
/// services.
///
/// Request payloads are the raw token bytes (not JSON). Each request is
/// handled to completion before the next one is polled; a failed publish is
/// logged and the loop moves on, since there is no acknowledgment path back
/// to the requester. Runs until the process shuts down.
pub struct ValidationResponder<S, Sub, Pub>
where
    S: AuthServicePort,
    Sub: MessageSubscriber,
    Pub: MessagePublisher,
{
    auth_service: Arc<S>,
    subscriber: Arc<Sub>,
    publisher: Arc<Pub>,
}

impl<S, Sub, Pub> ValidationResponder<S, Sub, Pub>
where
    S: AuthServicePort,
    Sub: MessageSubscriber,
    Pub: MessagePublisher,
{
    pub fn new(auth_service: Arc<S>, subscriber: Arc<Sub>, publisher: Arc<Pub>) -> Self {
        Self {
            auth_service,
            subscriber,
            publisher,
        }
    }

    /// Consume validation requests until process shutdown.
    ///
    /// Spawn this on its own task: it must never block the synchronous
    /// register/login path. Broker unavailability is retried with capped
    /// exponential backoff instead of crashing the process.
    pub async fn run(self) {
        let mut backoff = INITIAL_SUBSCRIBE_BACKOFF;

        loop {
            let mut requests = match self.subscriber.subscribe(VALIDATION_REQUEST_TOPIC).await {
                Ok(stream) => {
                    backoff = INITIAL_SUBSCRIBE_BACKOFF;
                    stream
                }
                Err(e) => {
                    tracing::error!(
                        error = %e,
                        retry_in_ms = backoff.as_millis() as u64,
                        "Failed to subscribe to validation requests"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(MAX_SUBSCRIBE_BACKOFF);
                    continue;
                }
            };

            tracing::info!(
                topic = VALIDATION_REQUEST_TOPIC,
                "Listening for token validation requests"
            );

            while let Some(payload) = requests.next().await {
                self.respond(payload).await;
            }

            tracing::warn!("Validation request stream ended, resubscribing");
        }
    }

    async fn respond(&self, payload: Vec<u8>) {
        let token = match String::from_utf8(payload) {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding non-UTF-8 validation request");
                return;
            }
        };

        tracing::debug!("Received token validation request");

        let is_valid = self.auth_service.validate_token(&token).await;
        let response = ValidationResponse { token, is_valid };

        let body = match serde_json::to_vec(&response) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize validation response");
                return;
            }
        };

        // A lost response is not retried here; the requester owns its own
        // timeout/retry, so we log and keep consuming.
        match self.publisher.publish(VALIDATION_RESPONSE_TOPIC, &body).await {
            Ok(()) => {
                tracing::debug!(is_valid, "Token validation result sent");
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to publish validation response");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_response_uses_wire_field_names() {
        let response = ValidationResponse {
            token: "abc".to_string(),
            is_valid: true,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["token"], "abc");
        assert_eq!(json["isValid"], true);

        let round_tripped: ValidationResponse =
            serde_json::from_value(json).unwrap();
        assert_eq!(round_tripped, response);
    }
}
