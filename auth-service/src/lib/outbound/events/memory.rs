use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::PoisonError;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;

use crate::domain::auth::errors::BrokerError;
use crate::domain::auth::ports::MessagePublisher;
use crate::domain::auth::ports::MessageStream;
use crate::domain::auth::ports::MessageSubscriber;

const CHANNEL_CAPACITY: usize = 64;

/// In-process broker over tokio broadcast channels.
///
/// Backs the integration tests and infrastructure-free development. Like a
/// real topic, a publish reaches every live subscriber; unlike one, messages
/// published before any subscription exists are dropped rather than retained.
pub struct InMemoryBroker {
    topics: Mutex<HashMap<String, broadcast::Sender<Vec<u8>>>>,
}

impl InMemoryBroker {
    pub fn new() -> Self {
        Self {
            topics: Mutex::new(HashMap::new()),
        }
    }

    fn sender(&self, topic: &str) -> broadcast::Sender<Vec<u8>> {
        let mut topics = self.topics.lock().unwrap_or_else(PoisonError::into_inner);
        topics
            .entry(topic.to_string())
            .or_insert_with(|| broadcast::channel(CHANNEL_CAPACITY).0)
            .clone()
    }
}

impl Default for InMemoryBroker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MessagePublisher for InMemoryBroker {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        // A publish with no live subscriber is not an error; the message is
        // simply not delivered to anyone.
        let _ = self.sender(topic).send(payload.to_vec());
        Ok(())
    }
}

#[async_trait]
impl MessageSubscriber for InMemoryBroker {
    async fn subscribe(&self, topic: &str) -> Result<MessageStream, BrokerError> {
        let receiver = self.sender(topic).subscribe();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(payload) => return Some((payload, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "In-memory subscriber lagged, messages dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        })
        .boxed();

        Ok(stream)
    }
}
