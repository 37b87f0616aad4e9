use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::OnceLock;
use std::sync::PoisonError;
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use rdkafka::consumer::Consumer;
use rdkafka::consumer::StreamConsumer;
use rdkafka::ClientConfig;
use rdkafka::Message;

use crate::config::Config;
use crate::domain::auth::errors::BrokerError;
use crate::domain::auth::ports::MessageStream;
use crate::domain::auth::ports::MessageSubscriber;

static ACTIVE_TOPICS: OnceLock<Mutex<HashSet<String>>> = OnceLock::new();

fn active_topics() -> &'static Mutex<HashSet<String>> {
    ACTIVE_TOPICS.get_or_init(|| Mutex::new(HashSet::new()))
}

/// Marks a topic as consumed by this process. Released on drop, so a
/// subscription can be replaced after its stream is torn down.
///
/// A second consumer group member for the same topic in one process would
/// silently double every response, hence the hard per-process limit.
struct TopicClaim {
    topic: String,
}

impl TopicClaim {
    fn acquire(topic: &str) -> Result<Self, BrokerError> {
        let mut active = active_topics().lock().unwrap_or_else(PoisonError::into_inner);

        if !active.insert(topic.to_string()) {
            return Err(BrokerError::TopicAlreadySubscribed(topic.to_string()));
        }

        Ok(Self {
            topic: topic.to_string(),
        })
    }
}

impl Drop for TopicClaim {
    fn drop(&mut self) {
        let mut active = active_topics().lock().unwrap_or_else(PoisonError::into_inner);
        active.remove(&self.topic);
    }
}

/// Kafka-backed subscriber.
///
/// Each `subscribe` opens a stream consumer for one topic under the
/// process-wide consumer group. The returned stream never yields an error:
/// transport failures are logged and retried after a short pause so one bad
/// poll cannot terminate the consumption loop.
pub struct KafkaMessageSubscriber {
    brokers: String,
    group_id: String,
}

impl KafkaMessageSubscriber {
    pub fn new(config: &Config) -> Self {
        Self {
            brokers: config.kafka.brokers.clone(),
            group_id: config.kafka.group_id.clone(),
        }
    }
}

#[async_trait]
impl MessageSubscriber for KafkaMessageSubscriber {
    async fn subscribe(&self, topic: &str) -> Result<MessageStream, BrokerError> {
        let claim = TopicClaim::acquire(topic)?;

        tracing::info!(
            brokers = %self.brokers,
            group_id = %self.group_id,
            topic,
            "Initializing Kafka consumer"
        );

        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", &self.brokers)
            .set("group.id", &self.group_id)
            .set("enable.auto.commit", "true")
            .set("auto.commit.interval.ms", "5000")
            .set("auto.offset.reset", "earliest")
            .set("session.timeout.ms", "30000")
            .set("enable.partition.eof", "false")
            .create()
            .map_err(|e| BrokerError::ConnectionFailed(e.to_string()))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| BrokerError::SubscribeFailed(e.to_string()))?;

        let stream = futures::stream::unfold((consumer, claim), |(consumer, claim)| async move {
            loop {
                let payload = {
                    match consumer.recv().await {
                        Ok(message) => Some(message.payload().map(<[u8]>::to_vec).unwrap_or_default()),
                        Err(e) => {
                            tracing::error!(error = %e, "Kafka consumer error");
                            None
                        }
                    }
                };

                match payload {
                    Some(payload) => return Some((payload, (consumer, claim))),
                    // Short pause so a broken broker connection does not spin
                    // a tight error loop.
                    None => tokio::time::sleep(Duration::from_millis(100)).await,
                }
            }
        })
        .boxed();

        Ok(stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_claim_rejects_second_subscription() {
        let first = TopicClaim::acquire("claim-test-duplicate").unwrap();

        let second = TopicClaim::acquire("claim-test-duplicate");
        assert!(matches!(
            second,
            Err(BrokerError::TopicAlreadySubscribed(_))
        ));

        drop(first);
    }

    #[test]
    fn topic_claim_is_released_on_drop() {
        let claim = TopicClaim::acquire("claim-test-release").unwrap();
        drop(claim);

        // Reacquiring after drop must succeed.
        let claim = TopicClaim::acquire("claim-test-release").unwrap();
        drop(claim);
    }

    #[test]
    fn topic_claims_are_independent_per_topic() {
        let first = TopicClaim::acquire("claim-test-a").unwrap();
        let second = TopicClaim::acquire("claim-test-b").unwrap();
        drop(first);
        drop(second);
    }
}
