use std::time::Duration;

use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use rdkafka::producer::FutureRecord;
use rdkafka::util::Timeout;

use crate::config::Config;
use crate::domain::auth::errors::BrokerError;
use crate::domain::auth::ports::MessagePublisher;

/// Kafka-backed publisher with at-least-once delivery semantics.
///
/// The underlying producer is created once at startup and reused for every
/// publish; librdkafka keeps the connection alive and reconnects with its own
/// bounded retry/backoff, so a transport hiccup does not fail every
/// subsequent call.
///
/// # Notes:
/// - `acks=all`: Wait for all in-sync replicas to acknowledge
/// - `enable.idempotence=true`: Prevents duplicate messages during retries
/// - `retries=10` + `retry.backoff.ms=100`: bounded retry with backoff
pub struct KafkaMessagePublisher {
    producer: FutureProducer,
    timeout: Duration,
}

impl KafkaMessagePublisher {
    pub fn new(config: &Config) -> Result<Self, anyhow::Error> {
        tracing::info!(
            brokers = %config.kafka.brokers,
            "Initializing Kafka producer"
        );

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.kafka.brokers)
            .set("message.timeout.ms", "30000")
            .set("queue.buffering.max.messages", "10000")
            .set("compression.type", "gzip")
            .set("enable.idempotence", "true")
            .set("acks", "all")
            .set("retries", "10")
            .set("max.in.flight.requests.per.connection", "5")
            .set("retry.backoff.ms", "100")
            .create()?;

        Ok(Self {
            producer,
            timeout: Duration::from_secs(30),
        })
    }
}

#[async_trait]
impl MessagePublisher for KafkaMessagePublisher {
    async fn publish(&self, topic: &str, payload: &[u8]) -> Result<(), BrokerError> {
        let record = FutureRecord::<(), _>::to(topic).payload(payload);

        self.producer
            .send(record, Timeout::After(self.timeout))
            .await
            .map(|_| {
                tracing::debug!(topic, "Message published");
            })
            .map_err(|(err, _)| {
                tracing::error!(topic, error = %err, "Failed to publish after retries");
                BrokerError::PublishFailed(err.to_string())
            })
    }
}
