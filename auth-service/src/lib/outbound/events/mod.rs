pub mod consumer;
pub mod memory;
pub mod producer;

pub use consumer::KafkaMessageSubscriber;
pub use memory::InMemoryBroker;
pub use producer::KafkaMessagePublisher;
