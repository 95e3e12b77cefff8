pub mod mock_broker;
pub mod test_event;

use amqp::BrokerConfig;
use event_publisher::Encoder;

pub const MOCK_EXCHANGE: &str = "mock-exchange";
pub const MOCK_ROUTING_KEY: &str = "mock-rk";

pub fn broker_config() -> BrokerConfig {
    BrokerConfig {
        host: "localhost".into(),
        port: 5672,
        vhost: String::new(),
        username: "guest".into(),
        password: "guest".into(),
    }
}

/// Encoder that rejects every event.
pub struct FailingEncoder;

impl<E> Encoder<E> for FailingEncoder {
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, _event: &E) -> anyhow::Result<Vec<u8>> {
        anyhow::bail!("unencodable event")
    }
}
