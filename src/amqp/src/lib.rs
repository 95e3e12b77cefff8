use std::sync::Arc;

use async_trait::async_trait;

mod config;
mod connection;

pub use lapin::BasicProperties;

pub use config::BrokerConfig;
pub use connection::AmqpConnectionProvider;

/// Hands out broker connections, one per [`BrokerConfig`].
///
/// Acquisition may be slow and may fail; a failure must not be cached, so
/// every caller retry reaches the broker again.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    async fn get_connection(&self, config: &BrokerConfig) -> anyhow::Result<Arc<dyn Connection>>;
}

#[async_trait]
pub trait Connection: Send + Sync {
    async fn create_channel(&self) -> anyhow::Result<Arc<dyn Channel>>;
}

/// A lightweight publish handle multiplexed over a [`Connection`].
#[async_trait]
pub trait Channel: Send + Sync {
    fn is_open(&self) -> bool;

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: BasicProperties,
        payload: &[u8],
    ) -> anyhow::Result<()>;

    async fn close(&self) -> anyhow::Result<()>;
}
