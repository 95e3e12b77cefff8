use std::{collections::HashMap, sync::Arc};

use anyhow::Context;
use async_trait::async_trait;
use lapin::{
    options::{BasicPublishOptions, ConfirmSelectOptions},
    BasicProperties, ConnectionProperties,
};
use tokio::sync::Mutex;
use tracing::info;

use crate::{BrokerConfig, Channel, Connection, ConnectionProvider};

/// Caches one live connection per broker config.
///
/// A cached connection is only reused while its status reports connected;
/// otherwise the next request reconnects and replaces the entry.
#[derive(Default)]
pub struct AmqpConnectionProvider {
    connections: Mutex<HashMap<BrokerConfig, Arc<AmqpConnection>>>,
}

impl AmqpConnectionProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConnectionProvider for AmqpConnectionProvider {
    async fn get_connection(&self, config: &BrokerConfig) -> anyhow::Result<Arc<dyn Connection>> {
        let mut connections = self.connections.lock().await;
        if let Some(existing) = connections.get(config) {
            if existing.inner.status().connected() {
                return Ok(Arc::clone(existing) as Arc<dyn Connection>);
            }
        }

        let connection =
            lapin::Connection::connect(&config.amqp_uri(), ConnectionProperties::default())
                .await
                .with_context(|| {
                    format!("failed to connect to broker at {}:{}", config.host, config.port)
                })?;
        info!(host = %config.host, port = config.port, "broker connection established");

        let connection = Arc::new(AmqpConnection { inner: connection });
        connections.insert(config.clone(), Arc::clone(&connection));
        Ok(connection)
    }
}

struct AmqpConnection {
    inner: lapin::Connection,
}

#[async_trait]
impl Connection for AmqpConnection {
    async fn create_channel(&self) -> anyhow::Result<Arc<dyn Channel>> {
        let channel = self.inner.create_channel().await?;
        channel
            .confirm_select(ConfirmSelectOptions { nowait: false })
            .await?;
        Ok(Arc::new(AmqpChannel { inner: channel }))
    }
}

struct AmqpChannel {
    inner: lapin::Channel,
}

#[async_trait]
impl Channel for AmqpChannel {
    fn is_open(&self) -> bool {
        self.inner.status().connected()
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: BasicProperties,
        payload: &[u8],
    ) -> anyhow::Result<()> {
        let confirmation = self
            .inner
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions::default(),
                payload,
                properties,
            )
            .await?;

        let confirmation = confirmation.await?;
        anyhow::ensure!(confirmation.is_ack());

        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        // Already gone; nothing to close.
        if !self.inner.status().connected() {
            return Ok(());
        }
        self.inner.close(200, "").await?;
        Ok(())
    }
}
