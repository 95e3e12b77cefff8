use std::sync::{
    atomic::{AtomicBool, AtomicU32, Ordering},
    Arc, Mutex,
};

use amqp::{BasicProperties, BrokerConfig, Channel, Connection, ConnectionProvider};
use async_trait::async_trait;

/// Provider returning one shared in-memory connection, with a switchable
/// failure mode and a request counter.
pub struct MockConnectionProvider {
    pub connection: Arc<MockConnection>,
    pub requests: AtomicU32,
    pub fail: AtomicBool,
}

impl MockConnectionProvider {
    pub fn new(connection: Arc<MockConnection>) -> Self {
        Self {
            connection,
            requests: AtomicU32::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl ConnectionProvider for MockConnectionProvider {
    async fn get_connection(&self, _config: &BrokerConfig) -> anyhow::Result<Arc<dyn Connection>> {
        self.requests.fetch_add(1, Ordering::Relaxed);
        if self.fail.load(Ordering::Relaxed) {
            anyhow::bail!("broker unreachable");
        }
        Ok(Arc::clone(&self.connection) as Arc<dyn Connection>)
    }
}

/// Hands out [`MockChannel`]s and remembers every one it created.
#[derive(Default)]
pub struct MockConnection {
    pub channels: Mutex<Vec<Arc<MockChannel>>>,
    pub publish_fails: AtomicBool,
}

impl MockConnection {
    pub fn channel(&self, index: usize) -> Arc<MockChannel> {
        Arc::clone(&self.channels.lock().unwrap()[index])
    }

    pub fn channel_count(&self) -> usize {
        self.channels.lock().unwrap().len()
    }

    pub fn total_closes(&self) -> u32 {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .map(|c| c.closes.load(Ordering::Relaxed))
            .sum()
    }

    /// Everything published so far, across all channels, in order.
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.channels
            .lock()
            .unwrap()
            .iter()
            .flat_map(|c| c.published.lock().unwrap().clone())
            .collect()
    }
}

#[async_trait]
impl Connection for MockConnection {
    async fn create_channel(&self) -> anyhow::Result<Arc<dyn Channel>> {
        let channel = Arc::new(MockChannel {
            publish_fails: self.publish_fails.load(Ordering::Relaxed),
            ..MockChannel::default()
        });
        self.channels.lock().unwrap().push(Arc::clone(&channel));
        Ok(channel)
    }
}

pub struct MockChannel {
    pub open: AtomicBool,
    pub closes: AtomicU32,
    pub close_fails: AtomicBool,
    pub publish_fails: bool,
    pub published: Mutex<Vec<PublishedMessage>>,
}

impl Default for MockChannel {
    fn default() -> Self {
        Self {
            open: AtomicBool::new(true),
            closes: AtomicU32::new(0),
            close_fails: AtomicBool::new(false),
            publish_fails: false,
            published: Mutex::new(Vec::new()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub exchange: String,
    pub routing_key: String,
    pub content_type: Option<String>,
    pub payload: Vec<u8>,
}

#[async_trait]
impl Channel for MockChannel {
    fn is_open(&self) -> bool {
        self.open.load(Ordering::Relaxed)
    }

    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        properties: BasicProperties,
        payload: &[u8],
    ) -> anyhow::Result<()> {
        if self.publish_fails {
            anyhow::bail!("simulated broker failure");
        }
        self.published.lock().unwrap().push(PublishedMessage {
            exchange: exchange.to_string(),
            routing_key: routing_key.to_string(),
            content_type: properties
                .content_type()
                .as_ref()
                .map(|ct| ct.as_str().to_string()),
            payload: payload.to_vec(),
        });
        Ok(())
    }

    async fn close(&self) -> anyhow::Result<()> {
        self.closes.fetch_add(1, Ordering::Relaxed);
        if self.close_fails.load(Ordering::Relaxed) {
            anyhow::bail!("close failed");
        }
        self.open.store(false, Ordering::Relaxed);
        Ok(())
    }
}
