use std::{
    any::{Any, TypeId},
    collections::HashMap,
    sync::Arc,
};

use amqp::{Channel, ConnectionProvider};
use tokio::sync::{Mutex, RwLock};
use tracing::warn;

use crate::{config::PublisherConfiguration, error::PublishError};

/// Publishing facade over a broker client.
///
/// Callers register a [`PublisherConfiguration`] per event type, then hand
/// event values to [`publish_event`](Self::publish_event). Publish
/// failures go to the configuration's error handler, never to the caller,
/// and [`clean_up`](Self::clean_up) closes every channel opened along the
/// way.
pub struct EventPublisher {
    connection_provider: Arc<dyn ConnectionProvider>,
    registry: RwLock<HashMap<TypeId, RegisteredEvent>>,
}

struct RegisteredEvent {
    configuration: Box<dyn Any + Send + Sync>,
    channels: Mutex<ChannelState>,
}

/// `active` is the channel the next publish tries to reuse. `opened` logs
/// every channel ever created for this configuration, including ones
/// discarded after failed publishes; cleanup closes them all.
#[derive(Default)]
struct ChannelState {
    active: Option<Arc<dyn Channel>>,
    opened: Vec<Arc<dyn Channel>>,
}

impl EventPublisher {
    pub fn new(connection_provider: Arc<dyn ConnectionProvider>) -> Self {
        Self {
            connection_provider,
            registry: RwLock::new(HashMap::new()),
        }
    }

    /// Registers the publish configuration for event type `E`.
    ///
    /// A repeated registration replaces the previous one. Channels opened
    /// under the replaced configuration stay tracked until
    /// [`clean_up`](Self::clean_up); the active slot is reset so the next
    /// publish opens a channel under the new configuration.
    pub async fn add_event<E: Any + Send + Sync>(&self, configuration: PublisherConfiguration<E>) {
        let mut registry = self.registry.write().await;
        match registry.get_mut(&TypeId::of::<E>()) {
            Some(entry) => {
                entry.configuration = Box::new(configuration);
                entry.channels.get_mut().active = None;
            }
            None => {
                registry.insert(
                    TypeId::of::<E>(),
                    RegisteredEvent {
                        configuration: Box::new(configuration),
                        channels: Mutex::new(ChannelState::default()),
                    },
                );
            }
        }
    }

    /// Publishes `event` according to its registered configuration.
    ///
    /// Events of an unregistered type are dropped silently. Failures are
    /// delivered to the configuration's error handler; the publisher stays
    /// usable afterwards.
    pub async fn publish_event<E: Any + Send + Sync>(&self, event: &E) {
        let registry = self.registry.read().await;
        let Some(entry) = registry.get(&TypeId::of::<E>()) else {
            return;
        };
        let Some(configuration) = entry
            .configuration
            .downcast_ref::<PublisherConfiguration<E>>()
        else {
            return;
        };

        if let Err(error) = self.try_publish(entry, configuration, event).await {
            configuration.error_handler.on_publish_error(event, &error);
        }
    }

    async fn try_publish<E>(
        &self,
        entry: &RegisteredEvent,
        configuration: &PublisherConfiguration<E>,
        event: &E,
    ) -> Result<(), PublishError> {
        let connection = self
            .connection_provider
            .get_connection(&configuration.broker_config)
            .await
            .map_err(PublishError::Connection)?;

        let channel = {
            let mut channels = entry.channels.lock().await;
            match channels.active.as_ref().filter(|c| c.is_open()) {
                Some(channel) => Arc::clone(channel),
                None => {
                    let channel = connection
                        .create_channel()
                        .await
                        .map_err(PublishError::Channel)?;
                    channels.active = Some(Arc::clone(&channel));
                    channels.opened.push(Arc::clone(&channel));
                    channel
                }
            }
        };

        let payload = configuration
            .encoder
            .encode(event)
            .map_err(PublishError::Encode)?;

        let published = channel
            .publish(
                &configuration.exchange,
                &configuration.routing_key,
                configuration.wire_properties(),
                &payload,
            )
            .await;

        if let Err(cause) = published {
            // The channel is presumed unusable; keep it only for cleanup.
            let mut channels = entry.channels.lock().await;
            if let Some(active) = &channels.active {
                if Arc::ptr_eq(active, &channel) {
                    channels.active = None;
                }
            }
            return Err(PublishError::Publish(cause));
        }

        Ok(())
    }

    /// Closes every channel this publisher has opened, across all
    /// registered event types.
    ///
    /// Close attempts are independent; a failure is logged and does not
    /// stop the sweep. Channels already drained by an earlier call are not
    /// closed again.
    pub async fn clean_up(&self) {
        let mut registry = self.registry.write().await;
        for entry in registry.values_mut() {
            let channels = entry.channels.get_mut();
            channels.active = None;
            for channel in channels.opened.drain(..) {
                if let Err(error) = channel.close().await {
                    warn!(%error, "failed to close channel during cleanup");
                }
            }
        }
    }
}
