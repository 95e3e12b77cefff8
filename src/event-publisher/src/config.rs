use amqp::{BasicProperties, BrokerConfig};

use crate::{encoder::Encoder, error::PublishError};

/// Receives every publish failure for one event type.
///
/// Implemented for any matching `Fn` closure, so a plain closure works at
/// registration sites.
pub trait ErrorHandler<E>: Send + Sync {
    fn on_publish_error(&self, event: &E, error: &PublishError);
}

impl<E, F> ErrorHandler<E> for F
where
    F: Fn(&E, &PublishError) + Send + Sync,
{
    fn on_publish_error(&self, event: &E, error: &PublishError) {
        self(event, error)
    }
}

/// Everything needed to put one event type onto the wire.
///
/// Registered once per event type; shared read-only by all publishes of
/// that type.
pub struct PublisherConfiguration<E> {
    pub(crate) broker_config: BrokerConfig,
    pub(crate) exchange: String,
    pub(crate) routing_key: String,
    properties: BasicProperties,
    pub(crate) encoder: Box<dyn Encoder<E>>,
    pub(crate) error_handler: Box<dyn ErrorHandler<E>>,
}

impl<E> PublisherConfiguration<E> {
    pub fn new(
        broker_config: BrokerConfig,
        exchange: impl Into<String>,
        routing_key: impl Into<String>,
        properties: BasicProperties,
        encoder: impl Encoder<E> + 'static,
        error_handler: impl ErrorHandler<E> + 'static,
    ) -> Self {
        Self {
            broker_config,
            exchange: exchange.into(),
            routing_key: routing_key.into(),
            properties,
            encoder: Box::new(encoder),
            error_handler: Box::new(error_handler),
        }
    }

    /// The property template merged with the encoder's content type.
    pub(crate) fn wire_properties(&self) -> BasicProperties {
        self.properties
            .clone()
            .with_content_type(self.encoder.content_type().into())
    }
}
