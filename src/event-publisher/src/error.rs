use thiserror::Error;

/// The stage at which a publish attempt failed, wrapping the cause.
///
/// Never surfaced to the caller of
/// [`EventPublisher::publish_event`](crate::EventPublisher::publish_event);
/// delivered to the configured error handler together with the failing
/// event.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("failed to establish broker connection")]
    Connection(anyhow::Error),

    #[error("failed to open channel")]
    Channel(anyhow::Error),

    #[error("failed to encode event")]
    Encode(anyhow::Error),

    #[error("broker refused publish")]
    Publish(anyhow::Error),
}

impl PublishError {
    /// The underlying cause of the failed stage.
    pub fn cause(&self) -> &anyhow::Error {
        match self {
            Self::Connection(cause)
            | Self::Channel(cause)
            | Self::Encode(cause)
            | Self::Publish(cause) => cause,
        }
    }
}
