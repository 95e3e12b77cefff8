pub mod config;
pub mod encoder;
pub mod error;
pub mod publisher;

pub use config::{ErrorHandler, PublisherConfiguration};
pub use encoder::{Encoder, JsonEncoder};
pub use error::PublishError;
pub use publisher::EventPublisher;
