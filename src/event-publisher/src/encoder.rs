use serde::Serialize;

/// Converts a typed event into a wire payload.
///
/// One encoder instance is bound per event type and shared across
/// publishes, so implementations must be stateless.
pub trait Encoder<E>: Send + Sync {
    fn content_type(&self) -> &str;

    fn encode(&self, event: &E) -> anyhow::Result<Vec<u8>>;
}

pub struct JsonEncoder<E> {
    event: std::marker::PhantomData<E>,
}

impl<E> JsonEncoder<E> {
    pub fn new() -> Self {
        Self {
            event: std::marker::PhantomData,
        }
    }
}

impl<E> Default for JsonEncoder<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Encoder<E> for JsonEncoder<E>
where
    E: Serialize + Send + Sync,
{
    fn content_type(&self) -> &str {
        "application/json"
    }

    fn encode(&self, event: &E) -> anyhow::Result<Vec<u8>> {
        Ok(serde_json::to_vec(event)?)
    }
}
