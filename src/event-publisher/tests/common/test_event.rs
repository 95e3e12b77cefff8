use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct TestEvent {
    pub event_id: Uuid,
    pub payload: String,
}

impl TestEvent {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            payload: payload.into(),
        }
    }
}
