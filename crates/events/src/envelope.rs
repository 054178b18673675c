use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Envelope for a published message, containing delivery metadata.
///
/// Notes:
/// - `aggregate_id` is the SKU of the product aggregate that emitted the payload.
/// - `sequence_number` is monotonically increasing per publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageEnvelope<M> {
    message_id: Uuid,
    aggregate_id: String,

    /// Position of this message in the publisher's output.
    sequence_number: u64,

    payload: M,
}

impl<M> MessageEnvelope<M> {
    pub fn new(
        message_id: Uuid,
        aggregate_id: impl Into<String>,
        sequence_number: u64,
        payload: M,
    ) -> Self {
        Self {
            message_id,
            aggregate_id: aggregate_id.into(),
            sequence_number,
            payload,
        }
    }

    pub fn message_id(&self) -> Uuid {
        self.message_id
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn payload(&self) -> &M {
        &self.payload
    }

    pub fn into_payload(self) -> M {
        self.payload
    }
}
