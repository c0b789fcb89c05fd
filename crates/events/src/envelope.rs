use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use splitledger_core::GroupId;

use crate::event::Event;

/// Envelope for a published event.
///
/// Notes:
/// - Every event is scoped to exactly one group.
/// - `sequence_number` increases monotonically per publisher.
/// - `payload` is the typed event; [`EventEnvelope::to_json`] erases it for
///   transports that only carry JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope<E> {
    event_id: Uuid,
    group_id: GroupId,
    event_type: String,
    event_version: u32,

    /// Monotonically increasing position in the publisher's output.
    sequence_number: u64,

    /// Business time of the change, copied from the event.
    occurred_at: DateTime<Utc>,

    payload: E,
}

impl<E> EventEnvelope<E> {
    pub fn new(
        event_id: Uuid,
        group_id: GroupId,
        event_type: impl Into<String>,
        event_version: u32,
        sequence_number: u64,
        occurred_at: DateTime<Utc>,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            group_id,
            event_type: event_type.into(),
            event_version,
            sequence_number,
            occurred_at,
            payload,
        }
    }

    pub fn event_id(&self) -> Uuid {
        self.event_id
    }

    pub fn group_id(&self) -> &GroupId {
        &self.group_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> u32 {
        self.event_version
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &E {
        &self.payload
    }

    pub fn into_payload(self) -> E {
        self.payload
    }
}

impl<E: Event> EventEnvelope<E> {
    /// Wrap `payload`, taking group, type, version and business time from the
    /// event itself.
    ///
    /// Uses a UUIDv7 (time-ordered) event id.
    pub fn wrap(sequence_number: u64, payload: E) -> Self {
        Self::new(
            Uuid::now_v7(),
            payload.group_id().clone(),
            payload.event_type(),
            payload.version(),
            sequence_number,
            payload.occurred_at(),
            payload,
        )
    }
}

impl<E: Serialize> EventEnvelope<E> {
    /// Same envelope with the payload serialized to JSON.
    pub fn to_json(&self) -> Result<EventEnvelope<JsonValue>, serde_json::Error> {
        Ok(EventEnvelope {
            event_id: self.event_id,
            group_id: self.group_id.clone(),
            event_type: self.event_type.clone(),
            event_version: self.event_version,
            sequence_number: self.sequence_number,
            occurred_at: self.occurred_at,
            payload: serde_json::to_value(&self.payload)?,
        })
    }
}
