use std::sync::atomic::{AtomicU64, Ordering};

use splitledger_events::{EventBus, EventEnvelope};

use crate::events::LedgerEvent;

/// Wraps ledger events in envelopes and hands them to a bus.
///
/// Publishing happens after commit and is best-effort: a bus failure is
/// logged and swallowed because the ledger change already happened.
#[derive(Debug)]
pub struct EventPublisher<B> {
    bus: B,
    sequence: AtomicU64,
}

impl<B> EventPublisher<B>
where
    B: EventBus<EventEnvelope<LedgerEvent>>,
{
    pub fn new(bus: B) -> Self {
        Self {
            bus,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn publish(&self, event: LedgerEvent) {
        let sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        let envelope = EventEnvelope::wrap(sequence, event);
        let event_type = envelope.event_type().to_string();

        if let Err(err) = self.bus.publish(envelope) {
            tracing::warn!(event_type = %event_type, sequence, error = %err, "failed to publish ledger event");
        }
    }
}
