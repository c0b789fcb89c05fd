//! Ledger notifications: event trait, envelopes, and a pub/sub bus.
//!
//! The ledger stores state, not history. Events are notifications published
//! after a state change has been committed; they are never replayed to rebuild
//! ledger state.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, Subscription};
pub use envelope::EventEnvelope;
pub use event::Event;
pub use in_memory_bus::{InMemoryBusError, InMemoryEventBus};
