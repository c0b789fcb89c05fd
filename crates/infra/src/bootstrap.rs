//! Wiring of the in-memory adapters into a ready-to-use engine.

use std::sync::Arc;

use splitledger_engine::{Clock, LedgerEngine, LedgerEvent};
use splitledger_events::{EventEnvelope, InMemoryEventBus};

use crate::config::{ConfigError, EngineConfig};
use crate::directory::InMemoryGroupDirectory;
use crate::token::InMemoryToken;

pub type LedgerBus = InMemoryEventBus<EventEnvelope<LedgerEvent>>;

/// An engine plus handles to the adapters behind it.
///
/// The directory and token are shared with the engine, so groups created or
/// balances minted through these handles are immediately visible to it.
pub struct InMemoryStack<C> {
    pub directory: Arc<InMemoryGroupDirectory>,
    pub token: Arc<InMemoryToken>,
    pub bus: Arc<LedgerBus>,
    pub engine: LedgerEngine<InMemoryGroupDirectory, Arc<InMemoryToken>, C, Arc<LedgerBus>>,
}

/// Build the stack and install the configured tracing subscriber.
///
/// Subscriber installation is process-wide and only the first call wins.
pub fn build_in_memory<C: Clock>(config: &EngineConfig, clock: Arc<C>) -> Result<InMemoryStack<C>, ConfigError> {
    let settings = config.engine_settings()?;
    splitledger_observability::init(&config.log);

    let directory = Arc::new(InMemoryGroupDirectory::new());
    let token = Arc::new(InMemoryToken::new());
    let bus: Arc<LedgerBus> = Arc::new(InMemoryEventBus::new());
    let engine = LedgerEngine::new(directory.clone(), token.clone(), clock, bus.clone(), settings);

    tracing::info!(
        future_date_tolerance_secs = config.future_date_tolerance_secs,
        "in-memory ledger stack ready"
    );

    Ok(InMemoryStack {
        directory,
        token,
        bus,
        engine,
    })
}
