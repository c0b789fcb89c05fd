//! Infrastructure layer: in-memory adapters, configuration and wiring.
//!
//! Everything here implements the engine's ports for single-process use and
//! tests. Durable or networked backends plug in through the same traits.

pub mod bootstrap;
pub mod clock;
pub mod config;
pub mod directory;
pub mod token;

mod integration_tests;

pub use bootstrap::{InMemoryStack, LedgerBus, build_in_memory};
pub use clock::{FixedClock, SystemClock};
pub use config::{ConfigError, EngineConfig};
pub use directory::{Group, InMemoryGroupDirectory};
pub use token::InMemoryToken;
