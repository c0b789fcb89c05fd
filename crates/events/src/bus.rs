//! Publish/subscribe contract for ledger notifications.
//!
//! Consumers (audit logs, notification senders, read models) subscribe to a
//! bus; the engine publishes to it after each committed change. Delivery is
//! best-effort and nothing is persisted: the ledger itself is the source of
//! truth.

use std::sync::Arc;
use std::sync::mpsc::{Receiver, RecvError, RecvTimeoutError};
use std::time::Duration;

/// Receiving end of a bus subscription.
///
/// A subscription sees every message published after it was created. It is
/// meant to be owned by a single consumer thread:
///
/// ```ignore
/// let subscription = bus.subscribe();
/// for envelope in subscription.iter() {
///     audit_log.append(envelope);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Next queued message, if any, without blocking.
    pub fn try_next(&self) -> Option<M> {
        self.receiver.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message.
    ///
    /// `Ok(None)` means the timeout elapsed; `Err` means the bus is gone.
    pub fn next_timeout(&self, timeout: Duration) -> Result<Option<M>, RecvError> {
        match self.receiver.recv_timeout(timeout) {
            Ok(message) => Ok(Some(message)),
            Err(RecvTimeoutError::Timeout) => Ok(None),
            Err(RecvTimeoutError::Disconnected) => Err(RecvError),
        }
    }

    /// Blocking iterator that ends when the bus is dropped.
    pub fn iter(&self) -> impl Iterator<Item = M> + '_ {
        self.receiver.iter()
    }

    /// Everything currently queued, without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Message bus shared across threads; several groups may publish at once.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + core::fmt::Display + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
