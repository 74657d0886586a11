//! Collaborators of the relay: where messages come from, where they go and
//! where diagnostics end up.
//!
//! Each seam is a small trait with a midir (or console) implementation for
//! the binary and an in-memory one in [`mock`] for tests.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::Result;

pub mod diagnostics;
pub mod input;
pub mod mock;
pub mod output;
pub mod registry;

pub use diagnostics::{ConsoleDiagnostics, DiagnosticSink, Severity, TracingDiagnostics};
pub use input::MidiInputSource;
pub use registry::{DeviceEvent, DeviceHandle, DeviceRegistry, DeviceState, DeviceWatcher, MidirRegistry, PortKind};

/// Callback invoked once per incoming message, in delivery order.
pub type MessageHandler = Box<dyn FnMut(&[u8]) + Send + 'static>;

/// A stream of raw MIDI messages bound to one input device.
pub trait MessageSource {
    /// Proof of an active subscription; handing it back to
    /// [`unsubscribe`](MessageSource::unsubscribe) ends delivery.
    type Subscription;

    fn subscribe(&mut self, handler: MessageHandler) -> Result<Self::Subscription>;

    /// Must not return before delivery to the handler has stopped.
    fn unsubscribe(&mut self, subscription: Self::Subscription);
}

/// A synchronous, fallible send to one output device.
pub trait MessageSink: Send {
    fn send(&mut self, message: &[u8]) -> Result<()>;
}

impl<S: MessageSink> MessageSink for Arc<Mutex<S>> {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        lock(self).send(message)
    }
}

impl MessageSink for midir::MidiOutputConnection {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        midir::MidiOutputConnection::send(self, message)?;
        Ok(())
    }
}

/// Locks a mutex, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
