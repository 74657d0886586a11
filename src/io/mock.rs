//! In-memory collaborators for driving a relay without MIDI hardware.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::registry::{DeviceHandle, DeviceRegistry, PortKind};
use super::{lock, DiagnosticSink, MessageHandler, MessageSink, MessageSource, Severity};
use crate::{Error, Result};

/// A message source whose messages are pushed by the test with
/// [`emit`](MockSource::emit). Clones share the same subscriber list.
#[derive(Clone, Default)]
pub struct MockSource {
    handlers: Arc<Mutex<Vec<(usize, MessageHandler)>>>,
    next_id: Arc<AtomicUsize>,
    refuse: Arc<AtomicBool>,
}

/// Subscription token handed out by [`MockSource`].
#[derive(Debug, PartialEq, Eq)]
pub struct MockSubscription(usize);

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delivers `data` to every current subscriber, in subscription order.
    pub fn emit(&self, data: &[u8]) {
        for (_, handler) in lock(&self.handlers).iter_mut() {
            handler(data);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        lock(&self.handlers).len()
    }

    /// Makes every later `subscribe` fail, like a port that vanished.
    pub fn refuse_subscriptions(&self) {
        self.refuse.store(true, Ordering::SeqCst);
    }
}

impl MessageSource for MockSource {
    type Subscription = MockSubscription;

    fn subscribe(&mut self, handler: MessageHandler) -> Result<MockSubscription> {
        if self.refuse.load(Ordering::SeqCst) {
            return Err(Error::MidiConnect("source refused the subscription".to_string()));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.handlers).push((id, handler));
        Ok(MockSubscription(id))
    }

    fn unsubscribe(&mut self, subscription: MockSubscription) {
        lock(&self.handlers).retain(|(id, _)| *id != subscription.0);
    }
}

/// Records every sent message; can be switched into a failing mode.
#[derive(Clone, Default)]
pub struct MockSink {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
    fail_next: Arc<AtomicUsize>,
}

impl MockSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `count` sends fail.
    pub fn fail_next(&self, count: usize) {
        self.fail_next.store(count, Ordering::SeqCst);
    }

    pub fn sent(&self) -> Vec<Vec<u8>> {
        lock(&self.sent).clone()
    }
}

impl MessageSink for MockSink {
    fn send(&mut self, message: &[u8]) -> Result<()> {
        let failing = self
            .fail_next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(Error::Send("device unavailable".to_string()));
        }
        lock(&self.sent).push(message.to_vec());
        Ok(())
    }
}

/// Collects diagnostics in memory.
#[derive(Clone, Default)]
pub struct RecordingDiagnostics {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<(Severity, String)> {
        lock(&self.lines).clone()
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.lines).iter().map(|(_, m)| m.clone()).collect()
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&self, severity: Severity, message: &str) {
        lock(&self.lines).push((severity, message.to_string()));
    }
}

/// A registry whose devices are plugged and unplugged by the test.
#[derive(Clone, Default)]
pub struct MockRegistry {
    devices: Arc<Mutex<Vec<DeviceHandle>>>,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plug(&self, device: DeviceHandle) {
        lock(&self.devices).push(device);
    }

    pub fn unplug(&self, kind: PortKind, id: &str) {
        lock(&self.devices).retain(|d| !(d.kind == kind && d.id == id));
    }

    fn of_kind(&self, kind: PortKind) -> Vec<DeviceHandle> {
        lock(&self.devices)
            .iter()
            .filter(|d| d.kind == kind)
            .cloned()
            .collect()
    }
}

impl DeviceRegistry for MockRegistry {
    fn inputs(&self) -> Vec<DeviceHandle> {
        self.of_kind(PortKind::Input)
    }

    fn outputs(&self) -> Vec<DeviceHandle> {
        self.of_kind(PortKind::Output)
    }
}
