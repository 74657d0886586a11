//! The relay between one input and one output device.
//!
//! A [`Relay`] subscribes to its input as soon as it is created and forwards
//! every message to its output, mirroring note-on/note-off events with
//! [`mirror_message`]. It is disconnected at most once and never rebound; a
//! new pairing of devices means a new relay.

use std::borrow::Cow;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::error;

use crate::io::{lock, DiagnosticSink, MessageSink, MessageSource, Severity};
use crate::midi::{format_midi_data, mirror_message, Mirrored};
use crate::{RelayError, Result};

/// What happened to one delivered message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Forwarded,
    /// Mirrored note out of range, nothing was sent.
    Dropped,
    /// The output rejected the message; already reported to diagnostics.
    SendFailed,
}

#[derive(Debug, Clone)]
pub struct RelayOptions {
    /// Log every relayed message. Owned by the caller and read per message,
    /// so it can be flipped while the relay runs.
    pub log_events: Arc<AtomicBool>,
    /// Report notes dropped because their mirror is out of range.
    pub report_drops: bool,
}

impl Default for RelayOptions {
    fn default() -> Self {
        Self {
            log_events: Arc::new(AtomicBool::new(false)),
            report_drops: true,
        }
    }
}

enum Subscription<T> {
    /// Not subscribed yet; only seen while `create` runs.
    Unattached,
    Active(T),
    Released,
}

/// Per-message state, shared with the input callback.
struct Forwarder<K, D> {
    output: K,
    diagnostics: D,
    options: RelayOptions,
    attached: bool,
}

impl<K: MessageSink, D: DiagnosticSink> Forwarder<K, D> {
    fn on_message(&mut self, data: &[u8]) -> std::result::Result<Outcome, RelayError> {
        if !self.attached {
            return Err(RelayError::Disconnected);
        }
        let log_events = self.options.log_events.load(Ordering::Relaxed);

        let out = match mirror_message(data) {
            Mirrored::Dropped { note } => {
                if self.options.report_drops {
                    self.diagnostics.report(
                        Severity::Warning,
                        &format!(
                            "ignoring event {} since the mirrored note {} is out of range",
                            format_midi_data(data),
                            note
                        ),
                    );
                }
                return Ok(Outcome::Dropped);
            }
            Mirrored::Transformed(out) => {
                if log_events {
                    self.diagnostics.report(
                        Severity::Info,
                        &format!(
                            "MIDI event: {} → {}",
                            format_midi_data(data),
                            format_midi_data(&out)
                        ),
                    );
                }
                Cow::Owned(out)
            }
            Mirrored::Unchanged => {
                if log_events {
                    self.diagnostics
                        .report(Severity::Info, &format!("MIDI event: {}", format_midi_data(data)));
                }
                Cow::Borrowed(data)
            }
        };

        match self.output.send(&out) {
            Ok(()) => Ok(Outcome::Forwarded),
            Err(err) => {
                self.diagnostics.report(
                    Severity::Error,
                    &format!("ERROR: sending MIDI to the output failed, {}", err),
                );
                Ok(Outcome::SendFailed)
            }
        }
    }
}

pub struct Relay<S: MessageSource, K, D> {
    input: S,
    subscription: Subscription<S::Subscription>,
    forwarder: Arc<Mutex<Forwarder<K, D>>>,
}

impl<S, K, D> Relay<S, K, D>
where
    S: MessageSource,
    K: MessageSink + 'static,
    D: DiagnosticSink + 'static,
{
    /// Subscribes to `input` and starts forwarding to `output` immediately.
    pub fn create(input: S, output: K, diagnostics: D, options: RelayOptions) -> Result<Self> {
        let forwarder = Arc::new(Mutex::new(Forwarder {
            output,
            diagnostics,
            options,
            attached: true,
        }));

        let shared = Arc::clone(&forwarder);
        let mut relay = Self {
            input,
            subscription: Subscription::Unattached,
            forwarder,
        };
        let token = relay.input.subscribe(Box::new(move |data| {
            if let Err(err) = lock(&shared).on_message(data) {
                error!(%err, event = %format_midi_data(data), "relay received a message after disconnect");
            }
        }))?;
        relay.subscription = Subscription::Active(token);
        Ok(relay)
    }

    /// Processes one message as if it came from the input.
    ///
    /// Fails with [`RelayError::Disconnected`] once the relay is
    /// disconnected.
    pub fn deliver(&self, data: &[u8]) -> std::result::Result<Outcome, RelayError> {
        lock(&self.forwarder).on_message(data)
    }
}

impl<S: MessageSource, K, D> Relay<S, K, D> {
    /// Unsubscribes from the input. No message reaches the output after
    /// this returns. A relay can only be disconnected once.
    pub fn disconnect(&mut self) -> std::result::Result<(), RelayError> {
        match std::mem::replace(&mut self.subscription, Subscription::Released) {
            Subscription::Active(token) => {
                self.input.unsubscribe(token);
                lock(&self.forwarder).attached = false;
                Ok(())
            }
            Subscription::Unattached => {
                self.subscription = Subscription::Unattached;
                Err(RelayError::NotAttached)
            }
            Subscription::Released => Err(RelayError::AlreadyDisconnected),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.subscription, Subscription::Active(_))
    }
}

impl<S: MessageSource, K, D> Drop for Relay<S, K, D> {
    fn drop(&mut self) {
        if self.is_connected() {
            let _ = self.disconnect();
        }
    }
}
