//! Keeps one relay alive between the chosen input and output ports across
//! device unplug/replug.

use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

use midir::MidiOutputConnection;
use tracing::{debug, error, info};

use super::relay::{Relay, RelayOptions};
use crate::io::{output, DeviceEvent, DiagnosticSink, MessageSink, MessageSource, MidiInputSource, PortKind, Severity};
use crate::midi::{format_midi_data, local_control_message};
use crate::Result;

/// Opens the devices a session relays between.
pub trait PortOpener {
    type Source: MessageSource;
    type Sink: MessageSink + 'static;

    fn open_input(&self, name: &str) -> Result<Self::Source>;
    fn open_output(&self, name: &str) -> Result<Self::Sink>;
}

pub struct MidirOpener;

impl PortOpener for MidirOpener {
    type Source = MidiInputSource;
    type Sink = MidiOutputConnection;

    fn open_input(&self, name: &str) -> Result<MidiInputSource> {
        MidiInputSource::open(name)
    }

    fn open_output(&self, name: &str) -> Result<MidiOutputConnection> {
        output::open_output(name)
    }
}

/// Relay state change caused by a device event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayChange {
    Stopped,
    Restarted,
}

type SharedSink<O> = Arc<Mutex<<O as PortOpener>::Sink>>;

pub struct Session<O: PortOpener, D> {
    opener: O,
    input_name: String,
    output_name: String,
    diagnostics: D,
    options: RelayOptions,
    output: Option<SharedSink<O>>,
    relay: Option<Relay<O::Source, SharedSink<O>, D>>,
}

impl<O, D> Session<O, D>
where
    O: PortOpener,
    D: DiagnosticSink + Clone + 'static,
{
    pub fn new(opener: O, input_name: &str, output_name: &str, diagnostics: D, options: RelayOptions) -> Self {
        Self {
            opener,
            input_name: input_name.to_string(),
            output_name: output_name.to_string(),
            diagnostics,
            options,
            output: None,
            relay: None,
        }
    }

    pub fn input_name(&self) -> &str {
        &self.input_name
    }

    pub fn output_name(&self) -> &str {
        &self.output_name
    }

    pub fn is_relaying(&self) -> bool {
        self.relay.is_some()
    }

    /// Opens both ports and creates a fresh relay between them.
    pub fn connect(&mut self) -> Result<()> {
        self.stop();
        let output = Arc::new(Mutex::new(self.opener.open_output(&self.output_name)?));
        let input = self.opener.open_input(&self.input_name)?;
        let relay = Relay::create(
            input,
            Arc::clone(&output),
            self.diagnostics.clone(),
            self.options.clone(),
        )?;
        info!(input = %self.input_name, output = %self.output_name, "relay created");
        self.output = Some(output);
        self.relay = Some(relay);
        Ok(())
    }

    /// Disconnects and drops the relay, then releases the output.
    pub fn stop(&mut self) {
        if let Some(mut relay) = self.relay.take() {
            if let Err(err) = relay.disconnect() {
                error!(%err, "relay disconnect failed");
            }
        }
        self.output = None;
    }

    fn binds(&self, kind: PortKind, name: &str) -> bool {
        match kind {
            PortKind::Input => name == self.input_name,
            PortKind::Output => name == self.output_name,
        }
    }

    /// Drops the relay when one of its ports goes away and recreates it once
    /// the port is back.
    pub fn on_device_event(&mut self, event: &DeviceEvent) -> Option<RelayChange> {
        let device = event.device();
        if !self.binds(device.kind, &device.name) {
            return None;
        }

        match event {
            DeviceEvent::Disconnected(_) if self.is_relaying() => {
                self.diagnostics
                    .report(Severity::Warning, &format!("port {} disconnected!", device.name));
                self.stop();
                Some(RelayChange::Stopped)
            }
            DeviceEvent::Connected(_) if !self.is_relaying() => match self.connect() {
                Ok(()) => {
                    self.diagnostics
                        .report(Severity::Info, &format!("port {} reconnected!", device.name));
                    Some(RelayChange::Restarted)
                }
                Err(err) => {
                    // The other port may still be missing.
                    debug!(%err, port = %device.name, "relay not restored yet");
                    None
                }
            },
            _ => None,
        }
    }

    pub fn set_logging(&self, on: bool) {
        self.options.log_events.store(on, Ordering::SeqCst);
    }

    pub fn is_logging(&self) -> bool {
        self.options.log_events.load(Ordering::SeqCst)
    }

    /// Sends Local Control on/off straight to the output, bypassing the
    /// mirror.
    pub fn set_local_control(&self, on: bool) {
        let Some(output) = &self.output else {
            self.diagnostics
                .report(Severity::Error, "ERROR: no output device selected!");
            return;
        };
        let data = local_control_message(on);
        self.diagnostics.report(
            Severity::Info,
            &format!("sending {} to try changing Local Control", format_midi_data(&data)),
        );
        let mut output = Arc::clone(output);
        if let Err(err) = output.send(&data) {
            self.diagnostics.report(
                Severity::Error,
                &format!("ERROR: sending MIDI to the output failed, {}", err),
            );
        }
    }
}
