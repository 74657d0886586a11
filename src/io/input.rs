use std::io::BufRead;

use midir::{Ignore, MidiInput, MidiInputConnection, MidiInputPort};
use tracing::debug;

use super::registry::{choose_port, DeviceHandle, PortKind};
use super::{MessageHandler, MessageSource};
use crate::{Error, Result};

const CLIENT_NAME: &str = "midi-mirror input";
const CONNECTION_NAME: &str = "midi-mirror-read-input";

/// Select the input port, preferring one whose name contains `wanted`.
pub fn choose_input_port(
    ports: &[DeviceHandle],
    wanted: Option<&str>,
    prompt: &mut impl BufRead,
) -> Result<usize> {
    choose_port(PortKind::Input, ports, wanted, None, prompt)
}

/// A midir input port as a [`MessageSource`].
///
/// The open `MidiInputConnection` is the subscription: closing it hands the
/// `MidiInput` client back so the source can be subscribed again.
pub struct MidiInputSource {
    midi_in: Option<MidiInput>,
    port: MidiInputPort,
    name: String,
}

impl MidiInputSource {
    /// Opens a client on the input port called exactly `name`.
    pub fn open(name: &str) -> Result<Self> {
        let mut midi_in = MidiInput::new(CLIENT_NAME)?;
        // Forward sysex, timing and active sensing too.
        midi_in.ignore(Ignore::None);

        let port = midi_in
            .ports()
            .into_iter()
            .find(|p| midi_in.port_name(p).is_ok_and(|n| n == name))
            .ok_or_else(|| Error::PortNotFound(name.to_string()))?;

        Ok(Self {
            midi_in: Some(midi_in),
            port,
            name: name.to_string(),
        })
    }
}

impl MessageSource for MidiInputSource {
    type Subscription = MidiInputConnection<()>;

    fn subscribe(&mut self, mut handler: MessageHandler) -> Result<Self::Subscription> {
        let midi_in = self
            .midi_in
            .take()
            .ok_or_else(|| Error::MidiConnect(format!("'{}' is already subscribed", self.name)))?;

        match midi_in.connect(&self.port, CONNECTION_NAME, move |_stamp, message, _| handler(message), ()) {
            Ok(connection) => {
                debug!(port = %self.name, "input subscribed");
                Ok(connection)
            }
            Err(err) => {
                let reason = err.to_string();
                self.midi_in = Some(err.into_inner());
                Err(Error::MidiConnect(reason))
            }
        }
    }

    fn unsubscribe(&mut self, subscription: Self::Subscription) {
        let (midi_in, ()) = subscription.close();
        self.midi_in = Some(midi_in);
        debug!(port = %self.name, "input unsubscribed");
    }
}
