use std::io::BufRead;

use midir::{MidiOutput, MidiOutputConnection};
use tracing::debug;

use super::registry::{choose_port, DeviceHandle, PortKind};
use crate::{Error, Result};

const CLIENT_NAME: &str = "midi-mirror output";
const CONNECTION_NAME: &str = "midi-mirror-forward-output";

/// Select the output port. Prefers a port whose name contains `wanted` and
/// is not identical to `in_port_name`, to avoid routing a device into itself.
pub fn choose_output_port(
    ports: &[DeviceHandle],
    wanted: Option<&str>,
    in_port_name: &str,
    prompt: &mut impl BufRead,
) -> Result<usize> {
    choose_port(PortKind::Output, ports, wanted, Some(in_port_name), prompt)
}

/// Connects to the output port called exactly `name`.
pub fn open_output(name: &str) -> Result<MidiOutputConnection> {
    let midi_out = MidiOutput::new(CLIENT_NAME)?;
    let port = midi_out
        .ports()
        .into_iter()
        .find(|p| midi_out.port_name(p).is_ok_and(|n| n == name))
        .ok_or_else(|| Error::PortNotFound(name.to_string()))?;

    let connection = midi_out.connect(&port, CONNECTION_NAME)?;
    debug!(port = %name, "output connected");
    Ok(connection)
}
