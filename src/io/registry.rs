//! Device enumeration, hot-plug detection and port selection.

use std::collections::HashMap;
use std::io::{BufRead, Write};

use midir::{MidiInput, MidiOutput};
use tracing::debug;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortKind {
    Input,
    Output,
}

impl PortKind {
    pub fn label(self) -> &'static str {
        match self {
            PortKind::Input => "input",
            PortKind::Output => "output",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceState {
    Connected,
    Disconnected,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceHandle {
    pub id: String,
    pub name: String,
    pub kind: PortKind,
    pub state: DeviceState,
}

impl DeviceHandle {
    pub fn connected(id: impl Into<String>, name: impl Into<String>, kind: PortKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            state: DeviceState::Connected,
        }
    }
}

/// Enumerates the devices currently known to the host.
pub trait DeviceRegistry {
    fn inputs(&self) -> Vec<DeviceHandle>;
    fn outputs(&self) -> Vec<DeviceHandle>;
}

/// Registry backed by two midir clients used only for enumeration.
pub struct MidirRegistry {
    midi_in: MidiInput,
    midi_out: MidiOutput,
}

impl MidirRegistry {
    pub fn new() -> Result<Self> {
        Ok(Self {
            midi_in: MidiInput::new("midi-mirror registry")?,
            midi_out: MidiOutput::new("midi-mirror registry")?,
        })
    }
}

impl DeviceRegistry for MidirRegistry {
    fn inputs(&self) -> Vec<DeviceHandle> {
        self.midi_in
            .ports()
            .iter()
            .filter_map(|p| {
                let name = self.midi_in.port_name(p).ok()?;
                Some(DeviceHandle::connected(p.id(), name, PortKind::Input))
            })
            .collect()
    }

    fn outputs(&self) -> Vec<DeviceHandle> {
        self.midi_out
            .ports()
            .iter()
            .filter_map(|p| {
                let name = self.midi_out.port_name(p).ok()?;
                Some(DeviceHandle::connected(p.id(), name, PortKind::Output))
            })
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEvent {
    Connected(DeviceHandle),
    Disconnected(DeviceHandle),
}

impl DeviceEvent {
    pub fn device(&self) -> &DeviceHandle {
        match self {
            DeviceEvent::Connected(d) | DeviceEvent::Disconnected(d) => d,
        }
    }
}

/// Turns successive registry snapshots into connect/disconnect events.
///
/// midir has no hot-plug callback, so the owner calls [`poll`](Self::poll)
/// periodically.
pub struct DeviceWatcher {
    known: HashMap<(PortKind, String), DeviceHandle>,
}

impl DeviceWatcher {
    pub fn new(registry: &impl DeviceRegistry) -> Self {
        Self {
            known: snapshot(registry),
        }
    }

    pub fn poll(&mut self, registry: &impl DeviceRegistry) -> Vec<DeviceEvent> {
        let current = snapshot(registry);
        let mut events = Vec::new();

        for (key, device) in &self.known {
            if !current.contains_key(key) {
                let mut gone = device.clone();
                gone.state = DeviceState::Disconnected;
                events.push(DeviceEvent::Disconnected(gone));
            }
        }
        for (key, device) in &current {
            if !self.known.contains_key(key) {
                events.push(DeviceEvent::Connected(device.clone()));
            }
        }

        if !events.is_empty() {
            debug!(count = events.len(), "device changes detected");
        }
        self.known = current;
        events
    }
}

fn snapshot(registry: &impl DeviceRegistry) -> HashMap<(PortKind, String), DeviceHandle> {
    registry
        .inputs()
        .into_iter()
        .chain(registry.outputs())
        .map(|d| ((d.kind, d.id.clone()), d))
        .collect()
}

/// Select a port. First tries the first port whose name contains `wanted`
/// and differs from `exclude`. If there is no match and only one port, that
/// one is used; otherwise the ports are listed and the user picks one from
/// `prompt`.
pub fn choose_port(
    kind: PortKind,
    ports: &[DeviceHandle],
    wanted: Option<&str>,
    exclude: Option<&str>,
    prompt: &mut impl BufRead,
) -> Result<usize> {
    if ports.is_empty() {
        return Err(Error::NoPorts(kind.label()));
    }

    if let Some(wanted) = wanted.filter(|w| !w.is_empty()) {
        let found = ports
            .iter()
            .position(|p| p.name.contains(wanted) && Some(p.name.as_str()) != exclude);
        if let Some(idx) = found {
            println!("Choosing {} port matching '{}': {}", kind.label(), wanted, ports[idx].name);
            return Ok(idx);
        }
    }

    if ports.len() == 1 {
        println!("Choosing the only available {} port: {}", kind.label(), ports[0].name);
        return Ok(0);
    }

    println!("\nAvailable {} ports:", kind.label());
    for (i, p) in ports.iter().enumerate() {
        println!("{}: {}", i, p.name);
    }
    print!("Please select {} port: ", kind.label());
    std::io::stdout().flush()?;

    let mut choice = String::new();
    prompt.read_line(&mut choice)?;
    match choice.trim().parse::<usize>() {
        Ok(idx) if idx < ports.len() => Ok(idx),
        _ => Err(Error::InvalidSelection(kind.label())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::mock::MockRegistry;

    fn ports(names: &[&str]) -> Vec<DeviceHandle> {
        names
            .iter()
            .enumerate()
            .map(|(i, n)| DeviceHandle::connected(i.to_string(), *n, PortKind::Output))
            .collect()
    }

    #[test]
    fn substring_match_wins() {
        let ports = ports(&["Synth", "MRCC 1", "MRCC 2"]);
        let idx = choose_port(PortKind::Output, &ports, Some("MRCC"), None, &mut &b""[..]).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn substring_match_skips_excluded_name() {
        let ports = ports(&["MRCC 1", "MRCC 2"]);
        let idx =
            choose_port(PortKind::Output, &ports, Some("MRCC"), Some("MRCC 1"), &mut &b""[..]).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn single_port_is_chosen_without_prompt() {
        let ports = ports(&["Only"]);
        let idx = choose_port(PortKind::Input, &ports, Some("nope"), None, &mut &b""[..]).unwrap();
        assert_eq!(idx, 0);
    }

    #[test]
    fn prompt_selects_by_index() {
        let ports = ports(&["A", "B", "C"]);
        let idx = choose_port(PortKind::Input, &ports, None, None, &mut &b"2\n"[..]).unwrap();
        assert_eq!(idx, 2);
    }

    #[test]
    fn invalid_prompt_answer() {
        let ports = ports(&["A", "B"]);
        let err = choose_port(PortKind::Input, &ports, None, None, &mut &b"7\n"[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection("input")));
        let err = choose_port(PortKind::Input, &ports, None, None, &mut &b"x\n"[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidSelection("input")));
    }

    #[test]
    fn no_ports() {
        let err = choose_port(PortKind::Output, &[], None, None, &mut &b""[..]).unwrap_err();
        assert!(matches!(err, Error::NoPorts("output")));
    }

    #[test]
    fn watcher_reports_changes() {
        let registry = MockRegistry::new();
        registry.plug(DeviceHandle::connected("in-1", "Keys", PortKind::Input));
        registry.plug(DeviceHandle::connected("out-1", "Synth", PortKind::Output));
        let mut watcher = DeviceWatcher::new(&registry);
        assert!(watcher.poll(&registry).is_empty());

        registry.unplug(PortKind::Output, "out-1");
        let events = watcher.poll(&registry);
        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], DeviceEvent::Disconnected(d)
            if d.name == "Synth" && d.state == DeviceState::Disconnected));

        registry.plug(DeviceHandle::connected("out-1", "Synth", PortKind::Output));
        let events = watcher.poll(&registry);
        assert_eq!(events, vec![DeviceEvent::Connected(DeviceHandle::connected(
            "out-1",
            "Synth",
            PortKind::Output
        ))]);
    }
}
