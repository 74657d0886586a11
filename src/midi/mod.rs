//! MIDI wire-format helpers: decoding for diagnostics, note names and the
//! note mirroring rule.

pub mod decode;
pub mod mirror;
pub mod notes;

pub use decode::{decode, format_midi_data, MessageType, MidiMessage, SystemMessage};
pub use mirror::{mirror_message, mirror_note, Mirrored, MIRROR_AXIS};
pub use notes::note_name;

/// Controller number of the Local Control channel mode message.
pub const LOCAL_CONTROL: u8 = 122;

/// Returns the bytes as space separated uppercase hex, e.g. `90 3C 64`.
pub fn hex_dump(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{:02X}", b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Builds the control-change message switching Local Control on or off on
/// channel 1.
pub fn local_control_message(on: bool) -> [u8; 3] {
    [0xB0, LOCAL_CONTROL, if on { 127 } else { 0 }]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_dump_is_uppercase_and_padded() {
        assert_eq!(hex_dump(&[0x90, 0x3C]), "90 3C");
        assert_eq!(hex_dump(&[0x0A, 0xFF, 0x00]), "0A FF 00");
        assert_eq!(hex_dump(&[]), "");
    }

    #[test]
    fn local_control_bytes() {
        assert_eq!(local_control_message(true), [0xB0, 122, 127]);
        assert_eq!(local_control_message(false), [0xB0, 122, 0]);
        assert_eq!(
            format_midi_data(&local_control_message(false)),
            "[1] control-change c:122 v:0"
        );
    }
}
