//! Human readable decoding of raw MIDI messages.
//!
//! [`decode`] is total: every byte sequence maps to a [`MidiMessage`], with
//! [`MidiMessage::Raw`] as the fallback whenever the length does not match
//! what the status byte announces.

use std::fmt;

use super::{hex_dump, note_name};

/// Channel message kinds, keyed by the high nibble of the status byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    NoteOff,
    NoteOn,
    PolyKeyPressure,
    ControlChange,
    ProgramChange,
    ChannelPressure,
    PitchBend,
    System,
}

impl MessageType {
    /// Returns `None` for data bytes (high bit clear).
    pub fn from_status(status: u8) -> Option<Self> {
        match status & 0xF0 {
            0x80 => Some(MessageType::NoteOff),
            0x90 => Some(MessageType::NoteOn),
            0xA0 => Some(MessageType::PolyKeyPressure),
            0xB0 => Some(MessageType::ControlChange),
            0xC0 => Some(MessageType::ProgramChange),
            0xD0 => Some(MessageType::ChannelPressure),
            0xE0 => Some(MessageType::PitchBend),
            0xF0 => Some(MessageType::System),
            _ => None,
        }
    }

    pub fn is_note(self) -> bool {
        matches!(self, MessageType::NoteOn | MessageType::NoteOff)
    }
}

/// System common and real-time messages, keyed by the low nibble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemMessage {
    SysEx,
    TimeCodeQuarterFrame { message_type: u8, value: u8 },
    SongPointer { position: i32 },
    SongSelect { song: u8 },
    TuneRequest,
    EndOfSysEx,
    Clock,
    Start,
    Continue,
    Stop,
    ActiveSensing,
    Reset,
}

/// A decoded MIDI message. Channels are stored 0-based and displayed 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MidiMessage {
    Empty,
    NoteOff { channel: u8, note: u8, velocity: u8 },
    NoteOn { channel: u8, note: u8, velocity: u8 },
    PolyKeyPressure { channel: u8, note: u8, pressure: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    ProgramChange { channel: u8, program: u8 },
    ChannelPressure { channel: u8, pressure: u8 },
    PitchBend { channel: u8, bend: i32 },
    System(SystemMessage),
    Raw(Vec<u8>),
}

/// Combines two 7-bit data bytes, least significant first.
fn fourteen_bit(lsb: u8, msb: u8) -> i32 {
    ((msb as i32) << 7) | lsb as i32
}

pub fn decode(data: &[u8]) -> MidiMessage {
    let Some(&status) = data.first() else {
        return MidiMessage::Empty;
    };
    let Some(kind) = MessageType::from_status(status) else {
        return MidiMessage::Raw(data.to_vec());
    };
    let channel = status & 0x0F;

    match (kind, data) {
        (MessageType::NoteOff, &[_, note, velocity]) => MidiMessage::NoteOff {
            channel,
            note,
            velocity,
        },
        (MessageType::NoteOn, &[_, note, velocity]) => MidiMessage::NoteOn {
            channel,
            note,
            velocity,
        },
        (MessageType::PolyKeyPressure, &[_, note, pressure]) => MidiMessage::PolyKeyPressure {
            channel,
            note,
            pressure,
        },
        (MessageType::ControlChange, &[_, controller, value]) => MidiMessage::ControlChange {
            channel,
            controller,
            value,
        },
        (MessageType::ProgramChange, &[_, program]) => {
            MidiMessage::ProgramChange { channel, program }
        }
        (MessageType::ChannelPressure, &[_, pressure]) => {
            MidiMessage::ChannelPressure { channel, pressure }
        }
        (MessageType::PitchBend, &[_, lsb, msb]) => MidiMessage::PitchBend {
            channel,
            bend: fourteen_bit(lsb, msb) - 0x2000,
        },
        (MessageType::System, _) => decode_system(status, data),
        _ => MidiMessage::Raw(data.to_vec()),
    }
}

fn decode_system(status: u8, data: &[u8]) -> MidiMessage {
    let message = match (status & 0x0F, data) {
        // Sysex payloads are opaque, any length is accepted.
        (0x0, _) => SystemMessage::SysEx,
        (0x1, &[_, b]) => SystemMessage::TimeCodeQuarterFrame {
            message_type: b >> 4,
            value: b & 0x0F,
        },
        (0x2, &[_, lsb, msb]) => SystemMessage::SongPointer {
            position: fourteen_bit(lsb, msb) - 0x2000,
        },
        (0x3, &[_, song]) => SystemMessage::SongSelect { song },
        (0x6, &[_]) => SystemMessage::TuneRequest,
        (0x7, &[_]) => SystemMessage::EndOfSysEx,
        (0x8, &[_]) => SystemMessage::Clock,
        (0xA, &[_]) => SystemMessage::Start,
        (0xB, &[_]) => SystemMessage::Continue,
        (0xC, &[_]) => SystemMessage::Stop,
        (0xE, &[_]) => SystemMessage::ActiveSensing,
        (0xF, &[_]) => SystemMessage::Reset,
        _ => return MidiMessage::Raw(data.to_vec()),
    };
    MidiMessage::System(message)
}

/// Returns the string version of the raw MIDI data.
pub fn format_midi_data(data: &[u8]) -> String {
    decode(data).to_string()
}

impl fmt::Display for SystemMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[sys] ")?;
        match *self {
            SystemMessage::SysEx => f.write_str("sysex"),
            SystemMessage::TimeCodeQuarterFrame {
                message_type,
                value,
            } => write!(f, "time-code-quarter-frame mt:{} v:{}", message_type, value),
            SystemMessage::SongPointer { position } => write!(f, "song-pointer pos:{}", position),
            SystemMessage::SongSelect { song } => write!(f, "song-select song:{}", song),
            SystemMessage::TuneRequest => f.write_str("tune-request"),
            SystemMessage::EndOfSysEx => f.write_str("end-of-sysex"),
            SystemMessage::Clock => f.write_str("clock"),
            SystemMessage::Start => f.write_str("start"),
            SystemMessage::Continue => f.write_str("continue"),
            SystemMessage::Stop => f.write_str("stop"),
            SystemMessage::ActiveSensing => f.write_str("active-sensing"),
            SystemMessage::Reset => f.write_str("reset"),
        }
    }
}

impl fmt::Display for MidiMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MidiMessage::Empty => f.write_str("<empty>"),
            MidiMessage::NoteOff {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "[{}] note-off {} v:{}",
                channel + 1,
                note_name(*note as i16),
                velocity
            ),
            MidiMessage::NoteOn {
                channel,
                note,
                velocity,
            } => write!(
                f,
                "[{}] note-on  {} v:{}",
                channel + 1,
                note_name(*note as i16),
                velocity
            ),
            MidiMessage::PolyKeyPressure {
                channel,
                note,
                pressure,
            } => write!(
                f,
                "[{}] poly-key-pressure {} p:{}",
                channel + 1,
                note_name(*note as i16),
                pressure
            ),
            MidiMessage::ControlChange {
                channel,
                controller,
                value,
            } => write!(
                f,
                "[{}] control-change c:{} v:{}",
                channel + 1,
                controller,
                value
            ),
            MidiMessage::ProgramChange { channel, program } => {
                write!(f, "[{}] program-change {}", channel + 1, program)
            }
            MidiMessage::ChannelPressure { channel, pressure } => {
                write!(f, "[{}] channel-pressure p:{}", channel + 1, pressure)
            }
            MidiMessage::PitchBend { channel, bend } => {
                write!(f, "[{}] pitch-bend b:{}", channel + 1, bend)
            }
            MidiMessage::System(message) => fmt::Display::fmt(message, f),
            MidiMessage::Raw(data) => f.write_str(&hex_dump(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_input() {
        assert_eq!(format_midi_data(&[]), "<empty>");
    }

    #[test]
    fn note_on_with_channel_and_name() {
        let text = format_midi_data(&[0x9C, 60, 100]);
        assert_eq!(text, "[13] note-on  C4 v:100");
        assert!(text.contains("C4"));
        assert!(text.contains("v:100"));
    }

    #[test]
    fn note_off() {
        assert_eq!(format_midi_data(&[0x80, 64, 0]), "[1] note-off E4 v:0");
    }

    #[test]
    fn note_on_with_wrong_length_is_hex() {
        assert_eq!(format_midi_data(&[0x90, 0x3C]), "90 3C");
        assert_eq!(format_midi_data(&[0x90, 0x3C, 0x40, 0x00]), "90 3C 40 00");
    }

    #[test]
    fn channel_messages() {
        assert_eq!(
            format_midi_data(&[0xA1, 61, 20]),
            "[2] poly-key-pressure C#4 p:20"
        );
        assert_eq!(
            format_midi_data(&[0xB0, 7, 100]),
            "[1] control-change c:7 v:100"
        );
        assert_eq!(format_midi_data(&[0xC5, 12]), "[6] program-change 12");
        assert_eq!(format_midi_data(&[0xDF, 90]), "[16] channel-pressure p:90");
        assert_eq!(format_midi_data(&[0xC5, 12, 0]), "C5 0C 00");
    }

    #[test]
    fn pitch_bend_is_signed() {
        assert_eq!(format_midi_data(&[0xE0, 0x00, 0x40]), "[1] pitch-bend b:0");
        assert_eq!(format_midi_data(&[0xE0, 0x7F, 0x7F]), "[1] pitch-bend b:8191");
        assert_eq!(format_midi_data(&[0xE0, 0x00, 0x00]), "[1] pitch-bend b:-8192");
    }

    #[test]
    fn system_messages() {
        assert_eq!(format_midi_data(&[0xF0, 0x7E, 0x01, 0xF7]), "[sys] sysex");
        assert_eq!(
            format_midi_data(&[0xF1, 0x35]),
            "[sys] time-code-quarter-frame mt:3 v:5"
        );
        assert_eq!(
            format_midi_data(&[0xF2, 0x00, 0x01]),
            "[sys] song-pointer pos:-8064"
        );
        assert_eq!(
            format_midi_data(&[0xF2, 0x00, 0x00]),
            "[sys] song-pointer pos:-8192"
        );
        assert_eq!(
            format_midi_data(&[0xF2, 0x7F, 0x7F]),
            "[sys] song-pointer pos:8191"
        );
        assert_eq!(format_midi_data(&[0xF3, 4]), "[sys] song-select song:4");
        assert_eq!(format_midi_data(&[0xF6]), "[sys] tune-request");
        assert_eq!(format_midi_data(&[0xF7]), "[sys] end-of-sysex");
        assert_eq!(format_midi_data(&[0xF8]), "[sys] clock");
        assert_eq!(format_midi_data(&[0xFA]), "[sys] start");
        assert_eq!(format_midi_data(&[0xFB]), "[sys] continue");
        assert_eq!(format_midi_data(&[0xFC]), "[sys] stop");
        assert_eq!(format_midi_data(&[0xFE]), "[sys] active-sensing");
        assert_eq!(format_midi_data(&[0xFF]), "[sys] reset");
    }

    #[test]
    fn system_length_mismatch_and_undefined_are_hex() {
        assert_eq!(format_midi_data(&[0xF8, 0x00]), "F8 00");
        assert_eq!(format_midi_data(&[0xF2, 0x01]), "F2 01");
        assert_eq!(format_midi_data(&[0xF4]), "F4");
        assert_eq!(format_midi_data(&[0xFD]), "FD");
    }

    #[test]
    fn data_byte_as_status_is_hex() {
        assert_eq!(format_midi_data(&[0x3C, 0x40, 0x00]), "3C 40 00");
        assert_eq!(decode(&[0x7F]), MidiMessage::Raw(vec![0x7F]));
    }

    #[test]
    fn structured_form() {
        assert_eq!(
            decode(&[0x91, 60, 1]),
            MidiMessage::NoteOn {
                channel: 1,
                note: 60,
                velocity: 1
            }
        );
        assert_eq!(
            decode(&[0xF1, 0x21]),
            MidiMessage::System(SystemMessage::TimeCodeQuarterFrame {
                message_type: 2,
                value: 1
            })
        );
        assert!(MessageType::from_status(0x85).is_some_and(MessageType::is_note));
        assert!(!MessageType::from_status(0xB0).is_some_and(MessageType::is_note));
    }

    #[test]
    fn every_short_sequence_decodes() {
        for a in 0..=255u8 {
            assert!(!format_midi_data(&[a]).is_empty());
            for b in [0u8, 0x3C, 0x7F, 0x80, 0xFF] {
                assert!(!format_midi_data(&[a, b]).is_empty());
                assert!(!format_midi_data(&[a, b, b]).is_empty());
            }
        }
    }

    proptest! {
        #[test]
        fn decode_is_total(data in prop::collection::vec(any::<u8>(), 0..=4)) {
            let text = format_midi_data(&data);
            prop_assert!(!text.is_empty());
        }

        #[test]
        fn mismatched_note_lengths_fall_back_to_hex(
            status in 0x80u8..=0x9F,
            data in prop::collection::vec(0u8..=0x7F, 0..=3)
                .prop_filter("not a 3 byte message", |d| d.len() != 2),
        ) {
            let mut bytes = vec![status];
            bytes.extend(data);
            prop_assert_eq!(format_midi_data(&bytes), hex_dump(&bytes));
        }
    }
}
