use super::MessageType;

/// Mirrored note = `MIRROR_AXIS - note`, an inversion around D4/D#4.
pub const MIRROR_AXIS: i16 = 124;

/// Result of applying the mirror rule to one raw message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mirrored {
    /// Not a note message; forward the original bytes.
    Unchanged,
    /// Note-on/note-off with its note byte replaced, in a fresh buffer.
    Transformed(Vec<u8>),
    /// The mirrored note is outside 0..=127, the event must not be sent.
    Dropped { note: i16 },
}

/// Mirror a single note number. Returns the unchecked value so callers can
/// report it when it falls out of range.
pub fn mirror_note(note: u8) -> i16 {
    MIRROR_AXIS - note as i16
}

/// Apply the mirror rule to a raw MIDI message.
///
/// Only Note On (0x9n) and Note Off (0x8n) with a note byte are touched. The
/// input slice is never modified; a transformed message is a new buffer with
/// the same status and velocity bytes.
pub fn mirror_message(data: &[u8]) -> Mirrored {
    let is_note = data
        .first()
        .and_then(|&status| MessageType::from_status(status))
        .is_some_and(MessageType::is_note);
    if !is_note || data.len() < 2 {
        return Mirrored::Unchanged;
    }

    let note = mirror_note(data[1]);
    if !(0..=127).contains(&note) {
        return Mirrored::Dropped { note };
    }
    let mut out = data.to_vec();
    out[1] = note as u8;
    Mirrored::Transformed(out)
}
