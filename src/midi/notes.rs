const NOTE_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Convert a MIDI note number to its name with octave (60 -> "C4").
///
/// Takes a signed value so that out-of-range mirror results can still be
/// printed; negative values render as plain decimal.
pub fn note_name(note: i16) -> String {
    if note < 0 {
        return note.to_string();
    }
    let pitch_class = note % 12;
    let octave = (note - pitch_class) / 12 - 1;
    format!("{}{}", NOTE_NAMES[pitch_class as usize], octave)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn middle_c_is_c4() {
        assert_eq!(note_name(60), "C4");
    }

    #[test]
    fn range_edges() {
        assert_eq!(note_name(0), "C-1");
        assert_eq!(note_name(61), "C#4");
        assert_eq!(note_name(124), "E9");
        assert_eq!(note_name(127), "G9");
    }

    #[test]
    fn negative_values_are_decimal() {
        assert_eq!(note_name(-1), "-1");
        assert_eq!(note_name(-3), "-3");
    }
}
