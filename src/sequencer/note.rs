// Note representation for the sequencer
// A note is a pitch token (or a rest) held for a number of sixteenth-note ticks

use serde::{Deserialize, Serialize};

/// A single step of a pattern
///
/// `value` is a pitch token such as `"C#4"`, a drum name for percussion
/// tracks, or the empty string for a rest. `duration` is measured in ticks
/// (sixteenth notes) and must be at least 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub value: String,
    pub duration: u32,
}

impl Note {
    pub fn new(value: impl Into<String>, duration: u32) -> Self {
        Self {
            value: value.into(),
            duration,
        }
    }

    /// A rest of the given length
    pub fn rest(duration: u32) -> Self {
        Self::new("", duration)
    }

    /// Rests occupy time but never produce a note change
    pub fn is_rest(&self) -> bool {
        self.value.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_creation() {
        let note = Note::new("C4", 2);
        assert_eq!(note.value, "C4");
        assert_eq!(note.duration, 2);
        assert!(!note.is_rest());
    }

    #[test]
    fn test_rest() {
        let rest = Note::rest(3);
        assert!(rest.is_rest());
        assert_eq!(rest.duration, 3);
    }

    #[test]
    fn test_deserialize_from_song_json() {
        let note: Note = serde_json::from_str(r#"{ "value": "D#5", "duration": 4 }"#).unwrap();
        assert_eq!(note, Note::new("D#5", 4));
    }
}
