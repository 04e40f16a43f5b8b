// Pattern - Ordered sequence of notes forming a loopable phrase
// In song files a pattern is written as a plain array of notes

use crate::sequencer::note::Note;
use serde::{Deserialize, Serialize};

/// An ordered sequence of notes
///
/// Patterns are validated when a track is built (see `TrackConfig::validate`);
/// a valid pattern is non-empty and every note lasts at least one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pattern {
    notes: Vec<Note>,
}

impl Pattern {
    pub fn new(notes: Vec<Note>) -> Self {
        Self { notes }
    }

    /// Get all notes
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    /// Get the number of notes
    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Total length of the pattern in ticks (sum of all note durations)
    pub fn tick_length(&self) -> u32 {
        self.notes.iter().map(|n| n.duration).sum()
    }

    /// Tick offsets at which each note begins
    ///
    /// One entry per note: the prefix sums of every duration but the last,
    /// starting at 0. Durations `[1, 2, 1]` give `[0, 1, 3]`.
    pub fn onsets(&self) -> Vec<u32> {
        self.notes
            .iter()
            .scan(0u32, |offset, note| {
                let onset = *offset;
                *offset += note.duration;
                Some(onset)
            })
            .collect()
    }

    /// Position of the note starting exactly at `tick`, if any
    pub fn onset_at(&self, tick: u32) -> Option<usize> {
        let mut offset = 0u32;
        for (position, note) in self.notes.iter().enumerate() {
            if offset == tick {
                return Some(position);
            }
            if offset > tick {
                break;
            }
            offset += note.duration;
        }
        None
    }
}

impl From<Vec<Note>> for Pattern {
    fn from(notes: Vec<Note>) -> Self {
        Self::new(notes)
    }
}
