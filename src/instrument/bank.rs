// Instrument bank - MIDI outputs that play the notes clocks emit

use crate::instrument::pitch::resolve_note;
use crate::midi::device::{MidiError, MidiSink};
use crate::midi::event::MidiEvent;
use crate::sequencer::clock::NoteChange;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::Instant;

pub const NOTE_VELOCITY: u8 = 127;

pub struct Instrument {
    name: String,
    output: Box<dyn MidiSink>,
}

impl Instrument {
    pub fn new(name: impl Into<String>, output: Box<dyn MidiSink>) -> Self {
        Self {
            name: name.into(),
            output,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `channel` is 1-based
    pub fn note_on(&mut self, channel: u8, note: u8, velocity: u8) -> Result<(), MidiError> {
        let event = MidiEvent::NoteOn {
            channel: channel.saturating_sub(1),
            note,
            velocity,
        };
        self.output.send_message(&event.to_bytes())
    }

    pub fn note_off(&mut self, channel: u8, note: u8) -> Result<(), MidiError> {
        let event = MidiEvent::NoteOff {
            channel: channel.saturating_sub(1),
            note,
        };
        self.output.send_message(&event.to_bytes())
    }
}

impl std::fmt::Debug for Instrument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instrument").field("name", &self.name).finish()
    }
}

/// A sounding note waiting for its note-off
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PendingNoteOff {
    /// First so the queue orders by deadline
    pub due: Instant,
    pub output: usize,
    pub channel: u8,
    pub note: u8,
}

/// Note-offs ordered by deadline, earliest first
#[derive(Debug, Default)]
pub struct NoteOffQueue {
    heap: BinaryHeap<Reverse<PendingNoteOff>>,
}

impl NoteOffQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, note_off: PendingNoteOff) {
        self.heap.push(Reverse(note_off));
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.heap.peek().map(|Reverse(n)| n.due)
    }

    /// Remove every note-off due at or before `now`
    pub fn pop_due(&mut self, now: Instant) -> Vec<PendingNoteOff> {
        let mut due = Vec::new();
        while self.heap.peek().is_some_and(|Reverse(n)| n.due <= now) {
            if let Some(Reverse(note_off)) = self.heap.pop() {
                due.push(note_off);
            }
        }
        due
    }

    /// Remove everything regardless of deadline
    pub fn drain(&mut self) -> Vec<PendingNoteOff> {
        let mut all: Vec<_> = self.heap.drain().map(|Reverse(n)| n).collect();
        all.sort();
        all
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

/// Instruments addressed by a track's `midiOutput`
#[derive(Debug, Default)]
pub struct InstrumentBank {
    instruments: Vec<Instrument>,
}

impl InstrumentBank {
    pub fn new(instruments: Vec<Instrument>) -> Self {
        Self { instruments }
    }

    pub fn push(&mut self, instrument: Instrument) {
        self.instruments.push(instrument);
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.instruments.iter().map(Instrument::name)
    }

    /// Start a note; returns the note-off to schedule
    ///
    /// Unplayable notes and missing outputs are logged and dropped.
    pub fn play(&mut self, change: &NoteChange, now: Instant) -> Option<PendingNoteOff> {
        let Some(instrument) = self.instruments.get_mut(change.output) else {
            log::debug!(
                "track {}: no instrument at output {}, dropping {}",
                change.track,
                change.output,
                change.value
            );
            return None;
        };

        let note = match resolve_note(&change.value, change.octave_offset) {
            Ok(note) => note,
            Err(e) => {
                log::warn!("track {}: cannot play note: {}", change.track, e);
                return None;
            }
        };

        if let Err(e) = instrument.note_on(change.channel, note, NOTE_VELOCITY) {
            log::warn!("{}: note on failed: {}", instrument.name(), e);
            return None;
        }

        Some(PendingNoteOff {
            due: now + change.duration(),
            output: change.output,
            channel: change.channel,
            note,
        })
    }

    pub fn release(&mut self, note_off: &PendingNoteOff) {
        if let Some(instrument) = self.instruments.get_mut(note_off.output) {
            if let Err(e) = instrument.note_off(note_off.channel, note_off.note) {
                log::warn!("{}: note off failed: {}", instrument.name(), e);
            }
        }
    }
}
