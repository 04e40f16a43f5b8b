// Instruments - pitch resolution and note playback on MIDI outputs

pub mod bank;
pub mod percussion;
pub mod pitch;

pub use bank::{Instrument, InstrumentBank, NoteOffQueue, PendingNoteOff};
pub use percussion::InstrumentType;
pub use pitch::{PitchError, note_number, resolve_note};
