// MIDI module - message codec and device connections

pub mod device;
pub mod event;

pub use device::{MidiError, MidiSink};
pub use event::MidiEvent;
