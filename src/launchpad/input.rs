// Surface input - decoding controller messages into pad events

use crate::grid::addressing::PadId;
use crate::midi::event::MidiEvent;

const PRESSED: u8 = 127;
const RELEASED: u8 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    PadPressed(PadId),
    PadReleased(PadId),
    ControlPressed(PadId),
    ControlReleased(PadId),
}

/// Decode one incoming message
///
/// Grid pads arrive as note on with velocity 127 (pressed) or note off,
/// control pads as control change with a value of 127 (pressed) or 0
/// (released). Anything else is ignored.
pub fn decode(bytes: &[u8]) -> Option<SurfaceEvent> {
    match MidiEvent::from_bytes(bytes)? {
        MidiEvent::NoteOn {
            note,
            velocity: PRESSED,
            ..
        } => Some(SurfaceEvent::PadPressed(PadId::from_raw(note))),
        MidiEvent::NoteOn { .. } => None,
        MidiEvent::NoteOff { note, .. } => Some(SurfaceEvent::PadReleased(PadId::from_raw(note))),
        MidiEvent::ControlChange {
            controller,
            value: PRESSED,
            ..
        } => Some(SurfaceEvent::ControlPressed(PadId::from_raw(controller))),
        MidiEvent::ControlChange {
            controller,
            value: RELEASED,
            ..
        } => Some(SurfaceEvent::ControlReleased(PadId::from_raw(controller))),
        MidiEvent::ControlChange { .. } => None,
    }
}
