// MIDI channel messages - parsing and encoding

/// Channel voice messages used by the grid controller and the instruments
///
/// `channel` is 0-based on the wire (0..=15).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MidiEvent {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
}

impl MidiEvent {
    /// Parse a raw MIDI message
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 3 {
            return None;
        }

        let status = bytes[0];
        let channel = status & 0x0F;
        let (data1, data2) = (bytes[1], bytes[2]);

        // Data bytes never have the high bit set
        if data1 > 0x7F || data2 > 0x7F {
            return None;
        }

        match status & 0xF0 {
            0x90 => {
                // Velocity 0 = Note Off
                if data2 == 0 {
                    Some(MidiEvent::NoteOff { channel, note: data1 })
                } else {
                    Some(MidiEvent::NoteOn {
                        channel,
                        note: data1,
                        velocity: data2,
                    })
                }
            }
            0x80 => Some(MidiEvent::NoteOff { channel, note: data1 }),
            0xB0 => Some(MidiEvent::ControlChange {
                channel,
                controller: data1,
                value: data2,
            }),
            _ => None,
        }
    }

    /// Encode as a three-byte message
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiEvent::NoteOn {
                channel,
                note,
                velocity,
            } => [0x90 | (channel & 0x0F), note & 0x7F, velocity & 0x7F],
            MidiEvent::NoteOff { channel, note } => [0x80 | (channel & 0x0F), note & 0x7F, 0],
            MidiEvent::ControlChange {
                channel,
                controller,
                value,
            } => [0xB0 | (channel & 0x0F), controller & 0x7F, value & 0x7F],
        }
    }
}
