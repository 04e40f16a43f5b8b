// Control pads - the fixed buttons around the playable grid

use crate::grid::addressing::PadId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Play,
    PageUp,
    PageDown,
    PageLeft,
    PageRight,
    ResetPattern,
    ResetAll,
    SessionMode,
    SongSelectMode,
}

impl Control {
    pub const ALL: [Control; 9] = [
        Control::Play,
        Control::PageUp,
        Control::PageDown,
        Control::PageLeft,
        Control::PageRight,
        Control::ResetPattern,
        Control::ResetAll,
        Control::SessionMode,
        Control::SongSelectMode,
    ];

    /// Identifier sent in control-change messages
    pub const fn id(self) -> u8 {
        match self {
            Control::Play => 19,
            Control::PageUp => 91,
            Control::PageDown => 92,
            Control::PageLeft => 93,
            Control::PageRight => 94,
            Control::ResetPattern => 89,
            Control::ResetAll => 49,
            Control::SessionMode => 95,
            Control::SongSelectMode => 97,
        }
    }

    pub fn from_id(id: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.id() == id)
    }

    pub const fn pad(self) -> PadId {
        PadId::from_raw(self.id())
    }
}
