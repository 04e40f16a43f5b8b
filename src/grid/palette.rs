// Palette - fixed colour table and LED states

/// Colours of the device palette used by the looper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Color {
    Blank,
    Grey,
    Red,
    Orange,
    Yellow,
    Blue,
    Green,
    Teal,
    Purple,
    Pink,
}

impl Color {
    /// Palette index (0-127)
    pub const fn index(self) -> u8 {
        match self {
            Color::Blank => 0x00,
            Color::Grey => 0x47,
            Color::Red => 0x05,
            Color::Orange => 0x54,
            Color::Yellow => 0x0D,
            Color::Blue => 0x4F,
            Color::Green => 0x15,
            Color::Teal => 0x4D,
            Color::Purple => 0x33,
            Color::Pink => 0x34,
        }
    }
}

/// Lighting mode, encoded as the device expects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LedMode {
    Static = 0,
    Flashing = 1,
    Pulsing = 2,
}

/// Target state of one LED
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedState {
    pub mode: LedMode,
    pub color: Color,
}

impl LedState {
    pub const OFF: LedState = LedState::on(Color::Blank);

    pub const fn on(color: Color) -> Self {
        Self {
            mode: LedMode::Static,
            color,
        }
    }

    pub const fn pulse(color: Color) -> Self {
        Self {
            mode: LedMode::Pulsing,
            color,
        }
    }

    pub fn is_off(&self) -> bool {
        self.color == Color::Blank
    }
}

/// What a lit pad means
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Pattern currently sounding
    Active,
    /// Pattern queued to play next
    Queued,
    /// Pattern that can be selected
    Available,
    /// Play pad while stopped
    PlayIdle,
    /// Play pad while playing
    Playing,
    Paging,
    ResetPattern,
    ResetAll,
    ModeActive,
    ModeInactive,
    SongSelected,
    Song,
    Banner,
}

impl Role {
    pub const fn color(self) -> Color {
        match self {
            Role::Active => Color::Green,
            Role::Queued => Color::Purple,
            Role::Available => Color::Purple,
            Role::PlayIdle => Color::Green,
            Role::Playing => Color::Red,
            Role::Paging => Color::Grey,
            Role::ResetPattern => Color::Yellow,
            Role::ResetAll => Color::Orange,
            Role::ModeActive => Color::Teal,
            Role::ModeInactive => Color::Grey,
            Role::SongSelected => Color::Red,
            Role::Song => Color::Pink,
            Role::Banner => Color::Teal,
        }
    }
}
