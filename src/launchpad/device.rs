// Launchpad device - LED and text output over any MIDI sink

use crate::grid::addressing::PadId;
use crate::grid::palette::{Color, LedState, Role};
use crate::launchpad::sysex::{MAX_LEDS_PER_MESSAGE, SysEx};
use crate::midi::device::{MidiError, MidiSink};

/// Banner scrolled when the device comes up
pub const WELCOME_TEXT: &str = "LOOPER";

/// Highest LED index cleared on startup
const LAST_LED: u8 = 127;

pub struct Launchpad {
    output: Box<dyn MidiSink>,
}

impl Launchpad {
    pub fn new(output: Box<dyn MidiSink>) -> Self {
        Self { output }
    }

    /// Programmer layout, every LED off, then the welcome banner
    pub fn initialize(&mut self) -> Result<(), MidiError> {
        self.send(&SysEx::programmer_mode())?;
        self.clear()?;
        self.scroll_text(WELCOME_TEXT, Role::Banner.color())
    }

    /// Turn off every LED the device knows about
    pub fn clear(&mut self) -> Result<(), MidiError> {
        let leds: Vec<_> = (0..=LAST_LED)
            .map(|id| (PadId::from_raw(id), LedState::OFF))
            .collect();
        self.set_leds(&leds)
    }

    /// Send a batch of LED states, split to the device's per-message limit
    pub fn set_leds(&mut self, leds: &[(PadId, LedState)]) -> Result<(), MidiError> {
        for chunk in leds.chunks(MAX_LEDS_PER_MESSAGE) {
            self.send(&SysEx::leds(chunk))?;
        }
        Ok(())
    }

    pub fn scroll_text(&mut self, text: &str, color: Color) -> Result<(), MidiError> {
        self.send(&SysEx::text_scroll(text, color))
    }

    fn send(&mut self, message: &SysEx) -> Result<(), MidiError> {
        self.output.send_message(&message.to_bytes())
    }
}

impl std::fmt::Debug for Launchpad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Launchpad").finish_non_exhaustive()
    }
}

/// Keeps every message sent to it, for inspecting device traffic
#[derive(Debug, Clone, Default)]
pub struct RecordingSink {
    messages: std::sync::Arc<std::sync::Mutex<Vec<Vec<u8>>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything sent so far
    pub fn take(&self) -> Vec<Vec<u8>> {
        match self.messages.lock() {
            Ok(mut messages) => std::mem::take(&mut *messages),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl MidiSink for RecordingSink {
    fn send_message(&mut self, message: &[u8]) -> Result<(), MidiError> {
        match self.messages.lock() {
            Ok(mut messages) => messages.push(message.to_vec()),
            Err(poisoned) => poisoned.into_inner().push(message.to_vec()),
        }
        Ok(())
    }
}
