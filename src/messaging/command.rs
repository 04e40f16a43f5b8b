// Message types - everything that flows into and out of the engine loop

use crate::launchpad::input::SurfaceEvent;
use crate::sequencer::clock::NoteChange;

/// Commands consumed by the engine loop
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Posted by a clock's timer thread
    Tick { track: usize, generation: u64 },
    /// Decoded input from the grid controller
    Surface(SurfaceEvent),
    TogglePlay,
    SetBpm(f64),
    LoadSong(usize),
    Quit,
}

/// Events emitted by clocks while the engine dispatches a command
#[derive(Debug, Clone, PartialEq)]
pub enum ClockEvent {
    NoteChange(NoteChange),
    /// The clock's state changed; its column needs a redraw
    Tick(usize),
}
