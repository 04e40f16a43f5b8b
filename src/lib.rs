// Grid Looper - pattern sequencer played from a Launchpad Mini MK3

pub mod config;
pub mod console;
pub mod engine;
pub mod grid;
pub mod instrument;
pub mod launchpad;
pub mod messaging;
pub mod midi;
pub mod sequencer;
pub mod session;
pub mod song;
pub mod utils;

// Re-export commonly used types for convenience
pub use config::{Cli, Config, DEFAULT_BPM, MAX_BPM, MIN_BPM};
pub use engine::{Engine, Flow};
pub use grid::{GridPosition, LedFrame, LedState, PadId, Viewport, pad_for, parse_pad};
pub use instrument::{Instrument, InstrumentBank, InstrumentType};
pub use launchpad::{Control, Launchpad, SurfaceEvent};
pub use messaging::{ClockEvent, Command, create_clock_event_channel, create_command_channel};
pub use midi::{MidiError, MidiEvent, MidiSink};
pub use sequencer::{Clock, ClockBindings, ClockError, NoteChange, NoteSink, TickObserver, Ticker};
pub use session::{Mode, Session};
pub use song::{Song, SongError, load_library, load_song};
