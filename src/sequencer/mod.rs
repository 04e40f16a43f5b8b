// Sequencer module
// Per-track clocks, patterns and the timers that drive them

pub mod clock;
pub mod note;
pub mod pattern;
pub mod timer;
pub mod track;

pub use clock::{Clock, ClockBindings, ClockError, ClockState, NoteChange, NoteSink, TickObserver, tick_ms};
pub use note::Note;
pub use pattern::Pattern;
pub use timer::{Ticker, TimerHandle};
pub use track::{ConfigError, TrackConfig};
