// Communication channels between timer/MIDI threads and the engine loop

use crate::messaging::command::{ClockEvent, Command};
use crate::sequencer::clock::{NoteChange, NoteSink, TickObserver};
use crossbeam_channel::{Receiver, Sender, unbounded};

pub type CommandSender = Sender<Command>;
pub type CommandReceiver = Receiver<Command>;

/// Many producers (one per clock timer, MIDI input, console), one consumer
pub fn create_command_channel() -> (CommandSender, CommandReceiver) {
    unbounded()
}

pub type ClockEventSender = Sender<ClockEvent>;
pub type ClockEventReceiver = Receiver<ClockEvent>;

pub fn create_clock_event_channel() -> (ClockEventSender, ClockEventReceiver) {
    unbounded()
}

impl NoteSink for ClockEventSender {
    fn note_change(&mut self, change: NoteChange) {
        if self.send(ClockEvent::NoteChange(change)).is_err() {
            log::warn!("clock event receiver dropped, note lost");
        }
    }
}

impl TickObserver for ClockEventSender {
    fn tick(&mut self, track: usize) {
        // A missing observer never affects scheduling
        let _ = self.send(ClockEvent::Tick(track));
    }
}
