// Engine - the single-threaded event loop
//
// Timer threads, the Launchpad input callback and the console all post
// Commands; every clock, the session and the instruments are touched only
// from this loop.

use crate::instrument::bank::{InstrumentBank, NoteOffQueue};
use crate::messaging::channels::{ClockEventReceiver, CommandReceiver};
use crate::messaging::command::{ClockEvent, Command};
use crate::sequencer::clock::ClockError;
use crate::session::Session;
use crossbeam_channel::RecvTimeoutError;
use std::time::{Duration, Instant};

/// Whether the loop keeps running after a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Engine {
    session: Session,
    instruments: InstrumentBank,
    note_offs: NoteOffQueue,
    commands: CommandReceiver,
    events: ClockEventReceiver,
}

impl Engine {
    pub fn new(
        session: Session,
        instruments: InstrumentBank,
        commands: CommandReceiver,
        events: ClockEventReceiver,
    ) -> Self {
        Self {
            session,
            instruments,
            note_offs: NoteOffQueue::new(),
            commands,
            events,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Notes currently sounding
    pub fn pending_note_offs(&self) -> usize {
        self.note_offs.len()
    }

    /// Run until `Command::Quit` or every sender is gone
    pub fn run(&mut self) -> Result<(), ClockError> {
        log::info!("Engine running");
        let result = loop {
            match self.step(None) {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break Ok(()),
                Err(e) => break Err(e),
            }
        };
        self.shutdown();
        result
    }

    /// Wait for one command (or the next note-off deadline) and handle it
    ///
    /// `max_wait` bounds the wait; `None` waits as long as needed.
    pub fn step(&mut self, max_wait: Option<Duration>) -> Result<Flow, ClockError> {
        let now = Instant::now();
        let until_note_off = self
            .note_offs
            .next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now));

        let wait = match (until_note_off, max_wait) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        };

        let received = match wait {
            Some(wait) => match self.commands.recv_timeout(wait) {
                Ok(command) => Some(command),
                Err(RecvTimeoutError::Timeout) => None,
                Err(RecvTimeoutError::Disconnected) => return Ok(Flow::Quit),
            },
            None => match self.commands.recv() {
                Ok(command) => Some(command),
                Err(_) => return Ok(Flow::Quit),
            },
        };

        let flow = match received {
            Some(command) => self.dispatch(command)?,
            None => Flow::Continue,
        };

        self.release_due(Instant::now());
        Ok(flow)
    }

    /// Apply one command, then play and draw whatever the clocks emitted
    pub fn dispatch(&mut self, command: Command) -> Result<Flow, ClockError> {
        let song_before = self.session.current_song();

        let flow = match command {
            Command::Tick { track, generation } => {
                self.session.handle_tick(track, generation);
                Flow::Continue
            }
            Command::Surface(event) => {
                self.session.handle_surface(event)?;
                Flow::Continue
            }
            Command::TogglePlay => {
                self.session.toggle_play()?;
                Flow::Continue
            }
            Command::SetBpm(bpm) => {
                self.session.set_bpm(bpm)?;
                Flow::Continue
            }
            Command::LoadSong(index) => {
                if !self.session.load_song(index)? {
                    log::warn!("No song at index {}", index);
                }
                self.session.redraw_all();
                Flow::Continue
            }
            Command::Quit => Flow::Quit,
        };

        if self.session.current_song() != song_before {
            // Notes of the old song must not hang
            self.release_all();
        }

        self.drain_clock_events();
        Ok(flow)
    }

    fn drain_clock_events(&mut self) {
        let now = Instant::now();
        while let Ok(event) = self.events.try_recv() {
            match event {
                ClockEvent::NoteChange(change) => {
                    if let Some(note_off) = self.instruments.play(&change, now) {
                        self.note_offs.schedule(note_off);
                    }
                }
                ClockEvent::Tick(track) => self.session.redraw_track(track),
            }
        }
    }

    fn release_due(&mut self, now: Instant) {
        for note_off in self.note_offs.pop_due(now) {
            self.instruments.release(&note_off);
        }
    }

    /// Send every pending note-off now
    pub fn release_all(&mut self) {
        for note_off in self.note_offs.drain() {
            self.instruments.release(&note_off);
        }
    }

    /// Stop the clocks and silence every instrument
    pub fn shutdown(&mut self) {
        self.session.stop();
        // Events emitted before the clocks stopped
        self.drain_clock_events();
        self.release_all();
        log::info!("Engine stopped");
    }
}
