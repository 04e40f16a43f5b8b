// Clock - per-track sequencer state machine
// Walks the track's patterns one tick at a time, decides note onsets and
// pattern switches, and owns the timer that drives it

use crate::sequencer::timer::{Ticker, TimerHandle};
use crate::sequencer::track::{ConfigError, TrackConfig};
use std::io;
use std::time::Duration;

/// Length of one tick (a sixteenth note) in milliseconds
pub fn tick_ms(bpm: f64, rate: f64) -> f64 {
    (60_000.0 / (bpm * rate)) / 4.0
}

#[derive(Debug, thiserror::Error)]
pub enum ClockError {
    #[error("Invalid track configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("BPM must be a positive number, got {0}")]
    InvalidBpm(f64),

    #[error("Failed to start clock timer: {0}")]
    Timer(#[from] io::Error),
}

/// A note has started sounding
#[derive(Debug, Clone, PartialEq)]
pub struct NoteChange {
    pub track: usize,
    /// Instrument bank index taken from the track config
    pub output: usize,
    /// Pitch token, already resolved through the percussion table if any
    pub value: String,
    pub duration_ms: f64,
    /// 1-based MIDI channel
    pub channel: u8,
    /// Whole octaves added when the pitch is resolved
    pub octave_offset: i8,
}

impl NoteChange {
    pub fn duration(&self) -> Duration {
        Duration::from_secs_f64(self.duration_ms / 1000.0)
    }
}

/// Receives note onsets (the instrument layer)
pub trait NoteSink {
    fn note_change(&mut self, change: NoteChange);
}

/// Notified whenever a clock's observable state may have changed
pub trait TickObserver {
    fn tick(&mut self, track: usize);
}

/// Everything a clock talks to, injected at construction
pub struct ClockBindings {
    pub ticker: Ticker,
    pub notes: Box<dyn NoteSink>,
    pub observer: Box<dyn TickObserver>,
}

/// Mutable playback state of one track
#[derive(Debug, Clone, PartialEq)]
pub struct ClockState {
    pub bpm: f64,
    pub rate: f64,
    /// Track ordinal
    pub index: usize,
    pub pattern: usize,
    /// Current note within the pattern
    pub position: usize,
    /// Always below the current pattern's tick length
    pub ticks_elapsed: u32,
    pub next_pattern: usize,
    pub is_playing: bool,
}

pub struct Clock {
    config: TrackConfig,
    state: ClockState,
    /// Set by `set_next_pattern`, cleared at the next pattern start.
    /// Keeps a non-looping track from overwriting an explicit request.
    queued_explicitly: bool,
    timer: Option<TimerHandle>,
    ticker: Ticker,
    notes: Box<dyn NoteSink>,
    observer: Box<dyn TickObserver>,
}

impl Clock {
    /// Build a stopped clock for `config`
    ///
    /// Fails if the configuration could not be played or `bpm` is not
    /// positive.
    pub fn new(
        config: TrackConfig,
        index: usize,
        bpm: f64,
        bindings: ClockBindings,
    ) -> Result<Self, ClockError> {
        config.validate()?;
        validate_bpm(bpm)?;

        let state = ClockState {
            bpm,
            rate: config.rate,
            index,
            pattern: 0,
            position: 0,
            ticks_elapsed: 0,
            next_pattern: 0,
            is_playing: false,
        };

        Ok(Self {
            config,
            state,
            queued_explicitly: false,
            timer: None,
            ticker: bindings.ticker,
            notes: bindings.notes,
            observer: bindings.observer,
        })
    }

    pub fn state(&self) -> &ClockState {
        &self.state
    }

    pub fn config(&self) -> &TrackConfig {
        &self.config
    }

    pub fn index(&self) -> usize {
        self.state.index
    }

    pub fn pattern(&self) -> usize {
        self.state.pattern
    }

    pub fn next_pattern(&self) -> usize {
        self.state.next_pattern
    }

    pub fn position(&self) -> usize {
        self.state.position
    }

    pub fn ticks_elapsed(&self) -> u32 {
        self.state.ticks_elapsed
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn pattern_count(&self) -> usize {
        self.config.patterns.len()
    }

    /// Current tick length in milliseconds
    pub fn tick_ms(&self) -> f64 {
        tick_ms(self.state.bpm, self.state.rate)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(self.tick_ms() / 1000.0)
    }

    /// Generation of the installed timer, `None` while stopped
    pub fn timer_generation(&self) -> Option<u64> {
        self.timer.as_ref().map(TimerHandle::generation)
    }

    /// Start (or restart) playback
    ///
    /// Any running timer is cancelled before the new one is installed.
    pub fn start(&mut self) -> Result<(), ClockError> {
        self.install_timer()?;
        log::debug!("clock {} started at {:.2} ms/tick", self.state.index, self.tick_ms());
        self.observer.tick(self.state.index);
        Ok(())
    }

    /// Stop playback. Stopping a stopped clock does nothing.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
            log::debug!("clock {} stopped", self.state.index);
        }
        self.state.is_playing = false;
    }

    /// Change the tempo, reinstalling the timer when playing
    ///
    /// Reinstalling restarts the tick phase from now.
    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ClockError> {
        validate_bpm(bpm)?;
        if bpm == self.state.bpm {
            return Ok(());
        }

        self.state.bpm = bpm;
        if self.state.is_playing {
            self.install_timer()?;
        }
        Ok(())
    }

    /// Queue a pattern to take over at the next pattern boundary
    ///
    /// Out-of-range ordinals are ignored and `false` is returned.
    pub fn set_next_pattern(&mut self, pattern: usize) -> bool {
        if pattern >= self.pattern_count() {
            log::debug!(
                "clock {}: ignoring pattern {} (only {} patterns)",
                self.state.index,
                pattern,
                self.pattern_count()
            );
            return false;
        }

        self.state.next_pattern = pattern;
        self.queued_explicitly = true;
        self.observer.tick(self.state.index);
        true
    }

    /// Rewind the current pattern as if its first note just started
    pub fn reset(&mut self) {
        self.state.position = 0;
        self.state.ticks_elapsed = 1 % self.current_tick_length();
    }

    /// Rewind to the first pattern and drop any queued pattern
    pub fn reset_all(&mut self) {
        self.state.pattern = 0;
        self.state.next_pattern = 0;
        self.queued_explicitly = false;
        self.reset();
    }

    /// Entry point for timer ticks; ticks from a replaced timer are ignored
    pub fn on_timer(&mut self, generation: u64) {
        if self.timer_generation() == Some(generation) {
            self.tick();
        } else {
            log::trace!(
                "clock {}: dropping stale tick (generation {})",
                self.state.index,
                generation
            );
        }
    }

    /// Advance by one tick
    pub fn tick(&mut self) {
        let state = &self.state;
        let onset = self.config.patterns[state.pattern].onset_at(state.ticks_elapsed);
        let next_position = onset.unwrap_or(state.position);

        let cycle_start = onset == Some(0) && state.ticks_elapsed == 0;
        let should_switch = cycle_start && state.pattern != state.next_pattern;

        let (pattern, position) = if should_switch {
            (state.next_pattern, 0)
        } else {
            (state.pattern, next_position)
        };

        let tick_length = self.config.patterns[pattern].tick_length();
        let ticks_elapsed = (state.ticks_elapsed + 1) % tick_length;

        if should_switch {
            log::debug!(
                "clock {}: pattern {} -> {}",
                state.index,
                state.pattern,
                pattern
            );
        }
        if cycle_start {
            // The queued pattern has been reached, whether or not it changed
            self.queued_explicitly = false;
        }

        let next_pattern = if self.config.looping || self.queued_explicitly {
            state.next_pattern
        } else {
            (pattern + 1) % self.pattern_count()
        };

        self.state.pattern = pattern;
        self.state.position = position;
        self.state.ticks_elapsed = ticks_elapsed;
        self.state.next_pattern = next_pattern;

        if onset.is_some() {
            self.emit_note();
        }

        self.observer.tick(self.state.index);
    }

    fn emit_note(&mut self) {
        let note = &self.config.patterns[self.state.pattern].notes()[self.state.position];
        if note.is_rest() {
            return;
        }

        let value = match self.config.instrument_type {
            Some(instrument_type) => instrument_type.resolve(&note.value).to_string(),
            None => note.value.clone(),
        };

        let change = NoteChange {
            track: self.state.index,
            output: self.config.midi_output,
            value,
            duration_ms: note.duration as f64 * self.tick_ms(),
            channel: self.config.midi_channel,
            octave_offset: self.config.octave_offset,
        };

        log::trace!("clock {}: note {:?}", self.state.index, change);
        self.notes.note_change(change);
    }

    fn install_timer(&mut self) -> Result<(), ClockError> {
        if let Some(timer) = self.timer.take() {
            timer.cancel();
        }
        self.state.is_playing = false;

        let timer = self.ticker.spawn(self.state.index, self.tick_interval())?;

        self.timer = Some(timer);
        self.state.is_playing = true;
        Ok(())
    }

    fn current_tick_length(&self) -> u32 {
        self.config.patterns[self.state.pattern].tick_length()
    }
}

impl std::fmt::Debug for Clock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Clock")
            .field("name", &self.config.name)
            .field("state", &self.state)
            .field("timer", &self.timer)
            .finish()
    }
}

fn validate_bpm(bpm: f64) -> Result<(), ClockError> {
    if bpm.is_finite() && bpm > 0.0 {
        Ok(())
    } else {
        Err(ClockError::InvalidBpm(bpm))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instrument::percussion::InstrumentType;
    use crate::messaging::channels::{
        ClockEventReceiver, CommandReceiver, create_clock_event_channel, create_command_channel,
    };
    use crate::messaging::command::{ClockEvent, Command};
    use crate::sequencer::note::Note;
    use crate::sequencer::pattern::Pattern;

    struct Harness {
        clock: Clock,
        events: ClockEventReceiver,
        commands: CommandReceiver,
    }

    impl Harness {
        fn notes(&self) -> Vec<(String, f64)> {
            self.events
                .try_iter()
                .filter_map(|e| match e {
                    ClockEvent::NoteChange(change) => Some((change.value, change.duration_ms)),
                    ClockEvent::Tick(_) => None,
                })
                .collect()
        }

        fn tick(&mut self, times: usize) {
            for _ in 0..times {
                self.clock.tick();
            }
        }
    }

    fn build(config: TrackConfig) -> Harness {
        let (command_tx, commands) = create_command_channel();
        let (event_tx, events) = create_clock_event_channel();
        let bindings = ClockBindings {
            ticker: Ticker::new(command_tx),
            notes: Box::new(event_tx.clone()),
            observer: Box::new(event_tx),
        };
        Harness {
            clock: Clock::new(config, 4, 120.0, bindings).unwrap(),
            events,
            commands,
        }
    }

    fn pattern(notes: &[(&str, u32)]) -> Pattern {
        Pattern::new(notes.iter().map(|(v, d)| Note::new(*v, *d)).collect())
    }

    fn default_track(looping: bool) -> TrackConfig {
        TrackConfig::new(
            "test",
            vec![
                pattern(&[("C4", 1), ("D4", 2), ("E4", 1)]),
                pattern(&[("F4", 3)]),
            ],
        )
        .with_loop(looping)
    }

    fn expected(notes: &[(&str, f64)]) -> Vec<(String, f64)> {
        notes.iter().map(|(v, d)| (v.to_string(), *d)).collect()
    }

    #[test]
    fn test_tick_ms() {
        assert_eq!(tick_ms(120.0, 1.0), 125.0);
        assert_eq!(tick_ms(60.0, 1.0), 250.0);
        assert_eq!(tick_ms(120.0, 2.0), 62.5);
        assert_eq!(tick_ms(120.0, 0.5), 250.0);
    }

    #[test]
    fn test_loops_current_pattern() {
        let mut h = build(default_track(true));
        h.tick(8);
        assert_eq!(
            h.notes(),
            expected(&[
                ("C4", 125.0),
                ("D4", 250.0),
                ("E4", 125.0),
                ("C4", 125.0),
                ("D4", 250.0),
                ("E4", 125.0),
            ])
        );
    }

    #[test]
    fn test_single_note_pattern() {
        let mut h = build(TrackConfig::new("one", vec![pattern(&[("C4", 1)])]).with_loop(true));
        h.tick(5);

        let events: Vec<ClockEvent> = h.events.try_iter().collect();
        let ticks = events.iter().filter(|e| matches!(e, ClockEvent::Tick(4))).count();
        let notes = events
            .iter()
            .filter(|e| matches!(e, ClockEvent::NoteChange(c) if c.value == "C4"))
            .count();
        assert_eq!(ticks, 5);
        assert_eq!(notes, 5);
    }

    #[test]
    fn test_queued_pattern_waits_for_boundary() {
        let mut h = build(default_track(true));
        h.tick(1);
        assert!(h.clock.set_next_pattern(1));
        assert_eq!(h.clock.pattern(), 0);

        h.tick(4);
        assert_eq!(
            h.notes(),
            expected(&[("C4", 125.0), ("D4", 250.0), ("E4", 125.0), ("F4", 375.0)])
        );
        assert_eq!(h.clock.pattern(), 1);
        // Looping tracks stay on the new pattern
        assert_eq!(h.clock.next_pattern(), 1);
    }

    #[test]
    fn test_non_looping_advances_automatically() {
        let config = TrackConfig::new(
            "chain",
            vec![
                pattern(&[("C4", 1), ("D4", 2)]),
                pattern(&[("F4", 1)]),
                pattern(&[("G4", 2)]),
            ],
        );
        let mut h = build(config);
        h.tick(7);
        assert_eq!(
            h.notes(),
            expected(&[
                ("C4", 125.0),
                ("D4", 250.0),
                ("F4", 125.0),
                ("G4", 250.0),
                ("C4", 125.0),
            ])
        );
    }

    #[test]
    fn test_non_looping_respects_explicit_queue() {
        let config = TrackConfig::new(
            "chain",
            vec![
                pattern(&[("C4", 2)]),
                pattern(&[("D4", 2)]),
                pattern(&[("E4", 2)]),
            ],
        );
        let mut h = build(config);
        h.tick(1);
        assert_eq!(h.clock.next_pattern(), 1);

        h.clock.set_next_pattern(2);
        h.tick(1);
        assert_eq!(h.clock.next_pattern(), 2);

        h.tick(1);
        assert_eq!(h.clock.pattern(), 2);
        // Back to automatic chaining
        assert_eq!(h.clock.next_pattern(), 0);
        assert_eq!(h.notes(), expected(&[("C4", 250.0), ("E4", 250.0)]));
    }

    #[test]
    fn test_non_looping_resumes_after_queueing_current_pattern() {
        let config = TrackConfig::new("chain", vec![pattern(&[("C4", 1)]), pattern(&[("D4", 1)])]);
        let mut h = build(config);
        h.clock.set_next_pattern(0);
        h.tick(6);
        assert_eq!(
            h.notes(),
            expected(&[
                ("C4", 125.0),
                ("D4", 125.0),
                ("C4", 125.0),
                ("D4", 125.0),
                ("C4", 125.0),
                ("D4", 125.0),
            ])
        );
    }

    #[test]
    fn test_rests_emit_nothing() {
        let config = TrackConfig::new("rest", vec![pattern(&[("C4", 1), ("", 2), ("G4", 1)])])
            .with_loop(true);
        let mut h = build(config);
        h.tick(4);
        assert_eq!(h.notes(), expected(&[("C4", 125.0), ("G4", 125.0)]));
        assert_eq!(h.clock.position(), 2);
    }

    #[test]
    fn test_rate_scales_duration() {
        let mut h = build(default_track(true).with_rate(2.0));
        h.tick(2);
        assert_eq!(h.notes(), expected(&[("C4", 62.5), ("D4", 125.0)]));
    }

    #[test]
    fn test_percussion_values_resolved() {
        let config = TrackConfig::new("drums", vec![pattern(&[("kick", 1), ("snare", 1), ("E3", 1)])])
            .with_instrument_type(InstrumentType::Roland);
        let mut h = build(config);
        h.tick(3);
        assert_eq!(
            h.notes(),
            expected(&[("C2", 125.0), ("D2", 125.0), ("E3", 125.0)])
        );
    }

    #[test]
    fn test_note_change_carries_output_and_channel() {
        let mut config = default_track(true);
        config.midi_output = 3;
        config.midi_channel = 10;
        let mut h = build(config);
        h.tick(1);

        let change = h
            .events
            .try_iter()
            .find_map(|e| match e {
                ClockEvent::NoteChange(c) => Some(c),
                _ => None,
            })
            .unwrap();
        assert_eq!(change.track, 4);
        assert_eq!(change.output, 3);
        assert_eq!(change.channel, 10);
        assert_eq!(change.duration(), Duration::from_millis(125));
    }

    #[test]
    fn test_set_next_pattern_out_of_range() {
        let mut h = build(default_track(true));
        assert!(!h.clock.set_next_pattern(2));
        assert_eq!(h.clock.next_pattern(), 0);
        assert_eq!(h.events.try_iter().count(), 0);
    }

    #[test]
    fn test_set_next_pattern_notifies_observer() {
        let mut h = build(default_track(true));
        h.clock.set_next_pattern(1);
        assert!(matches!(h.events.try_recv(), Ok(ClockEvent::Tick(4))));
    }

    #[test]
    fn test_reset_keeps_patterns() {
        let mut h = build(default_track(true));
        h.tick(1);
        h.clock.set_next_pattern(1);
        h.tick(2);
        assert_eq!(h.clock.ticks_elapsed(), 3);

        h.clock.reset();
        assert_eq!(h.clock.position(), 0);
        assert_eq!(h.clock.ticks_elapsed(), 1);
        assert_eq!(h.clock.pattern(), 0);
        assert_eq!(h.clock.next_pattern(), 1);
    }

    #[test]
    fn test_reset_all() {
        let mut h = build(default_track(true));
        h.tick(1);
        h.clock.set_next_pattern(1);
        h.tick(4);
        assert_eq!(h.clock.pattern(), 1);

        h.clock.reset_all();
        assert_eq!(h.clock.pattern(), 0);
        assert_eq!(h.clock.next_pattern(), 0);
        assert_eq!(h.clock.position(), 0);
        assert_eq!(h.clock.ticks_elapsed(), 1);
    }

    #[test]
    fn test_reset_on_single_tick_pattern_stays_in_range() {
        let mut h = build(TrackConfig::new("one", vec![pattern(&[("C4", 1)])]));
        h.clock.reset();
        assert_eq!(h.clock.ticks_elapsed(), 0);
    }

    #[test]
    fn test_invalid_configuration_rejected() {
        let (command_tx, _commands) = create_command_channel();
        let (event_tx, _events) = create_clock_event_channel();
        let bindings = ClockBindings {
            ticker: Ticker::new(command_tx),
            notes: Box::new(event_tx.clone()),
            observer: Box::new(event_tx),
        };
        let result = Clock::new(TrackConfig::new("empty", vec![]), 0, 120.0, bindings);
        assert!(matches!(
            result,
            Err(ClockError::Config(ConfigError::NoPatterns))
        ));
    }

    #[test]
    fn test_start_installs_timer() {
        let mut h = build(default_track(true));
        assert!(!h.clock.is_playing());
        assert_eq!(h.clock.timer_generation(), None);

        h.clock.start().unwrap();
        assert!(h.clock.is_playing());
        let first = h.clock.timer_generation().unwrap();
        assert!(matches!(h.events.try_recv(), Ok(ClockEvent::Tick(4))));

        // Restarting replaces the timer
        h.clock.start().unwrap();
        let second = h.clock.timer_generation().unwrap();
        assert_ne!(first, second);

        h.clock.stop();
        assert!(!h.clock.is_playing());
        assert_eq!(h.clock.timer_generation(), None);

        // Idempotent
        h.clock.stop();
        assert!(!h.clock.is_playing());
    }

    #[test]
    fn test_timer_ticks_reach_clock() {
        let mut h = build(TrackConfig::new("fast", vec![pattern(&[("C4", 1)])]).with_loop(true));
        h.clock.set_bpm(6000.0).unwrap();
        h.clock.start().unwrap();

        let cmd = h.commands.recv_timeout(Duration::from_secs(2)).unwrap();
        match cmd {
            Command::Tick { track, generation } => {
                assert_eq!(track, 4);
                h.clock.on_timer(generation);
            }
            _ => panic!("Expected Tick command"),
        }
        h.clock.stop();
        assert_eq!(h.notes(), expected(&[("C4", 2.5)]));
    }

    #[test]
    fn test_stale_timer_ticks_ignored() {
        let mut h = build(default_track(true));
        h.clock.start().unwrap();
        let stale = h.clock.timer_generation().unwrap();
        h.clock.set_bpm(90.0).unwrap();

        h.clock.on_timer(stale);
        h.clock.stop();
        assert_eq!(h.clock.ticks_elapsed(), 0);
        assert!(h.notes().is_empty());
    }

    #[test]
    fn test_set_bpm_reinstalls_timer_when_playing() {
        let mut h = build(default_track(true));
        h.clock.set_bpm(100.0).unwrap();
        assert_eq!(h.clock.timer_generation(), None);
        assert_eq!(h.clock.tick_ms(), 150.0);

        h.clock.start().unwrap();
        let before = h.clock.timer_generation();
        h.clock.set_bpm(140.0).unwrap();
        assert_ne!(h.clock.timer_generation(), before);
        assert!(h.clock.is_playing());
        h.clock.stop();
    }

    #[test]
    fn test_set_bpm_rejects_invalid() {
        let mut h = build(default_track(true));
        assert!(matches!(h.clock.set_bpm(0.0), Err(ClockError::InvalidBpm(_))));
        assert!(h.clock.set_bpm(-10.0).is_err());
        assert!(h.clock.set_bpm(f64::INFINITY).is_err());
        assert_eq!(h.clock.state().bpm, 120.0);
    }
}
