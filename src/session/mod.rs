// Session - host logic tying the loaded song's clocks to the grid
//
// Owns one Clock per track, the page offsets and the current mode, and turns
// surface input into clock operations. The grid is a pure observer: a session
// without a Launchpad schedules exactly the same notes.

use crate::config::clamp_bpm;
use crate::grid::addressing::{Axis, GRID_SIZE, GridPosition, PadId, Viewport, max_page_offset, parse_pad};
use crate::grid::palette::{Color, LedState, Role};
use crate::grid::renderer::{ColumnView, LedFrame, render_collection, render_column, render_empty_column};
use crate::launchpad::controls::Control;
use crate::launchpad::device::Launchpad;
use crate::launchpad::input::SurfaceEvent;
use crate::messaging::channels::ClockEventSender;
use crate::midi::device::MidiError;
use crate::sequencer::clock::{Clock, ClockBindings, ClockError};
use crate::sequencer::timer::Ticker;
use crate::song::Song;
use std::fmt;

/// What the playable grid currently shows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// One column per track, one row per pattern
    Session,
    /// One pad per song in the library
    SongSelect,
}

/// An attached Launchpad plus what its LEDs currently show
struct Surface {
    launchpad: Launchpad,
    frame: LedFrame,
}

impl Surface {
    fn apply<I>(&mut self, target: I)
    where
        I: IntoIterator<Item = (PadId, LedState)>,
    {
        let delta = self.frame.reconcile(target);
        if delta.is_empty() {
            return;
        }
        if let Err(e) = self.launchpad.set_leds(&delta) {
            log::warn!("Launchpad update failed: {}", e);
            // Resend everything next time
            self.frame.invalidate();
        }
    }

    fn scroll_text(&mut self, text: &str, color: Color) {
        if let Err(e) = self.launchpad.scroll_text(text, color) {
            log::warn!("Launchpad text scroll failed: {}", e);
        }
    }
}

pub struct Session {
    songs: Vec<Song>,
    current_song: Option<usize>,
    clocks: Vec<Clock>,
    bpm: f64,
    bpm_override: Option<f64>,
    is_playing: bool,
    viewport: Viewport,
    mode: Mode,
    surface: Option<Surface>,
    surface_absence_reported: bool,
    ticker: Ticker,
    events: ClockEventSender,
}

impl Session {
    /// Create a stopped session with no song loaded
    pub fn new(songs: Vec<Song>, ticker: Ticker, events: ClockEventSender) -> Self {
        Self {
            songs,
            current_song: None,
            clocks: Vec::new(),
            bpm: crate::config::DEFAULT_BPM,
            bpm_override: None,
            is_playing: false,
            viewport: Viewport::default(),
            mode: Mode::Session,
            surface: None,
            surface_absence_reported: false,
            ticker,
            events,
        }
    }

    /// Use `bpm` for every song instead of the song's own tempo
    pub fn with_bpm_override(mut self, bpm: Option<f64>) -> Self {
        self.bpm_override = bpm.map(clamp_bpm);
        self
    }

    pub fn songs(&self) -> &[Song] {
        &self.songs
    }

    pub fn current_song(&self) -> Option<usize> {
        self.current_song
    }

    pub fn song(&self) -> Option<&Song> {
        self.current_song.and_then(|index| self.songs.get(index))
    }

    pub fn clocks(&self) -> &[Clock] {
        &self.clocks
    }

    pub fn clock(&self, track: usize) -> Option<&Clock> {
        self.clocks.get(track)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    /// Last state sent to `pad`, if a surface is attached
    pub fn led(&self, pad: PadId) -> Option<LedState> {
        self.surface.as_ref().and_then(|s| s.frame.get(pad))
    }

    /// Initialise `launchpad` and draw the current state on it
    pub fn attach_surface(&mut self, mut launchpad: Launchpad) -> Result<(), MidiError> {
        launchpad.initialize()?;

        let mut frame = LedFrame::new();
        frame.mark_grid_cleared();
        self.surface = Some(Surface { launchpad, frame });

        self.draw_controls();
        self.redraw_all();
        log::info!("Launchpad attached");
        Ok(())
    }

    /// Note that no Launchpad is available; logged once per session
    pub fn surface_unavailable(&mut self, reason: impl fmt::Display) {
        if !self.surface_absence_reported {
            log::warn!("Running without a Launchpad: {}", reason);
            self.surface_absence_reported = true;
        }
    }

    /// Replace the clocks with those of song `index`
    ///
    /// Old clocks are stopped first so they cannot keep emitting notes. The
    /// play state carries over. Returns false for an unknown index.
    pub fn load_song(&mut self, index: usize) -> Result<bool, ClockError> {
        let Some(song) = self.songs.get(index) else {
            log::debug!("no song at index {}", index);
            return Ok(false);
        };

        for clock in &mut self.clocks {
            clock.stop();
        }
        self.clocks.clear();

        let bpm = self.bpm_override.unwrap_or_else(|| clamp_bpm(song.bpm()));
        let mut clocks = Vec::with_capacity(song.tracks.len());
        for (track, config) in song.tracks.iter().enumerate() {
            let bindings = ClockBindings {
                ticker: self.ticker.clone(),
                notes: Box::new(self.events.clone()),
                observer: Box::new(self.events.clone()),
            };
            clocks.push(Clock::new(config.clone(), track, bpm, bindings)?);
        }

        log::info!(
            "Loaded song {} '{}' ({} tracks, {} bpm)",
            index,
            song.title,
            clocks.len(),
            bpm
        );

        self.clocks = clocks;
        self.bpm = bpm;
        self.current_song = Some(index);
        self.viewport = Viewport::default();

        if self.is_playing {
            for clock in &mut self.clocks {
                clock.start()?;
            }
        }
        Ok(true)
    }

    /// Load a song from the surface: scroll its title and show the library
    pub fn set_song(&mut self, index: usize) -> Result<bool, ClockError> {
        if !self.load_song(index)? {
            return Ok(false);
        }

        if let Some(title) = self.song().map(|song| song.title.clone()) {
            if let Some(surface) = &mut self.surface {
                surface.scroll_text(&title, Role::Banner.color());
            }
        }
        self.set_mode(Mode::SongSelect);
        Ok(true)
    }

    /// Start every clock if stopped, stop every clock if playing
    pub fn toggle_play(&mut self) -> Result<bool, ClockError> {
        if self.is_playing {
            for clock in &mut self.clocks {
                clock.stop();
            }
        } else {
            for clock in &mut self.clocks {
                clock.start()?;
            }
        }

        self.is_playing = !self.is_playing;
        log::info!("{}", if self.is_playing { "Playing" } else { "Stopped" });
        self.draw_play_control();
        Ok(self.is_playing)
    }

    /// Stop every clock; the session can be started again
    pub fn stop(&mut self) {
        for clock in &mut self.clocks {
            clock.stop();
        }
        if self.is_playing {
            self.is_playing = false;
            self.draw_play_control();
        }
    }

    /// Set the tempo of every clock, clamped to the supported range
    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), ClockError> {
        let bpm = clamp_bpm(bpm);
        for clock in &mut self.clocks {
            clock.set_bpm(bpm)?;
        }
        self.bpm = bpm;
        log::info!("Tempo set to {} bpm", bpm);
        Ok(())
    }

    /// Forward a timer tick to its clock
    pub fn handle_tick(&mut self, track: usize, generation: u64) {
        if let Some(clock) = self.clocks.get_mut(track) {
            clock.on_timer(generation);
        }
    }

    pub fn handle_surface(&mut self, event: SurfaceEvent) -> Result<(), ClockError> {
        match event {
            SurfaceEvent::PadPressed(pad) => match parse_pad(pad) {
                Some(position) => self.on_pad_press(position),
                None => Ok(()),
            },
            SurfaceEvent::ControlPressed(pad) => match Control::from_id(pad.raw()) {
                Some(control) => self.on_control_press(control),
                None => {
                    log::trace!("unassigned control {}", pad);
                    Ok(())
                }
            },
            SurfaceEvent::PadReleased(_) | SurfaceEvent::ControlReleased(_) => Ok(()),
        }
    }

    /// A grid pad at a page-relative position was pressed
    pub fn on_pad_press(&mut self, position: GridPosition) -> Result<(), ClockError> {
        match self.mode {
            Mode::SongSelect => {
                let index = position.row * GRID_SIZE + position.track;
                self.set_song(index)?;
            }
            Mode::Session => {
                let (track, pattern) = self.viewport.to_absolute(position);
                let Some(clock) = self.clocks.get_mut(track) else {
                    return Ok(());
                };

                if clock.pattern() == pattern {
                    // Show how far into the piece this track is
                    if let Some(surface) = &mut self.surface {
                        surface.scroll_text(&(pattern + 1).to_string(), Role::Banner.color());
                    }
                }

                if clock.set_next_pattern(pattern) {
                    log::debug!("track {}: queued pattern {}", track, pattern);
                }
            }
        }
        Ok(())
    }

    pub fn on_control_press(&mut self, control: Control) -> Result<(), ClockError> {
        match control {
            Control::Play => {
                self.toggle_play()?;
            }
            Control::PageUp => self.scroll(Axis::Y, -1),
            Control::PageDown => self.scroll(Axis::Y, 1),
            Control::PageLeft => self.scroll(Axis::X, -1),
            Control::PageRight => self.scroll(Axis::X, 1),
            Control::ResetPattern => self.reset_patterns(),
            Control::ResetAll => self.reset_all(),
            Control::SessionMode => self.set_mode(Mode::Session),
            Control::SongSelectMode => self.set_mode(Mode::SongSelect),
        }
        Ok(())
    }

    /// Rewind every clock's current pattern
    pub fn reset_patterns(&mut self) {
        for clock in &mut self.clocks {
            clock.reset();
        }
        self.redraw_all();
    }

    /// Rewind every clock to its first pattern and return to the first page
    pub fn reset_all(&mut self) {
        for clock in &mut self.clocks {
            clock.reset_all();
        }
        self.viewport = Viewport::default();
        self.redraw_all();
    }

    /// Move the visible page; offsets stop at the first and last pages
    pub fn scroll(&mut self, axis: Axis, delta: isize) {
        let max_offset = match axis {
            Axis::X => max_page_offset(self.clocks.len()),
            Axis::Y => max_page_offset(self.max_patterns()),
        };

        if self.viewport.scroll(axis, delta, max_offset) {
            log::debug!(
                "page offsets x={} y={}",
                self.viewport.x_offset,
                self.viewport.y_offset
            );
            self.redraw_all();
        }
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        self.draw_mode_controls();
        self.redraw_all();
    }

    /// Redraw the column of `track` if it is visible
    pub fn redraw_track(&mut self, track: usize) {
        if self.mode != Mode::Session {
            return;
        }
        let Some(surface) = &mut self.surface else {
            return;
        };
        let (Some(column), Some(clock)) = (self.viewport.column_for(track), self.clocks.get(track))
        else {
            return;
        };

        surface.apply(render_column(column, &ColumnView::for_clock(clock, &self.viewport)));
    }

    /// Redraw the whole grid for the current mode
    pub fn redraw_all(&mut self) {
        let Some(surface) = &mut self.surface else {
            return;
        };

        match self.mode {
            Mode::Session => {
                for column in 0..GRID_SIZE {
                    let track = column + self.viewport.track_offset();
                    let leds = match self.clocks.get(track) {
                        Some(clock) => {
                            render_column(column, &ColumnView::for_clock(clock, &self.viewport))
                        }
                        None => render_empty_column(column),
                    };
                    surface.apply(leds);
                }
            }
            Mode::SongSelect => {
                surface.apply(render_collection(self.songs.len(), self.current_song));
            }
        }
    }

    fn max_patterns(&self) -> usize {
        self.clocks
            .iter()
            .map(Clock::pattern_count)
            .max()
            .unwrap_or(0)
    }

    fn draw_controls(&mut self) {
        let Some(surface) = &mut self.surface else {
            return;
        };
        surface.apply([
            (Control::PageUp.pad(), LedState::on(Role::Paging.color())),
            (Control::PageDown.pad(), LedState::on(Role::Paging.color())),
            (Control::PageLeft.pad(), LedState::on(Role::Paging.color())),
            (Control::PageRight.pad(), LedState::on(Role::Paging.color())),
            (Control::ResetPattern.pad(), LedState::on(Role::ResetPattern.color())),
            (Control::ResetAll.pad(), LedState::on(Role::ResetAll.color())),
        ]);
        self.draw_play_control();
        self.draw_mode_controls();
    }

    fn draw_play_control(&mut self) {
        let role = if self.is_playing {
            Role::Playing
        } else {
            Role::PlayIdle
        };
        if let Some(surface) = &mut self.surface {
            surface.apply([(Control::Play.pad(), LedState::pulse(role.color()))]);
        }
    }

    fn draw_mode_controls(&mut self) {
        let (session, song_select) = match self.mode {
            Mode::Session => (Role::ModeActive, Role::ModeInactive),
            Mode::SongSelect => (Role::ModeInactive, Role::ModeActive),
        };
        if let Some(surface) = &mut self.surface {
            surface.apply([
                (Control::SessionMode.pad(), LedState::on(session.color())),
                (Control::SongSelectMode.pad(), LedState::on(song_select.color())),
            ]);
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        for clock in &mut self.clocks {
            clock.stop();
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("current_song", &self.current_song)
            .field("bpm", &self.bpm)
            .field("is_playing", &self.is_playing)
            .field("mode", &self.mode)
            .field("viewport", &self.viewport)
            .field("clocks", &self.clocks.len())
            .field("surface", &self.surface.is_some())
            .finish()
    }
}
