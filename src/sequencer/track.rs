// Track configuration - one sequenced part of a song
// Deserialized from song files, validated before a Clock is built

use crate::instrument::percussion::InstrumentType;
use crate::sequencer::pattern::Pattern;
use serde::{Deserialize, Serialize};

/// Configuration errors are raised while building a Clock, never mid-playback
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("track has no patterns")]
    NoPatterns,

    #[error("pattern {pattern} has no notes")]
    EmptyPattern { pattern: usize },

    #[error("note {note} of pattern {pattern} has zero duration")]
    ZeroDuration { pattern: usize, note: usize },

    #[error("pattern {pattern} is too long to count in ticks")]
    PatternTooLong { pattern: usize },

    #[error("rate must be a positive number, got {0}")]
    InvalidRate(f64),

    #[error("MIDI channel must be between 1 and 16, got {0}")]
    InvalidChannel(u8),
}

fn default_rate() -> f64 {
    1.0
}

fn default_channel() -> u8 {
    1
}

/// A track as written in a song file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackConfig {
    pub name: String,

    pub patterns: Vec<Pattern>,

    /// Tempo multiplier relative to the global BPM
    #[serde(default = "default_rate")]
    pub rate: f64,

    /// When false the track chains to the following pattern on its own
    #[serde(default, rename = "loop")]
    pub looping: bool,

    /// Index into the instrument bank
    #[serde(default)]
    pub midi_output: usize,

    /// 1-based MIDI channel
    #[serde(default = "default_channel")]
    pub midi_channel: u8,

    #[serde(default)]
    pub octave_offset: i8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument_type: Option<InstrumentType>,
}

impl TrackConfig {
    /// Create a track with default playback settings
    pub fn new(name: impl Into<String>, patterns: Vec<Pattern>) -> Self {
        Self {
            name: name.into(),
            patterns,
            rate: default_rate(),
            looping: false,
            midi_output: 0,
            midi_channel: default_channel(),
            octave_offset: 0,
            instrument_type: None,
        }
    }

    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn with_rate(mut self, rate: f64) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_instrument_type(mut self, instrument_type: InstrumentType) -> Self {
        self.instrument_type = Some(instrument_type);
        self
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Check every invariant the clock relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.patterns.is_empty() {
            return Err(ConfigError::NoPatterns);
        }

        if !self.rate.is_finite() || self.rate <= 0.0 {
            return Err(ConfigError::InvalidRate(self.rate));
        }

        if !(1..=16).contains(&self.midi_channel) {
            return Err(ConfigError::InvalidChannel(self.midi_channel));
        }

        for (pattern_index, pattern) in self.patterns.iter().enumerate() {
            if pattern.is_empty() {
                return Err(ConfigError::EmptyPattern {
                    pattern: pattern_index,
                });
            }

            if let Some(note_index) = pattern.notes().iter().position(|n| n.duration == 0) {
                return Err(ConfigError::ZeroDuration {
                    pattern: pattern_index,
                    note: note_index,
                });
            }

            let length = pattern
                .notes()
                .iter()
                .try_fold(0u32, |total, n| total.checked_add(n.duration));
            if length.is_none() {
                return Err(ConfigError::PatternTooLong {
                    pattern: pattern_index,
                });
            }
        }

        Ok(())
    }
}
