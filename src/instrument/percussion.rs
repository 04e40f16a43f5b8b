// Percussion mapping - drum names to pitch tokens for drum machines

use serde::{Deserialize, Serialize};

/// Selects a drum-name table for a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum InstrumentType {
    /// Roland TR-style kit layout
    Roland,
}

const ROLAND_KIT: [(&str, &str); 16] = [
    ("kick", "C2"),
    ("rimShot", "C#2"),
    ("snare", "D2"),
    ("clap", "D#2"),
    ("closedHat", "F#2"),
    ("lowTom", "G2"),
    ("openHat", "A#2"),
    ("midTom", "B2"),
    ("cymbal", "C#3"),
    ("highTom", "D3"),
    ("cowBell", "G#3"),
    ("highConga", "D4"),
    ("midConga", "D#4"),
    ("lowConga", "E4"),
    ("maracas", "A#4"),
    ("claves", "D#5"),
];

impl InstrumentType {
    /// Look up a drum name; returns `None` for names outside the kit
    pub fn lookup(&self, name: &str) -> Option<&'static str> {
        match self {
            InstrumentType::Roland => ROLAND_KIT
                .iter()
                .find(|(drum, _)| *drum == name)
                .map(|(_, pitch)| *pitch),
        }
    }

    /// Resolve a note value, passing unknown names through unchanged
    pub fn resolve<'a>(&self, value: &'a str) -> &'a str {
        self.lookup(value).unwrap_or(value)
    }
}
