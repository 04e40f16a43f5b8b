// Song library - songs are JSON or RON files holding a title, a tempo and
// the track configurations handed to the clocks

use crate::config::DEFAULT_BPM;
use crate::sequencer::track::{ConfigError, TrackConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, thiserror::Error)]
pub enum SongError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("Failed to read song directory: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Unsupported song format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Song '{song}' has an invalid bpm: {bpm}")]
    InvalidBpm { song: String, bpm: f64 },

    #[error("Song '{song}', track {track}: {source}")]
    InvalidTrack {
        song: String,
        track: usize,
        #[source]
        source: ConfigError,
    },

    #[error("{}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: Box<SongError>,
    },
}

/// File formats a song can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongFormat {
    Json,
    Ron,
}

impl SongFormat {
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "json" => Some(SongFormat::Json),
            "ron" => Some(SongFormat::Ron),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    #[serde(default)]
    pub title: String,

    /// Falls back to `DEFAULT_BPM` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,

    pub tracks: Vec<TrackConfig>,
}

impl Song {
    pub fn new(title: impl Into<String>, tracks: Vec<TrackConfig>) -> Self {
        Self {
            title: title.into(),
            bpm: None,
            tracks,
        }
    }

    pub fn with_bpm(mut self, bpm: f64) -> Self {
        self.bpm = Some(bpm);
        self
    }

    pub fn bpm(&self) -> f64 {
        self.bpm.unwrap_or(DEFAULT_BPM)
    }

    /// Pattern count of the longest track
    pub fn max_patterns(&self) -> usize {
        self.tracks
            .iter()
            .map(TrackConfig::pattern_count)
            .max()
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), SongError> {
        if let Some(bpm) = self.bpm {
            if !bpm.is_finite() || bpm <= 0.0 {
                return Err(SongError::InvalidBpm {
                    song: self.title.clone(),
                    bpm,
                });
            }
        }

        for (index, track) in self.tracks.iter().enumerate() {
            track.validate().map_err(|source| SongError::InvalidTrack {
                song: self.title.clone(),
                track: index,
                source,
            })?;
        }
        Ok(())
    }

    /// Parse song text in the given format
    pub fn parse(text: &str, format: SongFormat) -> Result<Self, SongError> {
        let song = match format {
            SongFormat::Json => serde_json::from_str(text)?,
            SongFormat::Ron => ron::from_str(text)?,
        };
        Ok(song)
    }
}

/// Load and validate one song file
///
/// Songs without a title are named after the file.
pub fn load_song(path: impl AsRef<Path>) -> Result<Song, SongError> {
    let path = path.as_ref();
    let format =
        SongFormat::from_path(path).ok_or_else(|| SongError::UnsupportedFormat(path.to_path_buf()))?;

    let text = fs::read_to_string(path)?;
    let mut song = Song::parse(&text, format)?;

    if song.title.trim().is_empty() {
        song.title = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    song.validate()?;
    log::debug!("loaded song '{}' from {}", song.title, path.display());
    Ok(song)
}

/// Load every song file directly inside `dir`, ordered by file name
///
/// Files with other extensions are skipped; a song that fails to load fails
/// the whole library.
pub fn load_library(dir: impl AsRef<Path>) -> Result<Vec<Song>, SongError> {
    let dir = dir.as_ref();

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type().is_file() && SongFormat::from_path(path).is_some() {
            paths.push(path.to_path_buf());
        }
    }
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    let songs = paths
        .into_iter()
        .map(|path| {
            load_song(&path).map_err(|source| SongError::Load {
                path,
                source: Box::new(source),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    log::info!("loaded {} songs from {}", songs.len(), dir.display());
    Ok(songs)
}
