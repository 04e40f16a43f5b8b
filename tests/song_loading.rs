// Song library loading from disk

use grid_looper::song::{SongError, load_library, load_song};
use std::fs;
use tempfile::TempDir;

const JSON_SONG: &str = r#"{
    "title": "json song",
    "bpm": 90,
    "tracks": [
        {
            "name": "keys",
            "patterns": [[{ "value": "C4", "duration": 2 }, { "value": "", "duration": 2 }]],
            "midiOutput": 1,
            "midiChannel": 3,
            "octaveOffset": 1
        }
    ]
}"#;

const RON_SONG: &str = r#"(
    tracks: [
        (
            name: "drums",
            loop: true,
            instrumentType: Some(roland),
            patterns: [[(value: "kick", duration: 4)]],
        ),
    ],
)"#;

fn library(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, contents) in files {
        fs::write(dir.path().join(name), contents).unwrap();
    }
    dir
}

#[test]
fn test_library_sorted_by_file_name() {
    let dir = library(&[
        ("b_ron.ron", RON_SONG),
        ("a_json.json", JSON_SONG),
        ("notes.txt", "not a song"),
    ]);

    let songs = load_library(dir.path()).unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0].title, "json song");
    assert_eq!(songs[0].bpm(), 90.0);
    assert_eq!(songs[0].tracks[0].midi_output, 1);
    assert_eq!(songs[0].tracks[0].octave_offset, 1);

    // Untitled songs are named after their file
    assert_eq!(songs[1].title, "b_ron");
    assert_eq!(songs[1].bpm(), 120.0);
    assert!(songs[1].tracks[0].looping);
}

#[test]
fn test_library_ignores_subdirectories() {
    let dir = library(&[("a.json", JSON_SONG)]);
    fs::create_dir(dir.path().join("drafts")).unwrap();
    fs::write(dir.path().join("drafts").join("b.json"), JSON_SONG).unwrap();

    assert_eq!(load_library(dir.path()).unwrap().len(), 1);
}

#[test]
fn test_empty_library() {
    let dir = library(&[]);
    assert!(load_library(dir.path()).unwrap().is_empty());
}

#[test]
fn test_invalid_song_fails_library() {
    let broken = r#"{ "title": "broken", "tracks": [
        { "name": "t", "patterns": [[{ "value": "C4", "duration": 0 }]] }
    ] }"#;
    let dir = library(&[("a.json", JSON_SONG), ("z.json", broken)]);

    match load_library(dir.path()) {
        Err(SongError::Load { path, source }) => {
            assert!(path.ends_with("z.json"));
            assert!(matches!(*source, SongError::InvalidTrack { track: 0, .. }));
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_malformed_json() {
    let dir = library(&[("bad.json", "{ \"tracks\": [ ")]);
    assert!(matches!(
        load_song(dir.path().join("bad.json")),
        Err(SongError::Json(_))
    ));
}

#[test]
fn test_unsupported_format() {
    let dir = library(&[("song.yaml", "tracks: []")]);
    assert!(matches!(
        load_song(dir.path().join("song.yaml")),
        Err(SongError::UnsupportedFormat(_))
    ));
}

#[test]
fn test_missing_directory() {
    let dir = library(&[]);
    assert!(load_library(dir.path().join("nope")).is_err());
}

#[test]
fn test_bundled_songs_load() {
    let songs = load_library(concat!(env!("CARGO_MANIFEST_DIR"), "/songs")).unwrap();
    assert_eq!(songs.len(), 3);
    assert_eq!(songs[0].title, "loopy");
    assert!(songs.iter().all(|song| !song.tracks.is_empty()));
}
