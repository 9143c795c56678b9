//! History file persistence tests

use canopy_playback::{History, PlaybackError};
use std::fs;
use tempfile::tempdir;

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.txt");

    let mut history = History::new(10);
    history.push("/music/a.mp3");
    history.push("/music/b.mp3");
    history.save(&path).unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "/music/b.mp3\n/music/a.mp3\n"
    );

    let loaded = History::load(&path, 10).unwrap();
    assert_eq!(loaded, history);
    assert_eq!(loaded.current(), Some("/music/b.mp3"));
}

#[test]
fn test_load_truncates_to_configured_size() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.txt");

    let mut large = History::new(100);
    for i in 0..100 {
        large.push(format!("/music/{i}.mp3"));
    }
    large.save(&path).unwrap();

    let loaded = History::load(&path, 5).unwrap();
    assert_eq!(loaded.len(), 5);
    assert_eq!(loaded.get(0), Some("/music/99.mp3"));
    assert_eq!(loaded.get(4), Some("/music/95.mp3"));
}

#[test]
fn test_load_empty_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("history.txt");
    fs::write(&path, "").unwrap();

    let loaded = History::load(&path, 5).unwrap();
    assert!(loaded.is_empty());
    assert_eq!(loaded.current_index(), None);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = History::load(&dir.path().join("missing.txt"), 5).unwrap_err();
    assert!(matches!(err, PlaybackError::Io(_)));
}
