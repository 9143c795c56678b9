//! Playlist file persistence tests

use canopy_core::{CanopyError, Tree};
use std::fs;
use tempfile::tempdir;

fn sample_tree() -> Tree {
    let mut tree = Tree::new();
    tree.insert_item("/home/user/music/a.mp3").unwrap();
    tree.insert_item("/home/user/music/b.mp3").unwrap();
    tree.insert_item("/home/user/videos").unwrap();
    tree.insert_item("D:/films/c.mkv").unwrap();
    tree
}

#[test]
fn test_save_then_load() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.txt");

    let tree = sample_tree();
    tree.save(&path).unwrap();

    let loaded = Tree::load(&path).unwrap();
    assert_eq!(loaded, tree);
    assert_eq!(
        loaded.all_items::<Vec<String>>(),
        [
            "/home/user/music/a.mp3",
            "/home/user/music/b.mp3",
            "/home/user/videos",
            "D:/films/c.mkv",
        ]
    );
}

#[test]
fn test_save_empty_tree() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.txt");

    Tree::new().save(&path).unwrap();
    let loaded = Tree::load(&path).unwrap();
    assert!(loaded.is_empty());
}

#[test]
fn test_save_replaces_previous_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.txt");

    sample_tree().save(&path).unwrap();

    let mut smaller = Tree::new();
    smaller.insert_item("x.mp3").unwrap();
    smaller.save(&path).unwrap();

    assert_eq!(Tree::load(&path).unwrap(), smaller);
    // No temporary files left behind
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_load_missing_file() {
    let dir = tempdir().unwrap();
    let err = Tree::load(&dir.path().join("missing.txt")).unwrap_err();
    assert!(matches!(err, CanopyError::Io(_)));
}

#[test]
fn test_load_corrupt_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("playlist.txt");
    fs::write(&path, "canopy-tree 1\n0\t+\tok\n3\t+\tbroken\n").unwrap();

    let err = Tree::load(&path).unwrap_err();
    assert!(matches!(err, CanopyError::Parse { line: 3, .. }));
    assert!(err.to_string().contains("line 3"));
}
