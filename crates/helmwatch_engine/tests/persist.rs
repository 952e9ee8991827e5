use std::fs;

use helmwatch_engine::{ensure_output_dir, AtomicFileWriter, PersistError};
use tempfile::TempDir;

#[test]
fn creates_missing_download_dir() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("downloads");
    assert!(!new_dir.exists());
    ensure_output_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_file() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("vid_1.mp4", b"first").unwrap();
    assert_eq!(first.file_name().unwrap(), "vid_1.mp4");
    assert_eq!(fs::read(&first).unwrap(), b"first");

    let second = writer.write("vid_1.mp4", b"second").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read(&second).unwrap(), b"second");
}

#[test]
fn staged_chunks_are_invisible_until_commit() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let mut staged = writer.stage().unwrap();
    staged.write_chunk(b"abc").unwrap();
    staged.write_chunk(b"def").unwrap();
    assert_eq!(staged.bytes_written(), 6);
    assert!(!temp.path().join("clip.mp4").exists());

    let path = staged.commit("clip.mp4").unwrap();
    assert_eq!(fs::read(path).unwrap(), b"abcdef");
}

#[test]
fn path_like_names_are_refused() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().join("inner"));

    for name in ["../escape.mp4", "nested/clip.mp4", ".."] {
        let err = writer.write(name, b"data").unwrap_err();
        assert!(matches!(err, PersistError::InvalidName(_)), "{name}: {err}");
    }
    assert!(!temp.path().join("escape.mp4").exists());
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("clip.mp4", b"data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("clip.mp4").exists());
}
