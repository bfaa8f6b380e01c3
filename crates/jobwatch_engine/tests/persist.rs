use std::fs;

use jobwatch_engine::{ensure_dir, AtomicFileWriter};
use tempfile::TempDir;

#[test]
fn creates_missing_directory() {
    let temp = TempDir::new().unwrap();
    let new_dir = temp.path().join("state");
    assert!(!new_dir.exists());
    ensure_dir(&new_dir).unwrap();
    assert!(new_dir.is_dir());
}

#[test]
fn atomic_write_replaces_existing_and_is_atomic() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let first = writer.write("jobs.ron", "(jobs: {})").unwrap();
    assert_eq!(first.file_name().unwrap(), "jobs.ron");
    assert_eq!(fs::read_to_string(&first).unwrap(), "(jobs: {})");

    // Replace existing
    let second = writer.write("jobs.ron", "(jobs: {\"a\": ()})").unwrap();
    assert_eq!(first, second);
    assert_eq!(fs::read_to_string(&second).unwrap(), "(jobs: {\"a\": ()})");
}

#[test]
fn write_bytes_round_trips_binary_content() {
    let temp = TempDir::new().unwrap();
    let writer = AtomicFileWriter::new(temp.path().to_path_buf());

    let path = writer.write_bytes("report.bin", &[0u8, 159, 146, 150]).unwrap();
    assert_eq!(fs::read(&path).unwrap(), vec![0u8, 159, 146, 150]);
}

#[test]
fn no_partial_file_on_error() {
    let temp = TempDir::new().unwrap();
    let file_path = temp.path().join("not_a_dir");
    fs::write(&file_path, "x").unwrap();

    let writer = AtomicFileWriter::new(file_path.clone());
    let result = writer.write("jobs.ron", "data");
    assert!(result.is_err());
    assert!(!file_path.with_file_name("jobs.ron").exists());
}
