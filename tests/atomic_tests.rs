use std::{fs, path::Path};

use benchlab::{BenchError, atomic::write_atomic};

fn partial_files(dir: &Path) -> usize {
    fs::read_dir(dir)
        .expect("list")
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".partial"))
        .count()
}

#[test]
fn test_write_atomic_replaces_contents() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("summary.csv");
    write_atomic(&path, b"old").expect("first");
    write_atomic(&path, b"new").expect("second");
    assert_eq!(fs::read(&path).expect("read"), b"new");
    assert_eq!(partial_files(dir.path()), 0);
}

#[test]
fn test_write_atomic_into_missing_directory_fails_cleanly() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("absent").join("summary.csv");
    let err = write_atomic(&path, b"data").unwrap_err();
    assert!(matches!(err, BenchError::Io(_)));
    assert!(!path.exists());
    assert_eq!(partial_files(dir.path()), 0);
}

#[test]
fn test_failed_rename_removes_staging_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let target = dir.path().join("chart.svg");
    fs::create_dir(&target).expect("blocking dir");
    fs::write(target.join("keep"), b"x").expect("fill dir");
    let err = write_atomic(&target, b"<svg/>").unwrap_err();
    assert!(matches!(err, BenchError::Io(_)));
    assert!(target.is_dir());
    assert_eq!(partial_files(dir.path()), 0);
}
