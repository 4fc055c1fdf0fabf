//! # File Table Tests
//!
//! Tests for descriptor reservation and open/close bookkeeping.

use mipsim_core::common::SimError;
use mipsim_core::mem::files::{FileMode, FileTable};

#[test]
fn test_standard_streams_are_prebound() {
    let table = FileTable::new();
    for fd in 0..3 {
        assert!(table.is_open(fd));
    }
    assert!(!table.is_open(3));
}

#[test]
fn test_standard_streams_cannot_be_closed() {
    let mut table = FileTable::new();
    for fd in 0..3 {
        assert_eq!(table.close(fd), Err(SimError::BadDescriptor(fd)));
    }
}

#[test]
fn test_close_of_unopened_descriptor_fails() {
    let mut table = FileTable::new();
    assert_eq!(table.close(7), Err(SimError::BadDescriptor(7)));
}

#[test]
fn test_open_missing_file_for_read_is_io_error() {
    let mut table = FileTable::new();
    let err = table.open("/definitely/not/here", FileMode::Read).unwrap_err();
    assert!(matches!(err, SimError::Io(_)));
}

#[test]
fn test_open_write_close_cycle() {
    let path = std::env::temp_dir().join(format!("mipsim-files-{}.txt", std::process::id()));
    let path = path.to_string_lossy().into_owned();

    let mut table = FileTable::new();
    let fd = table.open(&path, FileMode::Write).unwrap();
    assert!(fd >= 3);
    assert!(table.is_open(fd));
    table.close(fd).unwrap();
    assert!(!table.is_open(fd));

    // Descriptors are not reused within one table.
    let fd2 = table.open(&path, FileMode::Append).unwrap();
    assert!(fd2 > fd);
    table.close(fd2).unwrap();
    let _ = std::fs::remove_file(&path);
}

#[test]
fn test_mode_flag_decoding() {
    assert_eq!(FileMode::from_flags(0), Some(FileMode::Read));
    assert_eq!(FileMode::from_flags(1), Some(FileMode::Write));
    assert_eq!(FileMode::from_flags(9), Some(FileMode::Append));
    assert_eq!(FileMode::from_flags(2), None);
}
