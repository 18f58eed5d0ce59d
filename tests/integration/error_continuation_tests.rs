use std::fs;
use std::path::PathBuf;

use tempfile::tempdir;
use utilbox::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use utilbox::scanner::{FileEntry, HashError, ScanError};

#[test]
fn test_find_duplicates_from_files_continues_on_error() {
    let finder = DuplicateFinder::with_defaults();
    // Files that don't exist trigger hashing errors
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let (groups, summary) = finder
        .find_duplicates_from_files(vec![file1, file2])
        .unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.scan_errors.len(), 2);

    for err in &summary.scan_errors {
        match err {
            ScanError::HashError(HashError::NotFound(_)) => {}
            _ => panic!("Expected NotFound HashError, got: {:?}", err),
        }
    }
}

#[test]
fn test_find_duplicates_from_files_strict_fails() {
    let config = FinderConfig::default().with_strict(true);
    let finder = DuplicateFinder::new(config);
    let file1 = FileEntry::new(PathBuf::from("nonexistent_1.txt"), 100);
    let file2 = FileEntry::new(PathBuf::from("nonexistent_2.txt"), 100);

    let result = finder.find_duplicates_from_files(vec![file1, file2]);

    match result.unwrap_err() {
        FinderError::ScanError(ScanError::HashError(HashError::NotFound(_))) => {}
        other => panic!("Expected NotFound ScanError, got: {:?}", other),
    }
}

#[test]
fn test_one_vanished_file_among_three_duplicates() {
    let dir = tempdir().unwrap();
    let mut entries = Vec::new();
    for name in ["a.txt", "b.txt", "c.txt"] {
        let path = dir.path().join(name);
        fs::write(&path, "same bytes").unwrap();
        entries.push(FileEntry::new(path, 10));
    }
    // Removed between enumeration and hashing
    fs::remove_file(dir.path().join("b.txt")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates_from_files(entries).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].reason(), "not_found");
    assert!(summary.scan_errors[0].path().ends_with("b.txt"));
}

#[test]
fn test_one_vanished_file_among_two_duplicates() {
    let dir = tempdir().unwrap();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    fs::write(&a, "pair").unwrap();
    fs::write(&b, "pair").unwrap();
    let entries = vec![FileEntry::new(a, 4), FileEntry::new(b.clone(), 4)];
    fs::remove_file(&b).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates_from_files(entries).unwrap();

    assert!(groups.is_empty());
    assert!(summary.has_errors());
}

#[cfg(unix)]
#[test]
fn test_unreadable_file_is_skipped_during_scan() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    for name in ["a.txt", "b.txt", "c.txt"] {
        fs::write(dir.path().join(name), "locked content").unwrap();
    }
    let locked = dir.path().join("c.txt");
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can read anything; only assert when the permission bites
    if fs::read(&locked).is_ok() {
        return;
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    fs::set_permissions(&locked, fs::Permissions::from_mode(0o644)).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
    assert_eq!(summary.scan_errors.len(), 1);
    assert_eq!(summary.scan_errors[0].reason(), "permission_denied");
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_keeps_other_duplicates() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "shared bytes").unwrap();
    fs::write(dir.path().join("b.txt"), "shared bytes").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("c.txt"), "shared bytes").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let readable = fs::read_dir(&locked).is_ok();
    let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (groups, summary) = result.unwrap();
    assert_eq!(groups.len(), 1);
    if readable {
        // Running with root privileges: nothing is skipped
        assert_eq!(groups[0].files.len(), 3);
        return;
    }

    assert_eq!(groups[0].files.len(), 2);
    assert!(summary
        .scan_errors
        .iter()
        .any(|e| e.reason() == "permission_denied"));
}
