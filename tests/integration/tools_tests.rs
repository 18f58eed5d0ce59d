use std::fs;
use std::sync::atomic::AtomicBool;

use tempfile::tempdir;
use utilbox::duplicates::find_duplicates;
use utilbox::tools::checksum::{compare_files, digest_file, Comparison};
use utilbox::tools::disk_usage::disk_usage;
use utilbox::tools::search::{search, SearchOptions};
use utilbox::tools::tree::{build_tree, TreeOptions};
use utilbox::tools::ToolError;

#[test]
fn test_compare_agrees_with_duplicate_finder() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("one"), "matching payload").unwrap();
    fs::write(dir.path().join("two"), "matching payload").unwrap();

    let groups = find_duplicates(dir.path(), 0).unwrap();
    assert_eq!(groups.len(), 1);

    let comparison = compare_files(&dir.path().join("one"), &dir.path().join("two")).unwrap();
    assert_eq!(comparison, Comparison::Identical { size: 16 });

    let digests = digest_file(&dir.path().join("one")).unwrap();
    assert_eq!(digests.blake3, groups[0].hash_hex());
}

#[test]
fn test_compare_different_sizes() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("short"), "abc").unwrap();
    fs::write(dir.path().join("long"), "abcdef").unwrap();

    let comparison =
        compare_files(&dir.path().join("short"), &dir.path().join("long")).unwrap();
    assert_eq!(comparison, Comparison::DifferentSize { first: 3, second: 6 });
    assert!(!comparison.is_identical());
}

#[test]
fn test_tools_honor_shutdown_flag() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("file.txt"), "x").unwrap();
    let flag = AtomicBool::new(true);

    assert!(matches!(
        disk_usage(dir.path(), 1, Some(&flag)),
        Err(ToolError::Interrupted)
    ));
    assert!(matches!(
        search(dir.path(), &SearchOptions::new("file"), Some(&flag)),
        Err(ToolError::Interrupted)
    ));
}

#[test]
fn test_search_descends_into_hidden_directories() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join(".config/app")).unwrap();
    fs::write(dir.path().join(".config/app/settings.toml"), "").unwrap();

    let report = search(dir.path(), &SearchOptions::new("settings"), None).unwrap();
    assert_eq!(report.matches.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_tree_marks_unreadable_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("secret"), "").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Root can list anything; only assert when the permission bites
    let readable = fs::read_dir(&locked).is_ok();
    let report = build_tree(dir.path(), TreeOptions::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
    if readable {
        return;
    }

    let report = report.unwrap();
    assert!(report
        .lines
        .iter()
        .any(|line| line.ends_with("[Permission Denied]")));
    assert!(!report.lines.iter().any(|line| line.contains("secret")));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_counts_as_skipped() {
    use std::os::unix::fs::PermissionsExt;

    let dir = tempdir().unwrap();
    fs::write(dir.path().join("visible.txt"), "data").unwrap();
    let locked = dir.path().join("locked");
    fs::create_dir(&locked).unwrap();
    fs::write(locked.join("visible_too.txt"), "data").unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    let readable = fs::read_dir(&locked).is_ok();
    let usage = disk_usage(dir.path(), 1, None);
    let found = search(dir.path(), &SearchOptions::new("visible"), None);
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    let (usage, found) = (usage.unwrap(), found.unwrap());
    if readable {
        assert_eq!(usage.skipped, 0);
        assert_eq!(found.skipped, 0);
        return;
    }

    assert_eq!(usage.skipped, 1);
    assert_eq!(found.skipped, 1);
    assert_eq!(found.matches.len(), 1);
}
