use std::fs::{self, File};
use std::io::Write;

use tempfile::tempdir;
use utilbox::duplicates::{find_duplicates, DuplicateFinder, FinderConfig};
use utilbox::scanner::WalkerConfig;

#[test]
fn test_scan_empty_directory() {
    let dir = tempdir().unwrap();
    let finder = DuplicateFinder::with_defaults();

    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 0);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_hello_world() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();

    let groups = find_duplicates(dir.path(), 0).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 5);
    let names: Vec<_> = groups[0]
        .files
        .iter()
        .map(|f| f.path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.txt", "b.txt"]);
    assert!(groups[0].files.iter().all(|f| f.path.is_absolute()));
}

#[test]
fn test_scan_ignores_gitignore_in_tree() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join(".gitignore"), "*.txt\n").unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();

    let groups = find_duplicates(dir.path(), 0).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
fn test_scan_hello_world_min_size_excludes_all() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();

    let groups = find_duplicates(dir.path(), 10).unwrap();
    assert!(groups.is_empty());
}

#[test]
fn test_scan_unique_files() {
    let dir = tempdir().unwrap();

    File::create(dir.path().join("a.txt"))
        .unwrap()
        .write_all(b"content a")
        .unwrap();
    File::create(dir.path().join("b.txt"))
        .unwrap()
        .write_all(b"content b")
        .unwrap();
    File::create(dir.path().join("c.txt"))
        .unwrap()
        .write_all(b"content c")
        .unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.hashed_files, 3);
    assert_eq!(summary.duplicate_groups, 0);
}

#[test]
fn test_scan_nested_directories() {
    let dir = tempdir().unwrap();
    let sub = dir.path().join("subdir");
    let deeper = sub.join("deeper");
    fs::create_dir_all(&deeper).unwrap();

    fs::write(dir.path().join("a.txt"), "nested content").unwrap();
    fs::write(sub.join("b.txt"), "nested content").unwrap();
    fs::write(deeper.join("c.txt"), "nested content").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].files.len(), 3);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 2 * 14);
}

#[test]
fn test_scan_same_size_different_content() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.bin"), "aaaa").unwrap();
    fs::write(dir.path().join("b.bin"), "bbbb").unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.eliminated_by_size, 0);
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_scan_multiple_groups_sorted_by_hash() {
    let dir = tempdir().unwrap();
    for (name, content) in [
        ("a1", "first"),
        ("a2", "first"),
        ("b1", "second!"),
        ("b2", "second!"),
        ("b3", "second!"),
    ] {
        fs::write(dir.path().join(name), content).unwrap();
    }

    let finder = DuplicateFinder::with_defaults();
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 2);
    assert!(groups[0].hash <= groups[1].hash);
    for group in &groups {
        let paths = group.paths();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }
}

#[test]
fn test_scan_max_size_filter() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("small1"), "tiny").unwrap();
    fs::write(dir.path().join("small2"), "tiny").unwrap();
    fs::write(dir.path().join("big1"), "x".repeat(500)).unwrap();
    fs::write(dir.path().join("big2"), "x".repeat(500)).unwrap();

    let walker_config = WalkerConfig {
        max_size: Some(100),
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (groups, _) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].size, 4);
}

#[test]
fn test_scan_skip_hidden_and_ignore_patterns() {
    let dir = tempdir().unwrap();
    let hidden = dir.path().join(".cache");
    fs::create_dir(&hidden).unwrap();
    fs::write(hidden.join("copy.txt"), "payload").unwrap();
    fs::write(dir.path().join("orig.txt"), "payload").unwrap();
    fs::write(dir.path().join("copy.tmp"), "payload").unwrap();

    let walker_config = WalkerConfig {
        skip_hidden: true,
        ignore_patterns: vec!["*.tmp".to_string()],
        ..WalkerConfig::default()
    };
    let finder = DuplicateFinder::new(FinderConfig::default().with_walker_config(walker_config));
    let (groups, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert!(groups.is_empty());
    assert_eq!(summary.total_files, 1);
}

#[test]
fn test_scan_rejects_file_root() {
    let dir = tempdir().unwrap();
    let file = dir.path().join("file.txt");
    fs::write(&file, "x").unwrap();

    assert!(find_duplicates(&file, 0).is_err());
    assert!(find_duplicates(&dir.path().join("missing"), 0).is_err());
}
