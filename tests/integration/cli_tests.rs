use std::fs;
use std::path::Path;

use clap::Parser;
use tempfile::{tempdir, TempDir};
use utilbox::cli::Cli;
use utilbox::error::ExitCode;
use utilbox::run_app_with_writer;

/// Run utilbox with `args`, isolated from any user config file.
fn run(config_dir: &Path, args: &[&str]) -> (anyhow::Result<ExitCode>, String) {
    let config = config_dir.join("utilbox-test.toml");
    let config = config.to_string_lossy().into_owned();
    let mut argv = vec!["utilbox", "--no-color", "--config", config.as_str()];
    argv.extend_from_slice(args);

    let cli = Cli::try_parse_from(argv).unwrap();
    let mut out = Vec::new();
    let result = run_app_with_writer(cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

fn hello_world_dir() -> TempDir {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::write(dir.path().join("b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();
    dir
}

#[test]
fn test_duplicates_text_output() {
    let dir = hello_world_dir();
    let root = dir.path().to_str().unwrap();

    let (result, out) = run(dir.path(), &["files", "duplicates", root, "--no-progress"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("Scanning for duplicates in: "));
    assert!(out.contains("Minimum file size: 0 bytes"));
    assert!(out.contains("Duplicate files (hash: "));
    assert!(out.contains("a.txt (5 bytes)"));
    assert!(out.contains("b.txt (5 bytes)"));
    assert!(!out.contains("c.txt"));
    assert!(out.contains("Found 1 duplicate group(s): 1 redundant file(s)"));
}

#[test]
fn test_duplicates_min_size_no_duplicates() {
    let dir = hello_world_dir();
    let root = dir.path().to_str().unwrap();

    let (result, out) = run(
        dir.path(),
        &["files", "duplicates", root, "--min-size", "10", "--no-progress"],
    );

    assert_eq!(result.unwrap(), ExitCode::NoDuplicates);
    assert!(out.contains("Minimum file size: 10 bytes"));
    assert!(out.contains("No duplicate files found."));
}

#[test]
fn test_duplicates_json_output() {
    let dir = hello_world_dir();
    let root = dir.path().to_str().unwrap();

    let (result, out) = run(dir.path(), &["files", "duplicates", root, "-o", "json"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let value: serde_json::Value = serde_json::from_str(&out).unwrap();
    let duplicates = value["duplicates"].as_array().unwrap();
    assert_eq!(duplicates.len(), 1);
    assert_eq!(duplicates[0]["size"], 5);
    assert_eq!(duplicates[0]["files"].as_array().unwrap().len(), 2);
    assert_eq!(
        duplicates[0]["hash"].as_str().unwrap(),
        blake3::hash(b"hello").to_hex().as_str()
    );
    assert_eq!(value["summary"]["exit_code"], 0);
    assert_eq!(value["summary"]["exit_code_name"], "UB000");
    assert!(value["skipped"].as_array().unwrap().is_empty());
}

#[test]
fn test_duplicates_csv_output() {
    let dir = hello_world_dir();
    let root = dir.path().to_str().unwrap();

    let (result, out) = run(dir.path(), &["files", "duplicates", root, "--output", "csv"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0], "group,hash,size,path");
    assert!(lines[1].starts_with("1,"));
    assert!(lines[1].ends_with("a.txt"));
    assert!(lines[2].ends_with("b.txt"));
}

#[test]
fn test_duplicates_config_file_sets_min_size() {
    let dir = hello_world_dir();
    let root = dir.path().to_str().unwrap();
    fs::write(dir.path().join("utilbox-test.toml"), "min_size = 100\n").unwrap();

    let (result, out) = run(dir.path(), &["files", "duplicates", root, "--no-progress"]);

    assert_eq!(result.unwrap(), ExitCode::NoDuplicates);
    assert!(out.contains("Minimum file size: 100 bytes"));

    // The command line wins over the file
    let (result, _) = run(
        dir.path(),
        &["files", "duplicates", root, "--min-size", "0", "--no-progress"],
    );
    assert_eq!(result.unwrap(), ExitCode::Success);
}

#[test]
fn test_invalid_config_file_is_fatal() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("utilbox-test.toml"), "io_threads = \"many\"\n").unwrap();

    let (result, _) = run(dir.path(), &["admin", "env"]);

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{:#}", err).contains("Failed to load config"));
}

#[test]
fn test_duplicates_missing_path() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");

    let (result, _) = run(
        dir.path(),
        &["files", "duplicates", missing.to_str().unwrap()],
    );

    let err = result.unwrap_err();
    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_utils_hash_text() {
    let dir = tempdir().unwrap();
    let (result, out) = run(dir.path(), &["utils", "hash", "hello"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains(blake3::hash(b"hello").to_hex().as_str()));
    assert!(out.contains("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"));
}

#[test]
fn test_utils_hashfile_and_compare() {
    let dir = hello_world_dir();
    let a = dir.path().join("a.txt");
    let b = dir.path().join("b.txt");
    let c = dir.path().join("c.txt");

    let (result, out) = run(dir.path(), &["utils", "hashfile", a.to_str().unwrap()]);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains(blake3::hash(b"hello").to_hex().as_str()));

    let (result, out) = run(
        dir.path(),
        &["utils", "compare", a.to_str().unwrap(), b.to_str().unwrap()],
    );
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out.trim(), "Identical (5 bytes)");

    let (result, out) = run(
        dir.path(),
        &["utils", "compare", a.to_str().unwrap(), c.to_str().unwrap()],
    );
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out.trim(), "Different (same size, different content)");
}

#[test]
fn test_utils_hashfile_missing() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("nope.bin");
    let (result, _) = run(dir.path(), &["utils", "hashfile", missing.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_utils_base64() {
    let dir = tempdir().unwrap();

    let (result, out) = run(dir.path(), &["utils", "base64", "hello"]);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out, "aGVsbG8=\n");

    let (result, out) = run(dir.path(), &["utils", "base64", "aGVsbG8=", "--decode"]);
    assert_eq!(result.unwrap(), ExitCode::Success);
    assert_eq!(out, "hello\n");

    let (result, _) = run(dir.path(), &["utils", "base64", "%%%", "-d"]);
    assert!(result.is_err());
}

#[test]
fn test_utils_tree() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src/nested")).unwrap();
    fs::write(dir.path().join("src/lib.rs"), "").unwrap();
    fs::write(dir.path().join("README"), "").unwrap();
    fs::write(dir.path().join(".hidden"), "").unwrap();

    let root = dir.path().to_str().unwrap();
    let (result, out) = run(dir.path(), &["utils", "tree", root, "--depth", "2"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with(root));
    assert!(out.contains("├── README"));
    assert!(out.contains("└── src"));
    assert!(out.contains("    ├── lib.rs"));
    assert!(out.contains("    └── nested"));
    assert!(!out.contains(".hidden"));
    assert!(out.ends_with("2 directories, 2 files\n"));
}

#[test]
fn test_files_diskusage() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("data")).unwrap();
    fs::write(dir.path().join("data/blob"), vec![0u8; 2048]).unwrap();
    fs::write(dir.path().join("top.txt"), vec![0u8; 10]).unwrap();

    let root = dir.path().to_str().unwrap();
    let (result, out) = run(dir.path(), &["files", "diskusage", root, "--depth", "1"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("Disk usage for: "));
    assert!(out.contains("  2048 bytes - data"));
    assert!(out.contains("  2058 bytes - (total)"));
}

#[test]
fn test_files_search() {
    let dir = tempdir().unwrap();
    fs::create_dir_all(dir.path().join("src")).unwrap();
    fs::write(dir.path().join("src/Main.rs"), "fn main() {}").unwrap();
    fs::write(dir.path().join("src/main.py"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();

    let root = dir.path().to_str().unwrap();
    let (result, out) = run(dir.path(), &["files", "search", "main", root, "-e", ".rs"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Main.rs (12 bytes)"));
    assert!(!out.contains("main.py"));
    assert!(out.contains("Found 1 matching file(s)."));
}

#[test]
fn test_files_search_invalid_regex() {
    let dir = tempdir().unwrap();
    let root = dir.path().to_str().unwrap();
    let (result, _) = run(dir.path(), &["files", "search", "(", root, "--regex"]);
    assert!(result.is_err());
}

#[test]
fn test_admin_hosts_with_file() {
    let dir = tempdir().unwrap();
    let hosts = dir.path().join("hosts");
    fs::write(&hosts, "# local\n127.0.0.1 localhost\n").unwrap();

    let (result, out) = run(dir.path(), &["admin", "hosts", "--file", hosts.to_str().unwrap()]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("   1 | # local"));
    assert!(out.contains("   2 | 127.0.0.1 localhost"));
}

#[test]
fn test_admin_hosts_missing_file() {
    let dir = tempdir().unwrap();
    let hosts = dir.path().join("hosts");
    let (result, _) = run(dir.path(), &["admin", "hosts", "--file", hosts.to_str().unwrap()]);
    assert!(result.is_err());
}

#[test]
fn test_admin_env() {
    let dir = tempdir().unwrap();
    let (result, out) = run(dir.path(), &["admin", "env"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("Environment Variables\n"));
    assert!(out.contains("Total: "));
}

#[test]
fn test_system_info() {
    let dir = tempdir().unwrap();
    let (result, out) = run(dir.path(), &["system", "info"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.contains("Architecture:"));
    assert!(out.contains("Memory total:"));
}

#[test]
fn test_system_monitor_single_reading() {
    let dir = tempdir().unwrap();
    let (result, out) = run(
        dir.path(),
        &["system", "monitor", "--interval", "0.01", "--count", "1"],
    );

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("System Resource Monitor\n"));
    assert!(out.contains("Reading 1/1:"));
    assert!(out.contains("CPU Usage:"));
    assert!(!out.contains("Reading 2/"));
}

#[test]
fn test_admin_interfaces() {
    let dir = tempdir().unwrap();
    let (result, out) = run(dir.path(), &["admin", "interfaces"]);

    assert_eq!(result.unwrap(), ExitCode::Success);
    assert!(out.starts_with("Network Interfaces (User Space)\n"));
}
