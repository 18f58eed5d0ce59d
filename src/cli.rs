//! Command-line interface definitions for utilbox.
//!
//! Commands are grouped the way they are used: `files`, `utils`, `admin`
//! and `system`. Global options (verbosity, color, error format, config
//! file) apply to every command.
//!
//! # Example
//!
//! ```bash
//! # Find duplicates of at least 1 MB, as JSON
//! utilbox files duplicates ~/Downloads --min-size 1MB --output json
//!
//! # Directory sizes two levels deep
//! utilbox files diskusage ~/projects --depth 2 --human
//!
//! # Debug logging
//! utilbox -v utils tree .
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

/// User-space command-line toolbox.
///
/// Duplicate finder, disk usage, file search, checksums, tree view and a
/// few read-only system views, none of which need administrator rights.
#[derive(Debug, Parser)]
#[command(name = "utilbox")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Report errors as JSON on stderr
    #[arg(long, global = true)]
    pub json_errors: bool,

    /// Use this configuration file instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Command group to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level command groups.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// File and directory operations
    #[command(subcommand)]
    Files(FilesCommand),
    /// Small everyday utilities
    #[command(subcommand)]
    Utils(UtilsCommand),
    /// Read-only administrative views
    #[command(subcommand)]
    Admin(AdminCommand),
    /// System information
    #[command(subcommand)]
    System(SystemCommand),
}

/// `files` subcommands.
#[derive(Debug, Subcommand)]
pub enum FilesCommand {
    /// Find files with identical content
    Duplicates(DuplicatesArgs),
    /// Show the size of each directory
    #[command(name = "diskusage")]
    DiskUsage(DiskUsageArgs),
    /// Search for files by name
    Search(SearchArgs),
}

/// `utils` subcommands.
#[derive(Debug, Subcommand)]
pub enum UtilsCommand {
    /// BLAKE3 and SHA-256 digests of a text
    Hash {
        /// Text to hash
        text: String,
    },
    /// BLAKE3 and SHA-256 digests of a file
    #[command(name = "hashfile")]
    HashFile {
        /// File to hash
        file: PathBuf,
    },
    /// Check whether two files have the same content
    Compare {
        /// First file
        first: PathBuf,
        /// Second file
        second: PathBuf,
    },
    /// Display a directory tree
    Tree(TreeArgs),
    /// Base64 encode or decode a text
    Base64 {
        /// Text to encode (or decode with --decode)
        text: String,
        /// Decode instead of encode
        #[arg(short, long)]
        decode: bool,
    },
}

/// `admin` subcommands.
#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// Show the hosts file with line numbers
    Hosts {
        /// Hosts file to show (default from config, usually /etc/hosts)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// List environment variables
    Env,
    /// Show network interfaces with traffic counters
    Interfaces,
}

/// `system` subcommands.
#[derive(Debug, Subcommand)]
pub enum SystemCommand {
    /// Operating system, CPU and memory overview
    Info,
    /// Sample CPU and memory usage at a fixed interval
    Monitor {
        /// Seconds between readings (fractions allowed)
        #[arg(long, value_name = "SECONDS", default_value = "1", value_parser = parse_interval)]
        interval: Duration,

        /// Number of readings to take
        #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
        count: u32,
    },
}

/// Arguments for `files duplicates`.
#[derive(Debug, Args)]
pub struct DuplicatesArgs {
    /// Directory path to scan for duplicates
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Minimum file size to consider, inclusive (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Maximum file size to consider, inclusive (e.g., 1KB, 1MB, 1GB)
    ///
    /// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub max_size: Option<u64>,

    /// Glob patterns to ignore (can be specified multiple times)
    ///
    /// Patterns are matched relative to the scan root. Ignore files in the
    /// scanned tree are not read.
    #[arg(short, long = "ignore", value_name = "PATTERN")]
    pub ignore_patterns: Vec<String>,

    /// Follow symbolic links during scan
    ///
    /// Warning: May cause infinite loops if symlinks form cycles.
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Skip hidden files and directories (starting with .)
    #[arg(long)]
    pub skip_hidden: bool,

    /// Number of I/O threads for hashing (default from config, usually 4)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..))]
    pub io_threads: Option<u16>,

    /// Abort on the first unreadable file instead of skipping it
    #[arg(long)]
    pub strict: bool,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,

    /// Do not show progress bars
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for `files diskusage`.
#[derive(Debug, Args)]
pub struct DiskUsageArgs {
    /// Directory (or file) to measure
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Directory depth to display (default from config, usually 1)
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Display sizes in human-readable format
    #[arg(long)]
    pub human: bool,
}

/// Arguments for `files search`.
#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Name pattern (substring or glob; regex with --regex)
    pub pattern: String,

    /// Directory to search
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Filter by file extension (e.g., .py, .txt)
    #[arg(short, long, value_name = "EXT")]
    pub extension: Option<String>,

    /// Make search case-sensitive
    #[arg(long)]
    pub case_sensitive: bool,

    /// Treat PATTERN as a regular expression
    #[arg(long)]
    pub regex: bool,
}

/// Arguments for `utils tree`.
#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Directory to display
    #[arg(value_name = "PATH", default_value = ".")]
    pub path: PathBuf,

    /// Maximum depth (default from config, usually 2)
    #[arg(long, value_name = "N")]
    pub depth: Option<usize>,

    /// Show hidden entries at the top level
    #[arg(short, long)]
    pub all: bool,
}

/// Output format for duplicate scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output for scripting
    Json,
    /// CSV output for spreadsheets
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, K/KB, KiB, M/MB, MiB, G/GB, GiB, T/TB, TiB.
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use utilbox::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("1MiB").unwrap(), 1_048_576);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    if num < 0.0 {
        return Err("Size cannot be negative".to_string());
    }

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}

/// Parse a positive number of seconds, fractions allowed.
///
/// # Errors
///
/// Returns an error for non-numeric, negative, zero or non-finite input.
pub fn parse_interval(s: &str) -> Result<Duration, String> {
    let seconds: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("Invalid interval: '{}'", s))?;
    if seconds <= 0.0 {
        return Err(format!("Interval must be positive: '{}'", s));
    }
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("Invalid interval '{}': {}", s, e))
}
