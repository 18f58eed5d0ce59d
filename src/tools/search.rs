//! Recursive file-name search.
//!
//! A name matches when it contains the pattern, or matches the glob
//! `*pattern*` (so `*.rs`-style wildcards work). In regex mode the pattern
//! is a regular expression tested against the file name. Matching is
//! case-insensitive unless asked otherwise.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use jwalk::WalkDir;
use regex::{Regex, RegexBuilder};
use serde::Serialize;

use super::ToolError;

/// Search parameters.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Pattern to look for in file names
    pub pattern: String,
    /// Keep only names ending with this suffix (e.g. `.rs`)
    pub extension: Option<String>,
    /// Match case exactly
    pub case_sensitive: bool,
    /// Treat the pattern as a regular expression
    pub regex: bool,
}

impl SearchOptions {
    /// Substring/glob search for `pattern`.
    #[must_use]
    pub fn new(pattern: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Default::default()
        }
    }
}

/// A file whose name matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    /// Full path of the file
    pub path: PathBuf,
    /// Size in bytes
    pub size: u64,
}

/// Result of [`search`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchReport {
    /// Matches sorted by path
    pub matches: Vec<SearchMatch>,
    /// Entries that could not be read
    pub skipped: usize,
}

enum Matcher {
    Plain {
        needle: String,
        glob: Option<Gitignore>,
        case_sensitive: bool,
    },
    Regex(Regex),
}

impl Matcher {
    fn build(options: &SearchOptions) -> Result<Self, ToolError> {
        let invalid = |message: String| ToolError::InvalidPattern {
            pattern: options.pattern.clone(),
            message,
        };

        if options.regex {
            let regex = RegexBuilder::new(&options.pattern)
                .case_insensitive(!options.case_sensitive)
                .build()
                .map_err(|e| invalid(e.to_string()))?;
            return Ok(Self::Regex(regex));
        }

        let needle = if options.case_sensitive {
            options.pattern.clone()
        } else {
            options.pattern.to_lowercase()
        };

        let mut builder = GitignoreBuilder::new("");
        builder.case_insensitive(!options.case_sensitive).map_err(|e| invalid(e.to_string()))?;
        let glob = match builder.add_line(None, &wrap_glob(&options.pattern)) {
            Ok(_) => builder.build().ok(),
            Err(e) => {
                log::debug!("Pattern is not a valid glob, using substring only: {}", e);
                None
            }
        };

        Ok(Self::Plain {
            needle,
            glob,
            case_sensitive: options.case_sensitive,
        })
    }

    fn is_match(&self, name: &str) -> bool {
        match self {
            Self::Regex(regex) => regex.is_match(name),
            Self::Plain {
                needle,
                glob,
                case_sensitive,
            } => {
                let haystack = if *case_sensitive {
                    name.to_string()
                } else {
                    name.to_lowercase()
                };
                haystack.contains(needle.as_str())
                    || glob
                        .as_ref()
                        .is_some_and(|g| g.matched(Path::new(name), false).is_ignore())
            }
        }
    }
}

/// `*pattern*` without doubling stars the pattern already has.
fn wrap_glob(pattern: &str) -> String {
    let mut glob = String::with_capacity(pattern.len() + 2);
    if !pattern.starts_with('*') {
        glob.push('*');
    }
    glob.push_str(pattern);
    if !pattern.ends_with('*') {
        glob.push('*');
    }
    glob
}

/// Find regular files under `root` whose names match.
///
/// # Errors
///
/// Returns [`ToolError::NotFound`] / [`ToolError::NotADirectory`] for a bad
/// root, [`ToolError::InvalidPattern`] for a bad regex and
/// [`ToolError::Interrupted`] when `shutdown` is raised.
pub fn search(
    root: &Path,
    options: &SearchOptions,
    shutdown: Option<&AtomicBool>,
) -> Result<SearchReport, ToolError> {
    let metadata = std::fs::metadata(root).map_err(|e| ToolError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(ToolError::NotADirectory(root.to_path_buf()));
    }

    let matcher = Matcher::build(options)?;
    let mut report = SearchReport::default();

    for entry in WalkDir::new(root).follow_links(false).skip_hidden(false) {
        if shutdown.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(ToolError::Interrupted);
        }

        let mut entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                report.skipped += 1;
                continue;
            }
        };
        if let Some(e) = entry.read_children_error.take() {
            log::warn!("Skipping unreadable directory: {}", e);
            report.skipped += 1;
        }

        if !entry.file_type().is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(ref ext) = options.extension {
            if !name.ends_with(ext.as_str()) {
                continue;
            }
        }
        if !matcher.is_match(&name) {
            continue;
        }

        let path = entry.path();
        match std::fs::symlink_metadata(&path) {
            Ok(m) => report.matches.push(SearchMatch { path, size: m.len() }),
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                report.skipped += 1;
            }
        }
    }

    report.matches.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(report)
}

/// Render matches and the trailing count line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_search<W: Write>(writer: &mut W, report: &SearchReport) -> io::Result<()> {
    for m in &report.matches {
        writeln!(writer, "{} ({} bytes)", m.path.display(), m.size)?;
    }
    writeln!(writer)?;
    writeln!(writer, "Found {} matching file(s).", report.matches.len())
}
