//! Directory tree rendering.

use std::fs;
use std::io::{self, Write};
use std::path::Path;

use super::{is_hidden_name, ToolError};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

/// Options for [`build_tree`].
#[derive(Debug, Clone, Copy)]
pub struct TreeOptions {
    /// Number of levels to show below the root
    pub depth: usize,
    /// Include dot-entries at the top level
    pub show_hidden: bool,
}

impl Default for TreeOptions {
    fn default() -> Self {
        Self {
            depth: 2,
            show_hidden: false,
        }
    }
}

/// Rendered tree.
#[derive(Debug, Clone, Default)]
pub struct TreeReport {
    /// Root line followed by one line per entry
    pub lines: Vec<String>,
    /// Directories listed
    pub directories: usize,
    /// Non-directory entries listed
    pub files: usize,
}

/// Build the tree under `root`.
///
/// Children are sorted by name. Symlinked directories are listed but not
/// descended into. An unreadable directory yields a `[Permission Denied]`
/// line at its position and rendering continues.
///
/// # Errors
///
/// Returns [`ToolError::NotFound`] or [`ToolError::NotADirectory`] for a bad root.
pub fn build_tree(root: &Path, options: TreeOptions) -> Result<TreeReport, ToolError> {
    let metadata = fs::metadata(root).map_err(|e| ToolError::from_io(root, e))?;
    if !metadata.is_dir() {
        return Err(ToolError::NotADirectory(root.to_path_buf()));
    }

    let mut report = TreeReport {
        lines: vec![root.display().to_string()],
        ..Default::default()
    };
    walk(root, "", 0, options, &mut report);
    Ok(report)
}

// Sequential read_dir recursion: each listing must be complete before
// drawing so the last child gets the closing connector.
fn walk(dir: &Path, prefix: &str, level: usize, options: TreeOptions, report: &mut TreeReport) {
    if level >= options.depth {
        return;
    }

    let read_dir = match fs::read_dir(dir) {
        Ok(read_dir) => read_dir,
        Err(e) => {
            log::debug!("Cannot list {}: {}", dir.display(), e);
            let marker = if e.kind() == io::ErrorKind::PermissionDenied {
                "[Permission Denied]".to_string()
            } else {
                format!("[Error: {}]", e)
            };
            report.lines.push(format!("{}{}", prefix, marker));
            return;
        }
    };

    let mut entries: Vec<fs::DirEntry> = read_dir
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                log::warn!("Skipping entry in {}: {}", dir.display(), e);
                None
            }
        })
        .filter(|entry| level > 0 || options.show_hidden || !is_hidden_name(&entry.file_name()))
        .collect();
    entries.sort_by_key(fs::DirEntry::file_name);

    let count = entries.len();
    for (i, entry) in entries.into_iter().enumerate() {
        let is_last = i + 1 == count;
        let connector = if is_last { LAST_BRANCH } else { BRANCH };
        let name = entry.file_name().to_string_lossy().into_owned();

        let file_type = entry.file_type().ok();
        let is_symlink = file_type.is_some_and(|t| t.is_symlink());
        let is_dir = file_type.is_some_and(|t| t.is_dir());

        if is_symlink {
            let target = fs::read_link(entry.path())
                .map(|t| t.display().to_string())
                .unwrap_or_else(|_| "?".to_string());
            report.lines.push(format!("{}{}{} -> {}", prefix, connector, name, target));
            if entry.path().is_dir() {
                report.directories += 1;
            } else {
                report.files += 1;
            }
            continue;
        }

        report.lines.push(format!("{}{}{}", prefix, connector, name));

        if is_dir {
            report.directories += 1;
            let extension = if is_last { SPACE } else { PIPE };
            walk(
                &entry.path(),
                &format!("{}{}", prefix, extension),
                level + 1,
                options,
                report,
            );
        } else {
            report.files += 1;
        }
    }
}

/// Print the tree followed by a count line.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_tree<W: Write>(writer: &mut W, report: &TreeReport) -> io::Result<()> {
    for line in &report.lines {
        writeln!(writer, "{}", line)?;
    }
    writeln!(writer)?;
    writeln!(
        writer,
        "{} directories, {} files",
        report.directories, report.files
    )
}
