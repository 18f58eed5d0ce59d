//! Recursive disk usage per directory.

use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use bytesize::ByteSize;
use jwalk::WalkDir;
use serde::Serialize;

use super::ToolError;

/// One directory and the bytes beneath it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiskUsageEntry {
    /// Path relative to the report root (`/`-joined components)
    pub name: String,
    /// Depth below the root (1 = direct child)
    pub depth: usize,
    /// Total size of regular files beneath this directory
    pub size: u64,
}

/// Result of [`disk_usage`].
#[derive(Debug, Clone, Serialize)]
pub struct DiskUsageReport {
    /// The path that was measured
    pub root: PathBuf,
    /// Total size of regular files under the root (or the file size)
    pub total: u64,
    /// Directories, largest first
    pub entries: Vec<DiskUsageEntry>,
    /// Entries that could not be read
    pub skipped: usize,
}

/// Measure the directories under `path` down to `depth` levels.
///
/// When `path` is a regular file the report holds that single file.
/// Symbolic links are never followed and unreadable entries are counted
/// in [`DiskUsageReport::skipped`].
///
/// # Errors
///
/// Returns [`ToolError::NotFound`] for a missing path and
/// [`ToolError::Interrupted`] if `shutdown` is raised during the walk.
pub fn disk_usage(
    path: &Path,
    depth: usize,
    shutdown: Option<&AtomicBool>,
) -> Result<DiskUsageReport, ToolError> {
    let metadata = std::fs::metadata(path).map_err(|e| ToolError::from_io(path, e))?;

    if metadata.is_file() {
        return Ok(DiskUsageReport {
            root: path.to_path_buf(),
            total: metadata.len(),
            entries: vec![DiskUsageEntry {
                name: path.display().to_string(),
                depth: 0,
                size: metadata.len(),
            }],
            skipped: 0,
        });
    }

    let depth = depth.max(1);
    let mut sizes: HashMap<PathBuf, (usize, u64)> = HashMap::new();
    let mut total = 0u64;
    let mut skipped = 0usize;

    let walk = WalkDir::new(path)
        .follow_links(false)
        .skip_hidden(false)
        .sort(true);

    for entry in walk {
        if shutdown.is_some_and(|flag| flag.load(Ordering::SeqCst)) {
            return Err(ToolError::Interrupted);
        }

        let mut entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable entry: {}", e);
                skipped += 1;
                continue;
            }
        };
        if let Some(e) = entry.read_children_error.take() {
            log::warn!("Skipping unreadable directory: {}", e);
            skipped += 1;
        }

        let entry_path = entry.path();
        let Ok(relative) = entry_path.strip_prefix(path) else {
            continue;
        };
        let components: Vec<_> = relative.components().collect();
        if components.is_empty() {
            continue;
        }

        let file_type = entry.file_type();
        if file_type.is_dir() {
            if components.len() <= depth {
                sizes.entry(relative.to_path_buf()).or_insert((components.len(), 0));
            }
            continue;
        }
        if !file_type.is_file() {
            continue;
        }

        let size = match std::fs::symlink_metadata(&entry_path) {
            Ok(m) => m.len(),
            Err(e) => {
                log::warn!("Skipping {}: {}", entry_path.display(), e);
                skipped += 1;
                continue;
            }
        };

        total += size;

        let ancestors = (components.len() - 1).min(depth);
        let mut key = PathBuf::new();
        for (level, component) in components.iter().take(ancestors).enumerate() {
            key.push(component);
            sizes.entry(key.clone()).or_insert((level + 1, 0)).1 += size;
        }
    }

    let mut entries: Vec<DiskUsageEntry> = sizes
        .into_iter()
        .map(|(rel, (depth, size))| DiskUsageEntry {
            name: rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect::<Vec<_>>()
                .join("/"),
            depth,
            size,
        })
        .collect();

    entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.name.cmp(&b.name)));

    Ok(DiskUsageReport {
        root: path.to_path_buf(),
        total,
        entries,
        skipped,
    })
}

/// Format a byte count as `"<n> bytes"` or, with `human`, like `1.5 KiB`.
#[must_use]
pub fn format_size(size: u64, human: bool) -> String {
    if human {
        ByteSize(size).to_string()
    } else {
        format!("{} bytes", size)
    }
}

/// Render a report as `"{size:>12} - {name}"` lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_disk_usage<W: Write>(
    writer: &mut W,
    report: &DiskUsageReport,
    human: bool,
) -> io::Result<()> {
    writeln!(writer, "Disk usage for: {}", report.root.display())?;
    writeln!(writer)?;

    for entry in &report.entries {
        writeln!(writer, "{:>12} - {}", format_size(entry.size, human), entry.name)?;
    }

    writeln!(writer, "{:>12} - (total)", format_size(report.total, human))?;

    if report.skipped > 0 {
        writeln!(writer, "Skipped {} unreadable entries.", report.skipped)?;
    }
    Ok(())
}
