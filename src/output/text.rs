//! Human-readable text output for duplicate scan results.
//!
//! ```text
//! Duplicate files (hash: 1a2b3c4d...):
//!   - /data/a.txt (5 bytes)
//!   - /data/b.txt (5 bytes)
//!
//! Found 1 duplicate group(s): 1 redundant file(s), 5 B reclaimable.
//! ```

use std::io::{self, Write};

use yansi::Paint;

use crate::duplicates::{DuplicateGroup, ScanSummary};

/// Text output formatter.
pub struct TextOutput<'a> {
    groups: &'a [DuplicateGroup],
    summary: &'a ScanSummary,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(groups: &'a [DuplicateGroup], summary: &'a ScanSummary) -> Self {
        Self { groups, summary }
    }

    /// Write the report.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        if self.groups.is_empty() {
            writeln!(writer, "No duplicate files found.")?;
        } else {
            for group in self.groups {
                let hex = group.hash_hex();
                let short = &hex[..8.min(hex.len())];
                let header = format!("Duplicate files (hash: {}...):", short);
                writeln!(writer, "{}", header.bold())?;
                for file in &group.files {
                    writeln!(writer, "  - {} ({} bytes)", file.path.display(), file.size)?;
                }
                writeln!(writer)?;
            }

            writeln!(
                writer,
                "Found {} duplicate group(s): {} redundant file(s), {} reclaimable.",
                self.summary.duplicate_groups,
                self.summary.duplicate_files,
                self.summary.reclaimable_display()
            )?;
        }

        if self.summary.has_errors() {
            let note = format!(
                "Skipped {} unreadable entr{} (run with -v for details).",
                self.summary.scan_errors.len(),
                if self.summary.scan_errors.len() == 1 { "y" } else { "ies" }
            );
            writeln!(writer, "{}", note.yellow())?;
        }

        Ok(())
    }

    /// Render the report into a string.
    #[must_use]
    pub fn render(&self) -> String {
        let mut buffer = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut buffer);
        String::from_utf8_lossy(&buffer).into_owned()
    }
}
