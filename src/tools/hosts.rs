//! Read-only view of the hosts file.

use std::io::{self, Write};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

use serde::Serialize;
use yansi::Paint;

use super::ToolError;

/// One active mapping line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostEntry {
    /// 1-based line number in the file
    pub line: usize,
    /// Address column as written
    pub address: String,
    /// Whether the address parses as an IPv4/IPv6 address
    pub valid_address: bool,
    /// Host names mapped to the address
    pub names: Vec<String>,
}

/// The file contents plus parsed entries.
#[derive(Debug, Clone, Serialize)]
pub struct HostsFile {
    /// File that was read
    pub path: PathBuf,
    /// Raw lines, in order
    pub lines: Vec<String>,
    /// Active mappings
    pub entries: Vec<HostEntry>,
}

/// `true` for a non-blank line that is not a comment.
#[must_use]
pub fn is_active_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

/// Parse a single line; `None` for blanks, comments and lines without names.
#[must_use]
pub fn parse_line(number: usize, line: &str) -> Option<HostEntry> {
    let content = line.split('#').next().unwrap_or("");
    let mut fields = content.split_whitespace();
    let address = fields.next()?;
    let names: Vec<String> = fields.map(str::to_string).collect();
    if names.is_empty() {
        return None;
    }
    Some(HostEntry {
        line: number,
        address: address.to_string(),
        valid_address: address.parse::<IpAddr>().is_ok(),
        names,
    })
}

/// Read and parse the hosts file at `path`.
///
/// # Errors
///
/// Returns [`ToolError::NotFound`] or [`ToolError::PermissionDenied`] when
/// the file cannot be read.
pub fn read_hosts(path: &Path) -> Result<HostsFile, ToolError> {
    let content = std::fs::read_to_string(path).map_err(|e| ToolError::from_io(path, e))?;
    let lines: Vec<String> = content.lines().map(str::to_string).collect();
    let entries = lines
        .iter()
        .enumerate()
        .filter_map(|(i, line)| parse_line(i + 1, line))
        .collect();

    Ok(HostsFile {
        path: path.to_path_buf(),
        lines,
        entries,
    })
}

/// Print `"{n:4} | {line}"` for every line, active lines in bold.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_hosts<W: Write>(writer: &mut W, hosts: &HostsFile) -> io::Result<()> {
    writeln!(writer, "Contents of {}:", hosts.path.display())?;
    writeln!(writer)?;
    writeln!(writer, "{}", "=".repeat(60))?;

    for (i, line) in hosts.lines.iter().enumerate() {
        let rendered = format!("{:4} | {}", i + 1, line);
        if is_active_line(line) {
            writeln!(writer, "{}", rendered.bold())?;
        } else {
            writeln!(writer, "{}", rendered)?;
        }
    }

    for entry in hosts.entries.iter().filter(|e| !e.valid_address) {
        log::warn!(
            "Line {}: '{}' is not a valid IP address",
            entry.line,
            entry.address
        );
    }
    Ok(())
}
