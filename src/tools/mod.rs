//! Everyday utilities that sit next to the duplicate finder.
//!
//! Each submodule exposes a library function returning a typed report plus
//! a `write_*` renderer used by the CLI:
//! - [`disk_usage`]: recursive directory sizes
//! - [`search`]: file-name search (substring, glob or regex)
//! - [`tree`]: directory tree rendering
//! - [`checksum`]: BLAKE3 / SHA-256 digests and file comparison
//! - [`encode`]: base64 encode / decode
//! - [`hosts`]: read-only hosts file view
//! - [`env`]: sorted environment listing
//! - [`interfaces`]: network interface counters
//! - [`system`]: OS, CPU and memory overview, resource monitor

pub mod checksum;
pub mod disk_usage;
pub mod encode;
pub mod env;
pub mod hosts;
pub mod interfaces;
pub mod search;
pub mod system;
pub mod tree;

use std::io;
use std::path::{Path, PathBuf};

/// Errors returned by the utilities.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    /// The given path does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A directory was required.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// The path exists but cannot be read.
    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },

    /// A search pattern could not be compiled.
    #[error("Invalid pattern '{pattern}': {message}")]
    InvalidPattern {
        /// The pattern as given
        pattern: String,
        /// Why it was rejected
        message: String,
    },

    /// Input was not valid base64.
    #[error("Invalid base64 input: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Decoded bytes were not valid UTF-8.
    #[error("Decoded data is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// The operation was cancelled with Ctrl+C.
    #[error("Operation interrupted by user")]
    Interrupted,
}

impl ToolError {
    /// Classify an I/O error raised while accessing `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }
}

/// `true` when the final component starts with a dot.
pub(crate) fn is_hidden_name(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}
