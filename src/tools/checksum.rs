//! Text and file digests, and file comparison.

use std::fmt;
use std::fs::File;
use std::io::{self, ErrorKind, Read, Write};
use std::path::Path;

use serde::Serialize;
use sha2::{Digest, Sha256};

use super::ToolError;
use crate::scanner::{hash_to_hex, HashError, Hasher, BUFFER_SIZE};

/// BLAKE3 and SHA-256 digests as lowercase hex.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Digests {
    /// BLAKE3 (256-bit)
    pub blake3: String,
    /// SHA-256
    pub sha256: String,
}

/// Digest an in-memory byte string.
#[must_use]
pub fn digest_bytes(data: &[u8]) -> Digests {
    Digests {
        blake3: blake3::hash(data).to_hex().to_string(),
        sha256: format!("{:x}", Sha256::digest(data)),
    }
}

/// Digest a file, streaming it once through both hashers.
///
/// # Errors
///
/// Returns [`ToolError::NotFound`], [`ToolError::PermissionDenied`] or
/// [`ToolError::Io`] when the file cannot be read.
pub fn digest_file(path: &Path) -> Result<Digests, ToolError> {
    let mut file = File::open(path).map_err(|e| ToolError::from_io(path, e))?;
    let mut blake = blake3::Hasher::new();
    let mut sha = Sha256::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let read = match file.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(ToolError::from_io(path, e)),
        };
        blake.update(&buffer[..read]);
        sha.update(&buffer[..read]);
    }

    Ok(Digests {
        blake3: blake.finalize().to_hex().to_string(),
        sha256: format!("{:x}", sha.finalize()),
    })
}

/// Outcome of [`compare_files`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Comparison {
    /// Same size and same BLAKE3 digest.
    Identical {
        /// Shared size in bytes
        size: u64,
    },
    /// Sizes differ; content was not read.
    DifferentSize {
        /// Size of the first file
        first: u64,
        /// Size of the second file
        second: u64,
    },
    /// Same size but the digests differ.
    DifferentContent {
        /// Shared size in bytes
        size: u64,
    },
}

impl Comparison {
    /// `true` for [`Comparison::Identical`].
    #[must_use]
    pub fn is_identical(&self) -> bool {
        matches!(self, Self::Identical { .. })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identical { size } => write!(f, "Identical ({} bytes)", size),
            Self::DifferentSize { first, second } => {
                write!(f, "Different (sizes {} vs {})", first, second)
            }
            Self::DifferentContent { .. } => write!(f, "Different (same size, different content)"),
        }
    }
}

/// Compare two files by size, then by BLAKE3 digest.
///
/// # Errors
///
/// Returns a [`ToolError`] if either file cannot be read.
pub fn compare_files(first: &Path, second: &Path) -> Result<Comparison, ToolError> {
    let first_size = file_size(first)?;
    let second_size = file_size(second)?;

    if first_size != second_size {
        return Ok(Comparison::DifferentSize {
            first: first_size,
            second: second_size,
        });
    }

    let hasher = Hasher::new();
    let first_hash = hasher.full_hash(first).map_err(hash_error)?;
    let second_hash = hasher.full_hash(second).map_err(hash_error)?;

    log::debug!(
        "compare: {} = {}, {} = {}",
        first.display(),
        hash_to_hex(&first_hash),
        second.display(),
        hash_to_hex(&second_hash)
    );

    if first_hash == second_hash {
        Ok(Comparison::Identical { size: first_size })
    } else {
        Ok(Comparison::DifferentContent { size: first_size })
    }
}

fn file_size(path: &Path) -> Result<u64, ToolError> {
    let metadata = std::fs::metadata(path).map_err(|e| ToolError::from_io(path, e))?;
    if metadata.is_dir() {
        return Err(ToolError::Io {
            path: path.to_path_buf(),
            source: io::Error::new(ErrorKind::InvalidInput, "is a directory"),
        });
    }
    Ok(metadata.len())
}

fn hash_error(error: HashError) -> ToolError {
    match error {
        HashError::NotFound(path) => ToolError::NotFound(path),
        HashError::PermissionDenied(path) => ToolError::PermissionDenied(path),
        HashError::Interrupted(_) => ToolError::Interrupted,
        HashError::Io { path, source } => ToolError::Io {
            path,
            source: io::Error::new(source.kind(), source.to_string()),
        },
    }
}

/// Print digests as `NAME: hex` lines.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_digests<W: Write>(writer: &mut W, digests: &Digests) -> io::Result<()> {
    writeln!(writer, "BLAKE3:  {}", digests.blake3)?;
    writeln!(writer, "SHA-256: {}", digests.sha256)
}
