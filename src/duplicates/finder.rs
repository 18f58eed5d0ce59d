//! Duplicate finder: walk, size filter, content hash.
//!
//! # Overview
//!
//! This module orchestrates the duplicate detection pipeline:
//! 1. **Walk** - collect regular files under the root (per-entry errors recorded)
//! 2. **Size grouping** - drop files whose size is unique (see [`crate::duplicates::groups`])
//! 3. **Content hash** - BLAKE3 every remaining file once, on a bounded I/O pool
//! 4. **Digest grouping** - split each size group by digest, keep groups of 2+
//!
//! # Example
//!
//! ```no_run
//! use utilbox::duplicates::find_duplicates;
//! use std::path::Path;
//!
//! let groups = find_duplicates(Path::new("."), 1024).unwrap();
//! for group in &groups {
//!     println!("{}: {} copies", group.hash_hex(), group.len());
//! }
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytesize::ByteSize;
use rayon::prelude::*;

use crate::progress::ProgressCallback;
use crate::scanner::{FileEntry, Hash, HashError, Hasher, ScanError, Walker, WalkerConfig};

use super::groups::{group_by_hash, group_by_size, DuplicateGroup};

/// Files above this size get a debug line when hashing starts.
const LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Number of I/O threads for parallel hashing.
    /// Default is 4 to prevent disk thrashing.
    pub io_threads: usize,
    /// Abort on the first per-entry error instead of skipping it.
    pub strict: bool,
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Optional shutdown flag for graceful termination.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("io_threads", &self.io_threads)
            .field("strict", &self.strict)
            .field("walker_config", &self.walker_config)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            io_threads: 4,
            strict: false,
            walker_config: WalkerConfig::default(),
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the hashing thread count (minimum 1).
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set fail-fast on any error.
    #[must_use]
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Set the minimum file size (inclusive).
    #[must_use]
    pub fn with_min_size(mut self, min_size: u64) -> Self {
        self.walker_config.min_size = Some(min_size);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate scan.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Total number of files that passed the walker filters
    pub total_files: usize,
    /// Total size of those files in bytes
    pub total_size: u64,
    /// Number of files eliminated by size grouping (unique sizes)
    pub eliminated_by_size: usize,
    /// Number of files whose content was hashed
    pub hashed_files: usize,
    /// Bytes read while hashing
    pub bytes_hashed: u64,
    /// Number of confirmed duplicate groups
    pub duplicate_groups: usize,
    /// Total number of duplicate files (excluding one original per group)
    pub duplicate_files: usize,
    /// Total space that can be reclaimed by removing duplicates
    pub reclaimable_space: u64,
    /// Duration of the entire scan
    pub scan_duration: Duration,
    /// Whether the scan was interrupted
    pub interrupted: bool,
    /// Entries skipped because of per-entry errors
    pub scan_errors: Vec<ScanError>,
}

impl ScanSummary {
    /// Calculate the percentage of space that is wasted by duplicates.
    #[must_use]
    pub fn wasted_percentage(&self) -> f64 {
        if self.total_size == 0 {
            0.0
        } else {
            (self.reclaimable_space as f64 / self.total_size as f64) * 100.0
        }
    }

    /// Format reclaimable space as human-readable string.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize(self.reclaimable_space).to_string()
    }

    /// Format total size as human-readable string.
    #[must_use]
    pub fn total_size_display(&self) -> String {
        ByteSize(self.total_size).to_string()
    }

    /// `true` when at least one entry was skipped.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.scan_errors.is_empty()
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The scan was interrupted by user (Ctrl+C or shutdown signal).
    #[error("Scan interrupted by user")]
    Interrupted,

    /// The provided path does not exist.
    #[error("Path not found: {0}")]
    PathNotFound(PathBuf),

    /// The provided path is not a directory.
    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    /// An I/O error occurred on the root path itself.
    #[error("I/O error for {path}: {source}")]
    IoWithPath {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The hashing thread pool could not be created.
    #[error("Failed to start hashing threads: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// A per-entry error, surfaced only in strict mode.
    #[error(transparent)]
    ScanError(#[from] ScanError),
}

/// Statistics from the content hashing stage.
#[derive(Debug, Clone, Default)]
pub struct HashStats {
    /// Files submitted for hashing
    pub input_files: usize,
    /// Files hashed successfully
    pub hashed_files: usize,
    /// Bytes read from successfully hashed files
    pub bytes_hashed: u64,
    /// Files that could not be hashed, in input order
    pub errors: Vec<HashError>,
    /// Whether shutdown was observed during hashing
    pub interrupted: bool,
}

/// Hash every file of the given size groups and split them by digest.
///
/// Hashing runs on a dedicated rayon pool of `config.io_threads` threads.
/// Files that fail to hash are recorded in [`HashStats::errors`] and left
/// out of the result, so a group of N copies with one unreadable member is
/// still reported with N-1 files.
///
/// # Errors
///
/// Returns [`FinderError::ThreadPool`] if the pool cannot be created.
pub fn hash_size_groups(
    size_groups: HashMap<u64, Vec<FileEntry>>,
    hasher: &Hasher,
    config: &FinderConfig,
) -> Result<(Vec<DuplicateGroup>, HashStats), FinderError> {
    let mut all_files: Vec<FileEntry> = size_groups.into_values().flatten().collect();
    all_files.sort_by(|a, b| a.path.cmp(&b.path));

    let mut stats = HashStats {
        input_files: all_files.len(),
        ..Default::default()
    };

    if all_files.is_empty() {
        log::debug!("Hashing: no files to process");
        return Ok((Vec::new(), stats));
    }

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_start("hashing", all_files.len());
    }

    log::info!(
        "Hashing {} files with {} thread(s)",
        all_files.len(),
        config.io_threads
    );

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.io_threads.max(1))
        .thread_name(|i| format!("utilbox-hash-{}", i))
        .build()?;

    let completed = AtomicUsize::new(0);

    let results: Vec<(FileEntry, Option<Result<Hash, HashError>>)> = pool.install(|| {
        all_files
            .into_par_iter()
            .map(|file| {
                if config.is_shutdown_requested() {
                    return (file, None);
                }

                if file.size > LARGE_FILE_THRESHOLD {
                    log::debug!(
                        "Hashing large file ({}): {}",
                        ByteSize(file.size),
                        file.path.display()
                    );
                }

                let result = hasher.full_hash(&file.path);

                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(ref callback) = config.progress_callback {
                    callback.on_progress(done, file.path.to_string_lossy().as_ref());
                    if result.is_ok() {
                        callback.on_item_completed(file.size);
                    }
                }

                (file, Some(result))
            })
            .collect()
    });

    if let Some(ref callback) = config.progress_callback {
        callback.on_phase_end("hashing");
    }

    if config.is_shutdown_requested() {
        stats.interrupted = true;
        log::info!("Hashing interrupted by shutdown signal");
    }

    let mut hashed = Vec::with_capacity(results.len());
    for (file, result) in results {
        match result {
            None | Some(Err(HashError::Interrupted(_))) => stats.interrupted = true,
            Some(Ok(hash)) => {
                log::trace!("Hashed: {}", file.path.display());
                stats.hashed_files += 1;
                stats.bytes_hashed += file.size;
                hashed.push((file, hash));
            }
            Some(Err(e)) => {
                log::warn!("Skipping {}: {}", file.path.display(), e);
                stats.errors.push(e);
            }
        }
    }

    let groups = group_by_hash(hashed);

    for group in &groups {
        log::debug!(
            "Duplicate group {}: {} files, {} bytes each",
            group.hash_hex(),
            group.len(),
            group.size
        );
    }

    Ok((groups, stats))
}

/// Duplicate finder that runs the full detection pipeline.
///
/// # Example
///
/// ```no_run
/// use utilbox::duplicates::{DuplicateFinder, FinderConfig};
/// use std::path::Path;
///
/// let config = FinderConfig::default().with_io_threads(4);
/// let finder = DuplicateFinder::new(config);
///
/// let (groups, summary) = finder.find_duplicates(Path::new("/some/path")).unwrap();
///
/// println!("Found {} duplicate groups", summary.duplicate_groups);
/// println!("Reclaimable space: {}", summary.reclaimable_display());
/// ```
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let mut hasher = Hasher::new();
        if let Some(ref flag) = config.shutdown_flag {
            hasher = hasher.with_shutdown_flag(flag.clone());
        }
        Self { config, hasher }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The configuration this finder runs with.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find all duplicate files under `path`.
    ///
    /// Returns confirmed duplicate groups, sorted by digest with files sorted
    /// by path, along with summary statistics. Paths in the result are
    /// absolute.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The path does not exist or is not a directory
    /// - The scan is interrupted by shutdown signal
    /// - Strict mode is on and any entry fails
    pub fn find_duplicates(
        &self,
        path: &Path,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if !path.exists() {
            return Err(FinderError::PathNotFound(path.to_path_buf()));
        }
        if !path.is_dir() {
            return Err(FinderError::NotADirectory(path.to_path_buf()));
        }

        let root = path
            .canonicalize()
            .map_err(|source| FinderError::IoWithPath {
                path: path.to_path_buf(),
                source,
            })?;

        log::info!("Starting duplicate scan of {}", root.display());

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
            callback.on_message(&format!("Walking {}", root.display()));
        }

        let mut walker = Walker::new(&root, self.config.walker_config.clone());
        if let Some(ref flag) = self.config.shutdown_flag {
            walker = walker.with_shutdown_flag(flag.clone());
        }
        if let Some(ref callback) = self.config.progress_callback {
            walker = walker.with_progress_callback(callback.clone());
        }

        let mut files = Vec::new();
        let mut scan_errors = Vec::new();

        for result in walker.walk() {
            match result {
                Ok(file) => files.push(file),
                Err(e) if self.config.strict => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_phase_end("walking");
                    }
                    return Err(FinderError::ScanError(e));
                }
                Err(e) => scan_errors.push(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (groups, mut summary) = self.process_files(files, scan_errors)?;
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Scan complete in {:.2?}: {} duplicate groups, {} duplicate files, {} reclaimable",
            summary.scan_duration,
            summary.duplicate_groups,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        Ok((groups, summary))
    }

    /// Find duplicates from a pre-collected list of files.
    ///
    /// Skips the walk. Entries that no longer exist or cannot be read are
    /// recorded in [`ScanSummary::scan_errors`] like any other skipped file.
    ///
    /// # Errors
    ///
    /// Same as [`find_duplicates`](Self::find_duplicates), minus the root checks.
    pub fn find_duplicates_from_files(
        &self,
        files: Vec<FileEntry>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let start_time = Instant::now();

        if self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        let (groups, mut summary) = self.process_files(files, Vec::new())?;
        summary.scan_duration = start_time.elapsed();
        Ok((groups, summary))
    }

    fn process_files(
        &self,
        files: Vec<FileEntry>,
        scan_errors: Vec<ScanError>,
    ) -> Result<(Vec<DuplicateGroup>, ScanSummary), FinderError> {
        let mut summary = ScanSummary {
            total_files: files.len(),
            total_size: files.iter().map(|f| f.size).sum(),
            scan_errors,
            ..Default::default()
        };

        log::info!(
            "Found {} files ({} total)",
            summary.total_files,
            summary.total_size_display()
        );

        let (size_groups, size_stats) = group_by_size(files);
        summary.eliminated_by_size = size_stats.eliminated_unique;

        if size_groups.is_empty() {
            log::info!("No potential duplicates found after size grouping");
            return Ok((Vec::new(), summary));
        }

        let (groups, hash_stats) = hash_size_groups(size_groups, &self.hasher, &self.config)?;

        if hash_stats.interrupted || self.config.is_shutdown_requested() {
            return Err(FinderError::Interrupted);
        }

        if self.config.strict {
            if let Some(first) = hash_stats.errors.first() {
                return Err(FinderError::ScanError(ScanError::from(first.clone())));
            }
        }

        summary
            .scan_errors
            .extend(hash_stats.errors.into_iter().map(ScanError::from));

        summary.hashed_files = hash_stats.hashed_files;
        summary.bytes_hashed = hash_stats.bytes_hashed;
        summary.duplicate_groups = groups.len();
        summary.duplicate_files = groups.iter().map(DuplicateGroup::duplicate_count).sum();
        summary.reclaimable_space = groups.iter().map(DuplicateGroup::wasted_space).sum();

        Ok((groups, summary))
    }
}

/// Find duplicate files under `root`, ignoring files smaller than `min_size`.
///
/// Uses default settings otherwise: 4 hashing threads, hidden files
/// included, symlinks skipped, per-entry errors skipped.
///
/// # Errors
///
/// Returns [`FinderError::PathNotFound`] or [`FinderError::NotADirectory`]
/// for a bad root.
pub fn find_duplicates(root: &Path, min_size: u64) -> Result<Vec<DuplicateGroup>, FinderError> {
    let config = FinderConfig::default().with_min_size(min_size);
    DuplicateFinder::new(config)
        .find_duplicates(root)
        .map(|(groups, _)| groups)
}
