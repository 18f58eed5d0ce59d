//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping
//! - Full content hashing on a bounded thread pool
//! - Duplicate group management

pub mod finder;
pub mod groups;

pub use finder::{
    find_duplicates, hash_size_groups, DuplicateFinder, FinderConfig, FinderError, HashStats,
    ScanSummary,
};
pub use groups::{
    group_by_hash, group_by_size, group_by_size_structured, DuplicateGroup, GroupingStats,
    SizeGroup,
};
