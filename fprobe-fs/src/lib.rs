//! Filesystem abstraction for fprobe.
//!
//! This crate provides:
//! - Filesystem trait for atomic artifact writes, appends and reads
//! - Real and mock implementations

pub mod filesystem;

pub use filesystem::{temp_sibling, Filesystem, FsError, MockFilesystem, RealFilesystem};
