//! Utility functions shared across the engine

use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

pub mod arrow_utils;
pub mod progress;

/// Check that `dir` exists and is a directory
///
/// # Errors
/// Returns an IO error naming the path otherwise
pub fn validate_directory(dir: &Path) -> Result<()> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", dir.display()),
        )
        .into())
    }
}

/// Find all Parquet files in a directory, sorted by file name
///
/// Name order keeps multi-file extracts deterministic from run to run.
///
/// # Errors
/// Returns an error if the directory cannot be read
pub fn find_parquet_files(dir: &Path) -> Result<Vec<PathBuf>> {
    validate_directory(dir)?;

    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "parquet") {
            files.push(path);
        }
    }
    files.sort_unstable();

    if files.is_empty() {
        log::warn!("No Parquet files found in {}", dir.display());
    }

    Ok(files)
}
