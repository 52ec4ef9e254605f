//! Parquet loading for discharge extracts
//!
//! Reads a single file or every file of a directory into one combined
//! `RecordBatch`; schema validation happens downstream when a computation
//! starts.

use std::fs::File;
use std::path::Path;
use std::time::Instant;

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use log::info;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use rayon::prelude::*;

use crate::error::{DiversionError, Result};
use crate::utils::find_parquet_files;

/// Default batch size for Parquet reading
pub const DEFAULT_BATCH_SIZE: usize = 16384;

/// Read one Parquet file into a single combined `RecordBatch`
///
/// # Arguments
/// * `path` - Path to the Parquet file
///
/// # Returns
/// All row groups of the file concatenated into one batch
///
/// # Errors
/// Returns an error if the file cannot be opened or is not valid Parquet
pub fn read_discharge_parquet(path: &Path) -> Result<RecordBatch> {
    let start = Instant::now();

    let file = File::open(path)?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let schema = builder.schema().clone();
    let reader = builder.with_batch_size(DEFAULT_BATCH_SIZE).build()?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch?);
    }
    let combined = concat_batches(&schema, &batches)?;

    info!(
        "Read {} row(s) from {} in {:.2?}",
        combined.num_rows(),
        path.display(),
        start.elapsed()
    );

    Ok(combined)
}

/// Read every Parquet file of a directory into a single combined `RecordBatch`
///
/// Files are read in parallel and concatenated in name order. All files must
/// share one schema.
///
/// # Arguments
/// * `dir` - Path to the directory containing Parquet files
///
/// # Returns
/// All files concatenated into one batch
///
/// # Errors
/// Returns an error if the directory cannot be read, a file is not valid
/// Parquet, no Parquet files are present, or schemas disagree
pub fn read_discharge_dir(dir: &Path) -> Result<RecordBatch> {
    let start = Instant::now();

    let files = find_parquet_files(dir)?;
    if files.is_empty() {
        return Err(DiversionError::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("No Parquet files found in {}", dir.display()),
        )));
    }

    let batches: Vec<RecordBatch> = files
        .par_iter()
        .map(|path| read_discharge_parquet(path))
        .collect::<Result<_>>()?;

    let schema = batches[0].schema();
    let combined = concat_batches(&schema, &batches)?;

    info!(
        "Read {} row(s) from {} file(s) in {} in {:.2?}",
        combined.num_rows(),
        files.len(),
        dir.display(),
        start.elapsed()
    );

    Ok(combined)
}
