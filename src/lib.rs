//! A Rust library for hospital patient-diversion and willingness-to-pay
//! analysis over Arrow discharge tables.
//!
//! The engine consumes cell-tagged discharge data, simulates the exclusion
//! of each merging-party hospital from the choice set, and reports where
//! admissions would land, hospital by hospital and rolled up to systems.
//! Companion modules assign discharges to cells, compute willingness-to-pay
//! and load Parquet extracts.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod loader;
pub mod testdata;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::{DiversionColumns, DiversionConfig, DiversionConfigBuilder};
pub use error::{DiversionError, Result};

// Computation entry points
pub use algorithm::cells::{CellAssigner, CellAssignment, CellConfig, LayerSummary};
pub use algorithm::diversion::{
    DiversionCalculator, DiversionReport, DiversionResult, ScenarioReport,
};
pub use algorithm::wtp::{WtpCalculator, WtpConfig, WtpResult};

// Arrow types
pub use arrow::datatypes::Schema as ArrowSchema;
pub use arrow::record_batch::RecordBatch;

// Data access
pub use loader::{DEFAULT_BATCH_SIZE, read_discharge_dir, read_discharge_parquet};
