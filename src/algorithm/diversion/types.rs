//! Type definitions for the diversion engine
//!
//! This module contains common types used throughout the diversion pipeline.

use std::time::Duration;

use arrow::record_batch::RecordBatch;
use serde::Serialize;

/// Result of a diversion computation
#[derive(Debug, Clone)]
pub struct DiversionResult {
    /// Hospital-level table, one row per hospital and one nullable
    /// `div_from_{hosp_id}` column per exclusion scenario
    pub hospital_level: RecordBatch,
    /// System-level table, one row per hospital and one nullable
    /// `div_from_sys_{sys_id}` column per focal system
    pub system_level: RecordBatch,
    /// Focal systems the computation ran for, ascending
    pub focal_systems: Vec<i64>,
    /// Findings collected while scenarios ran
    pub report: DiversionReport,
    /// Time taken for the computation
    pub computation_time: Duration,
}

/// Findings collected across a diversion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiversionReport {
    /// Input rows dropped because a required value was null or unusable
    pub skipped_rows: usize,
    /// One entry per exclusion scenario, in execution order
    pub scenarios: Vec<ScenarioReport>,
}

impl DiversionReport {
    /// Render the report as pretty-printed JSON
    ///
    /// # Errors
    /// Returns an error if serialization fails
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Findings for a single exclusion scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Focal system the scenario belongs to
    pub focal_system: i64,
    /// Hospital that was excluded
    pub hosp_id: i64,
    /// Display name of the excluded hospital
    pub hospital: String,
    /// Baseline admissions of the excluded hospital
    pub excluded_admissions: f64,
    /// Cells skipped because the focal system already held all their volume
    pub degenerate_cells: Vec<String>,
    /// Whether no admissions could be redistributed at all
    pub zero_denominator: bool,
}

/// Structure to hold extracted discharge rows in columnar form
#[derive(Debug, Clone, Default)]
pub struct DischargeRows {
    /// Cell keys
    pub cells: Vec<String>,
    /// Hospital identifiers
    pub hosp_ids: Vec<i64>,
    /// Hospital display names
    pub hospitals: Vec<String>,
    /// System identifiers
    pub sys_ids: Vec<i64>,
    /// Merging-party indicators
    pub party: Vec<bool>,
    /// Admission counts
    pub counts: Vec<f64>,
    /// Rows dropped because a required value was null or unusable
    pub skipped: usize,
}

impl DischargeRows {
    /// Number of usable rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.hosp_ids.len()
    }

    /// Check if no usable rows were extracted
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosp_ids.is_empty()
    }
}
