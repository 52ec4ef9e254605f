//! Willingness-to-pay computation
//!
//! A system's willingness-to-pay for network inclusion aggregates, cell by
//! cell, the admission volume times the log inverse of the share the system
//! leaves behind: `n * ln(1 / (1 - share_s))`. The term grows without bound
//! as a system approaches serving a cell alone, so fully-served cells are
//! either dropped from the sum or poison the system's total into a missing
//! value, depending on configuration.

use std::sync::Arc;

use arrow::array::{Float64Array, Int64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::{info, warn};
use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::error::{DiversionError, Result};
use crate::utils::arrow_utils;

/// Configuration for a willingness-to-pay computation
#[derive(Debug, Clone)]
pub struct WtpConfig {
    /// Cell (micro-market) identifier column
    pub cell: String,
    /// System identifier column
    pub sys_id: String,
    /// Admission count column
    pub count: String,
    /// Whether fully-served cells are dropped from a system's sum (`true`)
    /// or poison its total into a missing value (`false`)
    pub drop_degenerate_cells: bool,
}

impl Default for WtpConfig {
    fn default() -> Self {
        Self {
            cell: "cell".to_string(),
            sys_id: "sys_id".to_string(),
            count: "count".to_string(),
            drop_degenerate_cells: true,
        }
    }
}

/// A cell fully served by a single system
#[derive(Debug, Clone, Serialize)]
pub struct DegenerateShare {
    /// Cell key
    pub cell: String,
    /// System holding the cell's entire volume
    pub sys_id: i64,
}

/// Result of a willingness-to-pay computation
#[derive(Debug, Clone)]
pub struct WtpResult {
    /// One row per system: `sys_id`, baseline volume `n_s` and nullable `wtp`
    pub system_level: RecordBatch,
    /// Fully-served (cell, system) pairs, ascending by cell then system
    pub degenerate: Vec<DegenerateShare>,
}

/// Calculator for system-level willingness-to-pay
#[derive(Debug)]
pub struct WtpCalculator {
    /// Computation configuration
    config: WtpConfig,
}

impl WtpCalculator {
    /// Create a new calculator with the given configuration
    #[must_use]
    pub const fn new(config: WtpConfig) -> Self {
        Self { config }
    }

    /// Compute willingness-to-pay per system over a discharge batch
    ///
    /// # Errors
    /// Returns an error when a required column is missing or has an
    /// unusable type
    pub fn calculate(&self, batch: &RecordBatch) -> Result<WtpResult> {
        let cell_col = arrow_utils::get_column(batch, &self.config.cell)?;
        if !arrow_utils::is_supported_key_type(cell_col.data_type()) {
            return Err(DiversionError::InvalidDataType {
                column: self.config.cell.clone(),
                expected: "key".to_string(),
            });
        }
        let sys_col = arrow_utils::get_column(batch, &self.config.sys_id)?;
        if !matches!(sys_col.data_type(), DataType::Int32 | DataType::Int64) {
            return Err(DiversionError::InvalidDataType {
                column: self.config.sys_id.clone(),
                expected: "integer id".to_string(),
            });
        }
        let count_col = arrow_utils::get_column(batch, &self.config.count)?;
        if !arrow_utils::is_supported_numeric_type(count_col.data_type()) {
            return Err(DiversionError::InvalidDataType {
                column: self.config.count.clone(),
                expected: "numeric".to_string(),
            });
        }

        // Fold rows into per-cell system volumes
        let mut skipped = 0usize;
        let mut cells: FxHashMap<String, FxHashMap<i64, f64>> = FxHashMap::default();
        for i in 0..batch.num_rows() {
            let cell = arrow_utils::arrow_array_to_key(&cell_col, i);
            let sys = arrow_utils::arrow_array_to_i64(&sys_col, i);
            let count = arrow_utils::arrow_array_to_f64(&count_col, i);
            match (cell, sys, count) {
                (Some(cell), Some(sys), Some(count)) if count >= 0.0 => {
                    *cells.entry(cell).or_default().entry(sys).or_default() += count;
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!(
                "Skipped {skipped} discharge row(s) with null or unusable values in required columns"
            );
        }

        let mut wtp: FxHashMap<i64, f64> = FxHashMap::default();
        let mut volume: FxHashMap<i64, f64> = FxHashMap::default();
        let mut poisoned: FxHashSet<i64> = FxHashSet::default();
        let mut degenerate: Vec<DegenerateShare> = Vec::new();

        for (key, systems) in cells.iter().sorted_by(|(a, _), (b, _)| a.cmp(b)) {
            let n: f64 = systems.values().sum();
            for (&sys, &n_s) in systems.iter().sorted_by_key(|&(&sys, _)| sys) {
                *volume.entry(sys).or_default() += n_s;
                if n <= 0.0 {
                    continue;
                }
                if n_s == n {
                    degenerate.push(DegenerateShare {
                        cell: key.clone(),
                        sys_id: sys,
                    });
                    if !self.config.drop_degenerate_cells {
                        poisoned.insert(sys);
                    }
                    continue;
                }
                let share = n_s / n;
                *wtp.entry(sys).or_default() += n * (1.0 / (1.0 - share)).ln();
            }
        }

        if !degenerate.is_empty() {
            info!(
                "{} cell(s) fully served by a single system: {}",
                degenerate.len(),
                degenerate
                    .iter()
                    .map(|d| format!("{} (system {})", d.cell, d.sys_id))
                    .join(", ")
            );
        }

        let system_ids: Vec<i64> = volume.keys().copied().sorted_unstable().collect();
        let volumes: Vec<f64> = system_ids.iter().map(|sys| volume[sys]).collect();
        let totals: Vec<Option<f64>> = system_ids
            .iter()
            .map(|sys| {
                if poisoned.contains(sys) {
                    None
                } else {
                    Some(wtp.get(sys).copied().unwrap_or(0.0))
                }
            })
            .collect();

        let schema = Schema::new(vec![
            Field::new(&self.config.sys_id, DataType::Int64, false),
            Field::new("n_s", DataType::Float64, false),
            Field::new("wtp", DataType::Float64, true),
        ]);
        let system_level = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(system_ids)),
                Arc::new(Float64Array::from(volumes)),
                Arc::new(Float64Array::from(totals)),
            ],
        )?;

        Ok(WtpResult {
            system_level,
            degenerate,
        })
    }
}
