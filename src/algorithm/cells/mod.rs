//! Layered cell assignment for discharge rows
//!
//! Diversion runs on cells: groups of admissions that are close substitutes.
//! This module builds them by grouping rows on successively coarser variable
//! sets. A group becomes a cell only when it carries enough admissions;
//! rows left over cascade into the next, coarser layer. Rows no layer can
//! place are dropped from the output and reported.

use std::sync::Arc;

use arrow::array::{ArrayRef, BooleanArray, Int64Array};
use arrow::compute;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::{info, warn};
use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::error::{DiversionError, Result};
use crate::utils::arrow_utils;

/// Configuration for layered cell assignment
#[derive(Debug, Clone)]
pub struct CellConfig {
    /// Grouping variables per layer, finest first
    pub layers: Vec<Vec<String>>,
    /// Minimum admissions a group needs to become a cell
    pub min_size: f64,
    /// Admission count column
    pub count: String,
    /// Name of the cell column appended to the output
    pub cell: String,
}

impl CellConfig {
    /// Create a configuration with the default column names
    #[must_use]
    pub fn new(layers: Vec<Vec<String>>, min_size: f64) -> Self {
        Self {
            layers,
            min_size,
            count: "count".to_string(),
            cell: "cell".to_string(),
        }
    }

    /// Set the admission count column
    #[must_use]
    pub fn with_count_column(mut self, name: &str) -> Self {
        self.count = name.to_string();
        self
    }

    /// Set the name of the appended cell column
    #[must_use]
    pub fn with_cell_column(mut self, name: &str) -> Self {
        self.cell = name.to_string();
        self
    }
}

/// Outcome of one assignment layer
#[derive(Debug, Clone, Serialize)]
pub struct LayerSummary {
    /// 1-based layer number
    pub layer: usize,
    /// Cells created in this layer
    pub cells: usize,
    /// Rows assigned in this layer
    pub rows: usize,
    /// Admissions covered by this layer
    pub admissions: f64,
}

/// Result of cell assignment
#[derive(Debug, Clone)]
pub struct CellAssignment {
    /// Input rows that received a cell, with the cell column appended
    pub assigned: RecordBatch,
    /// Per-layer outcomes
    pub layers: Vec<LayerSummary>,
    /// Rows no layer could place
    pub unassigned_rows: usize,
}

/// Assigns discharge rows to cells through successively coarser layers
#[derive(Debug)]
pub struct CellAssigner {
    /// Assignment configuration
    config: CellConfig,
}

impl CellAssigner {
    /// Create a new assigner with the given configuration
    #[must_use]
    pub const fn new(config: CellConfig) -> Self {
        Self { config }
    }

    /// Assign every row of the batch to a cell, where possible
    ///
    /// Cell ids are dense 1-based integers, numbered in layer order and by
    /// sorted group key within a layer, so equal inputs yield equal ids.
    ///
    /// # Errors
    /// Returns an error when the configuration is unusable or a named column
    /// is missing or has an unusable type
    pub fn assign(&self, batch: &RecordBatch) -> Result<CellAssignment> {
        self.validate(batch)?;

        let count_col = arrow_utils::get_column(batch, &self.config.count)?;
        let counts: Vec<f64> = (0..batch.num_rows())
            .map(|i| arrow_utils::arrow_array_to_f64(&count_col, i).unwrap_or(0.0))
            .collect();

        let mut cell_ids: Vec<Option<i64>> = vec![None; batch.num_rows()];
        let mut next_cell_id: i64 = 1;
        let mut layers = Vec::with_capacity(self.config.layers.len());

        for (layer_idx, variables) in self.config.layers.iter().enumerate() {
            let columns: Vec<ArrayRef> = variables
                .iter()
                .map(|name| arrow_utils::get_column(batch, name))
                .collect::<Result<_>>()?;

            // Group the rows still unassigned after earlier layers
            let mut groups: FxHashMap<Vec<String>, (f64, Vec<usize>)> = FxHashMap::default();
            'rows: for i in 0..batch.num_rows() {
                if cell_ids[i].is_some() {
                    continue;
                }
                let mut key = Vec::with_capacity(columns.len());
                for column in &columns {
                    match arrow_utils::arrow_array_to_key(column, i) {
                        Some(part) => key.push(part),
                        None => continue 'rows,
                    }
                }
                let group = groups.entry(key).or_default();
                group.0 += counts[i];
                group.1.push(i);
            }

            let mut cells_created = 0usize;
            let mut rows_assigned = 0usize;
            let mut admissions = 0.0f64;
            for (_, (size, group_rows)) in groups
                .into_iter()
                .sorted_by(|(key_a, _), (key_b, _)| key_a.cmp(key_b))
            {
                if size < self.config.min_size {
                    continue;
                }
                for &row in &group_rows {
                    cell_ids[row] = Some(next_cell_id);
                }
                next_cell_id += 1;
                cells_created += 1;
                rows_assigned += group_rows.len();
                admissions += size;
            }

            info!(
                "Layer {}: {} cell(s) covering {} row(s) and {} admissions",
                layer_idx + 1,
                cells_created,
                rows_assigned,
                admissions
            );

            layers.push(LayerSummary {
                layer: layer_idx + 1,
                cells: cells_created,
                rows: rows_assigned,
                admissions,
            });
        }

        let unassigned_rows = cell_ids.iter().filter(|id| id.is_none()).count();
        if unassigned_rows > 0 {
            warn!(
                "{} row(s) remain unassigned after {} layer(s); they are dropped from the output",
                unassigned_rows,
                self.config.layers.len()
            );
        }

        let assigned = append_cell_column(batch, &cell_ids, &self.config.cell)?;

        Ok(CellAssignment {
            assigned,
            layers,
            unassigned_rows,
        })
    }

    fn validate(&self, batch: &RecordBatch) -> Result<()> {
        if self.config.layers.is_empty() {
            return Err(DiversionError::InvalidConfig(
                "at least one assignment layer is required".to_string(),
            ));
        }
        if self.config.layers.iter().any(Vec::is_empty) {
            return Err(DiversionError::InvalidConfig(
                "every assignment layer must name at least one grouping variable".to_string(),
            ));
        }
        if self.config.min_size.is_nan() || self.config.min_size <= 0.0 {
            return Err(DiversionError::InvalidConfig(
                "minimum cell size must be positive".to_string(),
            ));
        }
        if batch.schema().field_with_name(&self.config.cell).is_ok() {
            return Err(DiversionError::InvalidConfig(format!(
                "output column '{}' already exists in the input",
                self.config.cell
            )));
        }

        let count_col = arrow_utils::get_column(batch, &self.config.count)?;
        if !arrow_utils::is_supported_numeric_type(count_col.data_type()) {
            return Err(DiversionError::InvalidDataType {
                column: self.config.count.clone(),
                expected: "numeric".to_string(),
            });
        }

        for name in self.config.layers.iter().flatten().unique() {
            let column = arrow_utils::get_column(batch, name)?;
            if !arrow_utils::is_supported_key_type(column.data_type()) {
                return Err(DiversionError::InvalidDataType {
                    column: name.clone(),
                    expected: "key".to_string(),
                });
            }
        }

        Ok(())
    }
}

/// Keep the assigned rows and append their cell ids as a new column
fn append_cell_column(
    batch: &RecordBatch,
    cell_ids: &[Option<i64>],
    name: &str,
) -> Result<RecordBatch> {
    let mask = BooleanArray::from(cell_ids.iter().map(Option::is_some).collect_vec());

    let mut columns: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() + 1);
    for column in batch.columns() {
        columns.push(compute::filter(column, &mask)?);
    }
    let assigned: Vec<i64> = cell_ids.iter().filter_map(|id| *id).collect();
    columns.push(Arc::new(Int64Array::from(assigned)));

    let mut fields: Vec<Field> = batch
        .schema()
        .fields()
        .iter()
        .map(|field| field.as_ref().clone())
        .collect();
    fields.push(Field::new(name, DataType::Int64, false));

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
