//! Validation functions for the diversion engine
//!
//! This module contains functions for validating input data before any
//! computation starts.

use arrow::record_batch::RecordBatch;
use itertools::Itertools;
use log::warn;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::algorithm::diversion::types::DischargeRows;
use crate::config::DiversionColumns;
use crate::error::{DiversionError, Result};

/// Validate that the input batch has every required column
pub fn validate_columns(batch: &RecordBatch, columns: &DiversionColumns) -> Result<()> {
    for column in columns.required() {
        if batch.schema().field_with_name(column).is_err() {
            return Err(DiversionError::MissingColumn(column.to_string()));
        }
    }

    Ok(())
}

/// Warn when a hospital id maps to more than one display name
///
/// The first name seen wins downstream; offending ids are reported once.
pub fn warn_ambiguous_hospital_names(rows: &DischargeRows) {
    let mut first_names: FxHashMap<i64, &str> = FxHashMap::default();
    let mut ambiguous: FxHashSet<i64> = FxHashSet::default();

    for (hosp_id, name) in rows.hosp_ids.iter().zip(&rows.hospitals) {
        match first_names.get(hosp_id) {
            Some(first) if *first != name.as_str() => {
                ambiguous.insert(*hosp_id);
            }
            Some(_) => {}
            None => {
                first_names.insert(*hosp_id, name);
            }
        }
    }

    if !ambiguous.is_empty() {
        warn!(
            "{} hospital id(s) carry more than one name ({}); keeping the first name seen",
            ambiguous.len(),
            ambiguous.iter().sorted().join(", ")
        );
    }
}
