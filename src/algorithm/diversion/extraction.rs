//! Data extraction utilities for the diversion engine
//!
//! This module pulls the six required columns out of a discharge batch into
//! columnar vectors. A column whose physical type is unusable is a hard
//! error; individual null or unusable values only skip their row.

use arrow::array::ArrayRef;
use arrow::datatypes::DataType;
use arrow::record_batch::RecordBatch;
use log::warn;

use crate::algorithm::diversion::types::DischargeRows;
use crate::config::DiversionColumns;
use crate::error::{DiversionError, Result};
use crate::utils::arrow_utils;

const fn is_integer_type(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Int32 | DataType::Int64)
}

const fn is_string_type(data_type: &DataType) -> bool {
    matches!(data_type, DataType::Utf8)
}

const fn is_indicator_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Boolean | DataType::Int32 | DataType::Int64
    )
}

/// Fetch a column and check its physical type up front
fn checked_column(
    batch: &RecordBatch,
    name: &str,
    accepts: fn(&DataType) -> bool,
    expected: &str,
) -> Result<ArrayRef> {
    let column = arrow_utils::get_column(batch, name)?;
    if !accepts(column.data_type()) {
        return Err(DiversionError::InvalidDataType {
            column: name.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(column)
}

/// Extract discharge rows from a `RecordBatch`
///
/// Rows with a null in any required column, or with a negative admission
/// count, are dropped and counted in `DischargeRows::skipped`.
pub fn extract_discharge_rows(
    batch: &RecordBatch,
    columns: &DiversionColumns,
) -> Result<DischargeRows> {
    let cell_col = checked_column(batch, &columns.cell, arrow_utils::is_supported_key_type, "key")?;
    let hosp_id_col = checked_column(batch, &columns.hosp_id, is_integer_type, "integer id")?;
    let hospital_col = checked_column(batch, &columns.hospital, is_string_type, "string")?;
    let sys_id_col = checked_column(batch, &columns.sys_id, is_integer_type, "integer id")?;
    let party_col = checked_column(batch, &columns.party_ind, is_indicator_type, "indicator")?;
    let count_col = checked_column(
        batch,
        &columns.count,
        arrow_utils::is_supported_numeric_type,
        "numeric",
    )?;

    let mut rows = DischargeRows::default();

    for i in 0..batch.num_rows() {
        let cell = match arrow_utils::arrow_array_to_key(&cell_col, i) {
            Some(value) => value,
            None => {
                rows.skipped += 1;
                continue;
            }
        };

        let hosp_id = match arrow_utils::arrow_array_to_i64(&hosp_id_col, i) {
            Some(value) => value,
            None => {
                rows.skipped += 1;
                continue;
            }
        };

        let hospital = match arrow_utils::arrow_array_to_string(&hospital_col, i) {
            Some(value) => value,
            None => {
                rows.skipped += 1;
                continue;
            }
        };

        let sys_id = match arrow_utils::arrow_array_to_i64(&sys_id_col, i) {
            Some(value) => value,
            None => {
                rows.skipped += 1;
                continue;
            }
        };

        let party = match arrow_utils::arrow_array_to_bool(&party_col, i) {
            Some(value) => value,
            None => {
                rows.skipped += 1;
                continue;
            }
        };

        let count = match arrow_utils::arrow_array_to_f64(&count_col, i) {
            Some(value) if value >= 0.0 => value,
            _ => {
                rows.skipped += 1;
                continue;
            }
        };

        rows.cells.push(cell);
        rows.hosp_ids.push(hosp_id);
        rows.hospitals.push(hospital);
        rows.sys_ids.push(sys_id);
        rows.party.push(party);
        rows.counts.push(count);
    }

    if rows.skipped > 0 {
        warn!(
            "Skipped {} discharge row(s) with null or unusable values in required columns",
            rows.skipped
        );
    }

    Ok(rows)
}
