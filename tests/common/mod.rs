//! Shared fixtures and column helpers for the integration tests

#![allow(dead_code)]

use std::sync::Arc;

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

/// Build a discharge batch from `(cell, hosp_id, hospital, sys_id, party_ind, count)` rows
pub fn discharge_batch(rows: &[(&str, i64, &str, i64, bool, f64)]) -> RecordBatch {
    let schema = Schema::new(vec![
        Field::new("cell", DataType::Utf8, false),
        Field::new("hosp_id", DataType::Int64, false),
        Field::new("hospital", DataType::Utf8, false),
        Field::new("sys_id", DataType::Int64, false),
        Field::new("party_ind", DataType::Boolean, false),
        Field::new("count", DataType::Float64, false),
    ]);

    let cells: Vec<&str> = rows.iter().map(|r| r.0).collect();
    let hosp_ids: Vec<i64> = rows.iter().map(|r| r.1).collect();
    let hospitals: Vec<&str> = rows.iter().map(|r| r.2).collect();
    let sys_ids: Vec<i64> = rows.iter().map(|r| r.3).collect();
    let party: Vec<bool> = rows.iter().map(|r| r.4).collect();
    let counts: Vec<f64> = rows.iter().map(|r| r.5).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(cells)),
        Arc::new(Int64Array::from(hosp_ids)),
        Arc::new(StringArray::from(hospitals)),
        Arc::new(Int64Array::from(sys_ids)),
        Arc::new(BooleanArray::from(party)),
        Arc::new(Float64Array::from(counts)),
    ];

    RecordBatch::try_new(Arc::new(schema), columns).unwrap()
}

/// Column names of a batch, in schema order
pub fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|field| field.name().clone())
        .collect()
}

/// Read an integer column as a vector
pub fn i64_column(batch: &RecordBatch, name: &str) -> Vec<i64> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("column '{name}' not found"))
        .as_any()
        .downcast_ref::<Int64Array>()
        .unwrap_or_else(|| panic!("column '{name}' is not Int64"));
    (0..column.len()).map(|i| column.value(i)).collect()
}

/// Read a string column as a vector
pub fn str_column(batch: &RecordBatch, name: &str) -> Vec<String> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("column '{name}' not found"))
        .as_any()
        .downcast_ref::<StringArray>()
        .unwrap_or_else(|| panic!("column '{name}' is not Utf8"));
    (0..column.len()).map(|i| column.value(i).to_string()).collect()
}

/// Read a nullable float column as a vector of options
pub fn f64_column(batch: &RecordBatch, name: &str) -> Vec<Option<f64>> {
    let column = batch
        .column_by_name(name)
        .unwrap_or_else(|| panic!("column '{name}' not found"))
        .as_any()
        .downcast_ref::<Float64Array>()
        .unwrap_or_else(|| panic!("column '{name}' is not Float64"));
    (0..column.len())
        .map(|i| {
            if column.is_null(i) {
                None
            } else {
                Some(column.value(i))
            }
        })
        .collect()
}

/// Value of `column` in the row whose `hosp_id` matches
pub fn value_for(batch: &RecordBatch, hosp_id: i64, column: &str) -> Option<f64> {
    let row = i64_column(batch, "hosp_id")
        .iter()
        .position(|&id| id == hosp_id)
        .unwrap_or_else(|| panic!("hospital {hosp_id} not in the output"));
    f64_column(batch, column)[row]
}

/// Initialize the log capture for a test binary
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}
