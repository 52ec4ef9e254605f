//! Per-index value extraction from Arrow arrays
//!
//! Discharge extracts arrive with drifting physical encodings: ids as
//! `Int32` or `Int64`, counts as integers or floats, indicators as booleans
//! or 0/1 integers. The extractors here absorb that drift so the engine
//! reads one logical type per column. A null, or a physical type outside a
//! column's accepted set, reads as `None`.

use arrow::array::{Array, ArrayRef, BooleanArray, PrimitiveArray, StringArray};
use arrow::datatypes::{
    ArrowPrimitiveType, DataType, Float32Type, Float64Type, Int32Type, Int64Type,
};
use arrow::record_batch::RecordBatch;

use crate::error::{DiversionError, Result};

/// Data types accepted wherever a value is used as a grouping key
pub const fn is_supported_key_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8
            | DataType::Int32
            | DataType::Int64
            | DataType::Boolean
            | DataType::Float32
            | DataType::Float64
    )
}

/// Data types accepted wherever a numeric value is read
pub const fn is_supported_numeric_type(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int32 | DataType::Int64 | DataType::Float32 | DataType::Float64
    )
}

/// Non-null value of a primitive array at `index`
fn primitive_at<T: ArrowPrimitiveType>(array: &ArrayRef, index: usize) -> Option<T::Native> {
    let typed = array.as_any().downcast_ref::<PrimitiveArray<T>>()?;
    Some(typed.value(index))
}

/// Read a string value, handling nulls
pub fn arrow_array_to_string(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }
    let typed = array.as_any().downcast_ref::<StringArray>()?;
    Some(typed.value(index).to_string())
}

/// Read a numeric value as `f64`, widening any supported encoding, handling nulls
pub fn arrow_array_to_f64(array: &ArrayRef, index: usize) -> Option<f64> {
    if array.is_null(index) {
        return None;
    }
    match array.data_type() {
        DataType::Int32 => primitive_at::<Int32Type>(array, index).map(f64::from),
        DataType::Int64 => primitive_at::<Int64Type>(array, index).map(|v| v as f64),
        DataType::Float32 => primitive_at::<Float32Type>(array, index).map(f64::from),
        DataType::Float64 => primitive_at::<Float64Type>(array, index),
        _ => None,
    }
}

/// Read an integer id as `i64`, handling nulls
pub fn arrow_array_to_i64(array: &ArrayRef, index: usize) -> Option<i64> {
    if array.is_null(index) {
        return None;
    }
    match array.data_type() {
        DataType::Int32 => primitive_at::<Int32Type>(array, index).map(i64::from),
        DataType::Int64 => primitive_at::<Int64Type>(array, index),
        _ => None,
    }
}

/// Read an indicator as `bool`, handling nulls
///
/// Integer columns are read as indicators, with any non-zero value counting
/// as `true`.
pub fn arrow_array_to_bool(array: &ArrayRef, index: usize) -> Option<bool> {
    if array.is_null(index) {
        return None;
    }
    match array.data_type() {
        DataType::Boolean => {
            let typed = array.as_any().downcast_ref::<BooleanArray>()?;
            Some(typed.value(index))
        }
        DataType::Int32 | DataType::Int64 => arrow_array_to_i64(array, index).map(|v| v != 0),
        _ => None,
    }
}

/// Read a grouping-key string, handling nulls
///
/// String values are taken verbatim; integer, boolean and float values are
/// rendered through their canonical display form so that equal values land
/// in the same group regardless of physical encoding width.
pub fn arrow_array_to_key(array: &ArrayRef, index: usize) -> Option<String> {
    if array.is_null(index) {
        return None;
    }
    match array.data_type() {
        DataType::Utf8 => arrow_array_to_string(array, index),
        DataType::Boolean => {
            let typed = array.as_any().downcast_ref::<BooleanArray>()?;
            Some(typed.value(index).to_string())
        }
        DataType::Int32 | DataType::Int64 => {
            arrow_array_to_i64(array, index).map(|v| v.to_string())
        }
        DataType::Float32 => primitive_at::<Float32Type>(array, index).map(|v| v.to_string()),
        DataType::Float64 => primitive_at::<Float64Type>(array, index).map(|v| v.to_string()),
        _ => None,
    }
}

/// Index of a named column in a batch
///
/// # Errors
/// Returns `MissingColumn` if the column does not exist
pub fn get_column_index(batch: &RecordBatch, column_name: &str) -> Result<usize> {
    batch
        .schema()
        .index_of(column_name)
        .map_err(|_| DiversionError::MissingColumn(column_name.to_string()))
}

/// A named column of a batch
///
/// # Errors
/// Returns `MissingColumn` if the column does not exist
pub fn get_column(batch: &RecordBatch, column_name: &str) -> Result<ArrayRef> {
    let idx = get_column_index(batch, column_name)?;
    Ok(batch.column(idx).clone())
}
