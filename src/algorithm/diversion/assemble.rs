//! Result assembly for the diversion engine
//!
//! Builds the hospital-level and system-level output batches. Identity
//! columns come first, then one nullable float column per scenario or
//! focal system, with rows in presentation order.

use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;

use crate::algorithm::diversion::aggregation::CellHospitalTable;
use crate::algorithm::diversion::simulation::ScenarioColumn;
use crate::algorithm::diversion::system::SystemColumn;
use crate::error::Result;

/// Order hospitals for presentation: non-party rows first, then party rows
/// grouped by focal system, each group ascending by system and hospital id
fn presentation_order(table: &CellHospitalTable) -> Vec<usize> {
    let mut order: Vec<usize> = (0..table.hospitals.len()).collect();
    order.sort_by_key(|&i| {
        let hospital = &table.hospitals[i];
        (hospital.party_sys_id, hospital.sys_id, hospital.hosp_id)
    });
    order
}

/// Identity columns shared by both output tables
fn identity_columns(
    table: &CellHospitalTable,
    order: &[usize],
) -> (Vec<Field>, Vec<ArrayRef>) {
    let fields = vec![
        Field::new("hosp_id", DataType::Int64, false),
        Field::new("hospital", DataType::Utf8, false),
        Field::new("sys_id", DataType::Int64, false),
        Field::new("party_sys_id", DataType::Int64, false),
        Field::new("n_h", DataType::Float64, false),
    ];

    let hosp_ids: Vec<i64> = order.iter().map(|&i| table.hospitals[i].hosp_id).collect();
    let names: Vec<String> = order
        .iter()
        .map(|&i| table.hospitals[i].name.clone())
        .collect();
    let sys_ids: Vec<i64> = order.iter().map(|&i| table.hospitals[i].sys_id).collect();
    let party_sys_ids: Vec<i64> = order
        .iter()
        .map(|&i| table.hospitals[i].party_sys_id)
        .collect();
    let totals: Vec<f64> = order.iter().map(|&i| table.hospitals[i].n_total).collect();

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(hosp_ids)),
        Arc::new(StringArray::from(names)),
        Arc::new(Int64Array::from(sys_ids)),
        Arc::new(Int64Array::from(party_sys_ids)),
        Arc::new(Float64Array::from(totals)),
    ];

    (fields, columns)
}

/// Assemble the hospital-level output batch
pub fn assemble_hospital_level(
    table: &CellHospitalTable,
    scenarios: &[ScenarioColumn],
) -> Result<RecordBatch> {
    let order = presentation_order(table);
    let (mut fields, mut columns) = identity_columns(table, &order);

    for scenario in scenarios {
        fields.push(Field::new(
            format!("div_from_{}", scenario.hosp_id),
            DataType::Float64,
            true,
        ));
        let values: Vec<Option<f64>> = order.iter().map(|&i| scenario.values[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}

/// Assemble the system-level output batch
pub fn assemble_system_level(
    table: &CellHospitalTable,
    systems: &[SystemColumn],
) -> Result<RecordBatch> {
    let order = presentation_order(table);
    let (mut fields, mut columns) = identity_columns(table, &order);

    for system in systems {
        fields.push(Field::new(
            format!("div_from_sys_{}", system.focal_system),
            DataType::Float64,
            true,
        ));
        let values: Vec<Option<f64>> = order.iter().map(|&i| system.values[i]).collect();
        columns.push(Arc::new(Float64Array::from(values)));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), columns)?)
}
