//! Synthetic discharge data for demos and tests
//!
//! Generates a cell-tagged discharge batch over a known hospital landscape,
//! deterministic under a fixed seed. Each generated row is one admission
//! (`count` of 1) at a uniformly drawn hospital and cell, which keeps every
//! hospital present in most cells.

use std::sync::Arc;

use arrow::array::{BooleanArray, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rand::prelude::*;

use crate::error::{DiversionError, Result};

/// Configuration for the synthetic discharge generator
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Number of cells admissions spread over
    pub cells: usize,
    /// Number of hospital systems
    pub systems: usize,
    /// Hospitals per system
    pub hospitals_per_system: usize,
    /// How many systems, taken from the lowest ids, are merging parties
    pub party_systems: usize,
    /// Discharge rows to generate
    pub rows: usize,
    /// RNG seed
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            cells: 50,
            systems: 4,
            hospitals_per_system: 3,
            party_systems: 1,
            rows: 2000,
            seed: 42,
        }
    }
}

/// Generate a synthetic cell-tagged discharge batch
///
/// Hospital ids are `100 * sys_id + ordinal`, so system membership is
/// readable off the id. Integer cell keys and an integer count column
/// exercise the same encodings real extracts arrive in.
///
/// # Errors
/// Returns an error when the configuration describes an empty landscape
pub fn simulate_discharge_batch(config: &SimulationConfig) -> Result<RecordBatch> {
    if config.cells == 0 || config.systems == 0 || config.hospitals_per_system == 0 {
        return Err(DiversionError::InvalidConfig(
            "simulation needs at least one cell, system and hospital".to_string(),
        ));
    }
    if config.party_systems > config.systems {
        return Err(DiversionError::InvalidConfig(
            "more party systems than systems".to_string(),
        ));
    }

    let mut roster: Vec<(i64, String, i64, bool)> = Vec::new();
    for sys in 1..=config.systems as i64 {
        for ordinal in 1..=config.hospitals_per_system as i64 {
            let hosp_id = sys * 100 + ordinal;
            roster.push((
                hosp_id,
                format!("Hospital {hosp_id}"),
                sys,
                sys <= config.party_systems as i64,
            ));
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut cells = Vec::with_capacity(config.rows);
    let mut hosp_ids = Vec::with_capacity(config.rows);
    let mut hospitals = Vec::with_capacity(config.rows);
    let mut sys_ids = Vec::with_capacity(config.rows);
    let mut party = Vec::with_capacity(config.rows);
    let mut counts = Vec::with_capacity(config.rows);

    for _ in 0..config.rows {
        let (hosp_id, name, sys, is_party) = &roster[rng.random_range(0..roster.len())];
        cells.push(rng.random_range(1..=config.cells as i64));
        hosp_ids.push(*hosp_id);
        hospitals.push(name.clone());
        sys_ids.push(*sys);
        party.push(*is_party);
        counts.push(1i64);
    }

    let schema = Schema::new(vec![
        Field::new("cell", DataType::Int64, false),
        Field::new("hosp_id", DataType::Int64, false),
        Field::new("hospital", DataType::Utf8, false),
        Field::new("sys_id", DataType::Int64, false),
        Field::new("party_ind", DataType::Boolean, false),
        Field::new("count", DataType::Int64, false),
    ]);

    Ok(RecordBatch::try_new(
        Arc::new(schema),
        vec![
            Arc::new(Int64Array::from(cells)),
            Arc::new(Int64Array::from(hosp_ids)),
            Arc::new(StringArray::from(hospitals)),
            Arc::new(Int64Array::from(sys_ids)),
            Arc::new(BooleanArray::from(party)),
            Arc::new(Int64Array::from(counts)),
        ],
    )?)
}
