//! Exclusion scenario simulation
//!
//! Removing one party hospital from the choice set sends its admissions to
//! the other hospitals of each cell it served, in proportion to their
//! diversion fractions. Summing those gains across cells and dividing by
//! the redistribution base yields one `div_from` column per scenario.

use crate::algorithm::diversion::aggregation::CellHospitalTable;
use crate::algorithm::diversion::shares::CellDiversion;

/// Predicted diversion column for one excluded hospital
#[derive(Debug, Clone)]
pub struct ScenarioColumn {
    /// Focal system the scenario belongs to
    pub focal_system: i64,
    /// Hospital that was excluded
    pub hosp_id: i64,
    /// Display name of the excluded hospital
    pub hospital: String,
    /// Baseline admissions of the excluded hospital
    pub n_k: f64,
    /// Predicted diversion per hospital, indexed like the table's hospitals
    pub values: Vec<Option<f64>>,
    /// Keys of degenerate cells the excluded hospital had volume in
    pub degenerate_cells: Vec<String>,
    /// Whether no admissions could be redistributed at all
    pub zero_denominator: bool,
}

/// Simulate the exclusion of one party hospital
///
/// With `drop_degenerate_cells` the ratios are normalized over the volume
/// that was actually redistributed, so they sum to one whenever anything
/// moved. Without it the baseline volume of the excluded hospital stays in
/// the denominator and admissions stranded in degenerate cells dilute every
/// ratio.
///
/// Hospitals belonging to the focal system are reported as missing, as is
/// every hospital when nothing could be redistributed.
#[must_use]
pub fn simulate_exclusion(
    table: &CellHospitalTable,
    diversion: &CellDiversion,
    excluded: usize,
    drop_degenerate_cells: bool,
) -> ScenarioColumn {
    let hospital_k = &table.hospitals[excluded];
    let focal_system = diversion.focal_system;

    let mut gains = vec![0.0f64; table.hospitals.len()];
    let mut degenerate_cells = Vec::new();

    for &row in &table.hosp_rows[excluded] {
        let ci = table.row_cell[row];
        let n_k_cell = table.row_n_h[row];
        if n_k_cell <= 0.0 {
            continue;
        }
        if diversion.degenerate_cells.binary_search(&ci).is_ok() {
            degenerate_cells.push(table.cells[ci].key.clone());
            continue;
        }

        let cell = &table.cells[ci];
        for cell_row in cell.start..cell.end {
            let div = diversion.div[cell_row];
            if div > 0.0 {
                gains[table.row_hosp[cell_row]] += n_k_cell * div;
            }
        }
    }

    let denominator: f64 = if drop_degenerate_cells {
        gains.iter().sum()
    } else {
        hospital_k.n_total
    };
    let zero_denominator = denominator <= 0.0;

    let values = table
        .hospitals
        .iter()
        .enumerate()
        .map(|(hi, hospital)| {
            if hospital.sys_id == focal_system || zero_denominator {
                None
            } else {
                Some(gains[hi] / denominator)
            }
        })
        .collect();

    ScenarioColumn {
        focal_system,
        hosp_id: hospital_k.hosp_id,
        hospital: hospital_k.name.clone(),
        n_k: hospital_k.n_total,
        values,
        degenerate_cells,
        zero_denominator,
    }
}
