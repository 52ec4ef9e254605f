//! Per-cell market shares and diversion fractions
//!
//! For each cell the focal system's share is measured over party rows only,
//! and each rival row's diversion fraction renormalizes its share over the
//! volume the focal system does not hold. Rows of the focal system itself
//! divert nothing.

use smallvec::SmallVec;

use crate::algorithm::diversion::aggregation::CellHospitalTable;

/// Per-cell shares and diversion fractions for one focal system
#[derive(Debug, Clone)]
pub struct CellDiversion {
    /// Focal system these fractions were computed for
    pub focal_system: i64,
    /// Within-cell share of each table row
    pub share_h: Vec<f64>,
    /// Focal-system share of each cell
    pub share_m: Vec<f64>,
    /// Diversion fraction of each table row; NaN in degenerate or empty cells
    pub div: Vec<f64>,
    /// Cells whose entire volume sits with the focal system, ascending
    pub degenerate_cells: SmallVec<[usize; 4]>,
}

/// Compute shares and diversion fractions for `focal_system` across all cells
///
/// A cell is degenerate when the focal system holds all of its volume; its
/// rows keep NaN fractions and the cell index is recorded. Cells with no
/// volume at all also yield NaN fractions but are not flagged.
#[must_use]
pub fn compute_cell_diversion(table: &CellHospitalTable, focal_system: i64) -> CellDiversion {
    let num_rows = table.num_rows();
    let mut share_h = vec![0.0; num_rows];
    let mut share_m = vec![0.0; table.cells.len()];
    let mut div = vec![0.0; num_rows];
    let mut degenerate_cells = SmallVec::new();

    for (ci, cell) in table.cells.iter().enumerate() {
        let mut n = 0.0;
        let mut n_m = 0.0;
        for row in cell.start..cell.end {
            n += table.row_n_h[row];
            if table.hospitals[table.row_hosp[row]].party_sys_id == focal_system {
                n_m += table.row_n_h[row];
            }
        }

        // Exact equality is safe: both sums accumulate the same addends in
        // the same order when the focal system holds the whole cell.
        if n > 0.0 && n_m == n {
            degenerate_cells.push(ci);
        }

        let cell_share_m = n_m / n;
        let n_rival = n - n_m;
        let remaining = 1.0 - cell_share_m;
        share_m[ci] = cell_share_m;

        for row in cell.start..cell.end {
            share_h[row] = table.row_n_h[row] / n;
            let hospital = &table.hospitals[table.row_hosp[row]];
            let rival_share = if hospital.sys_id == focal_system {
                0.0
            } else {
                table.row_n_h[row] / n_rival
            };
            div[row] = rival_share / remaining;
        }
    }

    CellDiversion {
        focal_system,
        share_h,
        share_m,
        div,
        degenerate_cells,
    }
}
