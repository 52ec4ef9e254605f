//! Cell-by-hospital aggregation for the diversion engine
//!
//! This module folds discharge rows into an optimized struct-of-arrays
//! volume table, which improves cache locality by storing each attribute
//! in its own contiguous array. Every later stage runs on this table
//! instead of the raw batch.

use itertools::Itertools;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::algorithm::diversion::types::DischargeRows;

/// A hospital with its first-seen attributes and baseline volume
#[derive(Debug, Clone)]
pub struct Hospital {
    /// Hospital identifier
    pub hosp_id: i64,
    /// Display name
    pub name: String,
    /// System the hospital belongs to
    pub sys_id: i64,
    /// `sys_id` when the hospital belongs to a merging party, otherwise 0
    pub party_sys_id: i64,
    /// Baseline admissions across all cells
    pub n_total: f64,
}

/// Contiguous run of table rows belonging to one cell
#[derive(Debug, Clone)]
pub struct CellSlice {
    /// Cell key
    pub key: String,
    /// First row of the cell
    pub start: usize,
    /// One past the last row of the cell
    pub end: usize,
}

/// Cell-by-hospital volume table in struct-of-arrays form
///
/// Rows are sorted by (cell key, hospital id) so each cell occupies a
/// contiguous slice. `hospitals` is sorted by hospital id and `row_hosp`
/// indexes into it.
#[derive(Debug, Clone, Default)]
pub struct CellHospitalTable {
    /// Cell index of each row
    pub row_cell: Vec<usize>,
    /// Hospital index of each row
    pub row_hosp: Vec<usize>,
    /// Admissions of each row
    pub row_n_h: Vec<f64>,
    /// Cells, ascending by key
    pub cells: Vec<CellSlice>,
    /// Hospitals, ascending by id
    pub hospitals: Vec<Hospital>,
    /// Rows of each hospital, indexed like `hospitals`
    pub hosp_rows: Vec<Vec<usize>>,
    /// Distinct positive party system ids, ascending
    pub focal_systems: SmallVec<[i64; 4]>,
}

impl CellHospitalTable {
    /// Number of (cell, hospital) rows in the table
    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.row_n_h.len()
    }

    /// Indices of the merging-party hospitals of `focal_system`, ascending by id
    #[must_use]
    pub fn party_hospitals(&self, focal_system: i64) -> Vec<usize> {
        self.hospitals
            .iter()
            .enumerate()
            .filter(|(_, hospital)| hospital.party_sys_id == focal_system)
            .map(|(idx, _)| idx)
            .collect()
    }
}

/// Build the cell-by-hospital volume table from extracted rows
///
/// Hospital attributes (name, system, party membership) are taken from the
/// first row a hospital appears in; counts are summed across rows that share
/// a (cell, hospital) pair.
#[must_use]
pub fn build_cell_hospital_table(rows: &DischargeRows) -> CellHospitalTable {
    let mut hospitals: Vec<Hospital> = Vec::new();
    let mut hosp_index: FxHashMap<i64, usize> = FxHashMap::default();
    let mut cell_keys: Vec<String> = Vec::new();
    let mut cell_index: FxHashMap<String, usize> = FxHashMap::default();
    let mut volume: FxHashMap<(usize, usize), f64> = FxHashMap::default();

    for i in 0..rows.len() {
        let hosp_id = rows.hosp_ids[i];
        let hi = match hosp_index.get(&hosp_id) {
            Some(&hi) => hi,
            None => {
                let hi = hospitals.len();
                let sys_id = rows.sys_ids[i];
                hospitals.push(Hospital {
                    hosp_id,
                    name: rows.hospitals[i].clone(),
                    sys_id,
                    party_sys_id: if rows.party[i] { sys_id } else { 0 },
                    n_total: 0.0,
                });
                hosp_index.insert(hosp_id, hi);
                hi
            }
        };
        hospitals[hi].n_total += rows.counts[i];

        let ci = match cell_index.get(&rows.cells[i]) {
            Some(&ci) => ci,
            None => {
                let ci = cell_keys.len();
                cell_keys.push(rows.cells[i].clone());
                cell_index.insert(rows.cells[i].clone(), ci);
                ci
            }
        };

        *volume.entry((ci, hi)).or_default() += rows.counts[i];
    }

    // Rank hospitals by id and cells by key for deterministic table order
    let mut hosp_order: Vec<usize> = (0..hospitals.len()).collect();
    hosp_order.sort_unstable_by_key(|&i| hospitals[i].hosp_id);
    let mut hosp_rank = vec![0usize; hospitals.len()];
    for (new_idx, &old_idx) in hosp_order.iter().enumerate() {
        hosp_rank[old_idx] = new_idx;
    }

    let mut cell_order: Vec<usize> = (0..cell_keys.len()).collect();
    cell_order.sort_unstable_by(|&a, &b| cell_keys[a].cmp(&cell_keys[b]));
    let mut cell_rank = vec![0usize; cell_keys.len()];
    for (new_idx, &old_idx) in cell_order.iter().enumerate() {
        cell_rank[old_idx] = new_idx;
    }

    let mut entries: Vec<(usize, usize, f64)> = volume
        .into_iter()
        .map(|((ci, hi), n_h)| (cell_rank[ci], hosp_rank[hi], n_h))
        .collect();
    entries.sort_unstable_by_key(|&(ci, hi, _)| (ci, hi));

    let hospitals: Vec<Hospital> = hosp_order.iter().map(|&i| hospitals[i].clone()).collect();

    let mut row_cell = Vec::with_capacity(entries.len());
    let mut row_hosp = Vec::with_capacity(entries.len());
    let mut row_n_h = Vec::with_capacity(entries.len());
    let mut cells: Vec<CellSlice> = Vec::with_capacity(cell_keys.len());

    for (ci, hi, n_h) in entries {
        if cells.len() == ci {
            cells.push(CellSlice {
                key: cell_keys[cell_order[ci]].clone(),
                start: row_cell.len(),
                end: row_cell.len(),
            });
        }
        row_cell.push(ci);
        row_hosp.push(hi);
        row_n_h.push(n_h);
        cells[ci].end = row_cell.len();
    }

    let mut hosp_rows: Vec<Vec<usize>> = vec![Vec::new(); hospitals.len()];
    for (row, &hi) in row_hosp.iter().enumerate() {
        hosp_rows[hi].push(row);
    }

    let focal_systems: SmallVec<[i64; 4]> = hospitals
        .iter()
        .map(|hospital| hospital.party_sys_id)
        .filter(|&sys| sys > 0)
        .sorted_unstable()
        .dedup()
        .collect();

    CellHospitalTable {
        row_cell,
        row_hosp,
        row_n_h,
        cells,
        hospitals,
        hosp_rows,
        focal_systems,
    }
}
