//! System-level aggregation of scenario columns
//!
//! A focal system's column is the volume-weighted average of its party
//! hospitals' scenario columns, with each hospital weighted by its baseline
//! admissions. Missing constituents make the aggregate missing.

use log::warn;

use crate::algorithm::diversion::aggregation::CellHospitalTable;
use crate::algorithm::diversion::simulation::ScenarioColumn;

/// Aggregated diversion column for one focal system
#[derive(Debug, Clone)]
pub struct SystemColumn {
    /// Focal system the column belongs to
    pub focal_system: i64,
    /// Aggregated diversion per hospital, indexed like the table's hospitals
    pub values: Vec<Option<f64>>,
}

/// Roll scenario columns up to one column per focal system
#[must_use]
pub fn aggregate_to_systems(
    table: &CellHospitalTable,
    scenarios: &[ScenarioColumn],
) -> Vec<SystemColumn> {
    table
        .focal_systems
        .iter()
        .map(|&focal_system| {
            let members: Vec<&ScenarioColumn> = scenarios
                .iter()
                .filter(|scenario| scenario.focal_system == focal_system)
                .collect();
            let total_weight: f64 = members.iter().map(|scenario| scenario.n_k).sum();

            if total_weight <= 0.0 {
                warn!(
                    "Focal system {focal_system} has no baseline admissions; its system-level column is missing"
                );
                return SystemColumn {
                    focal_system,
                    values: vec![None; table.hospitals.len()],
                };
            }

            let values = (0..table.hospitals.len())
                .map(|hi| {
                    let mut acc = 0.0;
                    for member in &members {
                        match member.values[hi] {
                            Some(value) => acc += member.n_k / total_weight * value,
                            None => return None,
                        }
                    }
                    Some(acc)
                })
                .collect();

            SystemColumn {
                focal_system,
                values,
            }
        })
        .collect()
}
