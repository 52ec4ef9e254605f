//! Core diversion computation
//!
//! This module implements the `DiversionCalculator` struct which orchestrates
//! the full pipeline: validate, extract, aggregate, simulate, assemble.

use std::time::Instant;

use arrow::record_batch::RecordBatch;
use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;

use crate::algorithm::diversion::aggregation::build_cell_hospital_table;
use crate::algorithm::diversion::assemble::{assemble_hospital_level, assemble_system_level};
use crate::algorithm::diversion::extraction::extract_discharge_rows;
use crate::algorithm::diversion::shares::compute_cell_diversion;
use crate::algorithm::diversion::simulation::{ScenarioColumn, simulate_exclusion};
use crate::algorithm::diversion::system::aggregate_to_systems;
use crate::algorithm::diversion::types::{DiversionReport, DiversionResult, ScenarioReport};
use crate::algorithm::diversion::validation::{validate_columns, warn_ambiguous_hospital_names};
use crate::config::DiversionConfig;
use crate::error::Result;
use crate::utils::progress;

/// Calculator for patient-diversion scenarios
#[derive(Debug)]
pub struct DiversionCalculator {
    /// Engine configuration
    config: DiversionConfig,
}

impl DiversionCalculator {
    // Constants for optimization
    const PARALLEL_THRESHOLD: usize = 10_000; // Table rows before scenarios go parallel

    /// Create a new calculator with the given configuration
    #[must_use]
    pub const fn new(config: DiversionConfig) -> Self {
        Self { config }
    }

    /// Run every exclusion scenario over a discharge batch
    ///
    /// # Arguments
    ///
    /// * `batch` - `RecordBatch` of cell-tagged discharge rows
    ///
    /// # Returns
    ///
    /// Result containing the hospital-level and system-level diversion tables
    /// together with the run report
    pub fn calculate(&self, batch: &RecordBatch) -> Result<DiversionResult> {
        let start_time = Instant::now();

        validate_columns(batch, &self.config.columns)?;

        let rows = extract_discharge_rows(batch, &self.config.columns)?;
        warn_ambiguous_hospital_names(&rows);

        let table = build_cell_hospital_table(&rows);

        if table.focal_systems.is_empty() {
            warn!("No merging-party hospitals found; returning baseline columns only");
        }

        let total_scenarios: usize = table
            .focal_systems
            .iter()
            .map(|&m| table.party_hospitals(m).len())
            .sum();

        info!(
            "Computing diversion for {} focal system(s) over {} cells and {} hospitals ({} scenarios)",
            table.focal_systems.len(),
            table.cells.len(),
            table.hospitals.len(),
            total_scenarios
        );

        let use_parallel = self.config.use_parallel && table.num_rows() >= Self::PARALLEL_THRESHOLD;
        let progress_bar = if self.config.show_progress {
            progress::scenario_bar(total_scenarios as u64, "Simulating exclusions")
        } else {
            ProgressBar::hidden()
        };

        let mut scenarios: Vec<ScenarioColumn> = Vec::with_capacity(total_scenarios);
        for &focal_system in &table.focal_systems {
            let diversion = compute_cell_diversion(&table, focal_system);
            let party = table.party_hospitals(focal_system);

            let columns: Vec<ScenarioColumn> = if use_parallel && party.len() > 1 {
                party
                    .par_iter()
                    .map(|&excluded| {
                        let column = simulate_exclusion(
                            &table,
                            &diversion,
                            excluded,
                            self.config.drop_degenerate_cells,
                        );
                        progress_bar.inc(1);
                        column
                    })
                    .collect()
            } else {
                party
                    .iter()
                    .map(|&excluded| {
                        let column = simulate_exclusion(
                            &table,
                            &diversion,
                            excluded,
                            self.config.drop_degenerate_cells,
                        );
                        progress_bar.inc(1);
                        column
                    })
                    .collect()
            };

            scenarios.extend(columns);
        }
        progress::finish_bar(&progress_bar, "Scenarios complete");

        report_scenario_findings(&scenarios);

        let systems = aggregate_to_systems(&table, &scenarios);

        let hospital_level = assemble_hospital_level(&table, &scenarios)?;
        let system_level = assemble_system_level(&table, &systems)?;

        let report = DiversionReport {
            skipped_rows: rows.skipped,
            scenarios: scenarios
                .iter()
                .map(|scenario| ScenarioReport {
                    focal_system: scenario.focal_system,
                    hosp_id: scenario.hosp_id,
                    hospital: scenario.hospital.clone(),
                    excluded_admissions: scenario.n_k,
                    degenerate_cells: scenario.degenerate_cells.clone(),
                    zero_denominator: scenario.zero_denominator,
                })
                .collect(),
        };

        let elapsed = start_time.elapsed();

        info!(
            "Diversion complete: {} hospitals, {} scenario column(s) in {:.2?}",
            table.hospitals.len(),
            scenarios.len(),
            elapsed
        );

        Ok(DiversionResult {
            hospital_level,
            system_level,
            focal_systems: table.focal_systems.iter().copied().collect(),
            report,
            computation_time: elapsed,
        })
    }
}

/// Surface per-scenario findings through the log facade, in scenario order
fn report_scenario_findings(scenarios: &[ScenarioColumn]) {
    for scenario in scenarios {
        if !scenario.degenerate_cells.is_empty() {
            info!(
                "Excluding {} ({}): focal system {} already holds all volume in cell(s) {}",
                scenario.hospital,
                scenario.hosp_id,
                scenario.focal_system,
                scenario.degenerate_cells.join(", ")
            );
        }
        if scenario.zero_denominator {
            warn!(
                "Excluding {} ({}): no admissions could be redistributed; reporting missing ratios",
                scenario.hospital, scenario.hosp_id
            );
        }
    }
}
