//! Patient-diversion computation for hospital merger analysis
//!
//! This module measures where each merging-party hospital's admissions
//! would land if the hospital were removed from the choice set. It
//! includes:
//!
//! 1. Validation and extraction of cell-tagged discharge rows
//! 2. Cell-by-hospital aggregation into a struct-of-arrays volume table
//! 3. Per-cell share and diversion-fraction computation per focal system
//! 4. One exclusion scenario per party hospital, with optional parallelism
//! 5. Volume-weighted roll-up to system-level columns
//!
//! Outputs are two Arrow batches (hospital-level and system-level) plus a
//! serializable run report.

pub mod aggregation;
pub mod assemble;
pub mod calculator;
pub mod extraction;
pub mod shares;
pub mod simulation;
pub mod system;
pub mod types;
pub mod validation;

// Re-export key types
pub use calculator::DiversionCalculator;
pub use types::{DiversionReport, DiversionResult, ScenarioReport};
