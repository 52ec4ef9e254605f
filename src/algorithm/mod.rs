//! Algorithm implementations for hospital merger analysis
//!
//! This module contains the computational stages of the merger-analysis
//! workflow: assigning discharges to cells, simulating patient diversion
//! away from merging-party hospitals, and measuring each system's
//! willingness-to-pay for network inclusion.

pub mod cells;
pub mod diversion;
pub mod wtp;
