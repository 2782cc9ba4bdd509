//! Simulation driver and run-level aggregation.

pub mod driver;
pub mod summary;

pub use driver::{HourlyResult, OutageMask, Simulator};
pub use summary::SimulationSummary;
