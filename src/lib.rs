//! Behind-the-meter solar + battery dispatch and investment simulator.

pub mod config;
pub mod dispatch;
/// Multi-year cash-flow projection and investment metrics.
pub mod finance;
pub mod io;
pub mod profile;
pub mod shedding;
/// Hourly simulation driver and run-level aggregation.
pub mod sim;
