//! File output.

pub mod export;

pub use export::{export_hourly_csv, export_projection_csv, write_hourly_csv, write_projection_csv};
