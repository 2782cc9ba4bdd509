//! Multi-year financial projection and investment metrics.

pub mod degradation;
pub mod metrics;
pub mod projection;

pub use degradation::{battery_capacity_fraction, escalation_factor, panel_efficiency};
pub use metrics::{FinancialResult, SensitivityBands, SensitivityCase, evaluate, irr, lcoe, mirr, npv};
pub use projection::{
    ProjectionBaseline, YearlyProjection, build_projection, cash_flow_sequence, initial_capital,
};
