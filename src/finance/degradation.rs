//! Year-indexed degradation, escalation, and load growth factors.
//!
//! Year 1 is the commissioning year and carries no degradation by
//! convention; losses accumulate from year 2. All factors are pure
//! functions of the year index and static configuration.

use crate::config::DegradationConfig;

/// How per-year performance loss accumulates.
#[derive(Debug, Clone, PartialEq)]
pub enum DegradationMode {
    /// Fixed rate per year: remaining = `1 - rate * (year - 1)`.
    Simple { rate_per_year: f64 },
    /// Explicit per-year rates, allowing a distinct first-year rate:
    /// remaining = `1 - Σ rates[0..year-1]`. Years past the end of the
    /// array reuse the last rate.
    Yearly { rates: Vec<f64> },
}

impl DegradationMode {
    /// Remaining performance fraction for a 1-indexed project year,
    /// floored at zero.
    pub fn remaining_fraction(&self, year: usize) -> f64 {
        if year <= 1 {
            return 1.0;
        }
        let lost = match self {
            Self::Simple { rate_per_year } => rate_per_year * (year - 1) as f64,
            Self::Yearly { rates } => {
                if rates.is_empty() {
                    0.0
                } else {
                    (0..year - 1)
                        .map(|i| rates.get(i).copied().unwrap_or(rates[rates.len() - 1]))
                        .sum()
                }
            }
        };
        (1.0 - lost).max(0.0)
    }
}

/// Panel degradation mode from configuration.
pub fn panel_mode(cfg: &DegradationConfig) -> DegradationMode {
    if cfg.mode == "yearly" {
        DegradationMode::Yearly {
            rates: cfg.panel_yearly_rates.clone(),
        }
    } else {
        DegradationMode::Simple {
            rate_per_year: cfg.panel_rate,
        }
    }
}

/// Battery degradation mode from configuration.
pub fn battery_mode(cfg: &DegradationConfig) -> DegradationMode {
    if cfg.mode == "yearly" {
        DegradationMode::Yearly {
            rates: cfg.battery_yearly_rates.clone(),
        }
    } else {
        DegradationMode::Simple {
            rate_per_year: cfg.battery_rate,
        }
    }
}

/// Panel efficiency for a project year: 100% at year 1, floored at 0%.
pub fn panel_efficiency(cfg: &DegradationConfig, year: usize) -> f64 {
    panel_mode(cfg).remaining_fraction(year)
}

/// Battery remaining capacity for a project year, never reported below the
/// configured end-of-life floor.
pub fn battery_capacity_fraction(cfg: &DegradationConfig, year: usize) -> f64 {
    battery_mode(cfg)
        .remaining_fraction(year)
        .max(cfg.battery_eol_fraction)
}

/// Compound escalation index: `(1 + rate)^(year - 1)`, so year 1 is the
/// unescalated baseline.
pub fn escalation_factor(rate: f64, year: usize) -> f64 {
    (1.0 + rate).powi(year.saturating_sub(1) as i32)
}

/// Annual load for a project year: compound growth plus a one-time step
/// increase from `step_year` onward.
pub fn grown_annual_load(
    base_kwh: f64,
    growth_rate: f64,
    year: usize,
    step: Option<(usize, f64)>,
) -> f64 {
    let mut load = base_kwh * escalation_factor(growth_rate, year);
    if let Some((step_year, step_kwh)) = step {
        if year >= step_year {
            load += step_kwh;
        }
    }
    load
}
