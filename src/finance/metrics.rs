//! Investment metrics computed from the projected cash-flow sequence.
//!
//! All functions take the cash flows with `t = 0` holding the negative
//! initial outlay and `t = 1..` the yearly net flows.

use std::fmt;

use rayon::join;

use crate::config::ScenarioConfig;

use super::projection::{
    ProjectionBaseline, YearlyProjection, build_projection, build_projection_scaled,
    cash_flow_sequence, equipment_cost, initial_capital,
};

use super::degradation::{escalation_factor, panel_efficiency};

/// Net present value of a cash-flow sequence at the given discount rate.
pub fn npv(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Derivative of NPV with respect to the rate, used by the IRR solver.
fn npv_derivative(rate: f64, cash_flows: &[f64]) -> f64 {
    cash_flows
        .iter()
        .enumerate()
        .skip(1)
        .map(|(t, cf)| -(t as f64) * cf / (1.0 + rate).powi(t as i32 + 1))
        .sum()
}

/// Internal rate of return by Newton-Raphson from a 10% initial guess.
///
/// Returns `None` for degenerate sequences with no sign change. When the
/// derivative vanishes or the 100-iteration budget runs out, the current
/// estimate is returned rather than treated as an error. The candidate
/// rate is clamped to `[-0.99, 5.0]` each step to keep the discount
/// factors finite.
pub fn irr(cash_flows: &[f64]) -> Option<f64> {
    if cash_flows.iter().all(|cf| *cf >= 0.0) || cash_flows.iter().all(|cf| *cf <= 0.0) {
        return None;
    }
    let mut rate = 0.10;
    for _ in 0..100 {
        let value = npv(rate, cash_flows);
        if value.abs() < 1e-4 {
            return Some(rate);
        }
        let slope = npv_derivative(rate, cash_flows);
        if slope.abs() < 1e-6 {
            break;
        }
        rate = (rate - value / slope).clamp(-0.99, 5.0);
    }
    Some(rate)
}

/// Modified internal rate of return.
///
/// Negative flows are discounted to present value at the finance rate,
/// positive flows compounded to the horizon at the reinvestment rate.
/// Returns 0 when either side of the polarity is empty.
pub fn mirr(cash_flows: &[f64], finance_rate: f64, reinvestment_rate: f64) -> f64 {
    let n = cash_flows.len().saturating_sub(1);
    if n == 0 {
        return 0.0;
    }
    let mut pv_negative = 0.0;
    let mut fv_positive = 0.0;
    for (t, cf) in cash_flows.iter().enumerate() {
        if *cf < 0.0 {
            pv_negative += cf / (1.0 + finance_rate).powi(t as i32);
        } else if *cf > 0.0 {
            fv_positive += cf * (1.0 + reinvestment_rate).powi((n - t) as i32);
        }
    }
    if pv_negative >= 0.0 || fv_positive <= 0.0 {
        return 0.0;
    }
    (fv_positive / -pv_negative).powf(1.0 / n as f64) - 1.0
}

/// Discounted payback period in years, linearly interpolated within the
/// crossing year. Returns `horizon + 1` when the cumulative cash flow
/// never turns positive.
pub fn payback_years(projection: &[YearlyProjection], initial_outlay: f64) -> f64 {
    let mut previous = -initial_outlay;
    for row in projection {
        if row.cumulative_cash_flow >= 0.0 {
            let recovered_in_year = row.cumulative_cash_flow - previous;
            if recovered_in_year > 0.0 {
                return row.year as f64 - 1.0 + (-previous) / recovered_in_year;
            }
            return row.year as f64;
        }
        previous = row.cumulative_cash_flow;
    }
    projection.len() as f64 + 1.0
}

/// Levelized cost of energy: initial capital plus escalated lifetime
/// costs over discounted lifetime generation. Only the energy yield is
/// discounted, at a rate that may differ from the NPV rate. Returns 0
/// when the system generates nothing.
pub fn lcoe(config: &ScenarioConfig, baseline: &ProjectionBaseline) -> f64 {
    let fin = &config.financial;
    let deg = &config.degradation;
    let rate = fin.lcoe_discount_rate;
    let insured_base = equipment_cost(config) * config.costs.insurance_fraction;
    let pv_capex = config.system.pv_kwp * config.costs.capex_per_kwp;
    let battery_capex = config.battery.capacity_kwh * config.costs.capex_per_kwh;

    let mut costs = initial_capital(config);
    let mut generation = 0.0;
    for year in 1..=fin.horizon_years {
        costs += config.costs.om_per_year * escalation_factor(fin.cpi, year)
            + insured_base * escalation_factor(fin.insurance_escalation, year);
        if config.costs.replacement_year == Some(year) {
            costs += (pv_capex
                * (config.costs.replacement_module_fraction
                    + config.costs.replacement_inverter_fraction)
                + battery_capex * config.costs.replacement_battery_fraction)
                * escalation_factor(fin.cpi, year);
        }

        let eff = if config.advanced.degradation {
            panel_efficiency(deg, year)
        } else {
            1.0
        };
        generation += baseline.annual_generation_kwh * eff / (1.0 + rate).powi(year as i32);
    }

    if generation > 0.0 { costs / generation } else { 0.0 }
}

/// A single sensitivity case: projection metrics under scaled income and
/// cost assumptions.
#[derive(Debug, Clone)]
pub struct SensitivityCase {
    pub npv: f64,
    pub irr: Option<f64>,
    pub payback_years: f64,
}

/// Expected, optimistic, and pessimistic outcomes under a symmetric
/// income/cost variation.
#[derive(Debug, Clone)]
pub struct SensitivityBands {
    pub variation: f64,
    pub optimistic: SensitivityCase,
    pub pessimistic: SensitivityCase,
}

/// Full investment appraisal for one scenario.
#[derive(Debug, Clone)]
pub struct FinancialResult {
    pub initial_capital: f64,
    pub npv: f64,
    pub irr: Option<f64>,
    pub mirr: f64,
    pub lcoe: f64,
    pub payback_years: f64,
    pub lifetime_net_cash_flow: f64,
    pub sensitivity: Option<SensitivityBands>,
}

fn case_from_projection(config: &ScenarioConfig, projection: &[YearlyProjection]) -> SensitivityCase {
    let flows = cash_flow_sequence(config, projection);
    SensitivityCase {
        npv: npv(config.financial.discount_rate, &flows),
        irr: irr(&flows),
        payback_years: payback_years(projection, initial_capital(config)),
    }
}

/// Evaluates all metrics for a scenario given its year-1 baseline flows.
///
/// The optimistic and pessimistic sensitivity projections are independent
/// and run on both halves of the thread pool.
pub fn evaluate(config: &ScenarioConfig, baseline: &ProjectionBaseline) -> FinancialResult {
    let projection = build_projection(config, baseline);
    let flows = cash_flow_sequence(config, &projection);
    let fin = &config.financial;

    let sensitivity = if config.advanced.detailed_financial {
        let v = fin.sensitivity_variation;
        let (optimistic, pessimistic) = join(
            || {
                let p = build_projection_scaled(config, baseline, 1.0 + v, 1.0 - v);
                case_from_projection(config, &p)
            },
            || {
                let p = build_projection_scaled(config, baseline, 1.0 - v, 1.0 + v);
                case_from_projection(config, &p)
            },
        );
        Some(SensitivityBands {
            variation: v,
            optimistic,
            pessimistic,
        })
    } else {
        None
    };

    FinancialResult {
        initial_capital: initial_capital(config),
        npv: npv(fin.discount_rate, &flows),
        irr: irr(&flows),
        mirr: mirr(&flows, fin.finance_rate, fin.reinvestment_rate),
        lcoe: lcoe(config, baseline),
        payback_years: payback_years(&projection, initial_capital(config)),
        lifetime_net_cash_flow: flows.iter().skip(1).sum(),
        sensitivity,
    }
}

impl fmt::Display for FinancialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial Result ---")?;
        writeln!(f, "Initial capital:     {:>12.2}", self.initial_capital)?;
        writeln!(f, "NPV:                 {:>12.2}", self.npv)?;
        match self.irr {
            Some(r) => writeln!(f, "IRR:                 {:>11.2}%", r * 100.0)?,
            None => writeln!(f, "IRR:                 {:>12}", "n/a")?,
        }
        writeln!(f, "MIRR:                {:>11.2}%", self.mirr * 100.0)?;
        writeln!(f, "LCOE:                {:>12.4} /kWh", self.lcoe)?;
        writeln!(f, "Payback:             {:>9.1} yrs", self.payback_years)?;
        write!(f, "Lifetime net flow:   {:>12.2}", self.lifetime_net_cash_flow)?;
        if let Some(bands) = &self.sensitivity {
            write!(
                f,
                "\nNPV band (+/-{:.0}%):   {:.2} .. {:.2}",
                bands.variation * 100.0,
                bands.pessimistic.npv,
                bands.optimistic.npv
            )?;
        }
        Ok(())
    }
}
