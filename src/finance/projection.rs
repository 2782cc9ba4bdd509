//! Year-by-year cash-flow projection over the project horizon.

use crate::config::ScenarioConfig;
use crate::sim::summary::SimulationSummary;

use super::degradation::{
    battery_capacity_fraction, escalation_factor, grown_annual_load, panel_efficiency,
};

/// Year-1 energy flows the projection scales across the horizon.
///
/// Built from a dispatch-stage summary; a 24-hour run is scaled to a year
/// by 365, a full 8760-hour run is taken as-is.
#[derive(Debug, Clone)]
pub struct ProjectionBaseline {
    /// Annual load (kWh).
    pub annual_load_kwh: f64,
    /// Annual solar generation (kWh).
    pub annual_generation_kwh: f64,
    /// Solar consumed directly by the load (kWh).
    pub annual_direct_use_kwh: f64,
    /// Load served from the battery (kWh).
    pub annual_battery_served_kwh: f64,
    /// Energy exported to the grid (kWh).
    pub annual_export_kwh: f64,
    /// Peak import reduction achieved by the system (kW).
    pub peak_reduction_kw: f64,
}

impl ProjectionBaseline {
    /// Derives the baseline from a simulation summary covering `days` days.
    pub fn from_summary(summary: &SimulationSummary, days_simulated: f64) -> Self {
        let scale = if days_simulated > 0.0 {
            365.0 / days_simulated
        } else {
            0.0
        };
        Self {
            annual_load_kwh: summary.total_load_kwh * scale,
            annual_generation_kwh: summary.total_solar_kwh * scale,
            annual_direct_use_kwh: summary.total_solar_used_kwh * scale,
            annual_battery_served_kwh: summary.total_discharge_kwh * scale,
            annual_export_kwh: summary.total_export_kwh * scale,
            peak_reduction_kw: summary.peak_load_kw - summary.peak_import_kw,
        }
    }
}

/// One project year of the financial projection. Each record depends only
/// on its year index and the static configuration; only the cumulative
/// cash flow is carried forward.
#[derive(Debug, Clone)]
pub struct YearlyProjection {
    /// Project year, 1-indexed.
    pub year: usize,
    /// Panel efficiency applied this year (1.0 in year 1).
    pub panel_efficiency: f64,
    /// Battery capacity fraction applied this year (floored at EOL).
    pub battery_capacity_fraction: f64,
    /// Degraded solar generation (kWh).
    pub generation_kwh: f64,
    /// Grown annual load (kWh).
    pub load_kwh: f64,
    /// Escalated energy rate (currency per kWh).
    pub energy_rate: f64,
    /// Escalated demand charge (currency per kVA-month).
    pub demand_rate: f64,
    /// Avoided-import and export income.
    pub energy_income: f64,
    /// Demand charge savings from peak reduction.
    pub demand_income: f64,
    /// Escalated O&M cost.
    pub om_cost: f64,
    /// Escalated insurance cost.
    pub insurance_cost: f64,
    /// One-time replacement cost (zero outside the replacement year).
    pub replacement_cost: f64,
    /// Income minus costs for this year.
    pub net_cash_flow: f64,
    /// Running total including the initial capital outlay.
    pub cumulative_cash_flow: f64,
    /// Net cash flow discounted to present value at the NPV rate.
    pub discounted_cash_flow: f64,
}

/// Installed equipment cost before fees: PV plus battery.
pub fn equipment_cost(config: &ScenarioConfig) -> f64 {
    config.system.pv_kwp * config.costs.capex_per_kwp
        + config.battery.capacity_kwh * config.costs.capex_per_kwh
}

/// Total initial capital outlay including fees and contingency.
pub fn initial_capital(config: &ScenarioConfig) -> f64 {
    equipment_cost(config) * (1.0 + config.costs.fees_fraction)
}

/// Builds the full projection table with income and costs at their
/// expected values.
pub fn build_projection(
    config: &ScenarioConfig,
    baseline: &ProjectionBaseline,
) -> Vec<YearlyProjection> {
    build_projection_scaled(config, baseline, 1.0, 1.0)
}

/// Builds the projection with income and cost scale factors applied, used
/// by the sensitivity bands (e.g. income ×1.1 and costs ×0.9 for the
/// optimistic case).
pub fn build_projection_scaled(
    config: &ScenarioConfig,
    baseline: &ProjectionBaseline,
    income_factor: f64,
    cost_factor: f64,
) -> Vec<YearlyProjection> {
    let fin = &config.financial;
    let tariff = &config.tariff;
    let deg = &config.degradation;
    let degrade = config.advanced.degradation;

    let pv_capex = config.system.pv_kwp * config.costs.capex_per_kwp;
    let battery_capex = config.battery.capacity_kwh * config.costs.capex_per_kwh;
    let insured_base = equipment_cost(config) * config.costs.insurance_fraction;

    let load_step = fin
        .load_step_year
        .map(|y| (y, fin.load_step_kwh))
        .filter(|_| config.advanced.load_growth);
    let growth_rate = if config.advanced.load_growth {
        fin.load_growth_rate
    } else {
        0.0
    };

    let mut cumulative = -initial_capital(config);
    let mut projection = Vec::with_capacity(fin.horizon_years);

    for year in 1..=fin.horizon_years {
        let eff = if degrade { panel_efficiency(deg, year) } else { 1.0 };
        let battery_frac = if degrade {
            battery_capacity_fraction(deg, year)
        } else {
            1.0
        };

        let energy_rate = tariff.energy_rate * escalation_factor(fin.tariff_escalation, year);
        let export_rate = tariff.export_rate * escalation_factor(fin.tariff_escalation, year);
        let demand_rate = tariff.demand_charge * escalation_factor(fin.demand_escalation, year);

        // Battery-served energy degrades with whichever of the two
        // components is the tighter constraint.
        let served = baseline.annual_direct_use_kwh * eff
            + baseline.annual_battery_served_kwh * eff.min(battery_frac);
        let export_income = if config.advanced.allow_export {
            baseline.annual_export_kwh * eff * export_rate
        } else {
            0.0
        };
        let energy_income = (served * energy_rate + export_income) * income_factor;
        let demand_income =
            baseline.peak_reduction_kw * demand_rate * 12.0 * battery_frac * income_factor;

        let om_cost =
            config.costs.om_per_year * escalation_factor(fin.cpi, year) * cost_factor;
        let insurance_cost =
            insured_base * escalation_factor(fin.insurance_escalation, year) * cost_factor;
        let replacement_cost = if config.costs.replacement_year == Some(year) {
            let raw = pv_capex
                * (config.costs.replacement_module_fraction
                    + config.costs.replacement_inverter_fraction)
                + battery_capex * config.costs.replacement_battery_fraction;
            raw * escalation_factor(fin.cpi, year) * cost_factor
        } else {
            0.0
        };

        let net = energy_income + demand_income - om_cost - insurance_cost - replacement_cost;
        cumulative += net;

        projection.push(YearlyProjection {
            year,
            panel_efficiency: eff,
            battery_capacity_fraction: battery_frac,
            generation_kwh: baseline.annual_generation_kwh * eff,
            load_kwh: grown_annual_load(baseline.annual_load_kwh, growth_rate, year, load_step),
            energy_rate,
            demand_rate,
            energy_income,
            demand_income,
            om_cost,
            insurance_cost,
            replacement_cost,
            net_cash_flow: net,
            cumulative_cash_flow: cumulative,
            discounted_cash_flow: net / (1.0 + fin.discount_rate).powi(year as i32),
        });
    }

    projection
}

/// Cash-flow sequence for the metrics engine: `t = 0` is the negative
/// initial outlay, followed by each year's net cash flow.
pub fn cash_flow_sequence(config: &ScenarioConfig, projection: &[YearlyProjection]) -> Vec<f64> {
    let mut flows = Vec::with_capacity(projection.len() + 1);
    flows.push(-initial_capital(config));
    flows.extend(projection.iter().map(|y| y.net_cash_flow));
    flows
}
