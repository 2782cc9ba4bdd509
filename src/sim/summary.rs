//! Post-hoc aggregation of hourly results into run-level energy metrics.

use std::fmt;

use super::driver::HourlyResult;

/// Aggregate energy metrics derived from a complete simulation run.
///
/// Computed post-hoc from the hourly result sequence so reported metrics
/// always agree with the per-hour records. Every ratio treats a zero
/// denominator as 0 rather than raising.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationSummary {
    /// Total load across the run (kWh).
    pub total_load_kwh: f64,
    /// Total solar generation (kWh).
    pub total_solar_kwh: f64,
    /// Total grid import (kWh).
    pub total_import_kwh: f64,
    /// Total grid export (kWh).
    pub total_export_kwh: f64,
    /// Total solar consumed directly by the load (kWh).
    pub total_solar_used_kwh: f64,
    /// Total battery charge throughput (kWh).
    pub total_charge_kwh: f64,
    /// Total battery discharge throughput (kWh).
    pub total_discharge_kwh: f64,
    /// Total unmet load during outage hours (kWh).
    pub total_unmet_kwh: f64,
    /// Total curtailed solar during outage hours (kWh).
    pub total_curtailed_kwh: f64,
    /// Largest hourly load (kW at hourly resolution).
    pub peak_load_kw: f64,
    /// Largest hourly grid import (kW).
    pub peak_import_kw: f64,
    /// Fraction of solar generation consumed directly by the load.
    pub self_consumption_rate: f64,
    /// Fraction of load met by solar directly or via the battery.
    pub solar_coverage_rate: f64,
    /// `(peak_load - peak_import) / peak_load`.
    pub peak_reduction: f64,
    /// Approximate battery cycles: total discharge over nameplate capacity.
    pub battery_cycles: f64,
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        numerator / denominator
    } else {
        0.0
    }
}

impl SimulationSummary {
    /// Computes all aggregates from the complete hourly record.
    ///
    /// `battery_capacity_kwh` is the nameplate capacity used for the cycle
    /// estimate; pass 0 to report zero cycles.
    pub fn from_results(results: &[HourlyResult], battery_capacity_kwh: f64) -> Self {
        let mut total_load = 0.0;
        let mut total_solar = 0.0;
        let mut total_import = 0.0;
        let mut total_export = 0.0;
        let mut total_solar_used = 0.0;
        let mut total_charge = 0.0;
        let mut total_discharge = 0.0;
        let mut total_unmet = 0.0;
        let mut total_curtailed = 0.0;
        let mut peak_load = 0.0_f64;
        let mut peak_import = 0.0_f64;

        for r in results {
            total_load += r.load;
            total_solar += r.solar;
            total_import += r.grid_import;
            total_export += r.grid_export;
            total_solar_used += r.solar_used;
            total_charge += r.battery_charge;
            total_discharge += r.battery_discharge;
            total_unmet += r.unmet_load;
            total_curtailed += r.curtailed_solar;
            peak_load = peak_load.max(r.load);
            peak_import = peak_import.max(r.grid_import);
        }

        Self {
            total_load_kwh: total_load,
            total_solar_kwh: total_solar,
            total_import_kwh: total_import,
            total_export_kwh: total_export,
            total_solar_used_kwh: total_solar_used,
            total_charge_kwh: total_charge,
            total_discharge_kwh: total_discharge,
            total_unmet_kwh: total_unmet,
            total_curtailed_kwh: total_curtailed,
            peak_load_kw: peak_load,
            peak_import_kw: peak_import,
            self_consumption_rate: ratio(total_solar_used, total_solar),
            solar_coverage_rate: ratio(total_solar_used + total_discharge, total_load),
            peak_reduction: ratio(peak_load - peak_import, peak_load),
            battery_cycles: ratio(total_discharge, battery_capacity_kwh),
        }
    }
}

impl fmt::Display for SimulationSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Simulation Summary ---")?;
        writeln!(f, "Load:                {:>9.2} kWh (peak {:.2} kW)", self.total_load_kwh, self.peak_load_kw)?;
        writeln!(f, "Solar:               {:>9.2} kWh", self.total_solar_kwh)?;
        writeln!(f, "Grid import:         {:>9.2} kWh (peak {:.2} kW)", self.total_import_kwh, self.peak_import_kw)?;
        writeln!(f, "Grid export:         {:>9.2} kWh", self.total_export_kwh)?;
        writeln!(f, "Battery charge:      {:>9.2} kWh", self.total_charge_kwh)?;
        writeln!(f, "Battery discharge:   {:>9.2} kWh ({:.2} cycles)", self.total_discharge_kwh, self.battery_cycles)?;
        writeln!(f, "Self-consumption:    {:>8.1}%", self.self_consumption_rate * 100.0)?;
        writeln!(f, "Solar coverage:      {:>8.1}%", self.solar_coverage_rate * 100.0)?;
        write!(f, "Peak reduction:      {:>8.1}%", self.peak_reduction * 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hour(load: f64, solar: f64, import: f64, solar_used: f64, discharge: f64) -> HourlyResult {
        HourlyResult {
            hour: 0,
            load,
            solar,
            grid_import: import,
            grid_export: 0.0,
            solar_used,
            battery_charge: 0.0,
            battery_discharge: discharge,
            soc_kwh: 5.0,
            net_load: load - solar,
            unmet_load: 0.0,
            curtailed_solar: 0.0,
        }
    }

    #[test]
    fn totals_sum_hourly_values() {
        let results = vec![
            hour(2.0, 1.0, 1.0, 1.0, 0.0),
            hour(3.0, 0.0, 2.0, 0.0, 1.0),
        ];
        let s = SimulationSummary::from_results(&results, 10.0);
        assert_eq!(s.total_load_kwh, 5.0);
        assert_eq!(s.total_solar_kwh, 1.0);
        assert_eq!(s.total_import_kwh, 3.0);
        assert_eq!(s.total_discharge_kwh, 1.0);
    }

    #[test]
    fn rates_and_peaks() {
        let results = vec![
            hour(4.0, 2.0, 2.0, 2.0, 0.0),
            hour(6.0, 0.0, 4.0, 0.0, 2.0),
        ];
        let s = SimulationSummary::from_results(&results, 10.0);
        assert_eq!(s.self_consumption_rate, 1.0);
        assert!((s.solar_coverage_rate - 0.4).abs() < 1e-12);
        assert_eq!(s.peak_load_kw, 6.0);
        assert_eq!(s.peak_import_kw, 4.0);
        assert!((s.peak_reduction - (6.0 - 4.0) / 6.0).abs() < 1e-12);
        assert!((s.battery_cycles - 0.2).abs() < 1e-12);
    }

    #[test]
    fn zero_solar_yields_zero_self_consumption_rate() {
        let results = vec![hour(2.0, 0.0, 2.0, 0.0, 0.0)];
        let s = SimulationSummary::from_results(&results, 10.0);
        assert_eq!(s.self_consumption_rate, 0.0);
    }

    #[test]
    fn empty_run_is_all_zero() {
        let s = SimulationSummary::from_results(&[], 10.0);
        assert_eq!(s.total_load_kwh, 0.0);
        assert_eq!(s.peak_reduction, 0.0);
        assert_eq!(s.battery_cycles, 0.0);
    }

    #[test]
    fn zero_capacity_reports_zero_cycles() {
        let results = vec![hour(3.0, 0.0, 2.0, 0.0, 1.0)];
        let s = SimulationSummary::from_results(&results, 0.0);
        assert_eq!(s.battery_cycles, 0.0);
    }

    #[test]
    fn display_does_not_panic() {
        let s = SimulationSummary::from_results(&[hour(2.0, 1.0, 1.0, 1.0, 0.0)], 10.0);
        assert!(!format!("{s}").is_empty());
    }
}
