//! Hourly dispatch strategies deciding energy flows between solar, battery,
//! load, and grid.
//!
//! One strategy is selected per simulation run and applied identically every
//! hour. Each implementation receives the same inputs (hour-of-day, load,
//! solar, battery state) and mutates the battery state as its side effect.
//! Out-of-range inputs are the caller's responsibility; no strategy raises
//! an error.

use super::battery::BatteryState;
use super::window::{TimeWindow, any_window_contains};

/// Energy flows produced by one dispatched hour (all kWh).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HourlyFlows {
    /// Energy imported from the grid, including any grid charging.
    pub grid_import: f64,
    /// Energy exported to the grid.
    pub grid_export: f64,
    /// Solar energy consumed directly by the load.
    pub solar_used: f64,
    /// Energy stored into the battery (from solar and, if permitted, grid).
    pub battery_charge: f64,
    /// Energy delivered by the battery to the load.
    pub battery_discharge: f64,
}

/// A dispatch rule applied to every hour of a run.
///
/// Selected once per run for static dispatch in the simulator, the same way
/// the run-level controller is chosen once rather than per step.
pub trait Strategy {
    /// Dispatches one hour and mutates the battery state for the next hour.
    fn dispatch_hour(
        &self,
        hour_of_day: usize,
        load_kwh: f64,
        solar_kwh: f64,
        battery: &mut BatteryState,
    ) -> HourlyFlows;
}

/// Schedule windows and flags shared by the window-driven strategies.
///
/// Each strategy constructor supplies a sensible default; callers may
/// override any field before the run starts.
#[derive(Debug, Clone, Default)]
pub struct DispatchConfig {
    /// Hours in which the battery may be (grid-)charged.
    pub charge_windows: Vec<TimeWindow>,
    /// Hours in which the battery should discharge to cover load.
    pub discharge_windows: Vec<TimeWindow>,
    /// Whether grid energy may top up the battery inside charge windows.
    pub allow_grid_charge: bool,
    /// Import cap for peak shaving (kW).
    pub peak_target_kw: Option<f64>,
}

impl DispatchConfig {
    /// Default time-of-use windows: overnight off-peak charging, morning and
    /// evening peak discharging.
    pub fn tou_default() -> Self {
        Self {
            charge_windows: vec![TimeWindow { start: 22, end: 6 }],
            discharge_windows: vec![
                TimeWindow { start: 7, end: 10 },
                TimeWindow { start: 18, end: 20 },
            ],
            allow_grid_charge: true,
            peak_target_kw: None,
        }
    }

    /// Default peak-shaving configuration: overnight grid top-up permitted,
    /// discharge driven by the import target rather than windows.
    pub fn peak_shaving_default(target_kw: f64) -> Self {
        Self {
            charge_windows: vec![TimeWindow { start: 22, end: 6 }],
            discharge_windows: Vec::new(),
            allow_grid_charge: true,
            peak_target_kw: Some(target_kw),
        }
    }
}

/// Self-consumption rules for one hour: battery covers the solar deficit,
/// absorbs the solar excess, and the grid takes the remainder either way.
fn self_consume(load_kwh: f64, solar_kwh: f64, battery: &mut BatteryState) -> HourlyFlows {
    let net = load_kwh - solar_kwh;
    if net > 0.0 {
        let discharge = battery.discharge(net);
        HourlyFlows {
            grid_import: net - discharge,
            solar_used: solar_kwh,
            battery_discharge: discharge,
            ..HourlyFlows::default()
        }
    } else {
        let excess = -net;
        let charge = battery.charge(excess);
        HourlyFlows {
            grid_export: excess - charge,
            solar_used: load_kwh,
            battery_charge: charge,
            ..HourlyFlows::default()
        }
    }
}

/// Window-driven dispatch shared by the TOU-arbitrage and scheduled
/// strategies.
fn window_dispatch(
    config: &DispatchConfig,
    hour_of_day: usize,
    load_kwh: f64,
    solar_kwh: f64,
    battery: &mut BatteryState,
) -> HourlyFlows {
    if any_window_contains(&config.discharge_windows, hour_of_day) {
        // Solar covers load first, the battery covers the rest regardless of
        // solar sufficiency, and excess solar is exported rather than stored.
        let solar_used = load_kwh.min(solar_kwh);
        let deficit = load_kwh - solar_used;
        let discharge = battery.discharge(deficit);
        HourlyFlows {
            grid_import: deficit - discharge,
            grid_export: solar_kwh - solar_used,
            solar_used,
            battery_discharge: discharge,
            ..HourlyFlows::default()
        }
    } else if any_window_contains(&config.charge_windows, hour_of_day) {
        // Load is met from solar then grid; excess solar charges the battery
        // first, then grid energy tops it up within the hour's power budget.
        let solar_used = load_kwh.min(solar_kwh);
        let excess = solar_kwh - solar_used;
        let solar_charge = battery.charge(excess);
        let grid_charge = if config.allow_grid_charge {
            let budget = (battery.power_kw - solar_charge).max(0.0);
            battery.charge(budget)
        } else {
            0.0
        };
        HourlyFlows {
            grid_import: (load_kwh - solar_used) + grid_charge,
            grid_export: excess - solar_charge,
            solar_used,
            battery_charge: solar_charge + grid_charge,
            ..HourlyFlows::default()
        }
    } else {
        self_consume(load_kwh, solar_kwh, battery)
    }
}

/// Maximize on-site use of solar: discharge into deficits, store excess.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelfConsumption;

impl Strategy for SelfConsumption {
    fn dispatch_hour(
        &self,
        _hour_of_day: usize,
        load_kwh: f64,
        solar_kwh: f64,
        battery: &mut BatteryState,
    ) -> HourlyFlows {
        self_consume(load_kwh, solar_kwh, battery)
    }
}

/// Time-of-use arbitrage: charge in off-peak windows, discharge in peak
/// windows, self-consumption fallback elsewhere.
#[derive(Debug, Clone)]
pub struct TouArbitrage {
    pub config: DispatchConfig,
}

impl TouArbitrage {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }
}

impl Default for TouArbitrage {
    fn default() -> Self {
        Self::new(DispatchConfig::tou_default())
    }
}

impl Strategy for TouArbitrage {
    fn dispatch_hour(
        &self,
        hour_of_day: usize,
        load_kwh: f64,
        solar_kwh: f64,
        battery: &mut BatteryState,
    ) -> HourlyFlows {
        window_dispatch(&self.config, hour_of_day, load_kwh, solar_kwh, battery)
    }
}

/// Cap grid import at a target by discharging just enough each hour.
#[derive(Debug, Clone)]
pub struct PeakShaving {
    pub config: DispatchConfig,
}

impl PeakShaving {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }
}

impl Strategy for PeakShaving {
    fn dispatch_hour(
        &self,
        hour_of_day: usize,
        load_kwh: f64,
        solar_kwh: f64,
        battery: &mut BatteryState,
    ) -> HourlyFlows {
        let target = self.config.peak_target_kw.unwrap_or(f64::INFINITY);
        let mut flows = if load_kwh > solar_kwh {
            // Import that would occur absent the battery; shave the part
            // above the target.
            let baseline_import = load_kwh - solar_kwh;
            let over = (baseline_import - target).max(0.0);
            let discharge = battery.discharge(over);
            HourlyFlows {
                grid_import: baseline_import - discharge,
                solar_used: solar_kwh,
                battery_discharge: discharge,
                ..HourlyFlows::default()
            }
        } else {
            // Excess solar always charges, self-consumption style.
            self_consume(load_kwh, solar_kwh, battery)
        };

        // Off-peak grid top-up is independent of the shaving logic.
        if self.config.allow_grid_charge
            && any_window_contains(&self.config.charge_windows, hour_of_day)
        {
            let budget = (battery.power_kw - flows.battery_charge).max(0.0);
            let grid_charge = battery.charge(budget);
            flows.grid_import += grid_charge;
            flows.battery_charge += grid_charge;
        }
        flows
    }
}

/// User-scheduled dispatch: identical mechanics to TOU arbitrage with
/// arbitrary caller-supplied windows.
#[derive(Debug, Clone)]
pub struct Scheduled {
    pub config: DispatchConfig,
}

impl Scheduled {
    pub fn new(config: DispatchConfig) -> Self {
        Self { config }
    }
}

impl Strategy for Scheduled {
    fn dispatch_hour(
        &self,
        hour_of_day: usize,
        load_kwh: f64,
        solar_kwh: f64,
        battery: &mut BatteryState,
    ) -> HourlyFlows {
        window_dispatch(&self.config, hour_of_day, load_kwh, solar_kwh, battery)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn battery() -> BatteryState {
        // Usable band 2-18 kWh, 5 kW rating, 10 kWh stored
        BatteryState {
            level_kwh: 10.0,
            min_kwh: 2.0,
            max_kwh: 18.0,
            power_kw: 5.0,
        }
    }

    #[test]
    fn self_consumption_charges_from_excess() {
        let mut b = battery();
        let flows = SelfConsumption.dispatch_hour(12, 10.0, 15.0, &mut b);
        assert_eq!(flows.battery_charge, 5.0);
        assert_eq!(b.level_kwh, 15.0);
        assert_eq!(flows.grid_export, 0.0);
        assert_eq!(flows.solar_used, 10.0);
        assert_eq!(flows.grid_import, 0.0);
    }

    #[test]
    fn self_consumption_discharges_into_deficit() {
        let mut b = battery();
        let flows = SelfConsumption.dispatch_hour(19, 10.0, 4.0, &mut b);
        assert_eq!(flows.battery_discharge, 5.0);
        assert_eq!(b.level_kwh, 5.0);
        assert_eq!(flows.grid_import, 1.0);
        assert_eq!(flows.solar_used, 4.0);
    }

    #[test]
    fn self_consumption_exports_beyond_headroom() {
        let mut b = battery();
        b.level_kwh = 17.0;
        let flows = SelfConsumption.dispatch_hour(12, 2.0, 8.0, &mut b);
        assert_eq!(flows.battery_charge, 1.0);
        assert_eq!(flows.grid_export, 5.0);
        assert_eq!(b.level_kwh, 18.0);
    }

    #[test]
    fn tou_discharge_window_uses_battery_despite_solar() {
        let mut b = battery();
        let tou = TouArbitrage::default();
        // Hour 19 is inside the default evening discharge window
        let flows = tou.dispatch_hour(19, 8.0, 2.0, &mut b);
        assert_eq!(flows.solar_used, 2.0);
        assert_eq!(flows.battery_discharge, 5.0);
        assert_eq!(flows.grid_import, 1.0);
    }

    #[test]
    fn tou_discharge_window_exports_excess_solar() {
        let mut b = battery();
        let tou = TouArbitrage::default();
        let flows = tou.dispatch_hour(8, 3.0, 7.0, &mut b);
        assert_eq!(flows.solar_used, 3.0);
        assert_eq!(flows.grid_export, 4.0);
        assert_eq!(flows.battery_charge, 0.0);
    }

    #[test]
    fn tou_charge_window_tops_up_from_grid() {
        let mut b = battery();
        let tou = TouArbitrage::default();
        // Hour 23 is inside the default overnight charge window, no solar
        let flows = tou.dispatch_hour(23, 1.0, 0.0, &mut b);
        assert_eq!(flows.battery_charge, 5.0);
        assert_eq!(flows.grid_import, 6.0); // 1 for load + 5 for charging
        assert_eq!(b.level_kwh, 15.0);
    }

    #[test]
    fn tou_charge_window_solar_first_then_grid_within_power_budget() {
        let mut b = battery();
        let mut config = DispatchConfig::tou_default();
        config.charge_windows = vec![TimeWindow { start: 10, end: 14 }];
        config.discharge_windows = Vec::new();
        let tou = TouArbitrage::new(config);
        let flows = tou.dispatch_hour(12, 2.0, 5.0, &mut b);
        // 3 kWh excess solar stored, grid adds only the remaining 2 kWh of
        // the 5 kW hourly power budget.
        assert_eq!(flows.battery_charge, 5.0);
        assert_eq!(flows.grid_import, 2.0);
        assert_eq!(flows.grid_export, 0.0);
    }

    #[test]
    fn tou_charge_window_without_grid_charging() {
        let mut b = battery();
        let mut config = DispatchConfig::tou_default();
        config.allow_grid_charge = false;
        let tou = TouArbitrage::new(config);
        let flows = tou.dispatch_hour(23, 1.0, 0.0, &mut b);
        assert_eq!(flows.battery_charge, 0.0);
        assert_eq!(flows.grid_import, 1.0);
        assert_eq!(b.level_kwh, 10.0);
    }

    #[test]
    fn tou_outside_windows_falls_back_to_self_consumption() {
        let mut b1 = battery();
        let mut b2 = battery();
        let tou = TouArbitrage::default();
        // Hour 13 is in neither default window set
        let tou_flows = tou.dispatch_hour(13, 10.0, 4.0, &mut b1);
        let sc_flows = SelfConsumption.dispatch_hour(13, 10.0, 4.0, &mut b2);
        assert_eq!(tou_flows, sc_flows);
        assert_eq!(b1, b2);
    }

    #[test]
    fn peak_shaving_caps_import_at_target() {
        let mut b = battery();
        let shaver = PeakShaving::new(DispatchConfig::peak_shaving_default(4.0));
        let flows = shaver.dispatch_hour(12, 10.0, 2.0, &mut b);
        // Baseline import 8, target 4 → discharge 4
        assert_eq!(flows.battery_discharge, 4.0);
        assert_eq!(flows.grid_import, 4.0);
    }

    #[test]
    fn peak_shaving_discharge_limited_by_headroom() {
        let mut b = battery();
        b.level_kwh = 4.0; // only 2 kWh usable
        let shaver = PeakShaving::new(DispatchConfig::peak_shaving_default(1.0));
        let flows = shaver.dispatch_hour(12, 10.0, 2.0, &mut b);
        assert_eq!(flows.battery_discharge, 2.0);
        assert_eq!(flows.grid_import, 6.0); // cap not fully reachable
    }

    #[test]
    fn peak_shaving_under_target_leaves_battery_alone() {
        let mut b = battery();
        let shaver = PeakShaving::new(DispatchConfig::peak_shaving_default(6.0));
        let flows = shaver.dispatch_hour(12, 8.0, 4.0, &mut b);
        assert_eq!(flows.battery_discharge, 0.0);
        assert_eq!(flows.grid_import, 4.0);
    }

    #[test]
    fn peak_shaving_charges_excess_solar() {
        let mut b = battery();
        let shaver = PeakShaving::new(DispatchConfig::peak_shaving_default(4.0));
        let flows = shaver.dispatch_hour(12, 3.0, 8.0, &mut b);
        assert_eq!(flows.battery_charge, 5.0);
        assert_eq!(flows.grid_export, 0.0);
    }

    #[test]
    fn peak_shaving_off_peak_grid_topup() {
        let mut b = battery();
        let shaver = PeakShaving::new(DispatchConfig::peak_shaving_default(4.0));
        // Hour 23 is inside the default overnight charge window
        let flows = shaver.dispatch_hour(23, 2.0, 0.0, &mut b);
        assert_eq!(flows.battery_charge, 5.0);
        assert_eq!(flows.grid_import, 7.0);
    }

    #[test]
    fn scheduled_matches_tou_mechanics_for_same_windows() {
        let config = DispatchConfig {
            charge_windows: vec![TimeWindow { start: 1, end: 4 }],
            discharge_windows: vec![TimeWindow { start: 17, end: 21 }],
            allow_grid_charge: true,
            peak_target_kw: None,
        };
        let mut b1 = battery();
        let mut b2 = battery();
        let scheduled = Scheduled::new(config.clone());
        let tou = TouArbitrage::new(config);
        for (hour, load, solar) in [(2, 1.0, 0.0), (12, 5.0, 8.0), (18, 9.0, 1.0)] {
            let s = scheduled.dispatch_hour(hour, load, solar, &mut b1);
            let t = tou.dispatch_hour(hour, load, solar, &mut b2);
            assert_eq!(s, t);
        }
    }

    #[test]
    fn soc_stays_in_band_for_all_strategies() {
        let strategies: Vec<Box<dyn Strategy>> = vec![
            Box::new(SelfConsumption),
            Box::new(TouArbitrage::default()),
            Box::new(PeakShaving::new(DispatchConfig::peak_shaving_default(3.0))),
            Box::new(Scheduled::new(DispatchConfig::tou_default())),
        ];
        for strategy in &strategies {
            let mut b = battery();
            for hour in 0..48 {
                let load = 2.0 + (hour % 7) as f64;
                let solar = if (6..18).contains(&(hour % 24)) { 6.0 } else { 0.0 };
                strategy.dispatch_hour(hour % 24, load, solar, &mut b);
                assert!(
                    b.level_kwh >= b.min_kwh - 1e-9 && b.level_kwh <= b.max_kwh + 1e-9,
                    "SoC {} outside [{}, {}] at hour {hour}",
                    b.level_kwh,
                    b.min_kwh,
                    b.max_kwh
                );
            }
        }
    }
}
