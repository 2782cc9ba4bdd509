//! Integration tests for the dispatch strategies over full-day runs.

mod common;

use bess_sim::dispatch::strategy::{
    DispatchConfig, PeakShaving, Scheduled, SelfConsumption, Strategy, TouArbitrage,
};
use bess_sim::sim::driver::Simulator;
use bess_sim::sim::summary::SimulationSummary;

fn run_day<S: Strategy>(strategy: &S) -> Vec<bess_sim::sim::driver::HourlyResult> {
    let (load, solar) = common::default_profiles();
    let mut sim = Simulator::new(strategy, &load, &solar, common::default_battery());
    sim.run()
}

#[test]
fn every_strategy_produces_a_full_day() {
    let strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(SelfConsumption),
        Box::new(TouArbitrage::default()),
        Box::new(PeakShaving::new(DispatchConfig::peak_shaving_default(1.5))),
        Box::new(Scheduled::new(DispatchConfig::tou_default())),
    ];
    let (load, solar) = common::default_profiles();
    for strategy in &strategies {
        let mut sim = Simulator::new(
            strategy.as_ref(),
            &load,
            &solar,
            common::default_battery(),
        );
        let results = sim.run();
        assert_eq!(results.len(), 24);
        for r in &results {
            assert!(r.soc_kwh >= 2.0 - 1e-9 && r.soc_kwh <= 18.0 + 1e-9);
            assert!(r.grid_import >= 0.0);
            assert!(r.grid_export >= 0.0);
        }
    }
}

#[test]
fn self_consumption_never_imports_while_solar_covers_load() {
    for r in run_day(&SelfConsumption) {
        if r.solar >= r.load {
            assert!(r.grid_import < 1e-9, "imported during surplus hour {}", r.hour);
        }
    }
}

#[test]
fn self_consumption_summary_rates_are_sane() {
    let results = run_day(&SelfConsumption);
    let s = SimulationSummary::from_results(&results, 20.0);
    assert!(s.self_consumption_rate > 0.0 && s.self_consumption_rate <= 1.0);
    assert!(s.solar_coverage_rate > 0.0 && s.solar_coverage_rate <= 1.0);
    assert!(s.total_unmet_kwh == 0.0);
}

#[test]
fn tou_arbitrage_charges_overnight_and_discharges_in_peaks() {
    let results = run_day(&TouArbitrage::default());
    // Overnight window (22-6) with grid charging allowed: battery fills
    let overnight_charge: f64 = results
        .iter()
        .filter(|r| r.hour >= 22 || r.hour < 6)
        .map(|r| r.battery_charge)
        .sum();
    assert!(overnight_charge > 0.0);
    // Evening peak (18-20): battery discharges against the load
    let evening_discharge: f64 = results
        .iter()
        .filter(|r| (18..20).contains(&r.hour))
        .map(|r| r.battery_discharge)
        .sum();
    assert!(evening_discharge > 0.0);
}

#[test]
fn tou_without_grid_charge_only_stores_solar() {
    let mut config = DispatchConfig::tou_default();
    config.allow_grid_charge = false;
    let results = run_day(&TouArbitrage::new(config));
    // Overnight hours have no solar, so nothing can charge the battery
    for r in &results {
        if r.hour >= 22 || r.hour < 6 {
            assert!(r.battery_charge < 1e-9);
        }
    }
}

#[test]
fn peak_shaving_respects_target_until_battery_empties() {
    let target = 1.0;
    let results = run_day(&PeakShaving::new(DispatchConfig::peak_shaving_default(target)));
    for r in &results {
        // Inside the charge window grid top-up may exceed the target;
        // elsewhere imports above target mean the battery ran dry
        let in_charge_window = r.hour >= 22 || r.hour < 6;
        if r.grid_import > target + 1e-9 && !in_charge_window {
            assert!(r.battery_discharge > 0.0 || r.soc_kwh <= 2.0 + 1e-9);
        }
    }
}

#[test]
fn peak_shaving_lowers_peak_import_outside_charge_windows() {
    let shaved = run_day(&PeakShaving::new(DispatchConfig::peak_shaving_default(1.0)));
    let peak_import = shaved
        .iter()
        .filter(|r| !(r.hour >= 22 || r.hour < 6))
        .map(|r| r.grid_import)
        .fold(0.0_f64, f64::max);
    let baseline_peak = shaved
        .iter()
        .filter(|r| !(r.hour >= 22 || r.hour < 6))
        .map(|r| (r.load - r.solar).max(0.0))
        .fold(0.0_f64, f64::max);
    assert!(peak_import <= baseline_peak + 1e-9);
}

#[test]
fn scheduled_matches_tou_with_identical_windows() {
    let config = DispatchConfig::tou_default();
    let a = run_day(&TouArbitrage::new(config.clone()));
    let b = run_day(&Scheduled::new(config));
    assert_eq!(a, b);
}

#[test]
fn energy_balance_holds_without_grid_charging() {
    let mut config = DispatchConfig::tou_default();
    config.allow_grid_charge = false;
    for r in run_day(&TouArbitrage::new(config)) {
        assert!((r.load - (r.solar_used + r.battery_discharge + r.grid_import)).abs() < 1e-9);
        assert!((r.solar - (r.solar_used + r.battery_charge + r.grid_export)).abs() < 1e-9);
    }
}

#[test]
fn nodal_balance_holds_with_grid_charging() {
    for r in run_day(&TouArbitrage::default()) {
        // import + solar + discharge covers load + charge + export
        let supply = r.grid_import + r.solar + r.battery_discharge;
        let demand = r.load + r.battery_charge + r.grid_export;
        assert!(
            (supply - demand).abs() < 1e-9,
            "nodal balance broke at hour {}",
            r.hour
        );
    }
}

#[test]
fn identical_seeds_give_identical_runs() {
    let (load_a, solar_a) = common::default_profiles();
    let (load_b, solar_b) = common::default_profiles();
    assert_eq!(load_a.as_slice(), load_b.as_slice());
    let strategy = SelfConsumption;
    let mut sim_a = Simulator::new(&strategy, &load_a, &solar_a, common::default_battery());
    let mut sim_b = Simulator::new(&strategy, &load_b, &solar_b, common::default_battery());
    assert_eq!(sim_a.run(), sim_b.run());
}
