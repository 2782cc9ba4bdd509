//! Simulator entry point: CLI wiring and config-driven scenario runs.

use std::path::Path;
use std::process;

use bess_sim::config::ScenarioConfig;
use bess_sim::dispatch::battery::BatteryState;
use bess_sim::dispatch::strategy::{
    DispatchConfig, PeakShaving, Scheduled, SelfConsumption, Strategy, TouArbitrage,
};
use bess_sim::finance::metrics::{FinancialResult, evaluate};
use bess_sim::finance::projection::{ProjectionBaseline, YearlyProjection, build_projection};
use bess_sim::io::export::{export_hourly_csv, export_projection_csv};
use bess_sim::profile::{EnergyProfile, LoadShape, SolarShape};
use bess_sim::shedding::{StageResult, run_sweep};
use bess_sim::sim::driver::{HourlyResult, Simulator};
use bess_sim::sim::summary::SimulationSummary;

/// Parsed CLI arguments.
struct CliArgs {
    scenario_path: Option<String>,
    preset: Option<String>,
    seed_override: Option<u64>,
    hourly_out: Option<String>,
    projection_out: Option<String>,
}

fn print_help() {
    eprintln!("bess-sim - Behind-the-meter solar + battery dispatch simulator");
    eprintln!();
    eprintln!("Usage: bess-sim [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --scenario <path>        Load scenario from TOML config file");
    eprintln!("  --preset <name>          Use a built-in preset (residential, commercial)");
    eprintln!("  --seed <u64>             Override profile random seed");
    eprintln!("  --hourly-out <path>      Export hourly dispatch results to CSV");
    eprintln!("  --projection-out <path>  Export yearly financial projection to CSV");
    eprintln!("  --help                   Show this help message");
    eprintln!();
    eprintln!("If no --scenario or --preset is given, the residential preset is used.");
}

fn parse_args() -> CliArgs {
    let args: Vec<String> = std::env::args().collect();
    let mut cli = CliArgs {
        scenario_path: None,
        preset: None,
        seed_override: None,
        hourly_out: None,
        projection_out: None,
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                print_help();
                process::exit(0);
            }
            "--scenario" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --scenario requires a path argument");
                    process::exit(1);
                }
                cli.scenario_path = Some(args[i].clone());
            }
            "--preset" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --preset requires a name argument");
                    process::exit(1);
                }
                cli.preset = Some(args[i].clone());
            }
            "--seed" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --seed requires a u64 argument");
                    process::exit(1);
                }
                if let Ok(s) = args[i].parse::<u64>() {
                    cli.seed_override = Some(s);
                } else {
                    eprintln!("error: --seed value \"{}\" is not a valid u64", args[i]);
                    process::exit(1);
                }
            }
            "--hourly-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --hourly-out requires a path argument");
                    process::exit(1);
                }
                cli.hourly_out = Some(args[i].clone());
            }
            "--projection-out" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --projection-out requires a path argument");
                    process::exit(1);
                }
                cli.projection_out = Some(args[i].clone());
            }
            other => {
                eprintln!("error: unknown argument \"{other}\"");
                print_help();
                process::exit(1);
            }
        }
        i += 1;
    }

    cli
}

/// Builds the load and solar profiles from the scenario. Seasonal
/// variation switches from a representative day to a full 8760-hour year.
fn build_profiles(cfg: &ScenarioConfig) -> (EnergyProfile, EnergyProfile, f64) {
    let p = &cfg.profile;
    let load_shape = LoadShape {
        base_kwh: p.base_load_kwh,
        amp_kwh: p.load_amp_kwh,
        phase_rad: p.load_phase_rad,
        noise_std: p.load_noise_std,
    };
    let solar_shape = SolarShape {
        peak_kwh: p.solar_peak_kwh,
        sunrise_hour: p.sunrise_hour,
        sunset_hour: p.sunset_hour,
        noise_std: p.solar_noise_std,
    };
    if cfg.advanced.seasonal_variation {
        (
            load_shape.annual(p.seasonal_amplitude, p.seed),
            solar_shape.annual(p.seasonal_amplitude, p.seed.wrapping_add(1)),
            365.0,
        )
    } else {
        (
            load_shape.representative_day(p.seed),
            solar_shape.representative_day(p.seed.wrapping_add(1)),
            1.0,
        )
    }
}

fn dispatch_config(cfg: &ScenarioConfig) -> DispatchConfig {
    let d = &cfg.dispatch;
    DispatchConfig {
        charge_windows: d.charge_windows.clone(),
        discharge_windows: d.discharge_windows.clone(),
        allow_grid_charge: d.allow_grid_charge,
        peak_target_kw: d.peak_target_kw,
    }
}

/// Everything a scenario run produces before the financial stage.
struct RunOutputs {
    results: Vec<HourlyResult>,
    summary: SimulationSummary,
    shedding: Vec<StageResult>,
}

fn run_with<S: Strategy + Sync>(
    strategy: &S,
    cfg: &ScenarioConfig,
    load: &EnergyProfile,
    solar: &EnergyProfile,
) -> RunOutputs {
    let b = &cfg.battery;
    let battery = BatteryState::new(
        b.capacity_kwh,
        b.min_soc,
        b.max_soc,
        b.power_kw,
        b.initial_soc,
    );
    let mut sim = Simulator::new(strategy, load, solar, battery.clone());
    let results = sim.run();
    let summary = SimulationSummary::from_results(&results, b.capacity_kwh);
    let shedding = run_sweep(strategy, load, solar, &battery, &cfg.tariff);
    RunOutputs {
        results,
        summary,
        shedding,
    }
}

fn run_scenario(cfg: &ScenarioConfig, load: &EnergyProfile, solar: &EnergyProfile) -> RunOutputs {
    match cfg.dispatch.strategy.as_str() {
        "tou_arbitrage" => run_with(&TouArbitrage::new(dispatch_config(cfg)), cfg, load, solar),
        "peak_shaving" => run_with(&PeakShaving::new(dispatch_config(cfg)), cfg, load, solar),
        "scheduled" => run_with(&Scheduled::new(dispatch_config(cfg)), cfg, load, solar),
        _ => run_with(&SelfConsumption, cfg, load, solar),
    }
}

fn print_projection(projection: &[YearlyProjection]) {
    println!("--- Yearly Projection ---");
    println!(
        "{:>4} {:>6} {:>6} {:>12} {:>12} {:>12} {:>14}",
        "year", "eff", "bat", "income", "costs", "net", "cumulative"
    );
    for y in projection {
        println!(
            "{:>4} {:>6.3} {:>6.3} {:>12.2} {:>12.2} {:>12.2} {:>14.2}",
            y.year,
            y.panel_efficiency,
            y.battery_capacity_fraction,
            y.energy_income + y.demand_income,
            y.om_cost + y.insurance_cost + y.replacement_cost,
            y.net_cash_flow,
            y.cumulative_cash_flow,
        );
    }
}

fn print_financial(result: &FinancialResult) {
    println!("{result}");
    if let Some(bands) = &result.sensitivity {
        println!("--- Sensitivity (+/-{:.0}%) ---", bands.variation * 100.0);
        let fmt_irr = |irr: Option<f64>| match irr {
            Some(r) => format!("{:.2}%", r * 100.0),
            None => "n/a".to_string(),
        };
        println!(
            "optimistic:  NPV {:>12.2}  IRR {:>8}  payback {:>5.1} yrs",
            bands.optimistic.npv,
            fmt_irr(bands.optimistic.irr),
            bands.optimistic.payback_years,
        );
        println!(
            "pessimistic: NPV {:>12.2}  IRR {:>8}  payback {:>5.1} yrs",
            bands.pessimistic.npv,
            fmt_irr(bands.pessimistic.irr),
            bands.pessimistic.payback_years,
        );
    }
}

fn main() {
    let cli = parse_args();

    // Load config: --scenario takes priority, then --preset, then the
    // residential default
    let mut scenario = if let Some(ref path) = cli.scenario_path {
        match ScenarioConfig::from_toml_file(Path::new(path)) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else if let Some(ref name) = cli.preset {
        match ScenarioConfig::from_preset(name) {
            Ok(cfg) => cfg,
            Err(e) => {
                eprintln!("{e}");
                process::exit(1);
            }
        }
    } else {
        ScenarioConfig::residential()
    };

    if let Some(seed) = cli.seed_override {
        scenario.profile.seed = seed;
    }

    let errors = scenario.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }

    let (load, solar, days) = build_profiles(&scenario);
    let run = run_scenario(&scenario, &load, &solar);

    println!("{}\n", run.summary);

    let baseline = ProjectionBaseline::from_summary(&run.summary, days);
    let projection = build_projection(&scenario, &baseline);
    print_projection(&projection);
    println!();

    let financial = evaluate(&scenario, &baseline);
    print_financial(&financial);
    println!();

    println!("--- Load-Shedding Resilience ---");
    for stage in &run.shedding {
        println!("{stage}");
    }

    if let Some(ref path) = cli.hourly_out {
        if let Err(e) = export_hourly_csv(&run.results, Path::new(path)) {
            eprintln!("error: failed to write hourly CSV: {e}");
            process::exit(1);
        }
        eprintln!("Hourly results written to {path}");
    }
    if let Some(ref path) = cli.projection_out {
        if let Err(e) = export_projection_csv(&projection, Path::new(path)) {
            eprintln!("error: failed to write projection CSV: {e}");
            process::exit(1);
        }
        eprintln!("Projection written to {path}");
    }
}
