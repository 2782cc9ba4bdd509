//! Shared test fixtures for integration tests.

use bess_sim::config::ScenarioConfig;
use bess_sim::dispatch::battery::BatteryState;
use bess_sim::profile::{EnergyProfile, LoadShape, SolarShape};

/// Default battery (20 kWh, 10-90% SoC band, 5 kW, starting at 50%).
pub fn default_battery() -> BatteryState {
    BatteryState::new(20.0, 0.1, 0.9, 5.0, 0.5)
}

/// Default residential scenario configuration.
pub fn default_scenario() -> ScenarioConfig {
    ScenarioConfig::residential()
}

/// Deterministic (noise-free) representative-day load and solar profiles.
///
/// Returns `(load, solar)`, each 24 hours long.
pub fn default_profiles() -> (EnergyProfile, EnergyProfile) {
    let load = LoadShape {
        base_kwh: 1.2,
        amp_kwh: 0.8,
        phase_rad: 1.2,
        noise_std: 0.0,
    };
    let solar = SolarShape {
        peak_kwh: 6.0,
        sunrise_hour: 6,
        sunset_hour: 18,
        noise_std: 0.0,
    };
    (load.representative_day(42), solar.representative_day(43))
}

/// Year-1 baseline flows used by the finance integration tests.
pub fn default_baseline() -> bess_sim::finance::projection::ProjectionBaseline {
    bess_sim::finance::projection::ProjectionBaseline {
        annual_load_kwh: 10_000.0,
        annual_generation_kwh: 11_000.0,
        annual_direct_use_kwh: 5_500.0,
        annual_battery_served_kwh: 2_800.0,
        annual_export_kwh: 2_200.0,
        peak_reduction_kw: 2.5,
    }
}
