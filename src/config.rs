//! TOML-based scenario configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dispatch::window::TimeWindow;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields have defaults matching the residential preset. Load from TOML
/// with [`ScenarioConfig::from_toml_file`] or use
/// [`ScenarioConfig::residential`] for the built-in default.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// PV array size.
    #[serde(default)]
    pub system: SystemConfig,
    /// Battery capacity, power, and usable SoC band.
    #[serde(default)]
    pub battery: BatteryConfig,
    /// Dispatch strategy selection and schedule windows.
    #[serde(default)]
    pub dispatch: DispatchSection,
    /// Synthetic load/solar profile parameters.
    #[serde(default)]
    pub profile: ProfileConfig,
    /// Tariff rates.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Capital and operating cost structure.
    #[serde(default)]
    pub costs: CostConfig,
    /// Financial projection parameters.
    #[serde(default)]
    pub financial: FinancialConfig,
    /// Degradation model parameters.
    #[serde(default)]
    pub degradation: DegradationConfig,
    /// Independent enable flags for advanced modeling.
    #[serde(default)]
    pub advanced: AdvancedConfig,
}

/// PV array size.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SystemConfig {
    /// Installed PV capacity (kWp).
    pub pv_kwp: f64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self { pv_kwp: 8.0 }
    }
}

/// Battery capacity, power, and usable SoC band.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Nameplate capacity (kWh).
    pub capacity_kwh: f64,
    /// Charge/discharge power rating (kW).
    pub power_kw: f64,
    /// Lower usable SoC bound (0.0-1.0).
    pub min_soc: f64,
    /// Upper usable SoC bound (0.0-1.0).
    pub max_soc: f64,
    /// Starting SoC fraction.
    pub initial_soc: f64,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 20.0,
            power_kw: 5.0,
            min_soc: 0.1,
            max_soc: 0.9,
            initial_soc: 0.5,
        }
    }
}

/// Dispatch strategy selection and schedule windows.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSection {
    /// Strategy: `"self_consumption"`, `"tou_arbitrage"`, `"peak_shaving"`,
    /// or `"scheduled"`.
    pub strategy: String,
    /// Hours in which the battery may be (grid-)charged.
    pub charge_windows: Vec<TimeWindow>,
    /// Hours in which the battery should discharge to cover load.
    pub discharge_windows: Vec<TimeWindow>,
    /// Whether grid energy may top up the battery inside charge windows.
    pub allow_grid_charge: bool,
    /// Import cap for peak shaving (kW). Required by that strategy.
    pub peak_target_kw: Option<f64>,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            strategy: "self_consumption".to_string(),
            charge_windows: vec![TimeWindow { start: 22, end: 6 }],
            discharge_windows: vec![
                TimeWindow { start: 7, end: 10 },
                TimeWindow { start: 18, end: 20 },
            ],
            allow_grid_charge: true,
            peak_target_kw: None,
        }
    }
}

/// Names accepted by `dispatch.strategy`.
pub const STRATEGIES: &[&str] = &[
    "self_consumption",
    "tou_arbitrage",
    "peak_shaving",
    "scheduled",
];

/// Synthetic load/solar profile parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProfileConfig {
    /// Baseline load (kWh per hour).
    pub base_load_kwh: f64,
    /// Amplitude of the daily load sinusoid (kWh per hour).
    pub load_amp_kwh: f64,
    /// Phase offset of the load sinusoid (radians).
    pub load_phase_rad: f64,
    /// Load noise standard deviation (kWh per hour).
    pub load_noise_std: f64,
    /// Peak solar generation at noon (kWh per hour).
    pub solar_peak_kwh: f64,
    /// Sunrise hour (inclusive).
    pub sunrise_hour: usize,
    /// Sunset hour (exclusive).
    pub sunset_hour: usize,
    /// Solar multiplicative noise standard deviation.
    pub solar_noise_std: f64,
    /// Seasonal modulation amplitude for annual profiles (e.g. 0.15).
    pub seasonal_amplitude: f64,
    /// Master random seed for profile synthesis.
    pub seed: u64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            base_load_kwh: 1.2,
            load_amp_kwh: 0.8,
            load_phase_rad: 1.2,
            load_noise_std: 0.05,
            solar_peak_kwh: 6.0,
            sunrise_hour: 6,
            sunset_hour: 18,
            solar_noise_std: 0.05,
            seasonal_amplitude: 0.15,
            seed: 42,
        }
    }
}

/// Tariff rates.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Energy rate (currency per kWh imported).
    pub energy_rate: f64,
    /// Export rate (currency per kWh exported).
    pub export_rate: f64,
    /// Demand charge (currency per kVA per month).
    pub demand_charge: f64,
    /// Value of energy served during grid outages (currency per kWh).
    pub backup_rate: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            energy_rate: 0.25,
            export_rate: 0.08,
            demand_charge: 12.0,
            backup_rate: 0.60,
        }
    }
}

/// Capital and operating cost structure.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CostConfig {
    /// PV capital cost (currency per kWp).
    pub capex_per_kwp: f64,
    /// Battery capital cost (currency per kWh).
    pub capex_per_kwh: f64,
    /// Annual operations and maintenance cost (year-1 money).
    pub om_per_year: f64,
    /// Annual insurance as a fraction of installed cost.
    pub insurance_fraction: f64,
    /// Fees and contingency as a fraction of equipment cost.
    pub fees_fraction: f64,
    /// Year in which the one-time replacement cost falls.
    pub replacement_year: Option<usize>,
    /// Module replacement share of PV capital cost.
    pub replacement_module_fraction: f64,
    /// Inverter replacement share of PV capital cost.
    pub replacement_inverter_fraction: f64,
    /// Battery replacement share of battery capital cost.
    pub replacement_battery_fraction: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            capex_per_kwp: 900.0,
            capex_per_kwh: 400.0,
            om_per_year: 150.0,
            insurance_fraction: 0.005,
            fees_fraction: 0.08,
            replacement_year: Some(10),
            replacement_module_fraction: 0.0,
            replacement_inverter_fraction: 0.15,
            replacement_battery_fraction: 0.60,
        }
    }
}

/// Financial projection parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialConfig {
    /// Project horizon (years, typically 20-30).
    pub horizon_years: usize,
    /// NPV discount rate.
    pub discount_rate: f64,
    /// LCOE discount rate (may differ from the NPV rate).
    pub lcoe_discount_rate: f64,
    /// MIRR finance rate applied to negative cash flows.
    pub finance_rate: f64,
    /// MIRR reinvestment rate applied to positive cash flows.
    pub reinvestment_rate: f64,
    /// Annual energy tariff escalation.
    pub tariff_escalation: f64,
    /// Annual demand charge escalation.
    pub demand_escalation: f64,
    /// Annual inflation applied to O&M and replacement costs.
    pub cpi: f64,
    /// Annual insurance escalation.
    pub insurance_escalation: f64,
    /// Annual load growth rate.
    pub load_growth_rate: f64,
    /// Year from which the one-time load step applies.
    pub load_step_year: Option<usize>,
    /// One-time annual load increase (kWh) from `load_step_year` onward.
    pub load_step_kwh: f64,
    /// Sensitivity variation applied to income/costs (e.g. 0.10 for ±10%).
    pub sensitivity_variation: f64,
}

impl Default for FinancialConfig {
    fn default() -> Self {
        Self {
            horizon_years: 25,
            discount_rate: 0.08,
            lcoe_discount_rate: 0.06,
            finance_rate: 0.08,
            reinvestment_rate: 0.05,
            tariff_escalation: 0.06,
            demand_escalation: 0.06,
            cpi: 0.05,
            insurance_escalation: 0.05,
            load_growth_rate: 0.01,
            load_step_year: None,
            load_step_kwh: 0.0,
            sensitivity_variation: 0.10,
        }
    }
}

/// Degradation model parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DegradationConfig {
    /// Model: `"simple"` (fixed per-year rate) or `"yearly"` (explicit
    /// per-year rate array, allowing a distinct first-year rate).
    pub mode: String,
    /// Panel degradation rate per year (simple mode).
    pub panel_rate: f64,
    /// Battery degradation rate per year (simple mode).
    pub battery_rate: f64,
    /// Explicit per-year panel rates (yearly mode).
    pub panel_yearly_rates: Vec<f64>,
    /// Explicit per-year battery rates (yearly mode).
    pub battery_yearly_rates: Vec<f64>,
    /// Battery end-of-life capacity floor as a fraction of nameplate.
    pub battery_eol_fraction: f64,
}

impl Default for DegradationConfig {
    fn default() -> Self {
        Self {
            mode: "simple".to_string(),
            panel_rate: 0.005,
            battery_rate: 0.02,
            panel_yearly_rates: Vec::new(),
            battery_yearly_rates: Vec::new(),
            battery_eol_fraction: 0.7,
        }
    }
}

/// Independent enable flags for advanced modeling.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdvancedConfig {
    /// Simulate a full 8760-hour year with seasonal modulation instead of
    /// scaling a representative day.
    pub seasonal_variation: bool,
    /// Apply panel/battery degradation across the projection.
    pub degradation: bool,
    /// Compute sensitivity bands alongside the expected case.
    pub detailed_financial: bool,
    /// Whether exported energy earns the export rate.
    pub allow_export: bool,
    /// Apply annual load growth and the one-time load step.
    pub load_growth: bool,
}

impl Default for AdvancedConfig {
    fn default() -> Self {
        Self {
            seasonal_variation: false,
            degradation: true,
            detailed_financial: true,
            allow_export: true,
            load_growth: false,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"battery.min_soc"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the residential preset (the built-in defaults).
    pub fn residential() -> Self {
        Self {
            system: SystemConfig::default(),
            battery: BatteryConfig::default(),
            dispatch: DispatchSection::default(),
            profile: ProfileConfig::default(),
            tariff: TariffConfig::default(),
            costs: CostConfig::default(),
            financial: FinancialConfig::default(),
            degradation: DegradationConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }

    /// Returns the commercial preset: larger system, peak shaving against a
    /// demand charge, flatter daytime load.
    pub fn commercial() -> Self {
        Self {
            system: SystemConfig { pv_kwp: 60.0 },
            battery: BatteryConfig {
                capacity_kwh: 120.0,
                power_kw: 40.0,
                ..BatteryConfig::default()
            },
            dispatch: DispatchSection {
                strategy: "peak_shaving".to_string(),
                peak_target_kw: Some(35.0),
                ..DispatchSection::default()
            },
            profile: ProfileConfig {
                base_load_kwh: 12.0,
                load_amp_kwh: 6.0,
                load_phase_rad: 4.0,
                solar_peak_kwh: 45.0,
                ..ProfileConfig::default()
            },
            tariff: TariffConfig {
                energy_rate: 0.20,
                demand_charge: 25.0,
                ..TariffConfig::default()
            },
            costs: CostConfig {
                capex_per_kwp: 750.0,
                capex_per_kwh: 350.0,
                om_per_year: 900.0,
                ..CostConfig::default()
            },
            financial: FinancialConfig::default(),
            degradation: DegradationConfig::default(),
            advanced: AdvancedConfig::default(),
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["residential", "commercial"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "residential" => Ok(Self::residential()),
            "commercial" => Ok(Self::commercial()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid. The engine
    /// itself never validates; callers run this before invoking it.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.system.pv_kwp < 0.0 {
            errors.push(ConfigError {
                field: "system.pv_kwp".into(),
                message: "must be >= 0".into(),
            });
        }

        let bat = &self.battery;
        if bat.capacity_kwh <= 0.0 {
            errors.push(ConfigError {
                field: "battery.capacity_kwh".into(),
                message: "must be > 0".into(),
            });
        }
        if !(0.0..=1.0).contains(&bat.min_soc)
            || !(0.0..=1.0).contains(&bat.max_soc)
            || bat.min_soc >= bat.max_soc
        {
            errors.push(ConfigError {
                field: "battery.min_soc".into(),
                message: "min_soc and max_soc must be in [0, 1] with min < max".into(),
            });
        }
        if !(0.0..=1.0).contains(&bat.initial_soc) {
            errors.push(ConfigError {
                field: "battery.initial_soc".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        let d = &self.dispatch;
        if !STRATEGIES.contains(&d.strategy.as_str()) {
            errors.push(ConfigError {
                field: "dispatch.strategy".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    STRATEGIES.join(", "),
                    d.strategy
                ),
            });
        }
        if d.strategy == "peak_shaving" && d.peak_target_kw.is_none() {
            errors.push(ConfigError {
                field: "dispatch.peak_target_kw".into(),
                message: "required when strategy is \"peak_shaving\"".into(),
            });
        }
        for (i, w) in d.charge_windows.iter().chain(&d.discharge_windows).enumerate() {
            if w.start >= 24 || w.end >= 24 {
                errors.push(ConfigError {
                    field: format!("dispatch.windows[{i}]"),
                    message: "window hours must be in 0..=23".into(),
                });
            }
        }

        let p = &self.profile;
        if p.sunrise_hour >= p.sunset_hour {
            errors.push(ConfigError {
                field: "profile.sunrise_hour".into(),
                message: "must be < profile.sunset_hour".into(),
            });
        }
        if p.sunset_hour > 24 {
            errors.push(ConfigError {
                field: "profile.sunset_hour".into(),
                message: "must be <= 24".into(),
            });
        }

        if self.financial.horizon_years == 0 {
            errors.push(ConfigError {
                field: "financial.horizon_years".into(),
                message: "must be > 0".into(),
            });
        }

        let deg = &self.degradation;
        if deg.mode != "simple" && deg.mode != "yearly" {
            errors.push(ConfigError {
                field: "degradation.mode".into(),
                message: format!("must be \"simple\" or \"yearly\", got \"{}\"", deg.mode),
            });
        }
        if !(0.0..=1.0).contains(&deg.battery_eol_fraction) {
            errors.push(ConfigError {
                field: "degradation.battery_eol_fraction".into(),
                message: "must be in [0.0, 1.0]".into(),
            });
        }

        errors
    }
}
