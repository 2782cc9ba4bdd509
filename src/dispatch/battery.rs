//! Battery state of charge tracking with energy and power limits.

/// Mutable battery state threaded through an hourly simulation run.
///
/// Levels are absolute stored energy in kWh. At hourly resolution the power
/// rating in kW doubles as an energy limit in kWh per hour. One instance is
/// built per simulation run and mutated once per hour; it is never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct BatteryState {
    /// Current stored energy (kWh).
    pub level_kwh: f64,
    /// Minimum allowed stored energy (kWh).
    pub min_kwh: f64,
    /// Maximum allowed stored energy (kWh).
    pub max_kwh: f64,
    /// Charge/discharge power rating (kW).
    pub power_kw: f64,
}

impl BatteryState {
    /// Builds a battery state from nameplate capacity and a usable SoC band.
    ///
    /// # Arguments
    ///
    /// * `capacity_kwh` - Nameplate capacity (must be > 0)
    /// * `min_soc` - Lower usable SoC bound as a fraction (e.g. 0.1)
    /// * `max_soc` - Upper usable SoC bound as a fraction (e.g. 0.9)
    /// * `power_kw` - Charge/discharge power rating
    /// * `initial_soc` - Starting SoC fraction, clamped into the usable band
    ///
    /// # Panics
    ///
    /// Panics if capacity is not positive or `min_soc >= max_soc`.
    pub fn new(
        capacity_kwh: f64,
        min_soc: f64,
        max_soc: f64,
        power_kw: f64,
        initial_soc: f64,
    ) -> Self {
        assert!(capacity_kwh > 0.0, "capacity_kwh must be > 0");
        assert!(min_soc < max_soc, "min_soc must be < max_soc");
        let min_kwh = capacity_kwh * min_soc;
        let max_kwh = capacity_kwh * max_soc;
        Self {
            level_kwh: (capacity_kwh * initial_soc).clamp(min_kwh, max_kwh),
            min_kwh,
            max_kwh,
            power_kw: power_kw.max(0.0),
        }
    }

    /// Energy that can still be absorbed this hour (kWh).
    pub fn charge_headroom(&self) -> f64 {
        (self.max_kwh - self.level_kwh).min(self.power_kw).max(0.0)
    }

    /// Energy that can still be delivered this hour (kWh).
    pub fn discharge_headroom(&self) -> f64 {
        (self.level_kwh - self.min_kwh).min(self.power_kw).max(0.0)
    }

    /// Absorbs up to `want_kwh`, limited by headroom and power rating.
    /// Returns the energy actually stored.
    pub fn charge(&mut self, want_kwh: f64) -> f64 {
        let actual = want_kwh.max(0.0).min(self.charge_headroom());
        self.level_kwh += actual;
        actual
    }

    /// Delivers up to `want_kwh`, limited by headroom and power rating.
    /// Returns the energy actually delivered.
    pub fn discharge(&mut self, want_kwh: f64) -> f64 {
        let actual = want_kwh.max(0.0).min(self.discharge_headroom());
        self.level_kwh -= actual;
        actual
    }
}
