//! Hourly energy profiles and seeded synthetic shape generators.
//!
//! The engine consumes profiles as read-only sequences; collaborators may
//! supply measured data, or the generators here can synthesize plausible
//! shapes for sizing studies. All randomness is seeded for reproducibility.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Hours in a representative day profile.
pub const DAY_HOURS: usize = 24;
/// Hours in a full-year profile.
pub const YEAR_HOURS: usize = 8760;

/// An ordered sequence of non-negative hourly energy quantities (kWh),
/// either 24 (representative day) or 8760 (full year) long.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyProfile {
    hourly_kwh: Vec<f64>,
}

impl EnergyProfile {
    /// Wraps an hourly sequence.
    ///
    /// # Panics
    ///
    /// Panics if the sequence is not 24 or 8760 hours long.
    pub fn from_hourly(hourly_kwh: Vec<f64>) -> Self {
        assert!(
            hourly_kwh.len() == DAY_HOURS || hourly_kwh.len() == YEAR_HOURS,
            "profile must be {DAY_HOURS} or {YEAR_HOURS} hours, got {}",
            hourly_kwh.len()
        );
        Self { hourly_kwh }
    }

    /// Number of hours in the profile.
    pub fn hours(&self) -> usize {
        self.hourly_kwh.len()
    }

    /// Energy for hour `t` (kWh).
    pub fn kwh_at(&self, t: usize) -> f64 {
        self.hourly_kwh[t]
    }

    /// Total energy across the profile (kWh).
    pub fn total_kwh(&self) -> f64 {
        self.hourly_kwh.iter().sum()
    }

    /// Borrow the underlying hourly values.
    pub fn as_slice(&self) -> &[f64] {
        &self.hourly_kwh
    }
}

/// Parameters for the synthetic sinusoidal load shape.
#[derive(Debug, Clone)]
pub struct LoadShape {
    /// Baseline consumption (kWh per hour).
    pub base_kwh: f64,
    /// Amplitude of the daily sinusoidal variation (kWh per hour).
    pub amp_kwh: f64,
    /// Phase offset (radians; 0 puts the minimum at midnight).
    pub phase_rad: f64,
    /// Gaussian noise standard deviation (kWh per hour).
    pub noise_std: f64,
}

/// Parameters for the synthetic half-cosine solar shape.
#[derive(Debug, Clone)]
pub struct SolarShape {
    /// Peak generation at solar noon (kWh per hour).
    pub peak_kwh: f64,
    /// Sunrise hour (inclusive).
    pub sunrise_hour: usize,
    /// Sunset hour (exclusive).
    pub sunset_hour: usize,
    /// Multiplicative Gaussian noise standard deviation.
    pub noise_std: f64,
}

/// Box-Muller Gaussian noise with mean 0 and the given standard deviation.
fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }
    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    z0 * std_dev
}

/// Fraction of peak daylight at a given hour, half-cosine between sunrise
/// and sunset, zero outside.
fn daylight_frac(hour_of_day: usize, sunrise: usize, sunset: usize) -> f64 {
    if hour_of_day < sunrise || hour_of_day >= sunset {
        return 0.0;
    }
    let span = (sunset - sunrise) as f64;
    let pos = (hour_of_day - sunrise) as f64 + 0.5;
    (std::f64::consts::PI * pos / span).sin().max(0.0)
}

/// Seasonal scale for a day of the year: sinusoidal around 1.0 with the
/// given amplitude, peaking at midsummer (day 172).
fn seasonal_factor(day_of_year: usize, amplitude: f64) -> f64 {
    let angle = 2.0 * std::f64::consts::PI * (day_of_year as f64 - 172.0) / 365.0;
    (1.0 + amplitude * angle.cos()).max(0.0)
}

impl LoadShape {
    /// Generates a 24-hour representative day profile.
    pub fn representative_day(&self, seed: u64) -> EnergyProfile {
        let mut rng = StdRng::seed_from_u64(seed);
        EnergyProfile::from_hourly((0..DAY_HOURS).map(|h| self.hour_kwh(h, &mut rng)).collect())
    }

    /// Generates an 8760-hour profile, optionally modulated by a seasonal
    /// sinusoid of the given amplitude (e.g. 0.15 for ±15%).
    pub fn annual(&self, seasonal_amplitude: f64, seed: u64) -> EnergyProfile {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hourly = Vec::with_capacity(YEAR_HOURS);
        for day in 0..365 {
            let factor = seasonal_factor(day, seasonal_amplitude);
            for h in 0..DAY_HOURS {
                hourly.push(self.hour_kwh(h, &mut rng) * factor);
            }
        }
        EnergyProfile::from_hourly(hourly)
    }

    fn hour_kwh(&self, hour_of_day: usize, rng: &mut StdRng) -> f64 {
        let day_pos = hour_of_day as f64 / DAY_HOURS as f64;
        let angle = 2.0 * std::f64::consts::PI * day_pos + self.phase_rad;
        let kwh = self.base_kwh + self.amp_kwh * angle.sin() + gaussian_noise(rng, self.noise_std);
        kwh.max(0.0)
    }
}

impl SolarShape {
    /// Generates a 24-hour representative day profile.
    ///
    /// # Panics
    ///
    /// Panics if `sunrise_hour >= sunset_hour` or `sunset_hour > 24`.
    pub fn representative_day(&self, seed: u64) -> EnergyProfile {
        self.check_window();
        let mut rng = StdRng::seed_from_u64(seed);
        EnergyProfile::from_hourly(
            (0..DAY_HOURS).map(|h| self.hour_kwh(h, 1.0, &mut rng)).collect(),
        )
    }

    /// Generates an 8760-hour profile with seasonal modulation of the same
    /// form as [`LoadShape::annual`].
    pub fn annual(&self, seasonal_amplitude: f64, seed: u64) -> EnergyProfile {
        self.check_window();
        let mut rng = StdRng::seed_from_u64(seed);
        let mut hourly = Vec::with_capacity(YEAR_HOURS);
        for day in 0..365 {
            let factor = seasonal_factor(day, seasonal_amplitude);
            for h in 0..DAY_HOURS {
                hourly.push(self.hour_kwh(h, factor, &mut rng));
            }
        }
        EnergyProfile::from_hourly(hourly)
    }

    fn check_window(&self) {
        assert!(
            self.sunrise_hour < self.sunset_hour && self.sunset_hour <= DAY_HOURS,
            "solar window must satisfy sunrise < sunset <= 24"
        );
    }

    fn hour_kwh(&self, hour_of_day: usize, scale: f64, rng: &mut StdRng) -> f64 {
        let frac = daylight_frac(hour_of_day, self.sunrise_hour, self.sunset_hour);
        if frac <= 0.0 {
            return 0.0;
        }
        let noise_mult = 1.0 + gaussian_noise(rng, self.noise_std);
        (self.peak_kwh * frac * scale * noise_mult).max(0.0)
    }
}
