//! Battery state, schedule windows, and the four dispatch strategies.

pub mod battery;
pub mod strategy;
pub mod window;

pub use battery::BatteryState;
pub use strategy::{
    DispatchConfig, HourlyFlows, PeakShaving, Scheduled, SelfConsumption, Strategy, TouArbitrage,
};
pub use window::TimeWindow;
