//! Top-level run configuration.

use crate::{FleetError, FleetResult, SimClock, TimeOfDay};

/// Top-level simulation configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to the simulation builder.  Missing fields
/// fall back to [`SimConfig::default`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimConfig {
    /// Facility map the run targets.  Task files for another map are
    /// rejected at import.
    pub map_name: String,

    /// Time of day at which the run starts.
    pub start_time: TimeOfDay,

    /// Simulated minutes added to the time of day per tick.  Default: 5.
    pub tick_interval_minutes: u32,

    /// Wall-clock seconds one full simulated day is compressed into.
    /// Default: 180.
    pub sim_duration_secs: f64,

    /// Length of the simulated day in minutes.  Default: 1440.
    pub minutes_in_day: u32,

    /// Wall-clock seconds per agent update frame.  Default: 1/30.
    pub frame_secs: f64,

    /// Master RNG seed.  The same seed always produces identical results.
    pub seed: u64,

    /// Emit an agent snapshot every N ticks.  0 disables snapshots.
    pub snapshot_interval_ticks: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            map_name:                String::from("default"),
            start_time:              TimeOfDay::MIDNIGHT,
            tick_interval_minutes:   5,
            sim_duration_secs:       180.0,
            minutes_in_day:          1440,
            frame_secs:              1.0 / 30.0,
            seed:                    42,
            snapshot_interval_ticks: 1,
        }
    }
}

impl SimConfig {
    /// Reject configurations the clock cannot run.
    pub fn validate(&self) -> FleetResult<()> {
        if self.tick_interval_minutes == 0 {
            return Err(FleetError::Config("tick_interval_minutes must be > 0".into()));
        }
        if self.minutes_in_day < self.tick_interval_minutes {
            return Err(FleetError::Config(format!(
                "minutes_in_day ({}) is shorter than one tick ({} min)",
                self.minutes_in_day, self.tick_interval_minutes
            )));
        }
        if !(self.sim_duration_secs.is_finite() && self.sim_duration_secs > 0.0) {
            return Err(FleetError::Config("sim_duration_secs must be a positive number".into()));
        }
        if !(self.frame_secs.is_finite() && self.frame_secs > 0.0) {
            return Err(FleetError::Config("frame_secs must be a positive number".into()));
        }
        Ok(())
    }

    /// Construct a `SimClock` pre-configured for this run.
    pub fn make_clock(&self) -> SimClock {
        SimClock::new(
            self.start_time,
            self.tick_interval_minutes,
            self.sim_duration_secs,
            self.minutes_in_day,
        )
    }
}
