//! Simulation time model.
//!
//! # Design
//!
//! Two clocks run side by side:
//!
//! - **Wall time**: `f64` seconds of simulated run time.  Agent movement,
//!   loading timers, and router block expiry are measured in it.
//! - **Time of day**: a [`TimeOfDay`] advanced in fixed
//!   `tick_interval_minutes` steps.  Task entry is keyed on it.
//!
//! [`SimClock`] maps one onto the other: a whole day of `minutes_in_day`
//! minutes is compressed into `sim_duration_secs` of wall time, so one tick
//! fires every
//!
//! ```text
//! secs_per_tick = sim_duration_secs * tick_interval_minutes / minutes_in_day
//! ```
//!
//! Tick thresholds are computed as `k * secs_per_tick` rather than by
//! repeated addition so long runs do not drift.

use std::fmt;
use std::str::FromStr;

use tracing::trace;

use crate::{FleetError, FleetResult};

const MINUTES_PER_DAY: u16 = 24 * 60;

/// Tolerance used when comparing accumulated wall time against a tick
/// threshold.  Absorbs float summation error from many small `dt`s.
const THRESHOLD_EPSILON: f64 = 1e-9;

// ── TimeOfDay ─────────────────────────────────────────────────────────────────

/// A wall-clock time within a single day, `00:00 ..= 23:59`.
///
/// Stored as minutes since midnight, so the derived `Eq`/`Ord` compare by
/// total minutes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TimeOfDay {
    minutes: u16,
}

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay { minutes: 0 };

    /// Build from an hour (0–23) and minute (0–59).
    pub fn new(hour: u32, minute: u32) -> FleetResult<Self> {
        if hour > 23 || minute > 59 {
            return Err(FleetError::InvalidTime(format!("{hour}:{minute}")));
        }
        Ok(Self { minutes: (hour * 60 + minute) as u16 })
    }

    /// Build from minutes since midnight, wrapping at 24 h.
    #[inline]
    pub fn from_total_minutes(minutes: u32) -> Self {
        Self { minutes: (minutes % MINUTES_PER_DAY as u32) as u16 }
    }

    #[inline]
    pub fn hour(self) -> u32 {
        (self.minutes / 60) as u32
    }

    #[inline]
    pub fn minute(self) -> u32 {
        (self.minutes % 60) as u32
    }

    #[inline]
    pub fn total_minutes(self) -> u32 {
        self.minutes as u32
    }

    /// Advance by `mins` minutes in place, rolling the hour over and wrapping
    /// at 24 h.
    pub fn add_minutes(&mut self, mins: u32) {
        *self = self.plus_minutes(mins);
    }

    pub fn add_hours(&mut self, hrs: u32) {
        *self = self.plus_minutes(hrs * 60);
    }

    /// Non-mutating form of [`add_minutes`](Self::add_minutes).
    #[inline]
    pub fn plus_minutes(self, mins: u32) -> Self {
        let total = self.minutes as u64 + mins as u64;
        Self { minutes: (total % MINUTES_PER_DAY as u64) as u16 }
    }

    /// 12-hour label such as `4:05 PM`.  Noon is `12:00 PM`, midnight
    /// `12:00 AM`.
    pub fn to_am_pm(self) -> String {
        let (h, suffix) = match self.hour() {
            0 => (12, "AM"),
            h @ 1..=11 => (h, "AM"),
            12 => (12, "PM"),
            h => (h - 12, "PM"),
        };
        format!("{h}:{:02} {suffix}", self.minute())
    }
}

/// 24-hour, zero-padded `HH:MM`.
impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

impl FromStr for TimeOfDay {
    type Err = FleetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || FleetError::InvalidTime(s.to_owned());
        let (h, m) = s.trim().split_once(':').ok_or_else(bad)?;
        let hour: u32 = h.trim().parse().map_err(|_| bad())?;
        let minute: u32 = m.trim().parse().map_err(|_| bad())?;
        TimeOfDay::new(hour, minute).map_err(|_| bad())
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Advances a simulated time of day at a configurable scale and reports
/// each fixed-interval tick.
///
/// Driven by the simulation loop:
///
/// ```rust
/// use fleet_core::{SimClock, TimeOfDay};
///
/// let mut clock = SimClock::new(TimeOfDay::MIDNIGHT, 5, 180.0, 1440);
/// clock.accumulate(1.0);
/// while let Some(now) = clock.poll_tick() {
///     // release due tasks, dispatch, …
///     let _ = now;
/// }
/// ```
#[derive(Clone, Debug)]
pub struct SimClock {
    current_time:          TimeOfDay,
    tick_interval_minutes: u32,
    sim_duration_secs:     f64,
    minutes_in_day:        u32,
    elapsed_secs:          f64,
    ticks_fired:           u64,
}

impl SimClock {
    pub fn new(
        start:                 TimeOfDay,
        tick_interval_minutes: u32,
        sim_duration_secs:     f64,
        minutes_in_day:        u32,
    ) -> Self {
        Self {
            current_time: start,
            tick_interval_minutes,
            sim_duration_secs,
            minutes_in_day,
            elapsed_secs: 0.0,
            ticks_fired: 0,
        }
    }

    #[inline]
    pub fn current_time(&self) -> TimeOfDay {
        self.current_time
    }

    #[inline]
    pub fn tick_interval_minutes(&self) -> u32 {
        self.tick_interval_minutes
    }

    /// Wall-clock seconds elapsed since the run started.
    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed_secs
    }

    #[inline]
    pub fn ticks_fired(&self) -> u64 {
        self.ticks_fired
    }

    /// Wall-clock seconds between consecutive ticks.
    pub fn secs_per_tick(&self) -> f64 {
        self.sim_duration_secs * self.tick_interval_minutes as f64 / self.minutes_in_day as f64
    }

    /// Number of ticks in a full run.
    pub fn total_ticks(&self) -> u64 {
        (self.minutes_in_day / self.tick_interval_minutes.max(1)) as u64
    }

    /// `true` once every tick of the run has fired.
    #[inline]
    pub fn is_complete(&self) -> bool {
        self.ticks_fired >= self.total_ticks()
    }

    /// Wall-clock offset (seconds from run start) at which `time` is reached
    /// when the run starts at midnight.
    pub fn sim_time_for(&self, time: TimeOfDay) -> f64 {
        self.sim_duration_secs * time.total_minutes() as f64 / self.minutes_in_day as f64
    }

    /// Add `dt_secs` of wall time without firing anything.  Elapsed time is
    /// capped at the run duration.
    pub fn accumulate(&mut self, dt_secs: f64) {
        if dt_secs > 0.0 {
            self.elapsed_secs = (self.elapsed_secs + dt_secs).min(self.sim_duration_secs);
        }
    }

    /// Fire the next pending tick, if its threshold has been reached.
    ///
    /// Returns the new time of day.  Call in a loop until `None` to drain
    /// every tick crossed by a large `dt`.
    pub fn poll_tick(&mut self) -> Option<TimeOfDay> {
        if self.is_complete() {
            return None;
        }
        let threshold = self.threshold(self.ticks_fired + 1);
        if self.elapsed_secs + THRESHOLD_EPSILON < threshold {
            return None;
        }
        self.ticks_fired += 1;
        self.current_time.add_minutes(self.tick_interval_minutes);
        trace!(tick = self.ticks_fired, time = %self.current_time, "clock tick");
        Some(self.current_time)
    }

    /// Accumulate `dt_secs` and fire every tick it crosses.  Returns the
    /// number of ticks fired.
    pub fn advance(&mut self, dt_secs: f64) -> u32 {
        self.accumulate(dt_secs);
        let mut fired = 0;
        while self.poll_tick().is_some() {
            fired += 1;
        }
        fired
    }

    /// Jump wall time forward to the next threshold and fire exactly one
    /// tick.  Returns `None` once the run is complete.
    pub fn tick(&mut self) -> Option<TimeOfDay> {
        if self.is_complete() {
            return None;
        }
        let threshold = self.threshold(self.ticks_fired + 1);
        self.elapsed_secs = self.elapsed_secs.max(threshold);
        self.poll_tick()
    }

    /// Wall time at which tick `k` (1-based) fires.
    fn threshold(&self, k: u64) -> f64 {
        if k >= self.total_ticks() {
            self.sim_duration_secs
        } else {
            k as f64 * self.secs_per_tick()
        }
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tick {} ({}, {:.1}s)", self.ticks_fired, self.current_time, self.elapsed_secs)
    }
}
