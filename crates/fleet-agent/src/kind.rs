//! Agent kinds and their motion/handling profiles.

use std::fmt;
use std::str::FromStr;

use fleet_tasks::Task;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AgentKind {
    /// Automated guided cart.
    Cart,
    /// Human porter.
    Porter,
}

impl AgentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AgentKind::Cart => "cart",
            AgentKind::Porter => "porter",
        }
    }

    /// The stock profile for this kind.
    pub fn profile(self) -> AgentProfile {
        match self {
            AgentKind::Cart => AgentProfile::cart(),
            AgentKind::Porter => AgentProfile::porter(),
        }
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cart" | "agv" => Ok(AgentKind::Cart),
            "porter" => Ok(AgentKind::Porter),
            other => Err(format!("unknown agent kind {other:?}")),
        }
    }
}

// ── AgentProfile ──────────────────────────────────────────────────────────────

/// Motion and handling parameters for one agent.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentProfile {
    /// Cruise speed, m/s.
    pub speed: f32,

    /// Distance to the goal at which the agent counts as arrived.
    pub stopping_distance: f32,

    /// Seconds of no progress before the agent counts as stuck.
    pub stuck_threshold_secs: f64,

    /// Slower than this (m/s) counts as no progress.
    pub min_progress_speed: f32,

    /// Radius of the agent's footprint.
    pub body_radius: f32,

    /// Multiplier on a task's loading time.
    pub load_time_factor: f32,

    /// Handling time when the task needs no loading, seconds.
    pub unloaded_handling_secs: f32,
}

impl AgentProfile {
    pub fn cart() -> Self {
        Self {
            speed:                  2.0,
            stopping_distance:      0.5,
            stuck_threshold_secs:   2.0,
            min_progress_speed:     0.1,
            body_radius:            0.4,
            load_time_factor:       1.0,
            unloaded_handling_secs: 0.5,
        }
    }

    pub fn porter() -> Self {
        Self {
            speed:                  1.5,
            stopping_distance:      1.0,
            stuck_threshold_secs:   3.0,
            min_progress_speed:     0.1,
            body_radius:            0.3,
            load_time_factor:       1.5,
            unloaded_handling_secs: 3.0,
        }
    }

    pub fn with_speed(mut self, speed: f32) -> Self {
        self.speed = speed;
        self
    }

    /// Seconds spent loading or unloading `task` at either end.
    pub fn handling_secs(&self, task: &Task) -> f64 {
        if task.requires_loading {
            (task.loading_time * self.load_time_factor) as f64
        } else {
            self.unloaded_handling_secs as f64
        }
    }
}
