//! Router and avoidance tunables.

use crate::{RoutingError, RoutingResult};

/// Tunables shared by the router and by every agent's avoidance logic.
///
/// Distances are metres, durations wall-clock seconds.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RouterConfig {
    /// Master switch for [`Router::should_reroute`](crate::Router::should_reroute).
    pub enable_dynamic_rerouting: bool,

    /// When `false`, only blocked destinations trigger a reroute.
    pub enable_congestion_avoidance: bool,

    /// Sample spacing along a segment and the count radius at each sample.
    pub congestion_radius: f32,

    /// Moving agents within `congestion_radius` of one sample that make the
    /// segment congested.
    pub congestion_threshold: usize,

    /// Interval between expired-block sweeps.
    pub path_validation_interval_secs: f64,

    /// Duration used when a block is marked without one.
    pub default_block_secs: f64,

    /// Cell size blocked areas are snapped to.
    pub grid_size: f32,

    /// Reroutes allowed per destination before the agent keeps its stale path.
    pub max_reroute_attempts: u32,

    /// Minimum time between two reroute checks by the same agent.
    pub reroute_check_interval_secs: f64,

    /// Minimum distance travelled between two reroute checks.
    pub min_reroute_check_distance: f32,

    /// Ring radii searched around a blocked destination, ascending.
    pub alternative_destination_radii: Vec<f32>,

    /// Perpendicular offset used for detour candidates without waypoints.
    pub detour_offset: f32,

    /// Offset of the last-resort probes around the destination.
    pub destination_probe_offset: f32,

    /// Waypoints closer than this to either end of a leg are not detours.
    pub waypoint_min_distance: f32,

    /// How often a moving agent runs the head-on check.
    pub avoidance_check_interval_secs: f64,

    /// Agents closer than this are "stuck together".
    pub stuck_together_distance: f32,

    /// Cosine threshold for the opposed-heading and facing tests.
    pub head_on_cosine: f32,

    /// How far a yielding agent backs away.
    pub backing_up_distance: f32,

    /// Upper bound on one backing-up episode.
    pub max_backing_up_secs: f64,

    /// Back-off before an agent retries an unreachable goal.
    pub unreachable_retry_secs: f64,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            enable_dynamic_rerouting:      true,
            enable_congestion_avoidance:   true,
            congestion_radius:             2.0,
            congestion_threshold:          2,
            path_validation_interval_secs: 1.0,
            default_block_secs:            10.0,
            grid_size:                     1.0,
            max_reroute_attempts:          3,
            reroute_check_interval_secs:   2.0,
            min_reroute_check_distance:    1.0,
            alternative_destination_radii: vec![3.0, 6.0],
            detour_offset:                 2.0,
            destination_probe_offset:      2.0,
            waypoint_min_distance:         2.0,
            avoidance_check_interval_secs: 0.5,
            stuck_together_distance:       1.5,
            head_on_cosine:                0.7,
            backing_up_distance:           1.5,
            max_backing_up_secs:           2.0,
            unreachable_retry_secs:        1.0,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> RoutingResult<()> {
        let positive = [
            ("congestion_radius", self.congestion_radius),
            ("grid_size", self.grid_size),
            ("stuck_together_distance", self.stuck_together_distance),
            ("backing_up_distance", self.backing_up_distance),
        ];
        for (name, v) in positive {
            if !(v.is_finite() && v > 0.0) {
                return Err(RoutingError::Config(format!("{name} must be positive, got {v}")));
            }
        }
        if self.congestion_threshold == 0 {
            return Err(RoutingError::Config("congestion_threshold must be at least 1".into()));
        }
        if !(-1.0..=1.0).contains(&self.head_on_cosine) {
            return Err(RoutingError::Config(format!(
                "head_on_cosine must be in [-1, 1], got {}",
                self.head_on_cosine
            )));
        }
        if self.alternative_destination_radii.windows(2).any(|w| w[0] > w[1]) {
            return Err(RoutingError::Config("alternative_destination_radii must be ascending".into()));
        }
        let durations = [
            ("path_validation_interval_secs", self.path_validation_interval_secs),
            ("reroute_check_interval_secs", self.reroute_check_interval_secs),
            ("avoidance_check_interval_secs", self.avoidance_check_interval_secs),
            ("max_backing_up_secs", self.max_backing_up_secs),
            ("unreachable_retry_secs", self.unreachable_retry_secs),
            ("default_block_secs", self.default_block_secs),
        ];
        for (name, v) in durations {
            if !(v.is_finite() && v >= 0.0) {
                return Err(RoutingError::Config(format!("{name} must be non-negative, got {v}")));
            }
        }
        Ok(())
    }
}
