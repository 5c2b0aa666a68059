//! The run's shared `Router`.
//!
//! # Ownership
//!
//! One `Router` per simulation, owned by the sim and lent `&mut` to each
//! agent in turn.  Presence updates, block marks, and reroute counters are
//! therefore strictly ordered with respect to every congestion read.
//!
//! # Reroute search
//!
//! [`Router::should_reroute`] checks, in order:
//!
//! 1. **Blocked destination**: ring search around the destination, cardinal
//!    offsets before diagonals, smallest radius first.
//! 2. **Congested direct path**: detour search
//!    - (a) named waypoints away from both ends, both legs feasible and
//!      uncongested, cheapest by `|from,c| + |c,to| + 10·cost(c)`;
//!    - (b) with no waypoints, perpendicular offsets around the corners of
//!      the navigator's direct path, same ranking;
//!    - (c) fixed probes around the destination.
//!
//! Finding nothing is not an error; the caller keeps its path and asks again
//! on its next check.

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, trace};

use fleet_core::{AgentId, Point, WaypointId};
use fleet_nav::{Navigator, WaypointSet};

use crate::avoidance::{is_head_on, Conflict, Presence};
use crate::blocked::BlockedAreas;
use crate::RouterConfig;

/// Ranking weight applied to a candidate's cost multiplier.
const COST_WEIGHT: f32 = 10.0;

/// Cost added for a blocked cell.
const BLOCKED_COST: f32 = 10.0;

/// Cost added per moving agent near a cell.
const CROWD_COST: f32 = 0.5;

/// Ring directions, cardinal before diagonal.
const RING: [(f32, f32); 8] = [
    (1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0),
    (1.0, 1.0), (-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0),
];

/// Last-resort probe directions around the destination.
const PROBES: [(f32, f32); 4] = [(-1.0, 0.0), (1.0, 0.0), (0.0, -1.0), (0.0, 1.0)];

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of a reroute check.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RerouteDecision {
    /// Carry on with the current path.
    Keep,
    /// Replace the goal with a nearby point.  `congested` is set when the
    /// goal itself was clear and the move only avoids a crowded path.
    AlternativeDestination { goal: Point, congested: bool },
    /// Keep the goal but pass through `via` first.
    Waypoint { via: Point, waypoint: Option<WaypointId> },
}

impl RerouteDecision {
    #[inline]
    pub fn is_keep(&self) -> bool {
        matches!(self, RerouteDecision::Keep)
    }

    /// `true` for detours triggered by congestion rather than a blocked goal.
    pub fn is_congestion_detour(&self) -> bool {
        match self {
            RerouteDecision::Keep => false,
            RerouteDecision::AlternativeDestination { congested, .. } => *congested,
            RerouteDecision::Waypoint { .. } => true,
        }
    }
}

/// Monotonic observability counters.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RouterStats {
    /// Reroutes actually taken by agents.
    pub reroutes:              u64,
    /// Reroutes taken to avoid a congested path.
    pub congestion_detections: u64,
    pub blocks_marked:         u64,
    pub blocks_expired:        u64,
}

// ── Router ────────────────────────────────────────────────────────────────────

pub struct Router {
    config:         RouterConfig,
    /// Keyed by id so every scan visits agents in the same order.
    agents:         BTreeMap<AgentId, Presence>,
    blocked:        BlockedAreas,
    stats:          RouterStats,
    last_sweep:     f64,
    waypoint_usage: HashMap<WaypointId, u32>,
}

impl Router {
    pub fn new(config: RouterConfig) -> Self {
        let blocked = BlockedAreas::new(config.grid_size);
        Self {
            config,
            agents:         BTreeMap::new(),
            blocked,
            stats:          RouterStats::default(),
            last_sweep:     0.0,
            waypoint_usage: HashMap::new(),
        }
    }

    #[inline]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn blocked_areas(&self) -> &BlockedAreas {
        &self.blocked
    }

    /// How many times a detour went through waypoint `id`.
    pub fn waypoint_usage(&self, id: WaypointId) -> u32 {
        self.waypoint_usage.get(&id).copied().unwrap_or(0)
    }

    // ── Agent registry ────────────────────────────────────────────────────

    pub fn register(&mut self, presence: Presence) {
        self.agents.insert(presence.id, presence);
    }

    pub fn unregister(&mut self, id: AgentId) {
        self.agents.remove(&id);
    }

    /// Update a registered agent.  Unknown ids are ignored.
    pub fn update_presence(&mut self, presence: Presence) {
        if let Some(slot) = self.agents.get_mut(&presence.id) {
            *slot = presence;
        }
    }

    pub fn presence(&self, id: AgentId) -> Option<&Presence> {
        self.agents.get(&id)
    }

    pub fn registered_len(&self) -> usize {
        self.agents.len()
    }

    // ── Blocked areas ─────────────────────────────────────────────────────

    /// Block the cell containing `pos` for `duration_secs` from `now`.
    /// `None` uses the configured default.
    pub fn mark_area_blocked(&mut self, pos: Point, duration_secs: Option<f64>, now: f64) {
        let duration = duration_secs.unwrap_or(self.config.default_block_secs);
        let cell = self.blocked.mark(pos, now + duration);
        self.stats.blocks_marked += 1;
        debug!(x = cell.x, y = cell.y, duration, "area blocked");
    }

    pub fn unmark_area_blocked(&mut self, pos: Point) -> bool {
        self.blocked.unmark(pos)
    }

    /// `true` while the cell containing `pos` is blocked.  A lapsed entry is
    /// evicted on the way.
    pub fn is_area_blocked(&mut self, pos: Point, now: f64) -> bool {
        let had = self.blocked.len();
        let blocked = self.blocked.is_blocked(pos, now);
        self.stats.blocks_expired += (had - self.blocked.len()) as u64;
        blocked
    }

    /// Drop every lapsed block.  Returns how many were removed.
    pub fn sweep_expired(&mut self, now: f64) -> usize {
        let removed = self.blocked.sweep(now);
        self.stats.blocks_expired += removed as u64;
        if removed > 0 {
            trace!(removed, "expired blocks swept");
        }
        removed
    }

    /// Periodic housekeeping; sweeps once per `path_validation_interval_secs`.
    pub fn maintain(&mut self, now: f64) {
        if now - self.last_sweep >= self.config.path_validation_interval_secs {
            self.last_sweep = now;
            self.sweep_expired(now);
        }
    }

    // ── Congestion ────────────────────────────────────────────────────────

    /// Moving agents within `radius` of `pos`, the caller included.
    pub fn count_nearby_moving(&self, pos: Point, radius: f32) -> usize {
        self.agents
            .values()
            .filter(|a| a.moving && a.position.distance(pos) <= radius)
            .count()
    }

    /// Sample `from → to` every `congestion_radius` metres (both ends
    /// included) and report whether any sample is crowded.
    pub fn is_path_congested(&self, from: Point, to: Point) -> bool {
        let radius = self.config.congestion_radius;
        let threshold = self.config.congestion_threshold;
        let distance = from.distance(to);
        let steps = (distance / radius).ceil().max(1.0) as u32;
        (0..=steps).any(|i| {
            let sample = from.lerp(to, i as f32 / steps as f32);
            self.count_nearby_moving(sample, radius) >= threshold
        })
    }

    /// `1 + 10·blocked + 0.5·nearby_moving`.  A ranking weight only.
    pub fn path_cost_multiplier(&mut self, pos: Point, now: f64) -> f32 {
        let blocked = self.is_area_blocked(pos, now);
        self.cost_at(pos, blocked)
    }

    fn cost_at(&self, pos: Point, blocked: bool) -> f32 {
        let mut cost = 1.0;
        if blocked {
            cost += BLOCKED_COST;
        }
        cost + CROWD_COST * self.count_nearby_moving(pos, self.config.congestion_radius) as f32
    }

    // ── Rerouting ─────────────────────────────────────────────────────────

    pub fn should_reroute(
        &mut self,
        from:      Point,
        to:        Point,
        navigator: &dyn Navigator,
        waypoints: &WaypointSet,
        now:       f64,
    ) -> RerouteDecision {
        if !self.config.enable_dynamic_rerouting {
            return RerouteDecision::Keep;
        }

        if self.is_area_blocked(to, now) {
            return match self.find_alternative_destination(to, navigator, now) {
                Some(goal) => RerouteDecision::AlternativeDestination { goal, congested: false },
                None => RerouteDecision::Keep,
            };
        }

        if self.config.enable_congestion_avoidance && self.is_path_congested(from, to) {
            if let Some(decision) = self.find_alternative_route(from, to, navigator, waypoints, now) {
                debug!(?decision, "congested path, detour proposed");
                return decision;
            }
        }

        RerouteDecision::Keep
    }

    /// First reachable, unblocked point on the configured rings around
    /// `blocked_destination`.
    pub fn find_alternative_destination(
        &mut self,
        blocked_destination: Point,
        navigator:           &dyn Navigator,
        now:                 f64,
    ) -> Option<Point> {
        let radii = self.config.alternative_destination_radii.clone();
        for radius in radii {
            for (dx, dy) in RING {
                let candidate = blocked_destination + Point::new(dx, dy) * radius;
                if navigator.is_reachable(candidate) && !self.is_area_blocked(candidate, now) {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Detour search for a congested `from → to`.  See the module docs for
    /// the three tiers.
    pub fn find_alternative_route(
        &mut self,
        from:      Point,
        to:        Point,
        navigator: &dyn Navigator,
        waypoints: &WaypointSet,
        now:       f64,
    ) -> Option<RerouteDecision> {
        let detour = if waypoints.is_empty() {
            self.offset_detour(from, to, navigator, now)
        } else {
            self.waypoint_detour(from, to, navigator, waypoints, now)
        };
        if detour.is_some() {
            return detour;
        }

        let offset = self.config.destination_probe_offset;
        for (dx, dy) in PROBES {
            let candidate = to + Point::new(dx, dy) * offset;
            if navigator.is_reachable(candidate) && !self.is_area_blocked(candidate, now) {
                return Some(RerouteDecision::AlternativeDestination { goal: candidate, congested: true });
            }
        }
        None
    }

    fn waypoint_detour(
        &mut self,
        from:      Point,
        to:        Point,
        navigator: &dyn Navigator,
        waypoints: &WaypointSet,
        now:       f64,
    ) -> Option<RerouteDecision> {
        let min = self.config.waypoint_min_distance;
        let mut best: Option<(f32, WaypointId, Point)> = None;
        for wp in waypoints.iter() {
            let c = wp.position;
            if c.distance(from) <= min || c.distance(to) <= min {
                continue;
            }
            let Some(score) = self.score_candidate(from, c, to, navigator, now) else {
                continue;
            };
            if best.is_none_or(|(s, _, _)| score < s) {
                best = Some((score, wp.id, c));
            }
        }
        best.map(|(_, id, via)| RerouteDecision::Waypoint { via, waypoint: Some(id) })
    }

    fn offset_detour(
        &mut self,
        from:      Point,
        to:        Point,
        navigator: &dyn Navigator,
        now:       f64,
    ) -> Option<RerouteDecision> {
        let direction = (to - from).normalized();
        if direction.is_zero() {
            return None;
        }

        let mut anchors: Vec<Point> = navigator
            .find_path(from, to)
            .map(|p| p.interior().to_vec())
            .unwrap_or_default();
        if anchors.is_empty() {
            anchors = [1.0 / 3.0, 0.5, 2.0 / 3.0].iter().map(|&t| from.lerp(to, t)).collect();
        }

        let side = direction.perpendicular() * self.config.detour_offset;
        let mut best: Option<(f32, Point)> = None;
        for anchor in anchors {
            for c in [anchor + side, anchor - side] {
                let Some(score) = self.score_candidate(from, c, to, navigator, now) else {
                    continue;
                };
                if best.is_none_or(|(s, _)| score < s) {
                    best = Some((score, c));
                }
            }
        }
        best.map(|(_, via)| RerouteDecision::Waypoint { via, waypoint: None })
    }

    /// Ranking score of passing through `c`, or `None` if `c` is unusable.
    fn score_candidate(
        &mut self,
        from:      Point,
        c:         Point,
        to:        Point,
        navigator: &dyn Navigator,
        now:       f64,
    ) -> Option<f32> {
        if !navigator.is_reachable(c) || self.is_area_blocked(c, now) {
            return None;
        }
        if self.is_path_congested(from, c) || self.is_path_congested(c, to) {
            return None;
        }
        if navigator.find_path(from, c).is_err() || navigator.find_path(c, to).is_err() {
            return None;
        }
        Some(from.distance(c) + c.distance(to) + COST_WEIGHT * self.cost_at(c, false))
    }

    /// `true` if `to` is reachable and not blocked.
    pub fn validate_path(&mut self, to: Point, navigator: &dyn Navigator, now: f64) -> bool {
        navigator.is_reachable(to) && !self.is_area_blocked(to, now)
    }

    /// Count a reroute an agent actually applied.  Proposals from
    /// [`should_reroute`](Self::should_reroute) leave every counter alone.
    pub fn record_reroute(&mut self, decision: &RerouteDecision) {
        if decision.is_keep() {
            return;
        }
        self.stats.reroutes += 1;
        if decision.is_congestion_detour() {
            self.stats.congestion_detections += 1;
        }
        if let RerouteDecision::Waypoint { waypoint: Some(id), .. } = *decision {
            *self.waypoint_usage.entry(id).or_default() += 1;
        }
    }

    // ── Avoidance ─────────────────────────────────────────────────────────

    /// The nearest agent meeting `id` head-on within the stuck-together
    /// distance, if any.  Agents that are stationary or already backing up
    /// take no part.
    pub fn head_on_conflict(&self, id: AgentId) -> Option<Conflict> {
        let me = self.agents.get(&id)?;
        if !me.moving || me.backing_up {
            return None;
        }
        let reach = self.config.stuck_together_distance;
        let cosine = self.config.head_on_cosine;
        self.agents
            .values()
            .filter(|o| o.id != id && o.moving && !o.backing_up)
            .map(|o| (o, me.position.distance(o.position)))
            .filter(|&(o, d)| d <= reach && is_head_on(me, o, cosine))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(o, d)| Conflict { other: o.id, distance: d, must_yield: me.yields_to(o) })
    }

    /// Other agents within the stuck-together distance of `id`.
    pub fn colocated_agents(&self, id: AgentId) -> Vec<AgentId> {
        let Some(me) = self.agents.get(&id) else {
            return Vec::new();
        };
        let reach = self.config.stuck_together_distance;
        self.agents
            .values()
            .filter(|o| o.id != id && o.position.distance(me.position) <= reach)
            .map(|o| o.id)
            .collect()
    }

    /// `true` if a moving agent other than `exclude` has its body within
    /// `radius` of `pos`.
    pub fn is_space_occupied(&self, pos: Point, radius: f32, exclude: AgentId) -> bool {
        self.agents
            .values()
            .any(|o| o.id != exclude && o.moving && o.position.distance(pos) < radius)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(RouterConfig::default())
    }
}
