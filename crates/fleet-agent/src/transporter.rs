//! The transporter state machine.
//!
//! # Update model
//!
//! The simulation calls [`Transporter::update`] once per frame with the
//! frame's `dt`.  Every timed phase (loading, charging, backing up, retry
//! back-off) is a countdown advanced by `dt`; nothing blocks.
//!
//! # Legs
//!
//! A task is driven in two legs, `position → origin` and
//! `origin → destination`.  `nav.target` is the leg's nominal end point and
//! `nav.goal` the point actually driven to, which differs after the router
//! substitutes an alternative destination.  The reroute budget is counted
//! per target and resets when a new leg starts.
//!
//! # Avoidance
//!
//! While moving, the agent periodically asks the router for a head-on
//! conflict; if it is the side that must yield it backs up for a bounded
//! time, then re-plans to its goal.  An agent that makes no progress for
//! its kind's stuck threshold yields to co-located moving agents that
//! outrank it, or else asks for a reroute.

use std::collections::VecDeque;

use tracing::{debug, info, warn};

use fleet_core::{AgentId, AgentRng, Point, SlotHandle, TaskId};
use fleet_routing::{Presence, RerouteDecision};
use fleet_tasks::{Downtime, Task};

use crate::{AgentContext, AgentEvent, AgentKind, AgentProfile, MovementState};

// ── Internal state ────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct Navigation {
    target:              Option<Point>,
    goal:                Option<Point>,
    /// Remaining corners, the goal last.
    path:                VecDeque<Point>,
    reroute_attempts:    u32,
    stalled_reported:    bool,
    since_reroute_check: f64,
    last_check_pos:      Point,
}

#[derive(Debug, Default)]
struct Timers {
    /// Remaining load/unload time.
    handling:  f64,
    at_origin: bool,
    picked_up: bool,
    /// Remaining downtime.
    downtime:  f64,
    /// Back-off before retrying an unreachable goal from Idle.
    retry:     f64,
    avoidance: f64,
    stuck:     f64,
}

#[derive(Debug)]
struct BackingUp {
    target:      Point,
    elapsed:     f64,
    yielding_to: Option<AgentId>,
}

// ── AgentStatus ───────────────────────────────────────────────────────────────

/// Point-in-time summary of one agent, for reporting.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AgentStatus {
    pub id:                 AgentId,
    pub name:               String,
    pub kind:               AgentKind,
    pub state:              MovementState,
    pub queue_depth:        usize,
    pub downtime_depth:     usize,
    pub position:           Point,
    pub busy:               bool,
    pub available:          bool,
    pub backing_up:         bool,
    pub reroute_attempts:   u32,
    pub completed_tasks:    u32,
    pub distance_travelled: f64,
}

// ── Transporter ───────────────────────────────────────────────────────────────

pub struct Transporter {
    id:                 AgentId,
    name:               String,
    kind:               AgentKind,
    profile:            AgentProfile,
    avoidance_priority: u32,
    busy:               bool,
    available:          bool,
    state:              MovementState,
    tasks:              VecDeque<TaskId>,
    downtimes:          VecDeque<Downtime>,
    registry_slot:      Option<SlotHandle>,
    position:           Point,
    heading:            Point,
    nav:                Navigation,
    timers:             Timers,
    backing:            Option<BackingUp>,
    rng:                AgentRng,
    completed_tasks:    u32,
    completed_downtime: u32,
    distance_travelled: f64,
}

impl Transporter {
    /// An idle, available transporter with its kind's stock profile.
    pub fn new(id: AgentId, kind: AgentKind, position: Point, avoidance_priority: u32, seed: u64) -> Self {
        Self {
            id,
            name:               format!("{kind}-{}", id.0),
            kind,
            profile:            kind.profile(),
            avoidance_priority,
            busy:               false,
            available:          true,
            state:              MovementState::Idle,
            tasks:              VecDeque::new(),
            downtimes:          VecDeque::new(),
            registry_slot:      None,
            position,
            heading:            Point::ZERO,
            nav:                Navigation::default(),
            timers:             Timers::default(),
            backing:            None,
            rng:                AgentRng::new(seed, id),
            completed_tasks:    0,
            completed_downtime: 0,
            distance_travelled: 0.0,
        }
    }

    pub fn with_profile(mut self, profile: AgentProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> AgentKind {
        self.kind
    }

    pub fn profile(&self) -> &AgentProfile {
        &self.profile
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.profile.speed
    }

    #[inline]
    pub fn state(&self) -> MovementState {
        self.state
    }

    #[inline]
    pub fn position(&self) -> Point {
        self.position
    }

    pub fn avoidance_priority(&self) -> u32 {
        self.avoidance_priority
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn is_backing_up(&self) -> bool {
        self.backing.is_some()
    }

    /// `available ∧ ¬busy ∧ state = Idle`.
    #[inline]
    pub fn is_assignable(&self) -> bool {
        self.available && !self.busy && self.state == MovementState::Idle
    }

    pub fn task_queue(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.tasks.iter().copied()
    }

    pub fn current_task(&self) -> Option<TaskId> {
        self.tasks.front().copied()
    }

    pub fn queue_depth(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_tasks(&self) -> u32 {
        self.completed_tasks
    }

    /// The point currently driven to, if moving.
    pub fn goal(&self) -> Option<Point> {
        self.nav.goal
    }

    pub fn reroute_attempts(&self) -> u32 {
        self.nav.reroute_attempts
    }

    pub fn registry_slot(&self) -> Option<SlotHandle> {
        self.registry_slot
    }

    /// Set by the fleet registry when assignability changes.
    pub fn set_registry_slot(&mut self, slot: Option<SlotHandle>) {
        self.registry_slot = slot;
    }

    pub fn status(&self) -> AgentStatus {
        AgentStatus {
            id:                 self.id,
            name:               self.name.clone(),
            kind:               self.kind,
            state:              self.state,
            queue_depth:        self.tasks.len(),
            downtime_depth:     self.downtimes.len(),
            position:           self.position,
            busy:               self.busy,
            available:          self.available,
            backing_up:         self.backing.is_some(),
            reroute_attempts:   self.nav.reroute_attempts,
            completed_tasks:    self.completed_tasks,
            distance_travelled: self.distance_travelled,
        }
    }

    /// Snapshot for the router.
    pub fn presence(&self) -> Presence {
        Presence {
            id:         self.id,
            position:   self.position,
            heading:    self.heading,
            moving:     self.state == MovementState::Moving,
            backing_up: self.backing.is_some(),
            priority:   self.avoidance_priority,
        }
    }

    // ── Queues ────────────────────────────────────────────────────────────

    pub fn enqueue_task(&mut self, task: TaskId) {
        debug!(agent = %self.id, %task, "task queued");
        self.tasks.push_back(task);
    }

    pub fn enqueue_downtime(&mut self, downtime: Downtime) {
        debug!(agent = %self.id, downtime = %downtime.id, kind = downtime.kind.as_str(), "downtime queued");
        self.downtimes.push_back(downtime);
    }

    /// Stop at once, drop every queued task, and return to Idle.  Returns
    /// the dropped tasks.  A downtime in progress is cut short and leaves
    /// the queue; downtime not yet started is kept.
    pub fn emergency_stop(&mut self) -> Vec<TaskId> {
        let dropped: Vec<TaskId> = self.tasks.drain(..).collect();
        if self.state == MovementState::Charging {
            if let Some(downtime) = self.downtimes.pop_front() {
                warn!(agent = %self.id, downtime = %downtime.id, "downtime cut short");
            }
        }
        self.nav = Navigation::default();
        self.timers = Timers::default();
        self.backing = None;
        self.heading = Point::ZERO;
        self.state = MovementState::Idle;
        self.busy = false;
        self.available = true;
        warn!(agent = %self.id, dropped = dropped.len(), "emergency stop");
        dropped
    }

    // ── Update ────────────────────────────────────────────────────────────

    /// Advance the state machine by `dt` seconds.  Never fails; shortfalls
    /// show up as events and are retried on later frames.
    pub fn update(&mut self, dt: f64, ctx: &mut AgentContext<'_>) -> Vec<AgentEvent> {
        let mut events = Vec::new();
        let before = self.position;

        match self.state {
            MovementState::Idle => self.update_idle(dt, ctx, &mut events),
            MovementState::Moving => self.update_moving(dt, ctx, &mut events),
            MovementState::Arrived => self.begin_handling(ctx, &mut events),
            MovementState::Loading => self.update_loading(dt, ctx, &mut events),
            MovementState::Charging => self.update_charging(dt, &mut events),
        }

        self.distance_travelled += before.distance(self.position) as f64;
        ctx.router.update_presence(self.presence());
        events
    }

    fn set_state(&mut self, to: MovementState, events: &mut Vec<AgentEvent>) {
        if self.state == to {
            return;
        }
        let from = self.state;
        self.state = to;
        match to {
            MovementState::Idle => {
                self.busy = false;
                self.available = true;
            }
            _ => {
                self.busy = true;
                self.available = false;
            }
        }
        debug!(agent = %self.id, %from, %to, "state change");
        events.push(AgentEvent::StateChanged { from, to });
    }

    // ── Idle ──────────────────────────────────────────────────────────────

    fn update_idle(&mut self, dt: f64, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        if self.timers.retry > 0.0 {
            self.timers.retry -= dt;
            if self.timers.retry > 0.0 {
                return;
            }
        }

        let downtime_due = self
            .downtimes
            .front()
            .is_some_and(|d| d.is_due(ctx.time_of_day) && !d.lifecycle.is_completed());
        if downtime_due {
            self.begin_downtime(events);
            return;
        }

        let catalog = ctx.catalog;
        while let Some(&id) = self.tasks.front() {
            if catalog.get(id).is_some_and(|t| !t.is_completed()) {
                break;
            }
            debug!(agent = %self.id, task = %id, "dropping completed or unknown task");
            self.tasks.pop_front();
        }

        let Some(task_id) = self.tasks.front().copied() else {
            // A failed start left the agent busy; with nothing queued it is
            // free again.
            self.busy = false;
            self.available = true;
            return;
        };
        let Some(task) = catalog.get(task_id) else {
            return;
        };

        if self.start_leg(task.origin, ctx, events) {
            info!(agent = %self.id, task = %task.id, description = %task.description, "starting task");
            events.push(AgentEvent::TaskStarted(task_id));
        }
    }

    /// Plan a path to `target` and switch to Moving.  Returns `false` when
    /// neither `target` nor an alternative near it can be reached.
    fn start_leg(&mut self, target: Point, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) -> bool {
        let navigator = ctx.navigator;
        let mut goal = target;
        if !navigator.is_reachable(goal) {
            match ctx.router.find_alternative_destination(goal, navigator, ctx.now_secs) {
                Some(alt) => {
                    debug!(agent = %self.id, %target, %alt, "goal unreachable, using alternative");
                    goal = alt;
                }
                None => {
                    self.fail_unreachable(target, ctx, events);
                    return false;
                }
            }
        }

        let path = match navigator.find_path(self.position, goal) {
            Ok(path) => path,
            Err(err) => {
                debug!(agent = %self.id, %err, "path query failed");
                self.fail_unreachable(target, ctx, events);
                return false;
            }
        };

        let same_target = self.nav.target == Some(target);
        self.nav = Navigation {
            target:              Some(target),
            goal:                Some(goal),
            path:                path.corners.into_iter().skip(1).collect(),
            reroute_attempts:    if same_target { self.nav.reroute_attempts } else { 0 },
            stalled_reported:    same_target && self.nav.stalled_reported,
            since_reroute_check: 0.0,
            last_check_pos:      self.position,
        };
        self.timers.stuck = 0.0;
        self.timers.avoidance = 0.0;
        self.timers.retry = 0.0;
        self.set_state(MovementState::Moving, events);
        true
    }

    fn fail_unreachable(&mut self, goal: Point, ctx: &AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        warn!(agent = %self.id, %goal, "goal unreachable and no alternative found; will retry");
        events.push(AgentEvent::Unreachable { goal });
        self.timers.retry = ctx.router.config().unreachable_retry_secs;
        self.busy = true;
        self.available = false;
    }

    // ── Moving ────────────────────────────────────────────────────────────

    fn update_moving(&mut self, dt: f64, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        if self.backing.is_some() {
            self.update_backing(dt, ctx, events);
            return;
        }
        let Some(goal) = self.nav.goal else {
            self.set_state(MovementState::Idle, events);
            return;
        };
        if self.position.distance(goal) <= self.profile.stopping_distance {
            self.arrive(ctx, events);
            return;
        }

        let (avoid_every, reroute_every, reroute_min_dist) = {
            let cfg = ctx.router.config();
            (cfg.avoidance_check_interval_secs, cfg.reroute_check_interval_secs, cfg.min_reroute_check_distance)
        };

        self.timers.avoidance += dt;
        if self.timers.avoidance >= avoid_every {
            self.timers.avoidance = 0.0;
            if let Some(conflict) = ctx.router.head_on_conflict(self.id) {
                if conflict.must_yield {
                    self.begin_backing(Some(conflict.other), ctx, events);
                    return;
                }
            }
        }

        self.nav.since_reroute_check += dt;
        if self.nav.since_reroute_check >= reroute_every
            && self.position.distance(self.nav.last_check_pos) >= reroute_min_dist
        {
            self.nav.since_reroute_check = 0.0;
            self.nav.last_check_pos = self.position;
            self.try_reroute(ctx, events);
        }

        let start = self.position;
        self.advance_along_path(dt, ctx);

        let moved = start.distance(self.position) as f64;
        if moved < self.profile.min_progress_speed as f64 * dt {
            self.timers.stuck += dt;
        } else {
            self.timers.stuck = 0.0;
        }
        if self.timers.stuck > self.profile.stuck_threshold_secs {
            self.timers.stuck = 0.0;
            debug!(agent = %self.id, "stuck");
            self.recover_from_stuck(ctx, events);
            return;
        }

        if let Some(goal) = self.nav.goal {
            if self.position.distance(goal) <= self.profile.stopping_distance {
                self.arrive(ctx, events);
            }
        }
    }

    /// Move up to `speed·dt` along the path.  The step is refused when it
    /// would put the agent's body into a moving agent it was clear of.
    fn advance_along_path(&mut self, dt: f64, ctx: &AgentContext<'_>) {
        if self.nav.path.is_empty() {
            if let Some(goal) = self.nav.goal {
                self.nav.path.push_back(goal);
            }
        }

        let start = self.position;
        let mut pos = start;
        let mut budget = self.profile.speed * dt as f32;
        let mut reached = 0;
        for &corner in &self.nav.path {
            if budget <= 0.0 {
                break;
            }
            let d = pos.distance(corner);
            if d <= budget {
                pos = corner;
                budget -= d;
                reached += 1;
            } else {
                pos = pos.move_towards(corner, budget);
                budget = 0.0;
            }
        }

        let clearance = self.profile.body_radius * 2.0;
        let router = &*ctx.router;
        if router.is_space_occupied(pos, clearance, self.id)
            && !router.is_space_occupied(start, clearance, self.id)
        {
            return;
        }

        self.nav.path.drain(..reached);
        let step = pos - start;
        if !step.is_zero() {
            self.heading = step.normalized();
        }
        self.position = pos;
    }

    fn arrive(&mut self, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        self.nav.path.clear();
        self.heading = Point::ZERO;
        self.set_state(MovementState::Arrived, events);
        self.begin_handling(ctx, events);
    }

    // ── Rerouting ─────────────────────────────────────────────────────────

    fn try_reroute(&mut self, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        let Some(goal) = self.nav.goal else {
            return;
        };
        let navigator = ctx.navigator;
        let decision = ctx
            .router
            .should_reroute(self.position, goal, navigator, ctx.waypoints, ctx.now_secs);
        if decision.is_keep() {
            return;
        }

        if self.nav.reroute_attempts >= ctx.router.config().max_reroute_attempts {
            if !self.nav.stalled_reported {
                self.nav.stalled_reported = true;
                warn!(agent = %self.id, %goal, attempts = self.nav.reroute_attempts, "reroute limit reached; keeping stale path");
                events.push(AgentEvent::Stalled { goal });
            }
            return;
        }

        let applied = match decision {
            RerouteDecision::AlternativeDestination { goal: p, .. } => match navigator.find_path(self.position, p) {
                Ok(path) => {
                    self.nav.goal = Some(p);
                    self.nav.path = path.corners.into_iter().skip(1).collect();
                    true
                }
                Err(_) => false,
            },
            RerouteDecision::Waypoint { via, .. } => {
                match (navigator.find_path(self.position, via), navigator.find_path(via, goal)) {
                    (Ok(mut first), Ok(second)) => {
                        first.extend(second);
                        self.nav.path = first.corners.into_iter().skip(1).collect();
                        true
                    }
                    _ => false,
                }
            }
            RerouteDecision::Keep => false,
        };

        if applied {
            self.nav.reroute_attempts += 1;
            ctx.router.record_reroute(&decision);
            debug!(agent = %self.id, ?decision, attempt = self.nav.reroute_attempts, "rerouted");
            events.push(AgentEvent::Rerouted { decision, attempt: self.nav.reroute_attempts });
        }
    }

    fn recover_from_stuck(&mut self, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        let me = self.presence();
        let moving_neighbours: Vec<Presence> = ctx
            .router
            .colocated_agents(self.id)
            .into_iter()
            .filter_map(|id| ctx.router.presence(id).copied())
            .filter(|o| o.moving)
            .collect();

        if moving_neighbours.is_empty() {
            self.try_reroute(ctx, events);
            return;
        }

        let outranking = moving_neighbours
            .iter()
            .filter(|o| me.yields_to(o))
            .min_by_key(|o| (o.priority, o.id))
            .map(|o| o.id);
        if let Some(other) = outranking {
            self.begin_backing(Some(other), ctx, events);
        }
    }

    // ── Backing up ────────────────────────────────────────────────────────

    fn begin_backing(&mut self, yielding_to: Option<AgentId>, ctx: &AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        let distance = ctx.router.config().backing_up_distance;
        let away_from_goal = self
            .nav
            .goal
            .map(|g| self.position - g)
            .filter(|v| !v.is_zero())
            .map(Point::normalized);

        let direction = if !self.heading.is_zero() {
            -self.heading
        } else if let Some(d) = away_from_goal {
            d
        } else {
            self.rng.unit_direction()
        };

        let navigator = ctx.navigator;
        let mut target = self.position + direction * distance;
        if !navigator.is_reachable(target) {
            let origin = self.position;
            target = (0..4)
                .map(|_| origin + self.rng.unit_direction() * distance)
                .find(|&p| navigator.is_reachable(p))
                .unwrap_or(origin);
        }

        debug!(agent = %self.id, ?yielding_to, %target, "backing up");
        self.heading = (target - self.position).normalized();
        self.backing = Some(BackingUp { target, elapsed: 0.0, yielding_to });
        self.timers.stuck = 0.0;
        events.push(AgentEvent::BackingUp { yielding_to });
    }

    fn update_backing(&mut self, dt: f64, ctx: &mut AgentContext<'_>, _events: &mut Vec<AgentEvent>) {
        let max_secs = ctx.router.config().max_backing_up_secs;
        let step = self.profile.speed * dt as f32;
        let Some(backing) = self.backing.as_mut() else {
            return;
        };
        backing.elapsed += dt;
        let next = self.position.move_towards(backing.target, step);
        let done = backing.elapsed >= max_secs || next.distance(backing.target) < 1e-3;
        self.position = next;

        if done {
            if let Some(b) = self.backing.take() {
                debug!(agent = %self.id, yielded_to = ?b.yielding_to, secs = b.elapsed, "backing up finished");
            }
            self.replan(ctx);
        }
    }

    /// Re-plan from the current position to the current goal.
    fn replan(&mut self, ctx: &AgentContext<'_>) {
        let Some(goal) = self.nav.goal else {
            return;
        };
        self.nav.path = match ctx.navigator.find_path(self.position, goal) {
            Ok(path) => path.corners.into_iter().skip(1).collect(),
            Err(_) => VecDeque::from([goal]),
        };
        self.heading = Point::ZERO;
        self.timers.stuck = 0.0;
        self.timers.avoidance = 0.0;
    }

    // ── Loading ───────────────────────────────────────────────────────────

    fn begin_handling(&mut self, ctx: &AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        let catalog = ctx.catalog;
        let Some(task) = self.tasks.front().and_then(|&id| catalog.get(id)) else {
            self.nav = Navigation::default();
            self.set_state(MovementState::Idle, events);
            return;
        };
        // Nearest end wins.  Ambiguous when origin and destination lie within
        // the stopping distance of each other.
        let at_origin = self.position.distance(task.origin) < self.position.distance(task.destination);
        self.timers.at_origin = at_origin;
        self.timers.picked_up = false;
        self.timers.handling = self.profile.handling_secs(task);
        debug!(agent = %self.id, task = %task.id, at_origin, secs = self.timers.handling, "handling");
        self.set_state(MovementState::Loading, events);
    }

    fn update_loading(&mut self, dt: f64, ctx: &mut AgentContext<'_>, events: &mut Vec<AgentEvent>) {
        self.timers.handling -= dt;
        if self.timers.handling > 0.0 {
            return;
        }

        let catalog = ctx.catalog;
        let Some((task_id, task)) = self
            .tasks
            .front()
            .and_then(|&id| catalog.get(id).map(|t| (id, t)))
        else {
            self.nav = Navigation::default();
            self.set_state(MovementState::Idle, events);
            return;
        };

        if self.timers.at_origin {
            if !self.timers.picked_up {
                self.timers.picked_up = true;
                debug!(agent = %self.id, task = %task.id, "picked up");
                events.push(AgentEvent::PickedUp(task_id));
            }
            if !self.start_leg(task.destination, ctx, events) {
                self.timers.handling = ctx.router.config().unreachable_retry_secs;
                self.timers.retry = 0.0;
            }
        } else {
            self.finish_task(task_id, task, events);
        }
    }

    fn finish_task(&mut self, task_id: TaskId, task: &Task, events: &mut Vec<AgentEvent>) {
        self.tasks.pop_front();
        self.completed_tasks += 1;
        self.nav = Navigation::default();
        info!(agent = %self.id, task = %task.id, "task completed");
        events.push(AgentEvent::TaskCompleted(task_id));
        self.set_state(MovementState::Idle, events);
    }

    // ── Downtime ──────────────────────────────────────────────────────────

    fn begin_downtime(&mut self, events: &mut Vec<AgentEvent>) {
        let Some(downtime) = self.downtimes.front_mut() else {
            return;
        };
        downtime.lifecycle.mark_entered();
        downtime.lifecycle.mark_assigned();
        let (id, kind, secs) = (downtime.id, downtime.kind, downtime.duration_secs);
        self.timers.downtime = secs;
        self.nav = Navigation::default();
        info!(agent = %self.id, downtime = %id, kind = kind.as_str(), secs, "downtime started");
        self.set_state(MovementState::Charging, events);
        events.push(AgentEvent::DowntimeStarted(id));
    }

    fn update_charging(&mut self, dt: f64, events: &mut Vec<AgentEvent>) {
        self.timers.downtime -= dt;
        if self.timers.downtime > 0.0 {
            return;
        }
        if let Some(mut downtime) = self.downtimes.pop_front() {
            downtime.lifecycle.mark_completed();
            self.completed_downtime += 1;
            info!(agent = %self.id, downtime = %downtime.id, "downtime completed");
            events.push(AgentEvent::DowntimeCompleted(downtime.id));
        }
        self.set_state(MovementState::Idle, events);
    }
}
