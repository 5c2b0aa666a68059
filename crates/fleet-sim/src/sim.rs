//! The `Sim` struct and its frame loop.

use tracing::{debug, info, warn};

use fleet_agent::{AgentContext, AgentEvent, AgentStatus, Transporter};
use fleet_core::{AgentId, Point, SimClock, SimConfig, TaskId, TimeOfDay};
use fleet_dispatch::{Dispatcher, FleetRegistry, reconcile};
use fleet_nav::{Navigator, WaypointSet};
use fleet_routing::Router;
use fleet_tasks::TaskCatalog;

use crate::{NoopObserver, RunReport, SimObserver, TickSummary};

/// The simulation runner.
///
/// Each call to [`Sim::step`] is one frame:
///
/// 1. **Start** (first frame only): tasks due at the start time are
///    released and dispatched as tick 0.
/// 2. **Clock**: wall time advances by `dt`; for every tick it crosses the
///    catalog releases due tasks, the registry is reconciled with agent
///    assignability, and the dispatcher drains the entry queue.
/// 3. **Agents**: every agent updates in ascending `AgentId` order, each
///    seeing the router as left by the agents before it.
/// 4. **Events**: completions are recorded on the catalog; every event is
///    forwarded to the observer.
/// 5. **Maintenance**: expired blocked areas are swept.
///
/// Create via [`SimBuilder`][crate::SimBuilder].
pub struct Sim {
    pub config: SimConfig,

    pub clock: SimClock,

    /// Single owner of every task.
    pub catalog: TaskCatalog,

    /// Indexed by `AgentId`.
    pub agents: Vec<Transporter>,

    pub router: Router,

    /// Assignable agents, kept in line by `reconcile` each tick.
    pub registry: FleetRegistry,

    pub dispatcher: Dispatcher,

    pub navigator: Box<dyn Navigator>,

    pub waypoints: WaypointSet,

    /// Wall-clock seconds since the run started.  Keeps counting after the
    /// clock completes so agent timers and block expiries still advance.
    wall_secs: f64,
    frames:    u64,
    started:   bool,
}

impl Sim {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        config:     SimConfig,
        catalog:    TaskCatalog,
        agents:     Vec<Transporter>,
        router:     Router,
        registry:   FleetRegistry,
        dispatcher: Dispatcher,
        navigator:  Box<dyn Navigator>,
        waypoints:  WaypointSet,
    ) -> Self {
        Self {
            clock: config.make_clock(),
            config,
            catalog,
            agents,
            router,
            registry,
            dispatcher,
            navigator,
            waypoints,
            wall_secs: 0.0,
            frames:    0,
            started:   false,
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn time(&self) -> TimeOfDay {
        self.clock.current_time()
    }

    pub fn wall_secs(&self) -> f64 {
        self.wall_secs
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// `true` once every tick of the day has fired.
    pub fn is_complete(&self) -> bool {
        self.clock.is_complete()
    }

    pub fn agent(&self, id: AgentId) -> Option<&Transporter> {
        self.agents.get(id.index())
    }

    /// Status of every agent in id order.
    pub fn status(&self) -> Vec<AgentStatus> {
        self.agents.iter().map(Transporter::status).collect()
    }

    pub fn report(&self) -> RunReport {
        RunReport {
            ticks_fired: self.clock.ticks_fired(),
            final_time:  self.clock.current_time(),
            wall_secs:   self.wall_secs,
            frames:      self.frames,
            strategy:    self.dispatcher.kind(),
            tasks:       self.catalog.summary(),
            router:      self.router.stats(),
            agents:      self.status(),
        }
    }

    // ── Running ───────────────────────────────────────────────────────────

    /// Run frames of `config.frame_secs` until the day's last tick has
    /// fired.  Returns the final report, which the observer also receives.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> RunReport {
        let dt = self.config.frame_secs;
        while !self.clock.is_complete() {
            self.step_with(dt, observer);
        }
        let report = self.report();
        info!(
            ticks = report.ticks_fired,
            completed = report.tasks.completed,
            total = report.tasks.total,
            reroutes = report.router.reroutes,
            "simulation finished"
        );
        observer.on_sim_end(&report);
        report
    }

    /// Run frames until `n` more ticks have fired or the day ends.
    pub fn run_ticks<O: SimObserver>(&mut self, n: u64, observer: &mut O) {
        let target = self.clock.ticks_fired() + n;
        let dt = self.config.frame_secs;
        while self.clock.ticks_fired() < target && !self.clock.is_complete() {
            self.step_with(dt, observer);
        }
    }

    /// One frame of `dt` wall-clock seconds with no observer.
    pub fn step(&mut self, dt: f64) {
        self.step_with(dt, &mut NoopObserver);
    }

    /// One frame of `dt` wall-clock seconds.
    pub fn step_with<O: SimObserver>(&mut self, dt: f64, observer: &mut O) {
        self.ensure_started(observer);

        self.clock.accumulate(dt);
        while let Some(now) = self.clock.poll_tick() {
            self.process_tick(self.clock.ticks_fired(), now, observer);
        }

        self.wall_secs += dt.max(0.0);
        self.update_agents(dt, observer);
        self.router.maintain(self.wall_secs);
        self.frames += 1;
    }

    /// Fire exactly one tick (release and dispatch) without moving agents.
    /// Returns the new time of day, or `None` once the day is over.
    pub fn advance_tick<O: SimObserver>(&mut self, observer: &mut O) -> Option<TimeOfDay> {
        self.ensure_started(observer);
        let now = self.clock.tick()?;
        self.process_tick(self.clock.ticks_fired(), now, observer);
        Some(now)
    }

    fn ensure_started<O: SimObserver>(&mut self, observer: &mut O) {
        if !self.started {
            self.started = true;
            let start = self.clock.current_time();
            self.process_tick(0, start, observer);
        }
    }

    // ── Tick processing ───────────────────────────────────────────────────

    fn process_tick<O: SimObserver>(&mut self, tick: u64, now: TimeOfDay, observer: &mut O) {
        observer.on_tick_start(tick, now);

        let released = self.catalog.release_due(now);
        if !released.is_empty() {
            debug!(%now, count = released.len(), "tasks entered");
        }

        reconcile(&mut self.registry, &mut self.agents);
        let assignments = self.dispatcher.dispatch(&mut self.catalog, &self.registry, &mut self.agents);
        for a in &assignments {
            observer.on_assignment(now, a);
        }

        let summary = TickSummary {
            tick,
            time:       now,
            released:   released.len(),
            assigned:   assignments.len(),
            registered: self.registry.len(),
            waiting:    self.catalog.queue().len(),
            completed:  self.catalog.summary().completed,
        };
        observer.on_tick_end(&summary);

        let every = self.config.snapshot_interval_ticks;
        if every > 0 && tick.is_multiple_of(every) {
            observer.on_snapshot(tick, now, &self.agents);
        }
    }

    // ── Agent frame ───────────────────────────────────────────────────────

    fn update_agents<O: SimObserver>(&mut self, dt: f64, observer: &mut O) {
        let now_secs = self.wall_secs;
        let time = self.clock.current_time();

        // Explicit field borrows so the borrow checker sees disjoint access.
        let catalog   = &self.catalog;
        let router    = &mut self.router;
        let navigator = &*self.navigator;
        let waypoints = &self.waypoints;

        let mut reported: Vec<(AgentId, AgentEvent)> = Vec::new();
        for agent in self.agents.iter_mut() {
            let mut ctx = AgentContext::new(now_secs, time, catalog, router, navigator, waypoints);
            let events = agent.update(dt, &mut ctx);
            let id = agent.id();
            reported.extend(events.into_iter().map(|e| (id, e)));
        }

        for (agent, event) in &reported {
            if let AgentEvent::TaskCompleted(task) = *event {
                if !self.catalog.mark_completed(task) {
                    warn!(%agent, %task, "completion reported twice");
                }
            }
            observer.on_agent_event(time, *agent, event);
        }
    }

    // ── Operator controls ─────────────────────────────────────────────────

    /// Stop `agent` at once and drop its queue.  The dropped tasks are
    /// recorded as abandoned and returned.  Unknown ids are ignored.
    pub fn emergency_stop(&mut self, agent: AgentId) -> Vec<TaskId> {
        let Some(a) = self.agents.get_mut(agent.index()) else {
            warn!(%agent, "emergency stop for unknown agent ignored");
            return Vec::new();
        };
        let dropped = a.emergency_stop();
        self.router.update_presence(a.presence());
        for &task in &dropped {
            self.catalog.mark_abandoned(task);
        }
        dropped
    }

    /// Emergency-stop every agent.
    pub fn emergency_stop_all(&mut self) -> Vec<TaskId> {
        (0..self.agents.len() as u32)
            .flat_map(|i| self.emergency_stop(AgentId(i)))
            .collect()
    }

    /// Mark the grid cell around `pos` blocked for `duration_secs`
    /// (router default when `None`).
    pub fn mark_area_blocked(&mut self, pos: Point, duration_secs: Option<f64>) {
        self.router.mark_area_blocked(pos, duration_secs, self.wall_secs);
    }

    pub fn unmark_area_blocked(&mut self, pos: Point) -> bool {
        self.router.unmark_area_blocked(pos)
    }

    pub fn is_area_blocked(&mut self, pos: Point) -> bool {
        self.router.is_area_blocked(pos, self.wall_secs)
    }
}
