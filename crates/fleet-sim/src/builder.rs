//! Fluent builder for constructing a [`Sim`].

use tracing::info;

use fleet_agent::{AgentKind, AgentProfile, Transporter};
use fleet_core::{AgentId, Point, SimConfig};
use fleet_dispatch::{Dispatcher, FleetRegistry, StrategyKind};
use fleet_nav::{Navigator, OpenFloor, WaypointSet};
use fleet_routing::{AvoidancePriorities, Router, RouterConfig};
use fleet_tasks::{Downtime, TaskCatalog};

use crate::{Sim, SimError, SimResult};

/// One agent to place at build time.
#[derive(Clone, Debug)]
pub struct AgentSpec {
    pub kind:      AgentKind,
    pub position:  Point,
    pub name:      Option<String>,
    /// Replaces the kind's stock profile.
    pub profile:   Option<AgentProfile>,
    /// Taken from the builder's priority counter when `None`.
    pub priority:  Option<u32>,
    pub downtimes: Vec<Downtime>,
}

impl AgentSpec {
    pub fn new(kind: AgentKind, position: Point) -> Self {
        Self { kind, position, name: None, profile: None, priority: None, downtimes: Vec::new() }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_profile(mut self, profile: AgentProfile) -> Self {
        self.profile = Some(profile);
        self
    }

    pub fn with_priority(mut self, priority: u32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_downtime(mut self, downtime: Downtime) -> Self {
        self.downtimes.push(downtime);
        self
    }
}

/// Fluent builder for [`Sim`].
///
/// # Required inputs
///
/// - [`SimConfig`]: start time, tick interval, day compression, seed, …
/// - [`TaskCatalog`]: the run's tasks
///
/// # Optional inputs (have defaults)
///
/// | Method                | Default                          |
/// |-----------------------|----------------------------------|
/// | `.navigator(n)`       | `OpenFloor::unbounded()`         |
/// | `.waypoints(w)`       | empty `WaypointSet`              |
/// | `.router_config(c)`   | `RouterConfig::default()`        |
/// | `.strategy(k)`        | `StrategyKind::FirstAvailable`   |
/// | `.agent(spec)`        | no agents                        |
///
/// # Example
///
/// ```rust,ignore
/// let mut sim = SimBuilder::new(config, catalog)
///     .navigator(Box::new(grid))
///     .strategy(StrategyKind::EarliestArrival)
///     .agent(AgentSpec::new(AgentKind::Cart, Point::new(2.0, 2.0)))
///     .build()?;
/// let report = sim.run(&mut NoopObserver);
/// ```
pub struct SimBuilder {
    config:        SimConfig,
    catalog:       TaskCatalog,
    navigator:     Option<Box<dyn Navigator>>,
    waypoints:     Option<WaypointSet>,
    router_config: RouterConfig,
    strategy:      StrategyKind,
    strategy_name: Option<String>,
    agents:        Vec<AgentSpec>,
    priorities:    AvoidancePriorities,
}

impl SimBuilder {
    pub fn new(config: SimConfig, catalog: TaskCatalog) -> Self {
        Self {
            config,
            catalog,
            navigator:     None,
            waypoints:     None,
            router_config: RouterConfig::default(),
            strategy:      StrategyKind::default(),
            strategy_name: None,
            agents:        Vec::new(),
            priorities:    AvoidancePriorities::default(),
        }
    }

    pub fn navigator(mut self, navigator: Box<dyn Navigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    pub fn waypoints(mut self, waypoints: WaypointSet) -> Self {
        self.waypoints = Some(waypoints);
        self
    }

    pub fn router_config(mut self, config: RouterConfig) -> Self {
        self.router_config = config;
        self
    }

    pub fn strategy(mut self, kind: StrategyKind) -> Self {
        self.strategy = kind;
        self.strategy_name = None;
        self
    }

    /// Select the strategy by config name; an unknown name fails `build`.
    pub fn strategy_name(mut self, name: impl Into<String>) -> Self {
        self.strategy_name = Some(name.into());
        self
    }

    /// Source of avoidance priorities for agents that do not set one.
    pub fn priorities(mut self, priorities: AvoidancePriorities) -> Self {
        self.priorities = priorities;
        self
    }

    /// Add one agent.  Agents get ids in the order they are added.
    pub fn agent(mut self, spec: AgentSpec) -> Self {
        self.agents.push(spec);
        self
    }

    pub fn agents(mut self, specs: impl IntoIterator<Item = AgentSpec>) -> Self {
        self.agents.extend(specs);
        self
    }

    /// Validate inputs, place agents, and return a ready-to-run [`Sim`].
    pub fn build(mut self) -> SimResult<Sim> {
        // ── Validate ──────────────────────────────────────────────────────
        self.config.validate().map_err(|e| SimError::Config(e.to_string()))?;
        self.router_config.validate().map_err(|e| SimError::Config(e.to_string()))?;

        if let Some((_, task)) = self
            .catalog
            .iter()
            .find(|(_, t)| !t.map.is_empty() && t.map != self.config.map_name)
        {
            return Err(SimError::Config(format!(
                "task {:?} targets map {:?}, run is configured for {:?}",
                task.id, task.map, self.config.map_name
            )));
        }

        let strategy = match self.strategy_name.take() {
            Some(name) => name.parse()?,
            None => self.strategy,
        };

        let navigator = self.navigator.take().unwrap_or_else(|| Box::new(OpenFloor::unbounded()));

        // ── Place agents ──────────────────────────────────────────────────
        let mut router = Router::new(self.router_config.clone());
        let mut agents = Vec::with_capacity(self.agents.len());
        for (i, spec) in self.agents.into_iter().enumerate() {
            if !navigator.is_reachable(spec.position) {
                return Err(SimError::Config(format!(
                    "agent {i} ({}) starts at unreachable point {}",
                    spec.kind, spec.position
                )));
            }
            let id = AgentId(i as u32);
            let priority = spec.priority.unwrap_or_else(|| self.priorities.next());
            let mut agent = Transporter::new(id, spec.kind, spec.position, priority, self.config.seed);
            if let Some(profile) = spec.profile {
                agent = agent.with_profile(profile);
            }
            if let Some(name) = spec.name {
                agent = agent.with_name(name);
            }
            for downtime in spec.downtimes {
                agent.enqueue_downtime(downtime);
            }
            router.register(agent.presence());
            agents.push(agent);
        }

        info!(
            map = %self.config.map_name,
            agents = agents.len(),
            tasks = self.catalog.len(),
            %strategy,
            start = %self.config.start_time,
            "simulation built"
        );

        Ok(Sim::from_parts(
            self.config,
            self.catalog,
            agents,
            router,
            FleetRegistry::new(),
            Dispatcher::new(strategy),
            navigator,
            self.waypoints.unwrap_or_default(),
        ))
    }
}
