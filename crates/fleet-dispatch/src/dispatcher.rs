//! The per-tick assignment driver.

use tracing::{debug, info};

use fleet_agent::Transporter;
use fleet_tasks::TaskCatalog;

use crate::{Assignment, DispatchResult, DispatchStrategy, FleetRegistry, StrategyKind};

/// Runs one assignment strategy, chosen at construction.
pub struct Dispatcher {
    kind:           StrategyKind,
    strategy:       Box<dyn DispatchStrategy>,
    total_assigned: u64,
}

impl Dispatcher {
    pub fn new(kind: StrategyKind) -> Self {
        Self { kind, strategy: kind.build(), total_assigned: 0 }
    }

    /// Build from a config string such as `"earliest-arrival"`.
    pub fn from_name(name: &str) -> DispatchResult<Self> {
        Ok(Self::new(name.parse()?))
    }

    /// Use a custom strategy.  `kind` is only reported.
    pub fn with_strategy(kind: StrategyKind, strategy: Box<dyn DispatchStrategy>) -> Self {
        Self { kind, strategy, total_assigned: 0 }
    }

    pub fn kind(&self) -> StrategyKind {
        self.kind
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Tasks assigned over the dispatcher's lifetime.
    pub fn total_assigned(&self) -> u64 {
        self.total_assigned
    }

    /// Assign queued tasks to registered agents.  An empty entry queue or
    /// an empty registry is a no-op.
    pub fn dispatch(
        &mut self,
        catalog:  &mut TaskCatalog,
        registry: &FleetRegistry,
        agents:   &mut [Transporter],
    ) -> Vec<Assignment> {
        if catalog.queue().is_empty() {
            debug!("entry queue empty; nothing to dispatch");
            return Vec::new();
        }
        if registry.is_empty() {
            debug!(waiting = catalog.queue().len(), "no assignable agents; tasks wait");
            return Vec::new();
        }

        let assignments = self.strategy.assign(catalog, registry, agents);
        for a in &assignments {
            let label = catalog.get(a.task).map(|t| t.id.as_str()).unwrap_or_default();
            info!(task = %a.task, id = label, agent = %a.agent, strategy = self.strategy.name(), "task assigned");
        }
        self.total_assigned += assignments.len() as u64;
        assignments
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(StrategyKind::default())
    }
}
