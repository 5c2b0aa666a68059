//! Assignment strategies.
//!
//! A strategy walks the registry in order and moves tasks from the entry
//! queue onto agent queues.  Each move goes through
//! `TaskCatalog::take_head_for_assignment` or `take_for_assignment`, which
//! unlink the task from the entry queue before the agent sees it.

use std::fmt;
use std::str::FromStr;

use fleet_agent::Transporter;
use fleet_core::{AgentId, TaskId};
use fleet_tasks::{Task, TaskCatalog};

use crate::{DispatchError, FleetRegistry};

/// One task handed to one agent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Assignment {
    pub task:  TaskId,
    pub agent: AgentId,
}

/// Look up an agent by id.  Agents are stored at their id's index.
pub(crate) fn agent_mut(agents: &mut [Transporter], id: AgentId) -> Option<&mut Transporter> {
    agents.get_mut(id.index()).filter(|a| a.id() == id)
}

pub trait DispatchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Assign queued tasks to registered agents.
    fn assign(
        &self,
        catalog:  &mut TaskCatalog,
        registry: &FleetRegistry,
        agents:   &mut [Transporter],
    ) -> Vec<Assignment>;
}

// ── FirstAvailable ────────────────────────────────────────────────────────────

/// Each non-busy registered agent, in registry order, takes the entry-queue
/// head.
#[derive(Copy, Clone, Debug, Default)]
pub struct FirstAvailable;

impl DispatchStrategy for FirstAvailable {
    fn name(&self) -> &'static str {
        StrategyKind::FirstAvailable.as_str()
    }

    fn assign(
        &self,
        catalog:  &mut TaskCatalog,
        registry: &FleetRegistry,
        agents:   &mut [Transporter],
    ) -> Vec<Assignment> {
        let mut out = Vec::new();
        for id in registry.iter() {
            if catalog.queue().is_empty() {
                break;
            }
            let Some(agent) = agent_mut(agents, id) else {
                continue;
            };
            if agent.is_busy() {
                continue;
            }
            let Some(task) = catalog.take_head_for_assignment() else {
                break;
            };
            agent.enqueue_task(task);
            out.push(Assignment { task, agent: id });
        }
        out
    }
}

// ── EarliestArrival ───────────────────────────────────────────────────────────

/// Each available registered agent, in registry order, takes the queued
/// task it would finish soonest.
///
/// The estimate is straight-line: `(|agent→origin| + |origin→destination|)
/// / speed + 2 × loading_time`.  Ties go to the earlier task in queue order.
#[derive(Copy, Clone, Debug, Default)]
pub struct EarliestArrival;

impl EarliestArrival {
    /// Estimated seconds for `agent` to complete `task` from where it stands.
    pub fn estimate(agent: &Transporter, task: &Task) -> f64 {
        let speed = agent.speed();
        if speed <= 0.0 {
            return f64::INFINITY;
        }
        let travel = agent.position().distance(task.origin) + task.leg_length();
        let loading = if task.requires_loading { task.loading_time } else { 0.0 };
        (travel / speed) as f64 + 2.0 * loading as f64
    }
}

impl DispatchStrategy for EarliestArrival {
    fn name(&self) -> &'static str {
        StrategyKind::EarliestArrival.as_str()
    }

    fn assign(
        &self,
        catalog:  &mut TaskCatalog,
        registry: &FleetRegistry,
        agents:   &mut [Transporter],
    ) -> Vec<Assignment> {
        let mut candidates: Vec<TaskId> = catalog
            .queue()
            .iter()
            .filter(|&id| catalog.get(id).is_some_and(|t| !t.is_completed()))
            .collect();

        let mut out = Vec::new();
        for id in registry.iter() {
            if candidates.is_empty() {
                break;
            }
            let Some(agent) = agent_mut(agents, id) else {
                continue;
            };
            if !agent.is_available() || agent.is_busy() {
                continue;
            }

            let best = candidates
                .iter()
                .enumerate()
                .filter_map(|(i, &task)| catalog.get(task).map(|t| (i, Self::estimate(agent, t))))
                .min_by(|a, b| a.1.total_cmp(&b.1))
                .map(|(i, _)| i);
            let Some(i) = best else {
                break;
            };

            let task = candidates.remove(i);
            if catalog.take_for_assignment(task) {
                agent.enqueue_task(task);
                out.push(Assignment { task, agent: id });
            }
        }
        out
    }
}

// ── StrategyKind ──────────────────────────────────────────────────────────────

/// Strategy selector, parsed from config strings.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum StrategyKind {
    #[default]
    FirstAvailable,
    EarliestArrival,
}

impl StrategyKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyKind::FirstAvailable => "first-available",
            StrategyKind::EarliestArrival => "earliest-arrival",
        }
    }

    pub fn build(self) -> Box<dyn DispatchStrategy> {
        match self {
            StrategyKind::FirstAvailable => Box::new(FirstAvailable),
            StrategyKind::EarliestArrival => Box::new(EarliestArrival),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = DispatchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "first-available" => Ok(StrategyKind::FirstAvailable),
            "earliest-arrival" | "earliest-arrival-time" => Ok(StrategyKind::EarliestArrival),
            _ => Err(DispatchError::UnknownStrategy(s.to_string())),
        }
    }
}
