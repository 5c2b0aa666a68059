//! Simulation observer trait for progress reporting and data collection.

use fleet_agent::{AgentEvent, Transporter};
use fleet_core::{AgentId, TimeOfDay};
use fleet_dispatch::Assignment;

use crate::{RunReport, TickSummary};

/// Callbacks invoked by [`Sim`][crate::Sim] as the run progresses.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
///
/// # Example: completion counter
///
/// ```rust,ignore
/// struct Completions(usize);
///
/// impl SimObserver for Completions {
///     fn on_agent_event(&mut self, _: TimeOfDay, _: AgentId, event: &AgentEvent) {
///         if matches!(event, AgentEvent::TaskCompleted(_)) {
///             self.0 += 1;
///         }
///     }
/// }
/// ```
pub trait SimObserver {
    /// Called when a tick fires, before release and dispatch.
    fn on_tick_start(&mut self, _tick: u64, _time: TimeOfDay) {}

    /// Called after the tick's release and dispatch.
    fn on_tick_end(&mut self, _summary: &TickSummary) {}

    /// Called for every task handed to an agent.
    fn on_assignment(&mut self, _time: TimeOfDay, _assignment: &Assignment) {}

    /// Called for every event an agent reports from its frame update.
    fn on_agent_event(&mut self, _time: TimeOfDay, _agent: AgentId, _event: &AgentEvent) {}

    /// Called every `config.snapshot_interval_ticks` ticks with the agents
    /// in id order.
    fn on_snapshot(&mut self, _tick: u64, _time: TimeOfDay, _agents: &[Transporter]) {}

    /// Called once when [`Sim::run`][crate::Sim::run] finishes.
    fn on_sim_end(&mut self, _report: &RunReport) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
