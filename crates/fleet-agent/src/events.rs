//! Events an agent reports from one update.

use fleet_core::{AgentId, DowntimeId, Point, TaskId};
use fleet_routing::RerouteDecision;

use crate::MovementState;

#[derive(Clone, Debug, PartialEq)]
pub enum AgentEvent {
    StateChanged { from: MovementState, to: MovementState },

    /// Started driving to the task's origin.
    TaskStarted(TaskId),

    /// Finished loading at the origin.
    PickedUp(TaskId),

    /// Finished unloading at the destination.  The catalog should record it.
    TaskCompleted(TaskId),

    DowntimeStarted(DowntimeId),
    DowntimeCompleted(DowntimeId),

    Rerouted { decision: RerouteDecision, attempt: u32 },

    /// Began backing away to let `yielding_to` pass.
    BackingUp { yielding_to: Option<AgentId> },

    /// Goal could not be reached and no alternative was found.  The agent
    /// retries after a back-off.
    Unreachable { goal: Point },

    /// Reroute budget exhausted for the current goal.  Reported once.
    Stalled { goal: Point },
}
