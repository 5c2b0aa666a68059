//! Plain data row types written by output backends.

/// One agent's state at a snapshot tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshotRow {
    pub agent_id:        u32,
    pub tick:            u64,
    /// Minutes since midnight.
    pub minute_of_day:   u32,
    pub kind:            &'static str,
    pub state:           &'static str,
    pub x:               f32,
    pub y:               f32,
    pub queue_depth:     u32,
    pub busy:            bool,
    pub backing_up:      bool,
    pub completed_tasks: u32,
}

/// Summary of one clock tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSummaryRow {
    pub tick:          u64,
    pub minute_of_day: u32,
    pub released:      u64,
    pub assigned:      u64,
    pub registered:    u64,
    pub waiting:       u64,
    pub completed:     u64,
}

/// One agent event or dispatcher assignment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentEventRow {
    pub minute_of_day: u32,
    pub agent_id:      u32,
    /// Short event name, e.g. `task_completed`.
    pub event:         &'static str,
    /// Task or downtime index the event concerns; `u32::MAX` when none.
    pub subject:       u32,
    /// Free-form detail such as `idle->moving` or a reroute target.
    pub detail:        String,
}

impl AgentEventRow {
    pub const NO_SUBJECT: u32 = u32::MAX;
}
