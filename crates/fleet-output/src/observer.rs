//! `SimOutputObserver<W>`: bridges `SimObserver` to an `OutputWriter`.

use fleet_agent::{AgentEvent, Transporter};
use fleet_core::{AgentId, TimeOfDay};
use fleet_dispatch::Assignment;
use fleet_routing::RerouteDecision;
use fleet_sim::{RunReport, SimObserver, TickSummary};

use crate::row::{AgentEventRow, AgentSnapshotRow, TickSummaryRow};
use crate::writer::OutputWriter;
use crate::{OutputError, OutputResult};

/// A [`SimObserver`] that writes snapshots, tick summaries and agent events
/// to any [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because `SimObserver` methods
/// have no return value.  After `sim.run()` returns, check for errors with
/// [`take_error`][Self::take_error].
pub struct SimOutputObserver<W: OutputWriter> {
    writer:         W,
    /// Also write `StateChanged` events, which dominate the event log.
    state_changes:  bool,
    last_error:     Option<OutputError>,
}

impl<W: OutputWriter> SimOutputObserver<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, state_changes: false, last_error: None }
    }

    pub fn with_state_changes(mut self, enabled: bool) -> Self {
        self.state_changes = enabled;
        self
    }

    /// Take the stored write error (if any) after `sim.run()` returns.
    pub fn take_error(&mut self) -> Option<OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            // Keep only the first error.
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

fn event_row(time: TimeOfDay, agent: AgentId, event: &AgentEvent) -> AgentEventRow {
    let (name, subject, detail) = match event {
        AgentEvent::StateChanged { from, to } => {
            ("state_changed", AgentEventRow::NO_SUBJECT, format!("{}->{}", from.as_str(), to.as_str()))
        }
        AgentEvent::TaskStarted(t)       => ("task_started", t.0, String::new()),
        AgentEvent::PickedUp(t)          => ("picked_up", t.0, String::new()),
        AgentEvent::TaskCompleted(t)     => ("task_completed", t.0, String::new()),
        AgentEvent::DowntimeStarted(d)   => ("downtime_started", d.0, String::new()),
        AgentEvent::DowntimeCompleted(d) => ("downtime_completed", d.0, String::new()),
        AgentEvent::Rerouted { decision, attempt } => {
            let detail = match decision {
                RerouteDecision::Keep => format!("keep #{attempt}"),
                RerouteDecision::AlternativeDestination { goal: p, .. } => format!("goal {p} #{attempt}"),
                RerouteDecision::Waypoint { via, .. } => format!("via {via} #{attempt}"),
            };
            ("rerouted", AgentEventRow::NO_SUBJECT, detail)
        }
        AgentEvent::BackingUp { yielding_to } => (
            "backing_up",
            yielding_to.map_or(AgentEventRow::NO_SUBJECT, |a| a.0),
            String::new(),
        ),
        AgentEvent::Unreachable { goal } => ("unreachable", AgentEventRow::NO_SUBJECT, goal.to_string()),
        AgentEvent::Stalled { goal }     => ("stalled", AgentEventRow::NO_SUBJECT, goal.to_string()),
    };
    AgentEventRow {
        minute_of_day: time.total_minutes(),
        agent_id:      agent.0,
        event:         name,
        subject,
        detail,
    }
}

impl<W: OutputWriter> SimObserver for SimOutputObserver<W> {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        let row = TickSummaryRow {
            tick:          summary.tick,
            minute_of_day: summary.time.total_minutes(),
            released:      summary.released as u64,
            assigned:      summary.assigned as u64,
            registered:    summary.registered as u64,
            waiting:       summary.waiting as u64,
            completed:     summary.completed as u64,
        };
        let result = self.writer.write_tick_summary(&row);
        self.store_err(result);
    }

    fn on_assignment(&mut self, time: TimeOfDay, assignment: &Assignment) {
        let row = AgentEventRow {
            minute_of_day: time.total_minutes(),
            agent_id:      assignment.agent.0,
            event:         "assigned",
            subject:       assignment.task.0,
            detail:        String::new(),
        };
        let result = self.writer.write_event(&row);
        self.store_err(result);
    }

    fn on_agent_event(&mut self, time: TimeOfDay, agent: AgentId, event: &AgentEvent) {
        if !self.state_changes && matches!(event, AgentEvent::StateChanged { .. }) {
            return;
        }
        let row = event_row(time, agent, event);
        let result = self.writer.write_event(&row);
        self.store_err(result);
    }

    fn on_snapshot(&mut self, tick: u64, time: TimeOfDay, agents: &[Transporter]) {
        let rows: Vec<AgentSnapshotRow> = agents
            .iter()
            .map(|a| {
                let pos = a.position();
                AgentSnapshotRow {
                    agent_id:        a.id().0,
                    tick,
                    minute_of_day:   time.total_minutes(),
                    kind:            a.kind().as_str(),
                    state:           a.state().as_str(),
                    x:               pos.x,
                    y:               pos.y,
                    queue_depth:     a.queue_depth() as u32,
                    busy:            a.is_busy(),
                    backing_up:      a.is_backing_up(),
                    completed_tasks: a.completed_tasks(),
                }
            })
            .collect();

        if !rows.is_empty() {
            let result = self.writer.write_snapshots(&rows);
            self.store_err(result);
        }
    }

    fn on_sim_end(&mut self, _report: &RunReport) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
