//! CSV output backend.
//!
//! Creates three files in the configured output directory:
//! - `agent_snapshots.csv`
//! - `tick_summaries.csv`
//! - `agent_events.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::writer::OutputWriter;
use crate::{AgentEventRow, AgentSnapshotRow, OutputResult, TickSummaryRow};

pub const SNAPSHOT_HEADER: [&str; 11] = [
    "agent_id", "tick", "minute_of_day", "kind", "state", "x", "y",
    "queue_depth", "busy", "backing_up", "completed_tasks",
];

pub const SUMMARY_HEADER: [&str; 7] =
    ["tick", "minute_of_day", "released", "assigned", "registered", "waiting", "completed"];

pub const EVENT_HEADER: [&str; 5] = ["minute_of_day", "agent_id", "event", "subject", "detail"];

/// Writes run output to three CSV files.
pub struct CsvWriter {
    snapshots: Writer<File>,
    summaries: Writer<File>,
    events:    Writer<File>,
    finished:  bool,
}

impl CsvWriter {
    /// Create the CSV files in `dir` (which must exist) and write the
    /// header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut snapshots = Writer::from_path(dir.join("agent_snapshots.csv"))?;
        snapshots.write_record(SNAPSHOT_HEADER)?;

        let mut summaries = Writer::from_path(dir.join("tick_summaries.csv"))?;
        summaries.write_record(SUMMARY_HEADER)?;

        let mut events = Writer::from_path(dir.join("agent_events.csv"))?;
        events.write_record(EVENT_HEADER)?;

        Ok(Self { snapshots, summaries, events, finished: false })
    }
}

impl OutputWriter for CsvWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        for row in rows {
            self.snapshots.write_record(&[
                row.agent_id.to_string(),
                row.tick.to_string(),
                row.minute_of_day.to_string(),
                row.kind.to_owned(),
                row.state.to_owned(),
                format!("{:.3}", row.x),
                format!("{:.3}", row.y),
                row.queue_depth.to_string(),
                (row.busy as u8).to_string(),
                (row.backing_up as u8).to_string(),
                row.completed_tasks.to_string(),
            ])?;
        }
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.summaries.write_record(&[
            row.tick.to_string(),
            row.minute_of_day.to_string(),
            row.released.to_string(),
            row.assigned.to_string(),
            row.registered.to_string(),
            row.waiting.to_string(),
            row.completed.to_string(),
        ])?;
        Ok(())
    }

    fn write_event(&mut self, row: &AgentEventRow) -> OutputResult<()> {
        let subject = if row.subject == AgentEventRow::NO_SUBJECT {
            String::new()
        } else {
            row.subject.to_string()
        };
        self.events.write_record(&[
            row.minute_of_day.to_string(),
            row.agent_id.to_string(),
            row.event.to_owned(),
            subject,
            row.detail.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.snapshots.flush()?;
        self.summaries.flush()?;
        self.events.flush()?;
        Ok(())
    }
}
