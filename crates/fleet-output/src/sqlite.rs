//! SQLite output backend (feature `sqlite`).
//!
//! Creates a single `output.db` file in the configured output directory with
//! tables `agent_snapshots`, `tick_summaries` and `agent_events`.

use std::path::Path;

use rusqlite::{Connection, params};

use crate::writer::OutputWriter;
use crate::{AgentEventRow, AgentSnapshotRow, OutputResult, TickSummaryRow};

/// Writes run output to an SQLite database.
pub struct SqliteWriter {
    conn:     Connection,
    finished: bool,
}

impl SqliteWriter {
    /// Open (or create) `output.db` in `dir` and initialise the schema.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let conn = Connection::open(dir.join("output.db"))?;

        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous  = NORMAL;
             CREATE TABLE IF NOT EXISTS agent_snapshots (
                 agent_id        INTEGER NOT NULL,
                 tick            INTEGER NOT NULL,
                 minute_of_day   INTEGER NOT NULL,
                 kind            TEXT    NOT NULL,
                 state           TEXT    NOT NULL,
                 x               REAL    NOT NULL,
                 y               REAL    NOT NULL,
                 queue_depth     INTEGER NOT NULL,
                 busy            INTEGER NOT NULL,
                 backing_up      INTEGER NOT NULL,
                 completed_tasks INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS tick_summaries (
                 tick          INTEGER PRIMARY KEY,
                 minute_of_day INTEGER NOT NULL,
                 released      INTEGER NOT NULL,
                 assigned      INTEGER NOT NULL,
                 registered    INTEGER NOT NULL,
                 waiting       INTEGER NOT NULL,
                 completed     INTEGER NOT NULL
             );
             CREATE TABLE IF NOT EXISTS agent_events (
                 minute_of_day INTEGER NOT NULL,
                 agent_id      INTEGER NOT NULL,
                 event         TEXT    NOT NULL,
                 subject       INTEGER,
                 detail        TEXT    NOT NULL
             );",
        )?;

        Ok(Self { conn, finished: false })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()> {
        if rows.is_empty() {
            return Ok(());
        }
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(
                "INSERT INTO agent_snapshots \
                 (agent_id, tick, minute_of_day, kind, state, x, y, \
                  queue_depth, busy, backing_up, completed_tasks) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for row in rows {
                stmt.execute(params![
                    row.agent_id,
                    row.tick as i64,
                    row.minute_of_day,
                    row.kind,
                    row.state,
                    row.x as f64,
                    row.y as f64,
                    row.queue_depth,
                    row.busy as i64,
                    row.backing_up as i64,
                    row.completed_tasks,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()> {
        self.conn.execute(
            "INSERT INTO tick_summaries \
             (tick, minute_of_day, released, assigned, registered, waiting, completed) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                row.tick as i64,
                row.minute_of_day,
                row.released as i64,
                row.assigned as i64,
                row.registered as i64,
                row.waiting as i64,
                row.completed as i64,
            ],
        )?;
        Ok(())
    }

    fn write_event(&mut self, row: &AgentEventRow) -> OutputResult<()> {
        let subject = (row.subject != AgentEventRow::NO_SUBJECT).then_some(row.subject);
        self.conn.execute(
            "INSERT INTO agent_events (minute_of_day, agent_id, event, subject, detail) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![row.minute_of_day, row.agent_id, row.event, subject, row.detail],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
        Ok(())
    }
}
