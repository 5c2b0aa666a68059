//! The `OutputWriter` trait implemented by every backend.

use crate::{AgentEventRow, AgentSnapshotRow, OutputResult, TickSummaryRow};

/// Sink for rows produced by [`SimOutputObserver`][crate::SimOutputObserver].
///
/// Errors are stored by the observer and retrieved with
/// [`take_error`][crate::SimOutputObserver::take_error].
pub trait OutputWriter {
    fn write_snapshots(&mut self, rows: &[AgentSnapshotRow]) -> OutputResult<()>;

    fn write_tick_summary(&mut self, row: &TickSummaryRow) -> OutputResult<()>;

    fn write_event(&mut self, row: &AgentEventRow) -> OutputResult<()>;

    /// Flush and close all underlying handles.  Idempotent.
    fn finish(&mut self) -> OutputResult<()>;
}
