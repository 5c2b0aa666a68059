//! Per-tick summaries and the end-of-run report.

use std::fmt;

use fleet_agent::AgentStatus;
use fleet_core::TimeOfDay;
use fleet_dispatch::StrategyKind;
use fleet_routing::RouterStats;
use fleet_tasks::CatalogSummary;

/// What one clock tick did.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickSummary {
    /// Ticks fired so far; 0 for the release at the start time.
    pub tick:       u64,
    pub time:       TimeOfDay,
    pub released:   usize,
    pub assigned:   usize,
    /// Registry size after reconcile.
    pub registered: usize,
    /// Entered tasks still waiting after dispatch.
    pub waiting:    usize,
    pub completed:  usize,
}

/// Totals for a finished (or stopped) run.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunReport {
    pub ticks_fired: u64,
    pub final_time:  TimeOfDay,
    pub wall_secs:   f64,
    pub frames:      u64,
    pub strategy:    StrategyKind,
    pub tasks:       CatalogSummary,
    pub router:      RouterStats,
    pub agents:      Vec<AgentStatus>,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} ticks, ended {} after {:.1}s ({} frames), strategy {}",
            self.ticks_fired, self.final_time, self.wall_secs, self.frames, self.strategy
        )?;
        let t = &self.tasks;
        writeln!(
            f,
            "tasks: {} total, {} entered, {} assigned, {} completed, {} abandoned, {} waiting",
            t.total, t.entered, t.assigned, t.completed, t.abandoned, t.waiting
        )?;
        let r = &self.router;
        writeln!(
            f,
            "router: {} reroutes, {} congestion detections, {} blocks marked, {} expired",
            r.reroutes, r.congestion_detections, r.blocks_marked, r.blocks_expired
        )?;
        for a in &self.agents {
            writeln!(
                f,
                "  {:<12} {:<7} {:<8} done {:>3}  queued {:>2}  {:.0} m",
                a.name, a.kind.as_str(), a.state.as_str(), a.completed_tasks, a.queue_depth, a.distance_travelled
            )?;
        }
        Ok(())
    }
}
