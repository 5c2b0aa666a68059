//! Unit tests for fleet-sim.

use fleet_agent::{AgentEvent, AgentKind, MovementState, Transporter};
use fleet_core::{AgentId, DowntimeId, Point, SimConfig, TaskId, TimeOfDay};
use fleet_dispatch::{Assignment, StrategyKind};
use fleet_nav::OpenFloor;
use fleet_tasks::{Downtime, DowntimeKind, Task, TaskCatalog};

use crate::{AgentSpec, NoopObserver, RunReport, Sim, SimBuilder, SimError, SimObserver, TickSummary};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn hm(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

fn config() -> SimConfig {
    SimConfig { map_name: "ward".into(), ..SimConfig::default() }
}

fn task(id: &str, entry: TimeOfDay, origin: Point, destination: Point) -> Task {
    Task::new(id, entry, origin, destination).with_map("ward")
}

fn one_cart(tasks: Vec<Task>) -> Sim {
    SimBuilder::new(config(), TaskCatalog::new(tasks))
        .agent(AgentSpec::new(AgentKind::Cart, Point::ZERO))
        .build()
        .unwrap()
}

#[derive(Default)]
struct Recorder {
    ticks:       Vec<TickSummary>,
    assignments: Vec<(TimeOfDay, Assignment)>,
    events:      Vec<(TimeOfDay, AgentId, AgentEvent)>,
    snapshots:   usize,
    ended:       Option<RunReport>,
}

impl SimObserver for Recorder {
    fn on_tick_end(&mut self, summary: &TickSummary) {
        self.ticks.push(*summary);
    }

    fn on_assignment(&mut self, time: TimeOfDay, assignment: &Assignment) {
        self.assignments.push((time, *assignment));
    }

    fn on_agent_event(&mut self, time: TimeOfDay, agent: AgentId, event: &AgentEvent) {
        self.events.push((time, agent, event.clone()));
    }

    fn on_snapshot(&mut self, _tick: u64, _time: TimeOfDay, _agents: &[Transporter]) {
        self.snapshots += 1;
    }

    fn on_sim_end(&mut self, report: &RunReport) {
        self.ended = Some(report.clone());
    }
}

fn registry_mirrors_assignability(sim: &Sim) -> bool {
    let mut registered: Vec<AgentId> = sim.registry.iter().collect();
    registered.sort();
    let assignable: Vec<AgentId> = sim.agents.iter().filter(|a| a.is_assignable()).map(|a| a.id()).collect();
    registered == assignable
}

// ── Builder ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use super::*;

    #[test]
    fn rejects_zero_tick_interval() {
        let cfg = SimConfig { tick_interval_minutes: 0, ..config() };
        let err = SimBuilder::new(cfg, TaskCatalog::empty()).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = SimBuilder::new(config(), TaskCatalog::empty())
            .strategy_name("round-robin")
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Dispatch(_)));
    }

    #[test]
    fn rejects_unreachable_start() {
        let err = SimBuilder::new(config(), TaskCatalog::empty())
            .navigator(Box::new(OpenFloor::new(Point::ZERO, Point::new(10.0, 10.0))))
            .agent(AgentSpec::new(AgentKind::Porter, Point::new(-1.0, 0.0)))
            .build()
            .err()
            .unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn rejects_tasks_for_another_map() {
        let tasks = vec![Task::new("x", hm(1, 0), Point::ZERO, Point::new(1.0, 0.0)).with_map("theatre")];
        let err = SimBuilder::new(config(), TaskCatalog::new(tasks)).build().err().unwrap();
        assert!(matches!(err, SimError::Config(_)));
    }

    #[test]
    fn agents_get_sequential_ids_and_distinct_priorities() {
        let sim = SimBuilder::new(config(), TaskCatalog::empty())
            .agent(AgentSpec::new(AgentKind::Cart, Point::ZERO))
            .agent(AgentSpec::new(AgentKind::Cart, Point::new(1.0, 0.0)).named("cart-b"))
            .agent(AgentSpec::new(AgentKind::Porter, Point::new(2.0, 0.0)).with_priority(75))
            .strategy(StrategyKind::EarliestArrival)
            .build()
            .unwrap();

        let ids: Vec<AgentId> = sim.agents.iter().map(|a| a.id()).collect();
        assert_eq!(ids, vec![AgentId(0), AgentId(1), AgentId(2)]);
        assert_ne!(sim.agents[0].avoidance_priority(), sim.agents[1].avoidance_priority());
        assert_eq!(sim.agents[2].avoidance_priority(), 75);
        assert_eq!(sim.agents[1].name(), "cart-b");
        assert_eq!(sim.router.registered_len(), 3);
        assert_eq!(sim.dispatcher.kind(), StrategyKind::EarliestArrival);
    }
}

// ── Clock & release ───────────────────────────────────────────────────────────

#[cfg(test)]
mod ticks {
    use super::*;

    #[test]
    fn full_day_fires_288_ticks_and_ends_at_midnight() {
        let mut sim = SimBuilder::new(config(), TaskCatalog::empty()).build().unwrap();
        let mut rec = Recorder::default();
        let report = sim.run(&mut rec);

        assert_eq!(report.ticks_fired, 288);
        assert_eq!(report.final_time, TimeOfDay::MIDNIGHT);
        // Tick 0 at the start time plus one summary per fired tick.
        assert_eq!(rec.ticks.len(), 289);
        assert_eq!(rec.ended.as_ref(), Some(&report));
    }

    #[test]
    fn snapshots_follow_interval() {
        let cfg = SimConfig { snapshot_interval_ticks: 12, ..config() };
        let mut sim = SimBuilder::new(cfg, TaskCatalog::empty()).build().unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);
        assert_eq!(rec.snapshots, 25);
    }

    #[test]
    fn nine_am_task_enters_and_is_assigned_on_nine_am_tick() {
        let mut sim = one_cart(vec![task("T1", hm(9, 0), Point::new(2.0, 0.0), Point::new(5.0, 0.0))]);
        let mut rec = Recorder::default();

        while let Some(now) = sim.advance_tick(&mut rec) {
            if now == hm(9, 0) {
                break;
            }
        }

        let nine = rec.ticks.last().unwrap();
        assert_eq!(nine.time, hm(9, 0));
        assert_eq!(nine.tick, 108);
        assert_eq!(nine.released, 1);
        assert_eq!(nine.assigned, 1);
        assert!(rec.ticks[..rec.ticks.len() - 1].iter().all(|t| t.released == 0));
        assert_eq!(rec.assignments, vec![(hm(9, 0), Assignment { task: TaskId(0), agent: AgentId(0) })]);
        assert_eq!(sim.agents[0].current_task(), Some(TaskId(0)));
    }

    #[test]
    fn tasks_due_at_start_enter_immediately() {
        let cfg = SimConfig { start_time: hm(8, 0), ..config() };
        let tasks = vec![task("early", hm(7, 30), Point::ZERO, Point::new(1.0, 0.0))];
        let mut sim = SimBuilder::new(cfg, TaskCatalog::new(tasks))
            .agent(AgentSpec::new(AgentKind::Cart, Point::ZERO))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.step_with(0.01, &mut rec);
        assert_eq!(rec.ticks[0].tick, 0);
        assert_eq!(rec.ticks[0].assigned, 1);
    }
}

// ── Whole runs ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod runs {
    use super::*;

    fn ward() -> Sim {
        let tasks = vec![
            task("T1", hm(0, 10), Point::new(3.0, 0.0), Point::new(8.0, 0.0)),
            task("T2", hm(0, 10), Point::new(0.0, 5.0), Point::new(6.0, 5.0)),
            task("T3", hm(2, 0), Point::new(8.0, 0.0), Point::new(0.0, 0.0)),
        ];
        SimBuilder::new(config(), TaskCatalog::new(tasks))
            .agent(AgentSpec::new(AgentKind::Cart, Point::ZERO))
            .agent(AgentSpec::new(AgentKind::Porter, Point::new(0.0, 3.0)))
            .build()
            .unwrap()
    }

    #[test]
    fn every_task_completes() {
        let mut sim = ward();
        let mut rec = Recorder::default();
        let report = sim.run(&mut rec);

        assert_eq!(report.tasks.total, 3);
        assert_eq!(report.tasks.completed, 3);
        assert_eq!(report.tasks.abandoned, 0);
        assert!(sim.catalog.tasks().iter().all(|t| t.is_completed()));
        assert!(report.agents.iter().all(|a| a.state == MovementState::Idle));

        let completions = rec
            .events
            .iter()
            .filter(|(_, _, e)| matches!(e, AgentEvent::TaskCompleted(_)))
            .count();
        assert_eq!(completions, 3);
    }

    #[test]
    fn same_seed_same_run() {
        let a = ward().run(&mut NoopObserver);
        let b = ward().run(&mut NoopObserver);
        assert_eq!(a, b);
    }

    #[test]
    fn registry_mirrors_assignability_at_tick_boundaries() {
        let mut sim = ward();
        for _ in 0..60 {
            sim.advance_tick(&mut NoopObserver);
            assert!(registry_mirrors_assignability(&sim));
            for _ in 0..20 {
                sim.step(0.02);
            }
        }
    }

    #[test]
    fn completion_never_clears() {
        let mut sim = ward();
        let mut seen = vec![false; 3];
        for _ in 0..3000 {
            sim.step(1.0 / 30.0);
            for (i, t) in sim.catalog.tasks().iter().enumerate() {
                assert!(!(seen[i] && !t.is_completed()));
                seen[i] |= t.is_completed();
            }
        }
        assert!(seen.iter().all(|&s| s));
    }
}

// ── Operator controls ─────────────────────────────────────────────────────────

#[cfg(test)]
mod controls {
    use super::*;

    #[test]
    fn emergency_stop_abandons_queue() {
        let mut sim = one_cart(vec![task("T1", hm(0, 0), Point::new(20.0, 0.0), Point::new(30.0, 0.0))]);
        for _ in 0..10 {
            sim.step(0.05);
        }
        assert_eq!(sim.agents[0].state(), MovementState::Moving);

        let dropped = sim.emergency_stop(AgentId(0));
        assert_eq!(dropped, vec![TaskId(0)]);
        assert_eq!(sim.catalog.summary().abandoned, 1);
        assert!(sim.agents[0].is_assignable());
        assert!(!sim.catalog.get(TaskId(0)).unwrap().is_completed());

        assert!(sim.emergency_stop(AgentId(7)).is_empty());
    }

    #[test]
    fn blocked_area_expires_after_duration() {
        let mut sim = one_cart(Vec::new());
        let spot = Point::new(4.0, 4.0);
        sim.mark_area_blocked(spot, Some(10.0));
        assert!(sim.is_area_blocked(spot));
        for _ in 0..99 {
            sim.step(0.1);
        }
        assert!(sim.is_area_blocked(spot));
        for _ in 0..2 {
            sim.step(0.1);
        }
        assert!(!sim.is_area_blocked(spot));
    }

    #[test]
    fn scheduled_charging_runs() {
        let charging = Downtime::new(DowntimeId(0), DowntimeKind::Charging, hm(1, 0), 2.0);
        let mut sim = SimBuilder::new(config(), TaskCatalog::empty())
            .agent(AgentSpec::new(AgentKind::Cart, Point::ZERO).with_downtime(charging))
            .build()
            .unwrap();
        let mut rec = Recorder::default();
        sim.run(&mut rec);

        let kinds: Vec<&AgentEvent> = rec
            .events
            .iter()
            .map(|(_, _, e)| e)
            .filter(|e| matches!(e, AgentEvent::DowntimeStarted(_) | AgentEvent::DowntimeCompleted(_)))
            .collect();
        assert_eq!(
            kinds,
            vec![&AgentEvent::DowntimeStarted(DowntimeId(0)), &AgentEvent::DowntimeCompleted(DowntimeId(0))]
        );
        let started_at = rec
            .events
            .iter()
            .find(|(_, _, e)| matches!(e, AgentEvent::DowntimeStarted(_)))
            .map(|(t, _, _)| *t)
            .unwrap();
        assert_eq!(started_at, hm(1, 0));
    }
}
