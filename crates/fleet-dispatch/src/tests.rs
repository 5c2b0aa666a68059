//! Unit tests for fleet-dispatch.

use fleet_agent::{AgentContext, AgentKind, Transporter};
use fleet_core::{AgentId, Point, TaskId, TimeOfDay};
use fleet_nav::{OpenFloor, WaypointSet};
use fleet_routing::Router;
use fleet_tasks::{Task, TaskCatalog};

use crate::{Assignment, Dispatcher, FleetRegistry, StrategyKind, reconcile};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn hm(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

fn agents_at(positions: &[Point]) -> Vec<Transporter> {
    positions
        .iter()
        .enumerate()
        .map(|(i, &p)| Transporter::new(AgentId(i as u32), AgentKind::Cart, p, 50, 1))
        .collect()
}

fn released(tasks: Vec<Task>) -> TaskCatalog {
    let mut catalog = TaskCatalog::new(tasks);
    catalog.release_due(hm(23, 59));
    catalog
}

fn task(id: &str, origin: Point, destination: Point, priority: f32) -> Task {
    Task::new(id, hm(8, 0), origin, destination).with_priority(priority)
}

/// One frame for every agent, so queued tasks start.
fn update_all(agents: &mut [Transporter], catalog: &TaskCatalog) {
    let mut router = Router::default();
    for a in agents.iter() {
        router.register(a.presence());
    }
    let floor = OpenFloor::unbounded();
    let waypoints = WaypointSet::new();
    for a in agents.iter_mut() {
        let mut ctx = AgentContext::new(0.1, hm(8, 0), catalog, &mut router, &floor, &waypoints);
        a.update(0.1, &mut ctx);
    }
}

fn membership_matches(registry: &FleetRegistry, agents: &[Transporter]) -> bool {
    let mut registered: Vec<AgentId> = registry.iter().collect();
    registered.sort();
    let assignable: Vec<AgentId> = agents.iter().filter(|a| a.is_assignable()).map(|a| a.id()).collect();
    registered == assignable
}

// ── Registry ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod registry {
    use super::*;

    #[test]
    fn iterates_in_insertion_order() {
        let mut r = FleetRegistry::new();
        for i in [3, 1, 2] {
            r.insert(AgentId(i));
        }
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![AgentId(3), AgentId(1), AgentId(2)]);
        assert_eq!(r.len(), 3);
    }

    #[test]
    fn remove_head_middle_and_tail() {
        let mut r = FleetRegistry::new();
        let h: Vec<_> = (0..5).map(|i| r.insert(AgentId(i))).collect();

        assert_eq!(r.remove(h[2]), Some(AgentId(2)));
        assert_eq!(r.remove(h[0]), Some(AgentId(0)));
        assert_eq!(r.remove(h[4]), Some(AgentId(4)));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(3)]);

        r.insert(AgentId(9));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(3), AgentId(9)]);
    }

    #[test]
    fn stale_handle_rejected_after_slot_reuse() {
        let mut r = FleetRegistry::new();
        let old = r.insert(AgentId(0));
        assert_eq!(r.remove(old), Some(AgentId(0)));
        assert!(!r.contains(old));
        assert_eq!(r.remove(old), None);

        let new = r.insert(AgentId(1));
        assert_eq!(new.index, old.index);
        assert_ne!(new.generation, old.generation);
        assert_eq!(r.remove(old), None);
        assert_eq!(r.get(new), Some(AgentId(1)));
        assert_eq!(r.len(), 1);
    }

    #[test]
    fn empty_after_removing_everything() {
        let mut r = FleetRegistry::new();
        let a = r.insert(AgentId(0));
        let b = r.insert(AgentId(1));
        r.remove(b);
        r.remove(a);
        assert!(r.is_empty());
        assert_eq!(r.iter().next(), None);
    }
}

// ── Reconcile ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod reconcile_pass {
    use super::*;

    #[test]
    fn idle_agents_join_once() {
        let mut agents = agents_at(&[Point::ZERO, Point::new(5.0, 0.0)]);
        let mut r = FleetRegistry::new();

        let stats = reconcile(&mut r, &mut agents);
        assert_eq!(stats.added, 2);
        assert!(agents.iter().all(|a| a.registry_slot().is_some()));

        let again = reconcile(&mut r, &mut agents);
        assert_eq!(again.added, 0);
        assert_eq!(r.len(), 2);
    }

    #[test]
    fn working_agents_leave_and_return() {
        let catalog = released(vec![task("a", Point::new(3.0, 0.0), Point::new(6.0, 0.0), 0.0)]);
        let mut agents = agents_at(&[Point::ZERO, Point::new(0.0, 5.0)]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);

        agents[0].enqueue_task(TaskId(0));
        update_all(&mut agents, &catalog);
        assert!(!agents[0].is_assignable());

        let stats = reconcile(&mut r, &mut agents);
        assert_eq!(stats.removed, 1);
        assert_eq!(agents[0].registry_slot(), None);
        assert!(membership_matches(&r, &agents));

        agents[0].emergency_stop();
        reconcile(&mut r, &mut agents);
        assert!(membership_matches(&r, &agents));
        assert_eq!(r.iter().collect::<Vec<_>>(), vec![AgentId(1), AgentId(0)]);
    }
}

// ── Strategies ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod first_available {
    use super::*;

    #[test]
    fn single_idle_agent_gets_task_same_tick() {
        let mut catalog = TaskCatalog::new(vec![
            Task::new("T1", hm(9, 0), Point::new(1.0, 0.0), Point::new(2.0, 0.0)),
        ]);
        let mut agents = agents_at(&[Point::ZERO]);
        let mut r = FleetRegistry::new();
        let mut d = Dispatcher::new(StrategyKind::FirstAvailable);

        assert!(catalog.release_due(hm(8, 55)).is_empty());
        reconcile(&mut r, &mut agents);
        assert!(d.dispatch(&mut catalog, &r, &mut agents).is_empty());

        catalog.release_due(hm(9, 0));
        reconcile(&mut r, &mut agents);
        let out = d.dispatch(&mut catalog, &r, &mut agents);
        assert_eq!(out, vec![Assignment { task: TaskId(0), agent: AgentId(0) }]);
        assert_eq!(agents[0].current_task(), Some(TaskId(0)));
        assert!(catalog.queue().is_empty());
        assert!(catalog.get(TaskId(0)).unwrap().lifecycle().is_assigned());
    }

    #[test]
    fn serves_priority_order_across_registry_order() {
        let mut catalog = released(vec![
            task("low", Point::ZERO, Point::new(1.0, 0.0), 5.0),
            task("urgent", Point::ZERO, Point::new(1.0, 0.0), 1.0),
            task("spare", Point::ZERO, Point::new(1.0, 0.0), 9.0),
        ]);
        let mut agents = agents_at(&[Point::ZERO, Point::new(1.0, 1.0)]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);

        let out = Dispatcher::default().dispatch(&mut catalog, &r, &mut agents);
        assert_eq!(
            out,
            vec![
                Assignment { task: TaskId(1), agent: AgentId(0) },
                Assignment { task: TaskId(0), agent: AgentId(1) },
            ]
        );
        assert_eq!(catalog.queue().iter().collect::<Vec<_>>(), vec![TaskId(2)]);
    }

    #[test]
    fn assignment_is_atomic() {
        let mut catalog = released(vec![
            task("a", Point::ZERO, Point::new(1.0, 0.0), 0.0),
            task("b", Point::ZERO, Point::new(1.0, 0.0), 0.0),
        ]);
        let mut agents = agents_at(&[Point::ZERO]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);
        Dispatcher::default().dispatch(&mut catalog, &r, &mut agents);

        for (id, _) in catalog.iter() {
            let queued = catalog.queue().contains(id);
            let held = agents.iter().any(|a| a.task_queue().any(|t| t == id));
            assert!(!(queued && held), "{id} visible in both queues");
            assert!(queued || held, "{id} lost");
        }
        assert_eq!(catalog.assigned_audit(), &[TaskId(0)]);
    }

    #[test]
    fn empty_registry_is_noop() {
        let mut catalog = released(vec![task("a", Point::ZERO, Point::new(1.0, 0.0), 0.0)]);
        let mut agents = agents_at(&[]);
        let r = FleetRegistry::new();
        assert!(Dispatcher::default().dispatch(&mut catalog, &r, &mut agents).is_empty());
        assert_eq!(catalog.queue().len(), 1);
    }

    #[test]
    fn completed_heads_are_skipped() {
        let mut catalog = released(vec![
            task("done", Point::ZERO, Point::new(1.0, 0.0), 0.0),
            task("todo", Point::ZERO, Point::new(1.0, 0.0), 1.0),
        ]);
        catalog.mark_completed(TaskId(0));
        let mut agents = agents_at(&[Point::ZERO]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);

        let out = Dispatcher::default().dispatch(&mut catalog, &r, &mut agents);
        assert_eq!(out, vec![Assignment { task: TaskId(1), agent: AgentId(0) }]);
    }
}

#[cfg(test)]
mod earliest_arrival {
    use super::*;

    #[test]
    fn nearest_task_wins() {
        let mut catalog = released(vec![
            task("far", Point::new(40.0, 0.0), Point::new(41.0, 0.0), 0.0),
            task("near", Point::new(1.0, 0.0), Point::new(2.0, 0.0), 0.0),
        ]);
        let mut agents = agents_at(&[Point::ZERO, Point::new(40.0, 1.0)]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);

        let out = Dispatcher::new(StrategyKind::EarliestArrival).dispatch(&mut catalog, &r, &mut agents);
        assert_eq!(
            out,
            vec![
                Assignment { task: TaskId(1), agent: AgentId(0) },
                Assignment { task: TaskId(0), agent: AgentId(1) },
            ]
        );
        assert!(catalog.queue().is_empty());
    }

    #[test]
    fn ties_follow_queue_order() {
        let mut catalog = released(vec![
            task("second", Point::new(0.0, 3.0), Point::new(0.0, 4.0), 2.0),
            task("first", Point::new(3.0, 0.0), Point::new(4.0, 0.0), 1.0),
        ]);
        let mut agents = agents_at(&[Point::ZERO]);
        let mut r = FleetRegistry::new();
        reconcile(&mut r, &mut agents);

        let out = Dispatcher::new(StrategyKind::EarliestArrival).dispatch(&mut catalog, &r, &mut agents);
        assert_eq!(out, vec![Assignment { task: TaskId(1), agent: AgentId(0) }]);
    }

    #[test]
    fn estimate_counts_loading_twice() {
        let agent = Transporter::new(AgentId(0), AgentKind::Cart, Point::ZERO, 50, 1);
        let t = Task::new("x", hm(8, 0), Point::new(4.0, 0.0), Point::new(4.0, 6.0)).with_loading_time(1.5);
        assert_eq!(crate::EarliestArrival::estimate(&agent, &t), 5.0 + 3.0);
    }
}

#[cfg(test)]
mod strategy_kind {
    use super::*;

    #[test]
    fn parses_config_names() {
        assert_eq!("first-available".parse::<StrategyKind>().unwrap(), StrategyKind::FirstAvailable);
        assert_eq!("Earliest_Arrival".parse::<StrategyKind>().unwrap(), StrategyKind::EarliestArrival);
        assert!("round-robin".parse::<StrategyKind>().is_err());
        assert!(Dispatcher::from_name("nearest").is_err());
        assert_eq!(Dispatcher::from_name("earliest-arrival").unwrap().strategy_name(), "earliest-arrival");
    }
}
