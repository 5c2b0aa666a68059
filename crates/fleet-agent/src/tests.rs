//! Unit tests for fleet-agent.

use fleet_core::{AgentId, DowntimeId, Point, TaskId, TimeOfDay};
use fleet_nav::{OpenFloor, WaypointSet};
use fleet_routing::{Presence, Router, RouterConfig};
use fleet_tasks::{Downtime, DowntimeKind, Task, TaskCatalog};

use crate::{AgentContext, AgentEvent, AgentKind, MovementState, Transporter};

// ── Helpers ───────────────────────────────────────────────────────────────────

const DT: f64 = 0.05;

fn hm(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

struct World {
    catalog:   TaskCatalog,
    router:    Router,
    floor:     OpenFloor,
    waypoints: WaypointSet,
    time:      TimeOfDay,
    now:       f64,
}

impl World {
    fn new(tasks: Vec<Task>) -> Self {
        Self::with_router(tasks, Router::default())
    }

    fn with_router(tasks: Vec<Task>, router: Router) -> Self {
        Self {
            catalog: TaskCatalog::new(tasks),
            router,
            floor: OpenFloor::new(Point::new(-50.0, -50.0), Point::new(50.0, 50.0)),
            waypoints: WaypointSet::new(),
            time: hm(8, 0),
            now: 0.0,
        }
    }

    fn add(&mut self, agent: &Transporter) {
        self.router.register(agent.presence());
    }

    fn step(&mut self, agents: &mut [Transporter], dt: f64) -> Vec<(AgentId, AgentEvent)> {
        self.now += dt;
        let mut out = Vec::new();
        for agent in agents.iter_mut() {
            let mut ctx = AgentContext::new(
                self.now,
                self.time,
                &self.catalog,
                &mut self.router,
                &self.floor,
                &self.waypoints,
            );
            let events = agent.update(dt, &mut ctx);
            out.extend(events.into_iter().map(|e| (agent.id(), e)));
        }
        out
    }

    fn run(&mut self, agents: &mut [Transporter], secs: f64) -> Vec<(AgentId, AgentEvent)> {
        let frames = (secs / DT).round() as usize;
        (0..frames).flat_map(|_| self.step(agents, DT)).collect()
    }
}

fn cart(id: u32, pos: Point) -> Transporter {
    Transporter::new(AgentId(id), AgentKind::Cart, pos, 50, 7)
}

fn one_task(origin: Point, destination: Point) -> Vec<Task> {
    vec![Task::new("T1", hm(8, 0), origin, destination)]
}

fn events_of(events: &[(AgentId, AgentEvent)], id: u32) -> Vec<AgentEvent> {
    events.iter().filter(|(a, _)| *a == AgentId(id)).map(|(_, e)| e.clone()).collect()
}

// ── Profiles ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod profiles {
    use super::*;

    #[test]
    fn handling_time_per_kind() {
        let loaded = Task::new("a", hm(8, 0), Point::ZERO, Point::new(1.0, 0.0)).with_loading_time(2.0);
        let unloaded = loaded.clone().with_loading_time(0.0);
        assert!(!unloaded.requires_loading);

        let cart = AgentKind::Cart.profile();
        let porter = AgentKind::Porter.profile();
        assert_eq!(cart.handling_secs(&loaded), 2.0);
        assert_eq!(porter.handling_secs(&loaded), 3.0);
        assert_eq!(cart.handling_secs(&unloaded), 0.5);
        assert_eq!(porter.handling_secs(&unloaded), 3.0);
    }

    #[test]
    fn kind_parsing() {
        assert_eq!("cart".parse::<AgentKind>().unwrap(), AgentKind::Cart);
        assert_eq!(" AGV ".parse::<AgentKind>().unwrap(), AgentKind::Cart);
        assert_eq!("Porter".parse::<AgentKind>().unwrap(), AgentKind::Porter);
        assert!("forklift".parse::<AgentKind>().is_err());
    }

    #[test]
    fn stock_speeds() {
        assert_eq!(AgentKind::Cart.profile().speed, 2.0);
        assert_eq!(AgentKind::Porter.profile().speed, 1.5);
    }
}

// ── Task cycle ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod task_cycle {
    use super::*;

    #[test]
    fn new_agent_is_assignable() {
        let a = cart(0, Point::ZERO);
        assert_eq!(a.state(), MovementState::Idle);
        assert!(a.is_assignable());
        assert_eq!(a.status().queue_depth, 0);
    }

    #[test]
    fn completes_pickup_and_dropoff() {
        let mut world = World::new(one_task(Point::new(4.0, 0.0), Point::new(8.0, 0.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        let events = world.run(&mut agents, 15.0);

        let kinds: Vec<&AgentEvent> = events
            .iter()
            .map(|(_, e)| e)
            .filter(|e| !matches!(e, AgentEvent::StateChanged { .. }))
            .collect();
        assert_eq!(
            kinds,
            vec![
                &AgentEvent::TaskStarted(TaskId(0)),
                &AgentEvent::PickedUp(TaskId(0)),
                &AgentEvent::TaskCompleted(TaskId(0)),
            ]
        );

        let a = &agents[0];
        assert_eq!(a.state(), MovementState::Idle);
        assert!(a.is_assignable());
        assert_eq!(a.status().completed_tasks, 1);
        assert!(a.position().distance(Point::new(8.0, 0.0)) <= 0.5);
    }

    #[test]
    fn walks_the_state_diagram() {
        use MovementState::*;
        let mut world = World::new(one_task(Point::new(4.0, 0.0), Point::new(8.0, 0.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        let transitions: Vec<(MovementState, MovementState)> = world
            .run(&mut agents, 15.0)
            .into_iter()
            .filter_map(|(_, e)| match e {
                AgentEvent::StateChanged { from, to } => Some((from, to)),
                _ => None,
            })
            .collect();
        assert_eq!(
            transitions,
            vec![
                (Idle, Moving),
                (Moving, Arrived),
                (Arrived, Loading),
                (Loading, Moving),
                (Moving, Arrived),
                (Arrived, Loading),
                (Loading, Idle),
            ]
        );
    }

    #[test]
    fn busy_while_working() {
        let mut world = World::new(one_task(Point::new(4.0, 0.0), Point::new(8.0, 0.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        world.run(&mut agents, 0.5);
        assert_eq!(agents[0].state(), MovementState::Moving);
        assert!(agents[0].is_busy());
        assert!(!agents[0].is_available());
        assert!(!agents[0].is_assignable());
    }

    #[test]
    fn porter_loads_slower_than_cart() {
        let tasks = vec![
            Task::new("c", hm(8, 0), Point::new(0.2, 0.0), Point::new(20.0, 0.0)),
            Task::new("p", hm(8, 0), Point::new(0.2, 10.0), Point::new(20.0, 10.0)),
        ];
        let mut world = World::new(tasks);
        let mut agents = vec![
            cart(0, Point::ZERO),
            Transporter::new(AgentId(1), AgentKind::Porter, Point::new(0.0, 10.0), 60, 7),
        ];
        for a in &agents {
            world.add(a);
        }
        agents[0].enqueue_task(TaskId(0));
        agents[1].enqueue_task(TaskId(1));

        // Both start inside their stopping distance, so they load at once:
        // the cart for 2 s, the porter for 3 s.
        let events = world.run(&mut agents, 2.5);
        assert!(events_of(&events, 0).contains(&AgentEvent::PickedUp(TaskId(0))));
        assert!(!events_of(&events, 1).contains(&AgentEvent::PickedUp(TaskId(1))));
        assert_eq!(agents[1].state(), MovementState::Loading);
    }

    #[test]
    fn tasks_run_in_queue_order() {
        let tasks = vec![
            Task::new("first", hm(8, 0), Point::new(2.0, 0.0), Point::new(4.0, 0.0)).with_loading_time(0.0),
            Task::new("second", hm(8, 0), Point::new(4.0, 2.0), Point::new(4.0, 4.0)).with_loading_time(0.0),
        ];
        let mut world = World::new(tasks);
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));
        agents[0].enqueue_task(TaskId(1));

        let completed: Vec<AgentEvent> = world
            .run(&mut agents, 20.0)
            .into_iter()
            .map(|(_, e)| e)
            .filter(|e| matches!(e, AgentEvent::TaskCompleted(_)))
            .collect();
        assert_eq!(completed, vec![AgentEvent::TaskCompleted(TaskId(0)), AgentEvent::TaskCompleted(TaskId(1))]);
    }
}

// ── Emergency stop ────────────────────────────────────────────────────────────

#[cfg(test)]
mod emergency_stop {
    use super::*;

    #[test]
    fn drops_queue_and_returns_to_idle() {
        let tasks = vec![
            Task::new("a", hm(8, 0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)),
            Task::new("b", hm(8, 0), Point::new(10.0, 5.0), Point::new(20.0, 5.0)),
        ];
        let mut world = World::new(tasks);
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));
        agents[0].enqueue_task(TaskId(1));
        world.run(&mut agents, 1.0);
        assert_eq!(agents[0].state(), MovementState::Moving);

        let dropped = agents[0].emergency_stop();
        assert_eq!(dropped, vec![TaskId(0), TaskId(1)]);
        assert_eq!(agents[0].state(), MovementState::Idle);
        assert!(agents[0].is_assignable());
        assert_eq!(agents[0].current_task(), None);
        assert_eq!(agents[0].goal(), None);

        // Stays put afterwards.
        let here = agents[0].position();
        world.run(&mut agents, 1.0);
        assert_eq!(agents[0].position(), here);
    }

    #[test]
    fn stop_while_charging_ends_that_downtime_only() {
        let mut world = World::new(Vec::new());
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_downtime(Downtime::new(DowntimeId(0), DowntimeKind::Charging, hm(8, 0), 5.0));
        agents[0].enqueue_downtime(Downtime::new(DowntimeId(1), DowntimeKind::Charging, hm(9, 0), 5.0));
        world.run(&mut agents, 1.0);
        assert_eq!(agents[0].state(), MovementState::Charging);

        agents[0].emergency_stop();
        assert_eq!(agents[0].state(), MovementState::Idle);
        assert_eq!(agents[0].status().downtime_depth, 1);

        // The interrupted window does not start again.
        let events = world.run(&mut agents, 1.0);
        assert!(!events_of(&events, 0).contains(&AgentEvent::DowntimeStarted(DowntimeId(0))));
        assert_eq!(agents[0].state(), MovementState::Idle);
        assert_eq!(agents[0].status().downtime_depth, 1);
    }
}

// ── Downtime ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod downtime {
    use super::*;

    #[test]
    fn charging_runs_for_its_duration() {
        let mut world = World::new(Vec::new());
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_downtime(Downtime::new(DowntimeId(3), DowntimeKind::Charging, hm(8, 0), 3.0));

        let events = world.run(&mut agents, 0.1);
        assert!(events_of(&events, 0).contains(&AgentEvent::DowntimeStarted(DowntimeId(3))));
        assert_eq!(agents[0].state(), MovementState::Charging);
        assert!(!agents[0].is_assignable());

        let events = world.run(&mut agents, 3.0);
        assert!(events_of(&events, 0).contains(&AgentEvent::DowntimeCompleted(DowntimeId(3))));
        assert_eq!(agents[0].state(), MovementState::Idle);
        assert!(agents[0].is_assignable());
        assert_eq!(agents[0].status().downtime_depth, 0);
    }

    #[test]
    fn not_before_due() {
        let mut world = World::new(Vec::new());
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_downtime(Downtime::new(DowntimeId(0), DowntimeKind::Break, hm(9, 0), 3.0));

        world.run(&mut agents, 1.0);
        assert_eq!(agents[0].state(), MovementState::Idle);

        world.time = hm(9, 0);
        world.run(&mut agents, 0.1);
        assert_eq!(agents[0].state(), MovementState::Charging);
    }

    #[test]
    fn due_downtime_goes_before_queued_task() {
        let mut world = World::new(one_task(Point::new(4.0, 0.0), Point::new(8.0, 0.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));
        agents[0].enqueue_downtime(Downtime::new(DowntimeId(0), DowntimeKind::Charging, hm(8, 0), 1.0));

        let events = world.run(&mut agents, 2.0);
        let order: Vec<AgentEvent> = events
            .into_iter()
            .map(|(_, e)| e)
            .filter(|e| matches!(e, AgentEvent::DowntimeStarted(_) | AgentEvent::TaskStarted(_)))
            .collect();
        assert_eq!(order, vec![AgentEvent::DowntimeStarted(DowntimeId(0)), AgentEvent::TaskStarted(TaskId(0))]);
    }
}

// ── Reachability ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod reachability {
    use super::*;

    fn bounded_world(tasks: Vec<Task>) -> World {
        let mut world = World::new(tasks);
        world.floor = OpenFloor::new(Point::new(-10.0, -10.0), Point::new(10.0, 10.0));
        world
    }

    #[test]
    fn unreachable_origin_leaves_agent_unassignable() {
        let mut world = bounded_world(one_task(Point::new(100.0, 100.0), Point::new(0.0, 5.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        let events = world.run(&mut agents, 0.1);
        assert!(events_of(&events, 0).contains(&AgentEvent::Unreachable { goal: Point::new(100.0, 100.0) }));
        assert_eq!(agents[0].state(), MovementState::Idle);
        assert!(agents[0].is_busy());
        assert!(!agents[0].is_assignable());

        // Retries after the back-off, and keeps failing.
        let events = world.run(&mut agents, 1.5);
        assert!(events_of(&events, 0).iter().any(|e| matches!(e, AgentEvent::Unreachable { .. })));

        agents[0].emergency_stop();
        assert!(agents[0].is_assignable());
    }

    #[test]
    fn unreachable_origin_uses_alternative() {
        let mut world = bounded_world(one_task(Point::new(11.0, 0.0), Point::new(0.0, 5.0)));
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        world.run(&mut agents, 0.1);
        assert_eq!(agents[0].state(), MovementState::Moving);
        assert_eq!(agents[0].goal(), Some(Point::new(8.0, 0.0)));
    }
}

// ── Rerouting ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod rerouting {
    use super::*;

    #[test]
    fn blocked_destination_takes_alternative() {
        let mut world = World::new(one_task(Point::new(10.0, 0.0), Point::new(20.0, 0.0)));
        world.router.mark_area_blocked(Point::new(10.0, 0.0), Some(1000.0), 0.0);
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        let events = world.run(&mut agents, 3.0);
        let reroutes: Vec<AgentEvent> = events
            .into_iter()
            .map(|(_, e)| e)
            .filter(|e| matches!(e, AgentEvent::Rerouted { .. }))
            .collect();
        assert_eq!(reroutes.len(), 1);
        assert_eq!(agents[0].goal(), Some(Point::new(13.0, 0.0)));
        assert_eq!(agents[0].reroute_attempts(), 1);
        assert_eq!(world.router.stats().reroutes, 1);
    }

    #[test]
    fn exhausted_budget_reports_stall_once() {
        let config = RouterConfig { max_reroute_attempts: 0, ..RouterConfig::default() };
        let mut world = World::with_router(
            one_task(Point::new(10.0, 0.0), Point::new(20.0, 0.0)),
            Router::new(config),
        );
        world.router.mark_area_blocked(Point::new(10.0, 0.0), Some(1000.0), 0.0);
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        // Two reroute checks happen before arrival.
        let events = world.run(&mut agents, 4.5);
        let stalls = events.iter().filter(|(_, e)| matches!(e, AgentEvent::Stalled { .. })).count();
        assert_eq!(stalls, 1);
        assert!(!events.iter().any(|(_, e)| matches!(e, AgentEvent::Rerouted { .. })));
        // Kept the stale path.
        assert_eq!(agents[0].goal(), Some(Point::new(10.0, 0.0)));
        assert_eq!(agents[0].state(), MovementState::Moving);
    }

    fn crowded_run(max_reroute_attempts: u32) -> (World, Vec<AgentEvent>) {
        let config = RouterConfig { max_reroute_attempts, ..RouterConfig::default() };
        let mut world = World::with_router(
            one_task(Point::new(20.0, 0.0), Point::new(30.0, 0.0)),
            Router::new(config),
        );
        // Two bystanders crowd the straight line without blocking it.
        for (id, y) in [(1, 1.5), (2, 1.8)] {
            world.router.register(Presence {
                id:         AgentId(id),
                position:   Point::new(10.0, y),
                heading:    Point::new(0.0, 1.0),
                moving:     true,
                backing_up: false,
                priority:   10 + id,
            });
        }
        let mut agents = vec![cart(0, Point::ZERO)];
        world.add(&agents[0]);
        agents[0].enqueue_task(TaskId(0));

        let events = world.run(&mut agents, 9.0);
        (world, events.into_iter().map(|(_, e)| e).collect())
    }

    #[test]
    fn congestion_counted_only_for_applied_detours() {
        let (world, events) = crowded_run(0);
        let stats = world.router.stats();
        assert_eq!(stats.reroutes, 0);
        assert_eq!(stats.congestion_detections, 0);
        assert!(!events.iter().any(|e| matches!(e, AgentEvent::Rerouted { .. })));
    }

    #[test]
    fn congestion_counter_tracks_reroutes_within_budget() {
        let (world, events) = crowded_run(1);
        let stats = world.router.stats();
        let rerouted = events.iter().filter(|e| matches!(e, AgentEvent::Rerouted { .. })).count() as u64;
        assert!(rerouted <= 1);
        assert_eq!(stats.reroutes, rerouted);
        assert!(stats.congestion_detections <= stats.reroutes);
    }
}

// ── Avoidance ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod avoidance {
    use super::*;

    #[test]
    fn only_lower_ranked_agent_backs_up() {
        let tasks = vec![
            Task::new("east", hm(8, 0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)),
            Task::new("west", hm(8, 0), Point::new(-7.0, 0.0), Point::new(-20.0, 0.0)),
        ];
        let mut world = World::new(tasks);
        let mut agents = vec![
            Transporter::new(AgentId(0), AgentKind::Cart, Point::ZERO, 5, 1),
            Transporter::new(AgentId(1), AgentKind::Cart, Point::new(3.0, 0.0), 12, 1),
        ];
        for a in &agents {
            world.add(a);
        }
        agents[0].enqueue_task(TaskId(0));
        agents[1].enqueue_task(TaskId(1));

        let events = world.run(&mut agents, 1.0);
        let backing = |id| {
            events_of(&events, id)
                .into_iter()
                .filter(|e| matches!(e, AgentEvent::BackingUp { .. }))
                .collect::<Vec<_>>()
        };
        assert!(backing(0).is_empty());
        assert_eq!(backing(1), vec![AgentEvent::BackingUp { yielding_to: Some(AgentId(0)) }]);
    }

    #[test]
    fn backing_up_is_bounded() {
        let tasks = vec![
            Task::new("east", hm(8, 0), Point::new(10.0, 0.0), Point::new(20.0, 0.0)),
            Task::new("west", hm(8, 0), Point::new(-7.0, 0.0), Point::new(-20.0, 0.0)),
        ];
        let mut world = World::new(tasks);
        let mut agents = vec![
            Transporter::new(AgentId(0), AgentKind::Cart, Point::ZERO, 5, 1),
            Transporter::new(AgentId(1), AgentKind::Cart, Point::new(3.0, 0.0), 12, 1),
        ];
        for a in &agents {
            world.add(a);
        }
        agents[0].enqueue_task(TaskId(0));
        agents[1].enqueue_task(TaskId(1));

        let mut longest = 0.0_f64;
        let mut streak = 0.0;
        for _ in 0..200 {
            world.step(&mut agents, DT);
            if agents[1].is_backing_up() {
                streak += DT;
                longest = longest.max(streak);
            } else {
                streak = 0.0;
            }
        }
        assert!(longest > 0.0);
        assert!(longest <= 2.0 + 2.0 * DT, "backed up for {longest}s");
    }

    #[test]
    fn presence_reflects_state() {
        let a = cart(4, Point::new(1.0, 2.0));
        let p = a.presence();
        assert_eq!(p.id, AgentId(4));
        assert_eq!(p.position, Point::new(1.0, 2.0));
        assert!(!p.moving);
        assert!(!p.backing_up);
        assert_eq!(p.priority, 50);
    }
}
