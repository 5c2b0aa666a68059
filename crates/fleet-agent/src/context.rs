//! The world an agent sees during its update.

use fleet_core::TimeOfDay;
use fleet_nav::{Navigator, WaypointSet};
use fleet_routing::Router;
use fleet_tasks::TaskCatalog;

/// Borrowed simulation state handed to [`Transporter::update`](crate::Transporter::update).
///
/// Built once per agent per frame by the simulation.  The router is the only
/// mutable part; agents are updated one at a time, so each sees every
/// presence and block change made before it.
pub struct AgentContext<'a> {
    /// Wall-clock seconds since the run started.
    pub now_secs: f64,

    /// Simulated time of day.
    pub time_of_day: TimeOfDay,

    pub catalog:   &'a TaskCatalog,
    pub router:    &'a mut Router,
    pub navigator: &'a dyn Navigator,
    pub waypoints: &'a WaypointSet,
}

impl<'a> AgentContext<'a> {
    #[inline]
    pub fn new(
        now_secs:    f64,
        time_of_day: TimeOfDay,
        catalog:     &'a TaskCatalog,
        router:      &'a mut Router,
        navigator:   &'a dyn Navigator,
        waypoints:   &'a WaypointSet,
    ) -> Self {
        Self { now_secs, time_of_day, catalog, router, navigator, waypoints }
    }
}
