//! Named waypoints with an R-tree for spatial queries.
//!
//! Waypoints are fixed, named spots on the floor (corridor junctions,
//! lift lobbies, ward doors) that the router can route a detour through.

use std::collections::HashMap;

use rstar::{PointDistance, RTree, RTreeObject, AABB};

use fleet_core::{Point, WaypointId};

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct WaypointEntry {
    point: [f32; 2],
    id:    WaypointId,
}

impl RTreeObject for WaypointEntry {
    type Envelope = AABB<[f32; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WaypointEntry {
    fn distance_2(&self, point: &[f32; 2]) -> f32 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── WaypointSet ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Waypoint {
    pub id:       WaypointId,
    pub name:     String,
    pub position: Point,
}

#[derive(Default)]
pub struct WaypointSet {
    waypoints: Vec<Waypoint>,
    by_name:   HashMap<String, WaypointId>,
    index:     RTree<WaypointEntry>,
}

impl WaypointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk-load from `(name, position)` pairs.  A repeated name replaces the
    /// earlier entry's name lookup but both waypoints are kept.
    pub fn from_named<I, S>(items: I) -> Self
    where
        I: IntoIterator<Item = (S, Point)>,
        S: Into<String>,
    {
        let mut waypoints = Vec::new();
        let mut by_name = HashMap::new();
        for (i, (name, position)) in items.into_iter().enumerate() {
            let id = WaypointId(i as u32);
            let name = name.into();
            by_name.insert(name.clone(), id);
            waypoints.push(Waypoint { id, name, position });
        }
        let entries = waypoints
            .iter()
            .map(|w| WaypointEntry { point: [w.position.x, w.position.y], id: w.id })
            .collect();
        Self { waypoints, by_name, index: RTree::bulk_load(entries) }
    }

    pub fn add(&mut self, name: impl Into<String>, position: Point) -> WaypointId {
        let id = WaypointId(self.waypoints.len() as u32);
        let name = name.into();
        self.by_name.insert(name.clone(), id);
        self.index.insert(WaypointEntry { point: [position.x, position.y], id });
        self.waypoints.push(Waypoint { id, name, position });
        id
    }

    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    pub fn get(&self, id: WaypointId) -> Option<&Waypoint> {
        self.waypoints.get(id.index())
    }

    pub fn by_name(&self, name: &str) -> Option<&Waypoint> {
        self.by_name.get(name).and_then(|&id| self.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Waypoint> + '_ {
        self.waypoints.iter()
    }

    /// The waypoint closest to `p`.
    pub fn nearest(&self, p: Point) -> Option<&Waypoint> {
        self.index
            .nearest_neighbor(&[p.x, p.y])
            .and_then(|e| self.get(e.id))
    }

    /// Waypoints within `radius` of `p`, nearest first.
    pub fn within(&self, p: Point, radius: f32) -> Vec<&Waypoint> {
        let mut found: Vec<&Waypoint> = self
            .index
            .locate_within_distance([p.x, p.y], radius * radius)
            .filter_map(|e| self.get(e.id))
            .collect();
        found.sort_by(|a, b| {
            a.position
                .distance(p)
                .total_cmp(&b.position.distance(p))
                .then(a.id.cmp(&b.id))
        });
        found
    }
}
