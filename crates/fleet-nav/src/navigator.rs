//! The `Navigator` trait and the trivial [`OpenFloor`] implementation.
//!
//! # Pluggability
//!
//! Agents and the router only ever ask two questions of the physical
//! environment: "can an agent stand at P?" and "which corners does the
//! corridor path from A to B pass through?".  Anything that answers those
//! (grid A*, a navmesh, a visibility graph) can drive the simulation.

use fleet_core::Point;

use crate::{NavError, NavResult};

// ── NavPath ───────────────────────────────────────────────────────────────────

/// A feasible path: an ordered list of corner points from start to goal,
/// both included.
#[derive(Debug, Clone, PartialEq)]
pub struct NavPath {
    pub corners: Vec<Point>,
}

impl NavPath {
    /// Straight segment from `from` to `to`.
    pub fn direct(from: Point, to: Point) -> Self {
        Self { corners: vec![from, to] }
    }

    /// Sum of segment lengths.
    pub fn length(&self) -> f32 {
        self.corners.windows(2).map(|w| w[0].distance(w[1])).sum()
    }

    /// Corners strictly between start and goal.
    pub fn interior(&self) -> &[Point] {
        match self.corners.len() {
            0..=2 => &[],
            n => &self.corners[1..n - 1],
        }
    }

    pub fn goal(&self) -> Option<Point> {
        self.corners.last().copied()
    }

    /// Append `other`, dropping its first corner when it repeats our last.
    pub fn extend(&mut self, other: NavPath) {
        let mut rest = other.corners.into_iter().peekable();
        if let (Some(last), Some(first)) = (self.corners.last(), rest.peek()) {
            if last.distance(*first) < 1e-4 {
                rest.next();
            }
        }
        self.corners.extend(rest);
    }
}

// ── Navigator trait ───────────────────────────────────────────────────────────

/// Reachability and path queries against the facility floor.
///
/// Implementations must be `Send + Sync` so a single instance can be shared
/// read-only by every agent.
pub trait Navigator: Send + Sync {
    /// `true` if an agent can stand at `point`.
    fn is_reachable(&self, point: Point) -> bool;

    /// Compute a corridor path.  The returned path starts at `from` and ends
    /// at `to` exactly.
    fn find_path(&self, from: Point, to: Point) -> NavResult<NavPath>;
}

// ── OpenFloor ─────────────────────────────────────────────────────────────────

/// An obstacle-free rectangular floor.  Every point inside the bounds is
/// reachable and every path is a straight line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpenFloor {
    min: Point,
    max: Point,
}

impl OpenFloor {
    pub fn new(min: Point, max: Point) -> Self {
        Self {
            min: Point::new(min.x.min(max.x), min.y.min(max.y)),
            max: Point::new(min.x.max(max.x), min.y.max(max.y)),
        }
    }

    /// An effectively unbounded floor.
    pub fn unbounded() -> Self {
        Self::new(Point::new(f32::MIN, f32::MIN), Point::new(f32::MAX, f32::MAX))
    }
}

impl Navigator for OpenFloor {
    fn is_reachable(&self, p: Point) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    fn find_path(&self, from: Point, to: Point) -> NavResult<NavPath> {
        if !self.is_reachable(from) {
            return Err(NavError::Unreachable(from));
        }
        if !self.is_reachable(to) {
            return Err(NavError::Unreachable(to));
        }
        Ok(NavPath::direct(from, to))
    }
}
