//! Floor plan of the demo ward.
//!
//! A 40 m × 20 m floor in 1 m cells, split into three bays by two walls.
//! Each wall has a single doorway, so traffic between bays funnels through
//! them.
//!
//! ```text
//!  y=20 ┌─────────────┬───────────┬─────────────┐
//!       │             │           │             │
//!       │   bay A     │   bay B   │   bay C     │
//!       │           door-a      door-b          │
//!       │             │           │             │
//!  y=0  └─────────────┴───────────┴─────────────┘
//!      x=0          x=14        x=26          x=40
//! ```

use fleet_core::Point;
use fleet_nav::{GridNavigator, GridNavigatorBuilder, NavResult, WaypointSet};

pub const WIDTH:  u32 = 40;
pub const HEIGHT: u32 = 20;

pub const DOOR_A: Point = Point { x: 14.5, y: 9.5 };
pub const DOOR_B: Point = Point { x: 26.5, y: 13.5 };

pub fn build_floor() -> NavResult<GridNavigator> {
    GridNavigatorBuilder::new(Point::ZERO, WIDTH, HEIGHT, 1.0)
        // wall A with a doorway at y 8..11
        .block_rect(Point::new(14.0, 0.0), Point::new(15.0, 8.0))
        .block_rect(Point::new(14.0, 11.0), Point::new(15.0, 20.0))
        // wall B with a doorway at y 12..15
        .block_rect(Point::new(26.0, 0.0), Point::new(27.0, 12.0))
        .block_rect(Point::new(26.0, 15.0), Point::new(27.0, 20.0))
        .build()
}

/// Detour points offered by the router when an agent is stuck.
pub fn waypoints() -> WaypointSet {
    WaypointSet::from_named([
        ("door-a", DOOR_A),
        ("door-b", DOOR_B),
        ("bay-a", Point::new(7.0, 10.0)),
        ("bay-b", Point::new(20.0, 10.0)),
        ("bay-c", Point::new(33.0, 10.0)),
    ])
}
