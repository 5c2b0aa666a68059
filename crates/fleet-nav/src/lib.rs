//! `fleet-nav`: the physical-floor oracle agents and the router consult.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`navigator`]   | `Navigator` trait, `NavPath`, `OpenFloor`             |
//! | [`grid`]        | `GridNavigator` (A* over an occupancy grid), builder  |
//! | [`waypoints`]   | `Waypoint`, `WaypointSet` (R-tree + name lookup)      |
//! | [`error`]       | `NavError`, `NavResult<T>`                            |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `Waypoint`.             |

pub mod error;
pub mod grid;
pub mod navigator;
pub mod waypoints;


pub use error::{NavError, NavResult};
pub use grid::{GridNavigator, GridNavigatorBuilder};
pub use navigator::{NavPath, Navigator, OpenFloor};
pub use waypoints::{Waypoint, WaypointSet};
