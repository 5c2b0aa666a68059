//! `fleet-core`: foundational types for the `fleet_twin` transport simulator.
//!
//! This crate is a dependency of every other `fleet-*` crate.  It has no
//! `fleet-*` dependencies and minimal external ones (`rand`, `thiserror`,
//! `tracing`, plus optional `serde`).
//!
//! # What lives here
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`ids`]         | `AgentId`, `TaskId`, `DowntimeId`, `WaypointId`, `SlotHandle` |
//! | [`geo`]         | `Point` (facility-plane coordinates), vector helpers  |
//! | [`time`]        | `TimeOfDay`, `SimClock`                               |
//! | [`config`]      | `SimConfig`                                           |
//! | [`rng`]         | `AgentRng`, seeded per agent from the run seed        |
//! | [`error`]       | `FleetError`, `FleetResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimConfig;
pub use error::{FleetError, FleetResult};
pub use geo::Point;
pub use ids::{AgentId, DowntimeId, SlotHandle, TaskId, WaypointId};
pub use rng::AgentRng;
pub use time::{SimClock, TimeOfDay};
