//! `fleet-routing`: the shared router every agent consults while moving.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                   |
//! |-----------------|------------------------------------------------------------|
//! | [`config`]      | `RouterConfig`                                             |
//! | [`blocked`]     | `GridCell`, `BlockedAreas` (snapped cells with expiry)     |
//! | [`avoidance`]   | `AvoidancePriorities`, `Presence`, `Conflict`, `is_head_on`|
//! | [`router`]      | `Router`, `RerouteDecision`, `RouterStats`                 |
//! | [`error`]       | `RoutingError`, `RoutingResult<T>`                         |
//!
//! # Feature flags
//!
//! | Flag      | Effect                                                   |
//! |-----------|----------------------------------------------------------|
//! | `fx-hash` | `FxHashMap` for the blocked-area table.                  |
//! | `serde`   | Derives `Serialize`/`Deserialize` on config and stats.   |

pub mod avoidance;
pub mod blocked;
pub mod config;
pub mod error;
pub mod router;


pub use avoidance::{AvoidancePriorities, Conflict, Presence, is_head_on};
pub use blocked::{BlockedAreas, GridCell};
pub use config::RouterConfig;
pub use error::{RoutingError, RoutingResult};
pub use router::{RerouteDecision, Router, RouterStats};
