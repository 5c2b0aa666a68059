//! `fleet-agent`: carts and porters.
//!
//! A [`Transporter`] owns its task and downtime queues and advances one
//! frame at a time through [`Transporter::update`], borrowing the rest of
//! the world through an [`AgentContext`].  Everything it wants the
//! simulation to know comes back as [`AgentEvent`]s.
//!
//! # Crate layout
//!
//! | Module          | Contents                                              |
//! |-----------------|-------------------------------------------------------|
//! | [`state`]       | `MovementState`                                       |
//! | [`kind`]        | `AgentKind`, `AgentProfile` (speed, handling times)   |
//! | [`context`]     | `AgentContext` (per-frame borrowed world)             |
//! | [`events`]      | `AgentEvent`                                          |
//! | [`transporter`] | `Transporter`, `AgentStatus`                          |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on profiles and status.  |

pub mod context;
pub mod events;
pub mod kind;
pub mod state;
pub mod transporter;

#[cfg(test)]
mod tests;

pub use context::AgentContext;
pub use events::AgentEvent;
pub use kind::{AgentKind, AgentProfile};
pub use state::MovementState;
pub use transporter::{AgentStatus, Transporter};
