//! `fleet-sim`: the simulation loop for fleet_twin.
//!
//! # Frame loop
//!
//! ```text
//! step(dt):
//!   ① Clock     — accumulate dt; for every tick crossed:
//!                   catalog.release_due(now)      pending ──► entry queue
//!                   reconcile(registry, agents)   registry := assignable agents
//!                   dispatcher.dispatch(..)       entry queue ──► agent queues
//!   ② Agents    — Transporter::update in ascending AgentId order, sharing
//!                 the router through AgentContext.
//!   ③ Events    — TaskCompleted ⇒ catalog.mark_completed; all events go to
//!                 the observer.
//!   ④ Maintain  — router sweeps expired blocked areas.
//! ```
//!
//! The first frame also releases and dispatches tasks due at the start time
//! (reported as tick 0).
//!
//! # Cargo features
//!
//! | Feature   | Effect                                                 |
//! |-----------|--------------------------------------------------------|
//! | `serde`   | Derives on `RunReport` / `TickSummary`, propagated.    |
//! | `fx-hash` | FxHashMap for the router's blocked-area table.         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use fleet_agent::AgentKind;
//! use fleet_core::{Point, SimConfig};
//! use fleet_sim::{AgentSpec, NoopObserver, SimBuilder};
//!
//! let mut sim = SimBuilder::new(SimConfig::default(), catalog)
//!     .agent(AgentSpec::new(AgentKind::Cart, Point::new(0.0, 0.0)))
//!     .build()?;
//! let report = sim.run(&mut NoopObserver);
//! println!("{report}");
//! ```

pub mod builder;
pub mod error;
pub mod observer;
pub mod report;
pub mod sim;

#[cfg(test)]
mod tests;

pub use builder::{AgentSpec, SimBuilder};
pub use error::{SimError, SimResult};
pub use observer::{NoopObserver, SimObserver};
pub use report::{RunReport, TickSummary};
pub use sim::Sim;

pub use fleet_agent::AgentStatus;
