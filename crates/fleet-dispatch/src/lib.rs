//! `fleet-dispatch`: who gets which task.
//!
//! # Crate layout
//!
//! | Module         | Contents                                                 |
//! |----------------|----------------------------------------------------------|
//! | [`registry`]   | `FleetRegistry` (generational slot arena list), `reconcile` |
//! | [`strategy`]   | `DispatchStrategy`, `FirstAvailable`, `EarliestArrival`, `StrategyKind`, `Assignment` |
//! | [`dispatcher`] | `Dispatcher`                                             |
//! | [`error`]      | `DispatchError`, `DispatchResult<T>`                     |
//!
//! # Per-tick flow
//!
//! ```text
//! reconcile(registry, agents)        membership := { a | a.is_assignable() }
//! dispatcher.dispatch(catalog, registry, agents)
//!     strategy.assign(..)            entry queue ──► agent task queues
//! ```

pub mod dispatcher;
pub mod error;
pub mod registry;
pub mod strategy;

#[cfg(test)]
mod tests;

pub use dispatcher::Dispatcher;
pub use error::{DispatchError, DispatchResult};
pub use registry::{FleetRegistry, ReconcileStats, reconcile};
pub use strategy::{Assignment, DispatchStrategy, EarliestArrival, FirstAvailable, StrategyKind};
