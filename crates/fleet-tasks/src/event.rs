//! Work items an agent can hold: transport `Task`s and `Downtime` windows.
//!
//! # Lifecycle
//!
//! Both carry a [`Lifecycle`] with three monotonic flags:
//!
//! ```text
//! entered  ─►  assigned  ─►  completed
//! ```
//!
//! Each flag only ever goes `false → true`.  The `mark_*` methods return
//! whether the call actually flipped the flag, so callers can detect a
//! duplicate completion without a separate lookup.

use fleet_core::{DowntimeId, Point, TimeOfDay};

/// Loading time (seconds) applied when the task file leaves the field blank.
pub const DEFAULT_LOADING_TIME: f32 = 2.0;

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Lifecycle {
    entered:   bool,
    assigned:  bool,
    completed: bool,
}

impl Lifecycle {
    #[inline]
    pub fn is_entered(self) -> bool {
        self.entered
    }

    #[inline]
    pub fn is_assigned(self) -> bool {
        self.assigned
    }

    #[inline]
    pub fn is_completed(self) -> bool {
        self.completed
    }

    pub fn mark_entered(&mut self) -> bool {
        !std::mem::replace(&mut self.entered, true)
    }

    pub fn mark_assigned(&mut self) -> bool {
        !std::mem::replace(&mut self.assigned, true)
    }

    pub fn mark_completed(&mut self) -> bool {
        !std::mem::replace(&mut self.completed, true)
    }
}

// ── Task ──────────────────────────────────────────────────────────────────────

/// One transport job: carry something from `origin` to `destination`.
///
/// A `Task` lives in exactly one place, the [`TaskCatalog`](crate::TaskCatalog)
/// arena.  Everything else refers to it by `TaskId`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Task {
    /// Facility map the task was authored for.
    pub map: String,

    /// Time of day at which the task becomes visible to dispatch.
    pub entry_time: TimeOfDay,

    pub origin:      Point,
    pub destination: Point,

    /// Free-form identifier from the task file.
    pub id: String,

    pub description: String,

    /// Lower values are served first.
    pub priority: f32,

    /// Planner's estimate in simulated minutes.  Informational.
    pub estimated_duration: f32,

    /// `true` iff `loading_time > 0`.
    pub requires_loading: bool,

    /// Load/unload time in seconds, before the agent kind's adjustment.
    pub loading_time: f32,

    pub request_time: TimeOfDay,
    pub deadline:     Option<TimeOfDay>,

    pub(crate) lifecycle: Lifecycle,
}

impl Task {
    /// A task with default priority, duration, and loading time.
    pub fn new(id: impl Into<String>, entry_time: TimeOfDay, origin: Point, destination: Point) -> Self {
        Self {
            map:                String::new(),
            entry_time,
            origin,
            destination,
            id:                 id.into(),
            description:        String::new(),
            priority:           0.0,
            estimated_duration: 0.0,
            requires_loading:   true,
            loading_time:       DEFAULT_LOADING_TIME,
            request_time:       entry_time,
            deadline:           None,
            lifecycle:          Lifecycle::default(),
        }
    }

    pub fn with_map(mut self, map: impl Into<String>) -> Self {
        self.map = map.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_priority(mut self, priority: f32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_estimated_duration(mut self, minutes: f32) -> Self {
        self.estimated_duration = minutes;
        self
    }

    /// Sets `loading_time` and derives `requires_loading` from it.
    pub fn with_loading_time(mut self, secs: f32) -> Self {
        self.loading_time = secs.max(0.0);
        self.requires_loading = self.loading_time > 0.0;
        self
    }

    pub fn with_deadline(mut self, deadline: TimeOfDay) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[inline]
    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    #[inline]
    pub fn is_completed(&self) -> bool {
        self.lifecycle.completed
    }

    /// Straight-line length of the loaded leg.
    pub fn leg_length(&self) -> f32 {
        self.origin.distance(self.destination)
    }
}

// ── Downtime ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DowntimeKind {
    /// Staff break (porters).
    Break,
    /// Battery charging (carts).
    Charging,
}

impl DowntimeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            DowntimeKind::Break => "break",
            DowntimeKind::Charging => "charging",
        }
    }
}

/// A mandatory window during which an agent takes no work.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Downtime {
    pub id:            DowntimeId,
    pub kind:          DowntimeKind,
    /// Earliest time of day the window may start.
    pub due:           TimeOfDay,
    /// Length of the window in wall-clock seconds.
    pub duration_secs: f64,
    pub lifecycle:     Lifecycle,
}

impl Downtime {
    pub fn new(id: DowntimeId, kind: DowntimeKind, due: TimeOfDay, duration_secs: f64) -> Self {
        Self { id, kind, due, duration_secs, lifecycle: Lifecycle::default() }
    }

    /// `true` once the time of day has reached `due`.
    #[inline]
    pub fn is_due(&self, now: TimeOfDay) -> bool {
        now >= self.due
    }
}
