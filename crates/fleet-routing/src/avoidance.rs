//! Avoidance priorities and the head-on test.
//!
//! Every agent gets a distinct priority at creation.  When two agents meet
//! head-on, the one with the numerically larger priority yields and the other
//! keeps going, so two agents can never both back off or both push on.

use fleet_core::{AgentId, Point};

// ── AvoidancePriorities ───────────────────────────────────────────────────────

/// Hands out avoidance priorities from a monotonically increasing counter,
/// wrapped into `[floor, floor + span)`.  Lower values win.
#[derive(Debug, Clone)]
pub struct AvoidancePriorities {
    floor:   u32,
    span:    u32,
    counter: u32,
}

impl AvoidancePriorities {
    pub fn new(floor: u32, span: u32) -> Self {
        Self { floor, span: span.max(1), counter: 0 }
    }

    pub fn next(&mut self) -> u32 {
        let p = self.floor + self.counter % self.span;
        self.counter = self.counter.wrapping_add(1);
        p
    }
}

/// Priorities 1..=99.
impl Default for AvoidancePriorities {
    fn default() -> Self {
        Self::new(1, 99)
    }
}

// ── Presence ──────────────────────────────────────────────────────────────────

/// What the router knows about one agent.  Pushed by the agent every frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Presence {
    pub id:         AgentId,
    pub position:   Point,
    /// Unit heading, or zero when stationary.
    pub heading:    Point,
    pub moving:     bool,
    pub backing_up: bool,
    pub priority:   u32,
}

impl Presence {
    pub fn stationary(id: AgentId, position: Point, priority: u32) -> Self {
        Self {
            id,
            position,
            heading:    Point::ZERO,
            moving:     false,
            backing_up: false,
            priority,
        }
    }

    /// `true` if `self` should give way to `other`.  Equal priorities fall
    /// back to the larger id yielding.
    pub fn yields_to(&self, other: &Presence) -> bool {
        (self.priority, self.id) > (other.priority, other.id)
    }
}

// ── Conflict ──────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Conflict {
    pub other:     AgentId,
    pub distance:  f32,
    /// `true` for exactly one side of every conflict.
    pub must_yield: bool,
}

/// Head-on test: headings opposed, and each agent facing the other.
pub fn is_head_on(a: &Presence, b: &Presence, cosine: f32) -> bool {
    if a.heading.is_zero() || b.heading.is_zero() {
        return false;
    }
    let ab = (b.position - a.position).normalized();
    if ab.is_zero() {
        // Same spot: opposed headings alone decide.
        return a.heading.dot(b.heading) <= -cosine;
    }
    a.heading.dot(b.heading) <= -cosine
        && a.heading.dot(ab) >= cosine
        && b.heading.dot(-ab) >= cosine
}
