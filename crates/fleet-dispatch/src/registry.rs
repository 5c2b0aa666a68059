//! `FleetRegistry`: the ordered set of agents that can take a task.
//!
//! # Layout
//!
//! A doubly-linked list threaded through a generational slot arena.  Each
//! live slot holds one `AgentId` and its neighbours' slot indices; freed
//! slots go on a free list and have their generation bumped, so a
//! [`SlotHandle`] kept past its removal no longer matches and is rejected.
//!
//! | Operation        | Cost  |
//! |------------------|-------|
//! | `insert` (tail)  | O(1)  |
//! | `remove(handle)` | O(1)  |
//! | `iter`           | O(n), insertion order |
//!
//! The registry does not watch agents.  [`reconcile`] brings its
//! membership back in line with `Transporter::is_assignable` and is run
//! before every assignment pass.

use tracing::trace;

use fleet_agent::Transporter;
use fleet_core::{AgentId, SlotHandle};

#[derive(Debug)]
struct Slot {
    agent:      Option<AgentId>,
    generation: u32,
    prev:       Option<u32>,
    next:       Option<u32>,
}

#[derive(Debug, Default)]
pub struct FleetRegistry {
    slots: Vec<Slot>,
    free:  Vec<u32>,
    head:  Option<u32>,
    tail:  Option<u32>,
    len:   usize,
}

impl FleetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `agent` at the tail.
    pub fn insert(&mut self, agent: AgentId) -> SlotHandle {
        let index = match self.free.pop() {
            Some(i) => i,
            None => {
                self.slots.push(Slot { agent: None, generation: 0, prev: None, next: None });
                (self.slots.len() - 1) as u32
            }
        };

        let slot = &mut self.slots[index as usize];
        slot.agent = Some(agent);
        slot.prev = self.tail;
        slot.next = None;
        let handle = SlotHandle { index, generation: slot.generation };

        match self.tail {
            Some(t) => self.slots[t as usize].next = Some(index),
            None => self.head = Some(index),
        }
        self.tail = Some(index);
        self.len += 1;
        handle
    }

    /// Unlink the slot behind `handle`.  Returns the agent it held, or
    /// `None` for a stale or unknown handle.
    pub fn remove(&mut self, handle: SlotHandle) -> Option<AgentId> {
        if !self.contains(handle) {
            trace!(%handle, "ignoring stale registry handle");
            return None;
        }
        let i = handle.index as usize;
        let (prev, next) = (self.slots[i].prev, self.slots[i].next);

        match prev {
            Some(p) => self.slots[p as usize].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.slots[n as usize].prev = prev,
            None => self.tail = prev,
        }

        let slot = &mut self.slots[i];
        let agent = slot.agent.take();
        slot.prev = None;
        slot.next = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(handle.index);
        self.len -= 1;
        agent
    }

    /// `true` if `handle` refers to a live slot of the current generation.
    pub fn contains(&self, handle: SlotHandle) -> bool {
        self.slots
            .get(handle.index as usize)
            .is_some_and(|s| s.generation == handle.generation && s.agent.is_some())
    }

    pub fn get(&self, handle: SlotHandle) -> Option<AgentId> {
        if self.contains(handle) {
            self.slots[handle.index as usize].agent
        } else {
            None
        }
    }

    /// Registered agents in insertion order.
    pub fn iter(&self) -> Iter<'_> {
        Iter { registry: self, cursor: self.head }
    }
}

pub struct Iter<'a> {
    registry: &'a FleetRegistry,
    cursor:   Option<u32>,
}

impl Iterator for Iter<'_> {
    type Item = AgentId;

    fn next(&mut self) -> Option<AgentId> {
        let slot = &self.registry.slots[self.cursor? as usize];
        self.cursor = slot.next;
        slot.agent
    }
}

// ── Reconcile ─────────────────────────────────────────────────────────────────

/// Membership changes made by one [`reconcile`] pass.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ReconcileStats {
    pub added:   usize,
    pub removed: usize,
}

/// Bring the registry in line with agent assignability: agents that are no
/// longer assignable are unlinked and lose their handle; assignable agents
/// without a live handle are appended.  Agents are visited in slice order.
pub fn reconcile(registry: &mut FleetRegistry, agents: &mut [Transporter]) -> ReconcileStats {
    let mut stats = ReconcileStats::default();
    for agent in agents.iter_mut() {
        let live = agent.registry_slot().filter(|&h| registry.contains(h));
        match (agent.is_assignable(), live) {
            (false, Some(handle)) => {
                registry.remove(handle);
                agent.set_registry_slot(None);
                stats.removed += 1;
            }
            (false, None) => {
                if agent.registry_slot().is_some() {
                    agent.set_registry_slot(None);
                }
            }
            (true, None) => {
                let handle = registry.insert(agent.id());
                agent.set_registry_slot(Some(handle));
                stats.added += 1;
            }
            (true, Some(_)) => {}
        }
    }
    if stats != ReconcileStats::default() {
        trace!(added = stats.added, removed = stats.removed, registered = registry.len(), "registry reconciled");
    }
    stats
}
