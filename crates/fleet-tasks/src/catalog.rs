//! `TaskCatalog`: the run's task arena and entry-time release schedule.
//!
//! # Ownership
//!
//! The catalog owns every `Task` for the run in a `Vec` indexed by
//! `TaskId`.  Agent queues, the entry queue, and the audit lists only ever
//! hold ids, so completing a task flips the one flag every observer reads.
//!
//! # Release
//!
//! Tasks wait in `pending`, sorted ascending by `entry_time` (stable, so
//! equal entry times keep file order).  [`TaskCatalog::release_due`] pops
//! every head whose entry time has been reached and pushes it into the
//! [`EntryQueue`].  A task is therefore never queued before its entry time.

use std::collections::VecDeque;

use tracing::{debug, trace};

use fleet_core::{TaskId, TimeOfDay};

use crate::{EntryQueue, Task};

/// Run-level task accounting.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CatalogSummary {
    pub total:     usize,
    pub entered:   usize,
    pub assigned:  usize,
    pub completed: usize,
    pub abandoned: usize,
    /// Entered tasks still waiting in the entry queue.
    pub waiting:   usize,
}

pub struct TaskCatalog {
    tasks:     Vec<Task>,
    pending:   VecDeque<TaskId>,
    queue:     EntryQueue,
    /// Every task handed to an agent, in assignment order.
    assigned:  Vec<TaskId>,
    abandoned: Vec<TaskId>,
    completed: usize,
    exhausted_logged: bool,
}

impl TaskCatalog {
    /// Build the catalog.  `tasks` keep their index as `TaskId`; the release
    /// schedule is sorted by entry time.
    pub fn new(tasks: Vec<Task>) -> Self {
        let mut pending: Vec<TaskId> = (0..tasks.len() as u32).map(TaskId).collect();
        pending.sort_by_key(|id| tasks[id.index()].entry_time);
        Self {
            tasks,
            pending:          pending.into(),
            queue:            EntryQueue::new(),
            assigned:         Vec::new(),
            abandoned:        Vec::new(),
            completed:        0,
            exhausted_logged: false,
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    #[inline]
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (TaskId, &Task)> + '_ {
        self.tasks.iter().enumerate().map(|(i, t)| (TaskId(i as u32), t))
    }

    /// All tasks in file order.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn queue(&self) -> &EntryQueue {
        &self.queue
    }

    /// Tasks handed to agents, in assignment order.
    pub fn assigned_audit(&self) -> &[TaskId] {
        &self.assigned
    }

    pub fn abandoned(&self) -> &[TaskId] {
        &self.abandoned
    }

    /// Tasks not yet released into the entry queue.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Entry time of the next task still waiting to be released.
    pub fn next_entry_time(&self) -> Option<TimeOfDay> {
        self.pending.front().map(|id| self.tasks[id.index()].entry_time)
    }

    // ── Release ───────────────────────────────────────────────────────────

    /// Release every pending task whose `entry_time ≤ now` into the entry
    /// queue, marking it entered.  Returns the released ids in release order.
    pub fn release_due(&mut self, now: TimeOfDay) -> Vec<TaskId> {
        if self.pending.is_empty() {
            if !self.exhausted_logged {
                debug!(%now, "task catalog exhausted; no further releases");
                self.exhausted_logged = true;
            }
            return Vec::new();
        }

        let mut released = Vec::new();
        while let Some(&id) = self.pending.front() {
            let task = &mut self.tasks[id.index()];
            if task.entry_time > now {
                break;
            }
            self.pending.pop_front();
            task.lifecycle.mark_entered();
            self.queue.push(id, task.priority);
            trace!(task = %task.id, entry = %task.entry_time, priority = task.priority, "task entered");
            released.push(id);
        }
        released
    }

    // ── Assignment ────────────────────────────────────────────────────────

    /// Pop the queue head for assignment, skipping any already-completed
    /// heads.  The returned task is marked assigned and audited.
    pub fn take_head_for_assignment(&mut self) -> Option<TaskId> {
        while let Some(id) = self.queue.pop_head() {
            if self.tasks[id.index()].is_completed() {
                debug!(task = %id, "skipping completed task at queue head");
                continue;
            }
            self.record_assignment(id);
            return Some(id);
        }
        None
    }

    /// Take a specific queued task for assignment.  Returns `false` if it
    /// was not in the entry queue or is already completed.
    pub fn take_for_assignment(&mut self, id: TaskId) -> bool {
        if !self.queue.remove(id) {
            return false;
        }
        if self.tasks[id.index()].is_completed() {
            return false;
        }
        self.record_assignment(id);
        true
    }

    fn record_assignment(&mut self, id: TaskId) {
        self.tasks[id.index()].lifecycle.mark_assigned();
        self.assigned.push(id);
    }

    // ── Completion ────────────────────────────────────────────────────────

    /// Mark `id` completed.  Returns `true` only for the call that set the
    /// flag; unknown ids and repeat calls return `false`.
    pub fn mark_completed(&mut self, id: TaskId) -> bool {
        let Some(task) = self.tasks.get_mut(id.index()) else {
            return false;
        };
        let set = task.lifecycle.mark_completed();
        if set {
            self.completed += 1;
        }
        set
    }

    /// Record a task dropped from an agent's queue by an emergency stop.
    /// Its lifecycle flags are left as they are.
    pub fn mark_abandoned(&mut self, id: TaskId) {
        match self.tasks.get(id.index()) {
            Some(task) if !task.is_completed() => {
                if !self.abandoned.contains(&id) {
                    self.abandoned.push(id);
                }
            }
            _ => {}
        }
    }

    pub fn summary(&self) -> CatalogSummary {
        CatalogSummary {
            total:     self.tasks.len(),
            entered:   self.tasks.iter().filter(|t| t.lifecycle.is_entered()).count(),
            assigned:  self.assigned.len(),
            completed: self.completed,
            abandoned: self.abandoned.len(),
            waiting:   self.queue.len(),
        }
    }
}
