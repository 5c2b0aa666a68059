//! `EntryQueue`: entered-but-unassigned tasks in service order.
//!
//! Ordered by `(priority, insertion sequence)`: lower priority values come
//! first, and tasks of equal priority keep the order they were pushed in.
//! Since the catalog pushes in entry-time order, equal-priority tasks are
//! served in file order.
//!
//! A side index from `TaskId` to its key makes [`EntryQueue::remove`]
//! O(log n), which the earliest-arrival strategy needs to take a task from
//! the middle of the queue.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use fleet_core::TaskId;

#[derive(Copy, Clone, Debug)]
struct QueueKey {
    priority: f32,
    seq:      u64,
}

impl PartialEq for QueueKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueueKey {}

impl PartialOrd for QueueKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.priority
            .total_cmp(&other.priority)
            .then(self.seq.cmp(&other.seq))
    }
}

#[derive(Default, Debug)]
pub struct EntryQueue {
    entries:  BTreeMap<QueueKey, TaskId>,
    keys:     HashMap<TaskId, QueueKey>,
    next_seq: u64,
}

impl EntryQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue `task` at `priority`.  Pushing a task that is already queued
    /// moves it to the back of its new priority class.
    pub fn push(&mut self, task: TaskId, priority: f32) {
        self.remove(task);
        let key = QueueKey { priority, seq: self.next_seq };
        self.next_seq += 1;
        self.entries.insert(key, task);
        self.keys.insert(task, key);
    }

    /// Remove and return the task that should be served next.
    pub fn pop_head(&mut self) -> Option<TaskId> {
        let (_, task) = self.entries.pop_first()?;
        self.keys.remove(&task);
        Some(task)
    }

    pub fn peek_head(&self) -> Option<TaskId> {
        self.entries.first_key_value().map(|(_, &t)| t)
    }

    /// Remove `task` wherever it sits.  Returns `false` if it was not queued.
    pub fn remove(&mut self, task: TaskId) -> bool {
        match self.keys.remove(&task) {
            Some(key) => {
                self.entries.remove(&key);
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, task: TaskId) -> bool {
        self.keys.contains_key(&task)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued tasks in service order.
    pub fn iter(&self) -> impl Iterator<Item = TaskId> + '_ {
        self.entries.values().copied()
    }
}
