//! Unit tests for fleet-tasks.

use fleet_core::{Point, TaskId, TimeOfDay};

use crate::{Task, TaskCatalog};

// ── Helpers ───────────────────────────────────────────────────────────────────

fn hm(h: u32, m: u32) -> TimeOfDay {
    TimeOfDay::new(h, m).unwrap()
}

fn task(id: &str, entry: TimeOfDay, priority: f32) -> Task {
    Task::new(id, entry, Point::new(0.0, 0.0), Point::new(10.0, 0.0)).with_priority(priority)
}

const SAMPLE: &str = "\
#fleet-tasks
UFMap2
entryTime,origin,destination,id,description,priority,estimatedDuration,loadingTime
09:00,12;4,30;18.5,T-001,\"Linen, ward 3\",3,15,4

09:05,2;2,8;40,T-002,Specimen run,,,
08:30,0;0,1;1,T-003,Meds,1,5,0
";

// ── Lifecycle ─────────────────────────────────────────────────────────────────

#[cfg(test)]
mod lifecycle {
    use crate::Lifecycle;

    #[test]
    fn flags_only_set_once() {
        let mut l = Lifecycle::default();
        assert!(l.mark_completed());
        assert!(!l.mark_completed());
        assert!(l.is_completed());
    }

    #[test]
    fn loading_time_drives_requires_loading() {
        let t = super::task("a", super::hm(1, 0), 0.0).with_loading_time(0.0);
        assert!(!t.requires_loading);
        let t = t.with_loading_time(3.0);
        assert!(t.requires_loading);
    }
}

// ── EntryQueue ────────────────────────────────────────────────────────────────

#[cfg(test)]
mod entry_queue {
    use super::*;
    use crate::EntryQueue;

    #[test]
    fn lower_priority_value_first() {
        let mut q = EntryQueue::new();
        q.push(TaskId(0), 5.0);
        q.push(TaskId(1), 1.0);
        q.push(TaskId(2), 3.0);
        let order: Vec<_> = q.iter().collect();
        assert_eq!(order, vec![TaskId(1), TaskId(2), TaskId(0)]);
    }

    #[test]
    fn equal_priority_keeps_insertion_order() {
        let mut q = EntryQueue::new();
        for i in 0..5 {
            q.push(TaskId(i), 2.0);
        }
        let order: Vec<_> = std::iter::from_fn(|| q.pop_head()).collect();
        assert_eq!(order, (0..5).map(TaskId).collect::<Vec<_>>());
    }

    #[test]
    fn remove_from_middle() {
        let mut q = EntryQueue::new();
        q.push(TaskId(0), 1.0);
        q.push(TaskId(1), 2.0);
        q.push(TaskId(2), 3.0);
        assert!(q.remove(TaskId(1)));
        assert!(!q.remove(TaskId(1)));
        assert_eq!(q.len(), 2);
        assert!(!q.contains(TaskId(1)));
        assert_eq!(q.peek_head(), Some(TaskId(0)));
    }
}

// ── TaskCatalog ───────────────────────────────────────────────────────────────

#[cfg(test)]
mod catalog {
    use super::*;

    fn three() -> TaskCatalog {
        TaskCatalog::new(vec![
            task("late", hm(10, 0), 0.0),
            task("early", hm(8, 0), 9.0),
            task("mid", hm(9, 0), 3.0),
        ])
    }

    #[test]
    fn nothing_released_before_entry_time() {
        let mut c = three();
        assert!(c.release_due(hm(7, 55)).is_empty());
        assert!(c.queue().is_empty());
        assert_eq!(c.next_entry_time(), Some(hm(8, 0)));
    }

    #[test]
    fn releases_in_entry_time_order() {
        let mut c = three();
        let released = c.release_due(hm(9, 0));
        assert_eq!(released, vec![TaskId(1), TaskId(2)]);
        assert!(c.get(TaskId(1)).unwrap().lifecycle().is_entered());
        assert!(!c.get(TaskId(0)).unwrap().lifecycle().is_entered());
        // Priority 3 ahead of priority 9 in the queue.
        assert_eq!(c.queue().peek_head(), Some(TaskId(2)));
    }

    #[test]
    fn nine_am_task_enters_on_nine_am_tick() {
        let mut c = TaskCatalog::new(vec![task("T", hm(9, 0), 3.0)]);
        let mut now = hm(8, 50);
        assert!(c.release_due(now).is_empty());
        now.add_minutes(5);
        assert!(c.release_due(now).is_empty());
        now.add_minutes(5);
        assert_eq!(c.release_due(now), vec![TaskId(0)]);
        assert!(c.queue().contains(TaskId(0)));
    }

    #[test]
    fn same_entry_time_released_together_in_file_order() {
        let mut c = TaskCatalog::new(vec![
            task("a", hm(9, 0), 1.0),
            task("b", hm(9, 0), 1.0),
            task("c", hm(9, 0), 1.0),
        ]);
        c.release_due(hm(9, 0));
        let order: Vec<_> = c.queue().iter().collect();
        assert_eq!(order, vec![TaskId(0), TaskId(1), TaskId(2)]);
    }

    #[test]
    fn exhausted_catalog_is_noop() {
        let mut c = three();
        c.release_due(hm(23, 0));
        assert!(c.release_due(hm(23, 5)).is_empty());
        assert!(c.release_due(hm(23, 10)).is_empty());
        assert_eq!(c.pending_len(), 0);
    }

    #[test]
    fn take_head_removes_from_queue_and_audits() {
        let mut c = three();
        c.release_due(hm(12, 0));
        let id = c.take_head_for_assignment().unwrap();
        assert_eq!(id, TaskId(0));
        assert!(!c.queue().contains(id));
        assert!(c.get(id).unwrap().lifecycle().is_assigned());
        assert_eq!(c.assigned_audit(), &[id]);
    }

    #[test]
    fn take_specific_task() {
        let mut c = three();
        c.release_due(hm(12, 0));
        assert!(c.take_for_assignment(TaskId(1)));
        assert!(!c.take_for_assignment(TaskId(1)));
        assert_eq!(c.queue().len(), 2);
    }

    #[test]
    fn completion_is_monotonic() {
        let mut c = three();
        assert!(c.mark_completed(TaskId(0)));
        assert!(!c.mark_completed(TaskId(0)));
        assert!(!c.mark_completed(TaskId(99)));
        assert!(c.get(TaskId(0)).unwrap().is_completed());
        assert_eq!(c.summary().completed, 1);
    }

    #[test]
    fn completed_head_is_skipped() {
        let mut c = three();
        c.release_due(hm(12, 0));
        c.mark_completed(TaskId(0));
        assert_eq!(c.take_head_for_assignment(), Some(TaskId(2)));
    }

    #[test]
    fn abandoned_tasks_are_counted_once() {
        let mut c = three();
        c.release_due(hm(12, 0));
        let id = c.take_head_for_assignment().unwrap();
        c.mark_abandoned(id);
        c.mark_abandoned(id);
        let s = c.summary();
        assert_eq!(s.abandoned, 1);
        assert_eq!(s.assigned, 1);
        assert_eq!(s.entered, 3);
        assert_eq!(s.waiting, 2);
    }
}

// ── Loader / writer ───────────────────────────────────────────────────────────

#[cfg(test)]
mod wire_format {
    use std::io::Cursor;

    use super::*;
    use crate::{TaskError, load_tasks_reader, write_tasks};

    #[test]
    fn parses_sample() {
        let file = load_tasks_reader(Cursor::new(SAMPLE), Some("UFMap2")).unwrap();
        assert_eq!(file.map_name, "UFMap2");
        assert_eq!(file.tasks.len(), 3);

        let t = &file.tasks[0];
        assert_eq!(t.entry_time, hm(9, 0));
        assert_eq!(t.origin, Point::new(12.0, 4.0));
        assert_eq!(t.destination, Point::new(30.0, 18.5));
        assert_eq!(t.description, "Linen, ward 3");
        assert_eq!(t.priority, 3.0);
        assert_eq!(t.loading_time, 4.0);
        assert_eq!(t.map, "UFMap2");
        assert_eq!(t.request_time, t.entry_time);
    }

    #[test]
    fn blank_fields_take_defaults() {
        let file = load_tasks_reader(Cursor::new(SAMPLE), None).unwrap();
        let t = &file.tasks[1];
        assert_eq!(t.priority, 0.0);
        assert_eq!(t.estimated_duration, 0.0);
        assert_eq!(t.loading_time, 2.0);
        assert!(t.requires_loading);

        let t = &file.tasks[2];
        assert!(!t.requires_loading);
    }

    #[test]
    fn map_mismatch_rejected() {
        let err = load_tasks_reader(Cursor::new(SAMPLE), Some("OtherMap")).unwrap_err();
        assert!(matches!(err, TaskError::MapMismatch { .. }));
    }

    #[test]
    fn bad_marker_rejected() {
        let text = SAMPLE.replacen("#fleet-tasks", "#tasks", 1);
        let err = load_tasks_reader(Cursor::new(text), None).unwrap_err();
        assert!(matches!(err, TaskError::Format(_)));
    }

    #[test]
    fn bad_field_aborts_with_line_number() {
        let text = SAMPLE.replace("2;2,8;40", "2;2,8-40");
        match load_tasks_reader(Cursor::new(text), None) {
            Err(TaskError::Parse { line, .. }) => assert_eq!(line, 6),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn blank_lines_counted_in_error_line() {
        let text = SAMPLE.replace("\n\n", "\n\n\n\n").replace("08:30", "8h30");
        match load_tasks_reader(Cursor::new(text), None) {
            Err(TaskError::Parse { line, .. }) => assert_eq!(line, 9),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn bad_time_aborts() {
        let text = SAMPLE.replace("08:30", "8h30");
        assert!(matches!(
            load_tasks_reader(Cursor::new(text), None),
            Err(TaskError::Parse { .. })
        ));
    }

    #[test]
    fn round_trip_preserves_fields() {
        let first = load_tasks_reader(Cursor::new(SAMPLE), None).unwrap();
        let mut out = Vec::new();
        write_tasks(&mut out, &first.map_name, &first.tasks).unwrap();
        let second = load_tasks_reader(Cursor::new(out), Some("UFMap2")).unwrap();
        assert_eq!(first.tasks, second.tasks);
    }
}
