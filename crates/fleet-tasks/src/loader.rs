//! Task-file loader.
//!
//! # Format
//!
//! ```text
//! #fleet-tasks
//! UFMap2
//! entryTime,origin,destination,id,description,priority,estimatedDuration,loadingTime
//! 09:00,12;4,30;18.5,T-001,"Linen, ward 3",3,15,4
//! 09:05,2;2,8;40,T-002,Specimen run,,,
//! ```
//!
//! | Line | Content                                        |
//! |------|------------------------------------------------|
//! | 1    | The literal marker `#fleet-tasks`              |
//! | 2    | The map name the tasks were authored for       |
//! | 3    | Column header row (names are not interpreted)  |
//! | 4..  | One CSV record per task, fields by position    |
//!
//! Blank `priority`, `estimatedDuration` and `loadingTime` fields default to
//! `0`, `0` and `2.0`.  Blank lines are skipped.  Any field that fails to
//! parse aborts the whole import, since release order depends on every row.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use fleet_core::{Point, TimeOfDay};

use crate::event::DEFAULT_LOADING_TIME;
use crate::{Task, TaskError, TaskResult};

/// First line of every task file.
pub const HEADER_MARKER: &str = "#fleet-tasks";

/// Column names written on line 3.
pub const COLUMNS: [&str; 8] = [
    "entryTime",
    "origin",
    "destination",
    "id",
    "description",
    "priority",
    "estimatedDuration",
    "loadingTime",
];

/// Lines consumed before the CSV header row.
const PREAMBLE_LINES: u64 = 2;

/// A parsed task file.
#[derive(Clone, Debug)]
pub struct TaskFile {
    pub map_name: String,
    pub tasks:    Vec<Task>,
}

// ── CSV record ────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct TaskRecord {
    entry_time:         String,
    origin:             String,
    destination:        String,
    id:                 String,
    description:        String,
    priority:           Option<f32>,
    estimated_duration: Option<f32>,
    loading_time:       Option<f32>,
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Load a task file from disk.  See [`load_tasks_reader`].
pub fn load_tasks_path(path: &Path, expected_map: Option<&str>) -> TaskResult<TaskFile> {
    let file = File::open(path)?;
    let parsed = load_tasks_reader(file, expected_map)?;
    info!(path = %path.display(), map = %parsed.map_name, tasks = parsed.tasks.len(), "loaded task file");
    Ok(parsed)
}

/// Parse a task file from any `Read` source.
///
/// When `expected_map` is given and the file names a different map, the
/// import is rejected with [`TaskError::MapMismatch`].
pub fn load_tasks_reader<R: Read>(reader: R, expected_map: Option<&str>) -> TaskResult<TaskFile> {
    let mut reader = BufReader::new(reader);

    // ── Preamble ──────────────────────────────────────────────────────────
    let marker = read_line(&mut reader)?;
    if marker.trim_start_matches('\u{feff}').trim() != HEADER_MARKER {
        return Err(TaskError::Format(format!(
            "expected {HEADER_MARKER:?} on line 1, found {:?}",
            marker.trim()
        )));
    }

    let map_name = read_line(&mut reader)?.trim().to_owned();
    if map_name.is_empty() {
        return Err(TaskError::Format("missing map name on line 2".into()));
    }
    if let Some(expected) = expected_map {
        if expected != map_name {
            return Err(TaskError::MapMismatch { expected: expected.to_owned(), found: map_name });
        }
    }

    // ── Records ───────────────────────────────────────────────────────────
    // Read the body whole so error lines come from byte offsets; the csv
    // reader's own line counter skips blank lines.
    let mut body = String::new();
    reader.read_to_string(&mut body)?;
    let line_of = |pos: Option<&csv::Position>| -> u64 {
        let byte = pos.map_or(0, |p| p.byte() as usize).min(body.len());
        let newlines = body.as_bytes()[..byte].iter().filter(|&&b| b == b'\n').count() as u64;
        PREAMBLE_LINES + newlines + 1
    };

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut tasks = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| TaskError::Parse { line: line_of(e.position()), message: e.to_string() })?;
        let line = line_of(record.position());

        let row: TaskRecord = record
            .deserialize(None)
            .map_err(|e| TaskError::Parse { line, message: e.to_string() })?;
        tasks.push(build_task(row, &map_name).map_err(|message| TaskError::Parse { line, message })?);
    }

    Ok(TaskFile { map_name, tasks })
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn read_line<R: BufRead>(reader: &mut R) -> TaskResult<String> {
    let mut line = String::new();
    if reader.read_line(&mut line)? == 0 {
        return Err(TaskError::Format("unexpected end of file in preamble".into()));
    }
    Ok(line)
}

fn build_task(row: TaskRecord, map: &str) -> Result<Task, String> {
    let entry_time: TimeOfDay = row
        .entry_time
        .parse()
        .map_err(|e: fleet_core::FleetError| e.to_string())?;
    let origin: Point = row.origin.parse().map_err(|e: fleet_core::FleetError| e.to_string())?;
    let destination: Point = row
        .destination
        .parse()
        .map_err(|e: fleet_core::FleetError| e.to_string())?;

    let priority = row.priority.unwrap_or(0.0);
    let estimated = row.estimated_duration.unwrap_or(0.0);
    let loading = row.loading_time.unwrap_or(DEFAULT_LOADING_TIME);
    for (name, v) in [("priority", priority), ("estimatedDuration", estimated), ("loadingTime", loading)] {
        if !v.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }
    if loading < 0.0 {
        return Err(format!("loadingTime must not be negative, got {loading}"));
    }

    Ok(Task::new(row.id, entry_time, origin, destination)
        .with_map(map)
        .with_description(row.description)
        .with_priority(priority)
        .with_estimated_duration(estimated)
        .with_loading_time(loading))
}
