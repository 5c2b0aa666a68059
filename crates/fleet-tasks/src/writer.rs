//! Task-file writer, the inverse of [`loader`](crate::loader).

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::loader::{COLUMNS, HEADER_MARKER};
use crate::{Task, TaskResult};

/// Write `tasks` for `map` in the task-file format.
pub fn write_tasks<W: Write>(mut writer: W, map: &str, tasks: &[Task]) -> TaskResult<()> {
    writeln!(writer, "{HEADER_MARKER}")?;
    writeln!(writer, "{map}")?;

    let mut csv_writer = csv::Writer::from_writer(&mut writer);
    csv_writer.write_record(COLUMNS)?;
    for task in tasks {
        let loading = if task.requires_loading { task.loading_time } else { 0.0 };
        csv_writer.write_record([
            task.entry_time.to_string(),
            task.origin.to_string(),
            task.destination.to_string(),
            task.id.clone(),
            task.description.clone(),
            task.priority.to_string(),
            task.estimated_duration.to_string(),
            loading.to_string(),
        ])?;
    }
    csv_writer.flush()?;
    drop(csv_writer);
    writer.flush()?;
    Ok(())
}

pub fn write_tasks_path(path: &Path, map: &str, tasks: &[Task]) -> TaskResult<()> {
    let file = File::create(path)?;
    write_tasks(BufWriter::new(file), map, tasks)
}
