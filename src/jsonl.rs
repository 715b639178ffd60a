// JSONL import/export of task lists

use crate::task::Task;
use eyre::{Context, Result};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

/// Write tasks one per line, replacing the file
pub fn write_jsonl(path: &Path, tasks: &[Task]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(false)
        .open(path)
        .context("Failed to open JSONL file for writing")?;

    // Acquire exclusive lock before truncating
    file.lock_exclusive().context("Failed to acquire file lock")?;
    file.set_len(0)?;

    let mut writer = BufWriter::new(&file);
    for task in tasks {
        let json = serde_json::to_string(task)?;
        writeln!(writer, "{}", json)?;
    }
    writer.flush()?;
    drop(writer);
    file.sync_all()?; // Ensure data is flushed to disk

    info!(file = ?path, count = tasks.len(), "Exported tasks to JSONL");
    Ok(())
}

/// Read tasks in file order
///
/// Blank and malformed lines are skipped with a warning. When an id appears
/// twice the later line replaces the earlier record at its original position.
pub fn read_jsonl(path: &Path) -> Result<Vec<Task>> {
    if !path.exists() {
        // File doesn't exist yet, nothing to import
        return Ok(Vec::new());
    }

    let file = File::open(path).context("Failed to open JSONL file")?;
    let reader = BufReader::new(file);
    let mut tasks: Vec<Task> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for (line_num, line) in reader.lines().enumerate() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to read line, skipping"
                );
                continue;
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        let task: Task = match serde_json::from_str(&line) {
            Ok(t) => t,
            Err(e) => {
                warn!(
                    file = ?path,
                    line = line_num + 1,
                    error = ?e,
                    "Failed to parse task, skipping"
                );
                continue;
            }
        };

        match positions.get(&task.id) {
            Some(&index) => tasks[index] = task,
            None => {
                positions.insert(task.id.clone(), tasks.len());
                tasks.push(task);
            }
        }
    }

    info!(file = ?path, count = tasks.len(), "Loaded tasks from JSONL");
    Ok(tasks)
}
