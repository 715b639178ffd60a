// Storage backends that mirror the in-memory task list

use crate::error::StoreError;
use crate::filter::StatusFilter;
use crate::task::{Task, TaskStatus};
use eyre::{Context, Result};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

const CURRENT_VERSION: u32 = 1;
const DB_FILE: &str = "taskboard.db";

/// Operations a durable store must offer to back a `TaskListStore`
///
/// Ids the backend does not know fail with an `eyre::Report` wrapping
/// `StoreError::NotFound`; recover it with `downcast_ref::<StoreError>()`.
pub trait TaskBackend {
    /// True when this open created the storage, so nothing was ever written to it
    fn is_new(&self) -> bool;

    /// Store a new task; it becomes the first entry of `list`
    fn insert(&mut self, task: &Task) -> Result<()>;

    /// Write title, description and due date for `task.id`
    fn update_fields(&mut self, task: &Task) -> Result<()>;

    fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<()>;

    fn delete(&mut self, id: &str) -> Result<()>;

    /// Tasks with a matching status, most recently inserted first
    fn list(&self, filter: StatusFilter) -> Result<Vec<Task>>;

    /// Drop everything and store `tasks` so that `list` returns them in the same order
    fn replace_all(&mut self, tasks: &[Task]) -> Result<()>;

    /// Check that the backing database answers
    fn ping(&self) -> HealthReport;
}

/// Result of a backend health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub success: bool,
    pub message: String,
    pub database: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// SQLite-backed task table
pub struct SqliteBackend {
    db: Connection,
    label: String,
    created: bool,
}

impl SqliteBackend {
    /// Open or create a backend in the given directory
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let base_path = path.as_ref().to_path_buf();

        fs::create_dir_all(&base_path).context("Failed to create store directory")?;

        let db_path = base_path.join(DB_FILE);
        let db = Connection::open(&db_path).context("Failed to open SQLite database")?;

        let mut backend = Self {
            db,
            label: db_path.display().to_string(),
            created: false,
        };
        backend.created = !backend.has_schema()?;
        backend.create_schema()?;
        write_version(&base_path)?;

        info!(path = %backend.label, created = backend.created, "Opened task database");
        Ok(backend)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Connection::open_in_memory().context("Failed to open in-memory database")?;
        let backend = Self {
            db,
            label: ":memory:".to_string(),
            created: true,
        };
        backend.create_schema()?;
        Ok(backend)
    }

    /// Path of the database file, or `:memory:`
    pub fn label(&self) -> &str {
        &self.label
    }

    fn has_schema(&self) -> Result<bool> {
        let found = self
            .db
            .query_row(
                "SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'tasks'",
                [],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn create_schema(&self) -> Result<()> {
        debug!("Creating database schema");

        self.db.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                description TEXT,
                status TEXT NOT NULL CHECK (status IN ('pending', 'completed')),
                created_at INTEGER NOT NULL,
                due_date INTEGER
            );

            CREATE INDEX IF NOT EXISTS idx_tasks_status ON tasks(status);
            CREATE INDEX IF NOT EXISTS idx_tasks_created_at ON tasks(created_at DESC);
            "#,
        )?;

        Ok(())
    }

    fn exists(&self, id: &str) -> Result<bool> {
        let found = self
            .db
            .query_row("SELECT 1 FROM tasks WHERE id = ?1", [id], |_| Ok(()))
            .optional()?;
        Ok(found.is_some())
    }

    fn insert_row(conn: &Connection, task: &Task) -> Result<()> {
        conn.execute(
            "INSERT INTO tasks (id, title, description, status, created_at, due_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                task.id,
                task.title,
                task.description,
                task.status.as_str(),
                task.created_at,
                task.due_date
            ],
        )?;
        Ok(())
    }

    fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
        let status: String = row.get(3)?;
        let status = status
            .parse::<TaskStatus>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

        Ok(Task {
            id: row.get(0)?,
            title: row.get(1)?,
            description: row.get(2)?,
            status,
            created_at: row.get(4)?,
            due_date: row.get(5)?,
        })
    }
}

impl TaskBackend for SqliteBackend {
    fn is_new(&self) -> bool {
        self.created
    }

    fn insert(&mut self, task: &Task) -> Result<()> {
        if self.exists(&task.id)? {
            return Err(StoreError::invalid("id", format!("task '{}' already exists", task.id)).into());
        }
        Self::insert_row(&self.db, task).context("Failed to insert task")?;
        debug!(id = %task.id, "insert: stored");
        Ok(())
    }

    fn update_fields(&mut self, task: &Task) -> Result<()> {
        let changed = self.db.execute(
            "UPDATE tasks SET title = ?2, description = ?3, due_date = ?4 WHERE id = ?1",
            params![task.id, task.title, task.description, task.due_date],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(&task.id).into());
        }
        debug!(id = %task.id, "update_fields: stored");
        Ok(())
    }

    fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<()> {
        let changed = self.db.execute(
            "UPDATE tasks SET status = ?2 WHERE id = ?1",
            params![id, status.as_str()],
        )?;
        if changed == 0 {
            return Err(StoreError::not_found(id).into());
        }
        debug!(id, %status, "set_status: stored");
        Ok(())
    }

    fn delete(&mut self, id: &str) -> Result<()> {
        let changed = self.db.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(StoreError::not_found(id).into());
        }
        debug!(id, "delete: removed");
        Ok(())
    }

    fn list(&self, filter: StatusFilter) -> Result<Vec<Task>> {
        const COLUMNS: &str = "SELECT id, title, description, status, created_at, due_date FROM tasks";

        let tasks = match filter.status() {
            None => {
                let mut stmt = self.db.prepare(&format!("{} ORDER BY seq DESC", COLUMNS))?;
                let rows = stmt.query_map([], Self::task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
            Some(status) => {
                let mut stmt = self
                    .db
                    .prepare(&format!("{} WHERE status = ?1 ORDER BY seq DESC", COLUMNS))?;
                let rows = stmt.query_map([status.as_str()], Self::task_from_row)?;
                rows.collect::<rusqlite::Result<Vec<_>>>()
            }
        }
        .context("Failed to read tasks from database")?;

        Ok(tasks)
    }

    fn replace_all(&mut self, tasks: &[Task]) -> Result<()> {
        let tx = self.db.transaction()?;
        tx.execute("DELETE FROM tasks", [])?;
        // Oldest row first so the first task ends up with the highest seq
        for task in tasks.iter().rev() {
            Self::insert_row(&tx, task).with_context(|| format!("Failed to store task '{}'", task.id))?;
        }
        tx.commit()?;

        info!(count = tasks.len(), "Replaced stored tasks");
        Ok(())
    }

    fn ping(&self) -> HealthReport {
        match self.db.query_row("SELECT 1", [], |row| row.get::<_, i64>(0)) {
            Ok(_) => HealthReport {
                success: true,
                message: "Database connection successful".to_string(),
                database: self.label.clone(),
                error: None,
            },
            Err(e) => {
                warn!(error = ?e, "Database ping failed");
                HealthReport {
                    success: false,
                    message: "Database connection failed".to_string(),
                    database: self.label.clone(),
                    error: Some(e.to_string()),
                }
            }
        }
    }
}

fn write_version(base_path: &Path) -> Result<PathBuf> {
    let version_path = base_path.join(".version");
    if !version_path.exists() {
        fs::write(&version_path, CURRENT_VERSION.to_string()).context("Failed to write version file")?;
    }
    Ok(version_path)
}
