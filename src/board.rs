// A task list kept in step with a storage backend

use crate::backend::TaskBackend;
use crate::filter::StatusFilter;
use crate::seed::seed_tasks;
use crate::store::{TaskListStore, TaskStats};
use crate::task::{NewTask, Task, TaskStatus, TaskUpdate};
use eyre::Result;
use tracing::info;

/// One dashboard session: the in-memory store plus the backend it mirrors to
///
/// Each mutation is applied to a copy of the store first. The backend is only
/// written when the store accepted the change, and the copy replaces the
/// session's store only after that write succeeds, so a failed write leaves
/// both sides as they were.
pub struct Board<B: TaskBackend> {
    store: TaskListStore,
    backend: B,
}

impl<B: TaskBackend> Board<B> {
    /// Load every stored task
    ///
    /// A backend created by this open is filled with the sample tasks when
    /// `seed_on_empty` is set. A backend that merely holds no tasks (everything
    /// deleted, or an empty import) stays empty.
    pub fn open(mut backend: B, seed_on_empty: bool) -> Result<Self> {
        let mut tasks = backend.list(StatusFilter::All)?;
        if backend.is_new() && tasks.is_empty() && seed_on_empty {
            info!("New task database, seeding sample tasks");
            tasks = seed_tasks();
            backend.replace_all(&tasks)?;
        }

        let store = TaskListStore::from_tasks(tasks)?;
        Ok(Self { store, backend })
    }

    pub fn store(&self) -> &TaskListStore {
        &self.store
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn view(&self, filter: StatusFilter, search: &str) -> Vec<&Task> {
        self.store.view(filter, search)
    }

    pub fn stats(&self) -> TaskStats {
        self.store.stats()
    }

    pub fn create(&mut self, input: NewTask) -> Result<Task> {
        self.stage(|store, backend| {
            let task = store.create(input)?;
            backend.insert(&task)?;
            Ok(task)
        })
    }

    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Result<Task> {
        self.stage(|store, backend| {
            let task = store.update(id, update)?.clone();
            backend.update_fields(&task)?;
            Ok(task)
        })
    }

    pub fn edit(&mut self, id: &str, input: NewTask) -> Result<Task> {
        self.update(id, TaskUpdate::replace_all(input))
    }

    pub fn delete(&mut self, id: &str) -> Result<Task> {
        self.stage(|store, backend| {
            let removed = store.delete(id)?;
            backend.delete(id)?;
            Ok(removed)
        })
    }

    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<()> {
        self.stage(|store, backend| {
            store.set_status(id, status)?;
            backend.set_status(id, status)
        })
    }

    pub fn toggle(&mut self, id: &str) -> Result<TaskStatus> {
        self.stage(|store, backend| {
            let status = store.toggle(id)?;
            backend.set_status(id, status)?;
            Ok(status)
        })
    }

    /// Replace the whole list, in memory and in storage
    pub fn replace_all(&mut self, tasks: Vec<Task>) -> Result<()> {
        let store = TaskListStore::from_tasks(tasks)?;
        self.backend.replace_all(store.tasks())?;
        self.store = store;
        Ok(())
    }

    /// Reset to the sample tasks
    pub fn reseed(&mut self) -> Result<()> {
        self.replace_all(seed_tasks())
    }

    /// Run `op` against a copy of the store; keep the copy only if `op` succeeds
    fn stage<T>(&mut self, op: impl FnOnce(&mut TaskListStore, &mut B) -> Result<T>) -> Result<T> {
        let mut staged = self.store.clone();
        let out = op(&mut staged, &mut self.backend)?;
        self.store = staged;
        Ok(out)
    }
}
