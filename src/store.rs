// In-memory task list with filtered views and derived stats

use crate::error::StoreError;
use crate::filter::{StatusFilter, TaskQuery};
use crate::seed::seed_tasks;
use crate::task::{NewTask, Task, TaskStatus, TaskUpdate, normalize_description, now_ms, parse_due_date, validate_title};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;
use uuid::Uuid;

/// Counts by status plus the rounded completion percentage
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStats {
    pub total: usize,
    pub pending: usize,
    pub completed: usize,
    pub completion_rate: u32,
}

impl TaskStats {
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        let mut stats = TaskStats::default();
        for task in tasks {
            stats.total += 1;
            match task.status {
                TaskStatus::Pending => stats.pending += 1,
                TaskStatus::Completed => stats.completed += 1,
            }
        }
        stats.completion_rate = completion_rate(stats.completed, stats.total);
        stats
    }
}

/// `round(100 * completed / total)`, half-up, 0 for an empty list
pub fn completion_rate(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * completed + total) / (2 * total)) as u32
}

/// Ordered task collection, most recently created first
///
/// Also carries the current view parameters (status filter and search query)
/// so a dashboard can hold one store per session and render `visible()`.
#[derive(Debug, Clone, Default)]
pub struct TaskListStore {
    tasks: Vec<Task>,
    query: TaskQuery,
}

impl TaskListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding the mock dashboard tasks
    pub fn seeded() -> Self {
        Self {
            tasks: seed_tasks(),
            query: TaskQuery::default(),
        }
    }

    /// Build a store from an existing ordered list
    ///
    /// Fails with `InvalidInput` if two tasks share an id or a title is blank.
    pub fn from_tasks(tasks: Vec<Task>) -> Result<Self, StoreError> {
        let mut seen = HashSet::with_capacity(tasks.len());
        for task in &tasks {
            if !seen.insert(task.id.as_str()) {
                return Err(StoreError::invalid("id", format!("duplicate task id '{}'", task.id)));
            }
            if task.title.trim().is_empty() {
                return Err(StoreError::invalid(
                    "title",
                    format!("task '{}' has an empty title", task.id),
                ));
            }
        }
        Ok(Self {
            tasks,
            query: TaskQuery::default(),
        })
    }

    // ========================================================================
    // Reads
    // ========================================================================

    /// Full backing collection in display order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Tasks matching the filter and search, in collection order
    pub fn view(&self, filter: StatusFilter, search: &str) -> Vec<&Task> {
        let query = TaskQuery::new(filter, search);
        self.tasks.iter().filter(|t| query.matches(t)).collect()
    }

    /// Recomputed from the current collection on every call
    pub fn stats(&self) -> TaskStats {
        TaskStats::from_tasks(&self.tasks)
    }

    // ========================================================================
    // View parameters
    // ========================================================================

    pub fn query(&self) -> &TaskQuery {
        &self.query
    }

    pub fn set_filter(&mut self, filter: StatusFilter) {
        self.query.status = filter;
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.query.search = search.into();
    }

    /// `view` applied to the stored filter and search query
    pub fn visible(&self) -> Vec<&Task> {
        self.tasks.iter().filter(|t| self.query.matches(t)).collect()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Create a pending task and put it at the front of the list
    pub fn create(&mut self, input: NewTask) -> Result<Task, StoreError> {
        let title = validate_title(&input.title)?;
        let due_date = match input.due_date.as_deref() {
            Some(raw) => parse_due_date(raw)?,
            None => None,
        };

        let task = Task {
            id: self.fresh_id(),
            title,
            description: normalize_description(input.description),
            status: TaskStatus::Pending,
            created_at: now_ms(),
            due_date,
        };

        debug!(id = %task.id, title = %task.title, "create: prepending task");
        self.tasks.insert(0, task.clone());
        Ok(task)
    }

    /// Apply a partial update to title, description and due date
    ///
    /// All supplied values are validated before anything is written.
    pub fn update(&mut self, id: &str, update: TaskUpdate) -> Result<&Task, StoreError> {
        let index = self.index_of(id)?;

        let title = update.title.as_deref().map(validate_title).transpose()?;
        let due_date = match update.due_date {
            Some(Some(raw)) => Some(parse_due_date(&raw)?),
            Some(None) => Some(None),
            None => None,
        };
        let description = update.description.map(normalize_description);

        let task = &mut self.tasks[index];
        if let Some(title) = title {
            task.title = title;
        }
        if let Some(description) = description {
            task.description = description;
        }
        if let Some(due_date) = due_date {
            task.due_date = due_date;
        }

        debug!(id, "update: applied");
        Ok(task)
    }

    /// Replace every editable field, clearing optionals that are not supplied
    pub fn edit(&mut self, id: &str, input: NewTask) -> Result<&Task, StoreError> {
        self.update(id, TaskUpdate::replace_all(input))
    }

    /// Remove a task, returning it
    pub fn delete(&mut self, id: &str) -> Result<Task, StoreError> {
        let index = self.index_of(id)?;
        let removed = self.tasks.remove(index);
        debug!(id, "delete: removed");
        Ok(removed)
    }

    /// Set the status; no other field changes
    pub fn set_status(&mut self, id: &str, status: TaskStatus) -> Result<(), StoreError> {
        let index = self.index_of(id)?;
        self.tasks[index].status = status;
        debug!(id, %status, "set_status: applied");
        Ok(())
    }

    /// Flip pending/completed, returning the new status
    pub fn toggle(&mut self, id: &str) -> Result<TaskStatus, StoreError> {
        let next = self
            .get(id)
            .map(|t| t.status.toggled())
            .ok_or_else(|| StoreError::not_found(id))?;
        self.set_status(id, next)?;
        Ok(next)
    }

    fn index_of(&self, id: &str) -> Result<usize, StoreError> {
        self.tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| StoreError::not_found(id))
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::now_v7().to_string();
            if !self.contains(&id) {
                return id;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn assert_unique_ids(store: &TaskListStore) {
        let ids: HashSet<&str> = store.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), store.len());
    }

    #[test]
    fn test_create_prepends_pending_task() {
        let mut store = TaskListStore::seeded();
        let before = now_ms();

        let task = store
            .create(NewTask::new("Write release notes").with_description("For 0.2"))
            .unwrap();

        assert_eq!(store.len(), 6);
        assert_eq!(task.status, TaskStatus::Pending);
        assert!(task.created_at >= before);
        assert_eq!(task.description.as_deref(), Some("For 0.2"));

        let all = store.view(StatusFilter::All, "");
        assert_eq!(all[0].id, task.id);
        assert_unique_ids(&store);
    }

    #[test]
    fn test_create_rejects_empty_title() {
        let mut store = TaskListStore::seeded();
        let err = store.create(NewTask::new("   ")).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { field: "title", .. }));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_create_rejects_malformed_due_date() {
        let mut store = TaskListStore::new();
        let err = store
            .create(NewTask::new("Task").with_due_date("31/01/2024"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { field: "due_date", .. }));
        assert!(store.is_empty());
    }

    #[test]
    fn test_create_parses_due_date() {
        let mut store = TaskListStore::new();
        let task = store
            .create(NewTask::new("Task").with_due_date("2024-02-01"))
            .unwrap();
        assert_eq!(task.due_date, Some(1_706_745_600_000));
    }

    #[test]
    fn test_many_creates_keep_ids_unique() {
        let mut store = TaskListStore::seeded();
        for i in 0..200 {
            store.create(NewTask::new(format!("Task {}", i))).unwrap();
        }
        assert_eq!(store.len(), 205);
        assert_unique_ids(&store);
    }

    #[test]
    fn test_update_changes_only_supplied_fields() {
        let mut store = TaskListStore::seeded();
        let original = store.get("1").unwrap().clone();

        store
            .update("1", TaskUpdate::default().title("Finish documentation"))
            .unwrap();

        let updated = store.get("1").unwrap();
        assert_eq!(updated.title, "Finish documentation");
        assert_eq!(updated.description, original.description);
        assert_eq!(updated.due_date, original.due_date);
        assert_eq!(updated.status, original.status);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[test]
    fn test_update_clears_due_date() {
        let mut store = TaskListStore::seeded();
        assert!(store.get("4").unwrap().due_date.is_some());

        store.update("4", TaskUpdate::default().due_date(None)).unwrap();

        assert_eq!(store.get("4").unwrap().due_date, None);
    }

    #[test]
    fn test_update_missing_id_is_not_found() {
        let mut store = TaskListStore::seeded();
        let err = store
            .update("missing", TaskUpdate::default().title("x"))
            .unwrap_err();
        assert_eq!(err, StoreError::not_found("missing"));
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn test_update_invalid_input_leaves_task_unchanged() {
        let mut store = TaskListStore::seeded();
        let original = store.get("1").unwrap().clone();

        let result = store.update(
            "1",
            TaskUpdate::default()
                .title("Valid title")
                .due_date(Some("not a date".to_string())),
        );

        assert!(result.is_err());
        assert_eq!(store.get("1").unwrap(), &original);
    }

    #[test]
    fn test_edit_clears_omitted_optionals() {
        let mut store = TaskListStore::seeded();

        store.edit("1", NewTask::new("Docs")).unwrap();

        let task = store.get("1").unwrap();
        assert_eq!(task.title, "Docs");
        assert_eq!(task.description, None);
        assert_eq!(task.due_date, None);
        assert_eq!(task.status, TaskStatus::Pending);
    }

    #[test]
    fn test_delete_then_not_found() {
        let mut store = TaskListStore::seeded();

        let removed = store.delete("3").unwrap();
        assert_eq!(removed.title, "Update dependencies");
        assert_eq!(store.len(), 4);

        assert!(store.delete("3").unwrap_err().is_not_found());
        assert_eq!(store.len(), 4);
        assert!(store.set_status("3", TaskStatus::Pending).unwrap_err().is_not_found());
        assert!(store.update("3", TaskUpdate::default().title("x")).unwrap_err().is_not_found());
        assert!(store.toggle("3").unwrap_err().is_not_found());
    }

    #[test]
    fn test_set_status_touches_only_status() {
        let mut store = TaskListStore::seeded();
        let original = store.get("2").unwrap().clone();

        store.set_status("2", TaskStatus::Completed).unwrap();

        let task = store.get("2").unwrap();
        assert_eq!(task.status, TaskStatus::Completed);
        assert_eq!(task.title, original.title);
        assert_eq!(task.created_at, original.created_at);

        store.set_status("2", TaskStatus::Pending).unwrap();
        assert_eq!(store.get("2").unwrap(), &original);
    }

    #[test]
    fn test_toggle_round_trip() {
        let mut store = TaskListStore::seeded();
        assert_eq!(store.toggle("5").unwrap(), TaskStatus::Pending);
        assert_eq!(store.toggle("5").unwrap(), TaskStatus::Completed);
    }

    #[test]
    fn test_seeded_scenario_stats() {
        let mut store = TaskListStore::seeded();
        store.set_status("2", TaskStatus::Completed).unwrap();

        assert_eq!(
            store.stats(),
            TaskStats {
                total: 5,
                pending: 2,
                completed: 3,
                completion_rate: 60,
            }
        );
    }

    #[test]
    fn test_stats_empty() {
        let store = TaskListStore::new();
        assert_eq!(store.stats(), TaskStats::default());
    }

    #[test]
    fn test_stats_recomputed_after_mutation() {
        let mut store = TaskListStore::seeded();
        assert_eq!(store.stats().completion_rate, 40);
        store.delete("3").unwrap();
        store.delete("5").unwrap();
        assert_eq!(store.stats().completion_rate, 0);
        assert_eq!(store.stats().total, store.view(StatusFilter::All, "").len());
    }

    #[test]
    fn test_completion_rate_rounding() {
        assert_eq!(completion_rate(0, 0), 0);
        assert_eq!(completion_rate(1, 3), 33);
        assert_eq!(completion_rate(2, 3), 67);
        // Half rounds up
        assert_eq!(completion_rate(1, 8), 13);
        assert_eq!(completion_rate(3, 8), 38);
        assert_eq!(completion_rate(1, 2), 50);
        assert_eq!(completion_rate(4, 4), 100);
    }

    #[test]
    fn test_stats_serialization() {
        let json = serde_json::to_value(TaskListStore::seeded().stats()).unwrap();
        assert_eq!(json["total"], 5);
        assert_eq!(json["completionRate"], 40);
    }

    #[test]
    fn test_view_pending_bug() {
        let mut tasks = seed_tasks();
        let mut done = tasks[3].clone();
        done.id = "4-done".to_string();
        done.status = TaskStatus::Completed;
        tasks.push(done);
        let store = TaskListStore::from_tasks(tasks).unwrap();

        let view = store.view(StatusFilter::Pending, "bug");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "4");
    }

    #[test]
    fn test_view_preserves_order_and_does_not_mutate() {
        let store = TaskListStore::seeded();
        let before = store.tasks().to_vec();

        let ids: Vec<&str> = store
            .view(StatusFilter::Completed, "")
            .iter()
            .map(|t| t.id.as_str())
            .collect();

        assert_eq!(ids, vec!["3", "5"]);
        assert_eq!(store.tasks(), before.as_slice());
    }

    #[test]
    fn test_view_searches_description() {
        let store = TaskListStore::seeded();
        let view = store.view(StatusFilter::All, "MOCKUPS");
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, "5");
    }

    #[test]
    fn test_visible_uses_stored_query() {
        let mut store = TaskListStore::seeded();
        assert_eq!(store.visible().len(), 5);

        store.set_filter(StatusFilter::Pending);
        assert_eq!(store.visible().len(), 3);

        store.set_search("review");
        let visible = store.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, "2");
        assert_eq!(store.query(), &TaskQuery::new(StatusFilter::Pending, "review"));
    }

    #[test]
    fn test_from_tasks_rejects_duplicate_ids() {
        let mut tasks = seed_tasks();
        tasks.push(tasks[0].clone());
        let err = TaskListStore::from_tasks(tasks).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { field: "id", .. }));
    }

    #[test]
    fn test_from_tasks_rejects_blank_title() {
        let mut tasks = seed_tasks();
        tasks[2].title = "  ".to_string();
        let err = TaskListStore::from_tasks(tasks).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput { field: "title", .. }));
    }

    #[test]
    fn test_mixed_operation_sequence_keeps_invariants() {
        let mut store = TaskListStore::seeded();
        let a = store.create(NewTask::new("A")).unwrap();
        let b = store.create(NewTask::new("B")).unwrap();
        store.delete("1").unwrap();
        store.set_status(&a.id, TaskStatus::Completed).unwrap();
        store.update(&b.id, TaskUpdate::default().description(Some("bee".into()))).unwrap();
        let c = store.create(NewTask::new("C")).unwrap();

        assert_unique_ids(&store);
        assert_eq!(store.tasks()[0].id, c.id);
        assert_eq!(store.get(&a.id).unwrap().created_at, a.created_at);
        assert_eq!(store.stats().total, store.view(StatusFilter::All, "").len());
    }
}
