// Mock tasks the dashboard starts with

use crate::task::{Task, TaskStatus};
use chrono::NaiveDate;

fn day(y: i32, m: u32, d: u32) -> i64 {
    NaiveDate::from_ymd_opt(y, m, d)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or_default()
}

fn seed_task(
    id: &str,
    title: &str,
    description: &str,
    status: TaskStatus,
    created_at: i64,
    due_date: Option<i64>,
) -> Task {
    Task {
        id: id.to_string(),
        title: title.to_string(),
        description: Some(description.to_string()),
        status,
        created_at,
        due_date,
    }
}

/// Five tasks: three pending, two completed, in dashboard order
pub fn seed_tasks() -> Vec<Task> {
    vec![
        seed_task(
            "1",
            "Complete project documentation",
            "Write comprehensive documentation for the new feature",
            TaskStatus::Pending,
            day(2024, 1, 15),
            Some(day(2024, 2, 1)),
        ),
        seed_task(
            "2",
            "Review pull requests",
            "Review and merge pending pull requests from the team",
            TaskStatus::Pending,
            day(2024, 1, 16),
            None,
        ),
        seed_task(
            "3",
            "Update dependencies",
            "Update all npm packages to their latest versions",
            TaskStatus::Completed,
            day(2024, 1, 10),
            None,
        ),
        seed_task(
            "4",
            "Fix authentication bug",
            "Investigate and fix the login issue reported by users",
            TaskStatus::Pending,
            day(2024, 1, 17),
            Some(day(2024, 1, 20)),
        ),
        seed_task(
            "5",
            "Design new landing page",
            "Create mockups for the new landing page design",
            TaskStatus::Completed,
            day(2024, 1, 12),
            None,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_seed_counts() {
        let tasks = seed_tasks();
        assert_eq!(tasks.len(), 5);
        assert_eq!(tasks.iter().filter(|t| t.status == TaskStatus::Pending).count(), 3);
        assert_eq!(tasks.iter().filter(|t| t.status == TaskStatus::Completed).count(), 2);
    }

    #[test]
    fn test_seed_ids_unique() {
        let tasks = seed_tasks();
        let ids: HashSet<&str> = tasks.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids.len(), tasks.len());
    }

    #[test]
    fn test_seed_dates() {
        let tasks = seed_tasks();
        assert_eq!(tasks[0].created_at, 1_705_276_800_000);
        assert_eq!(tasks[0].due_date, Some(1_706_745_600_000));
        assert_eq!(tasks[1].due_date, None);
    }
}
