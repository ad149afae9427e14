//! Test utilities for entity types
//!
//! Builders for entities with sensible defaults, so tests only spell out the
//! fields they care about.

use taskdeck_core::{Developer, EntityId, Project, Task, TaskStatus};

/// Creates a test project with no description and zero counts.
pub fn test_project(id: EntityId, name: &str) -> Project {
    Project {
        id,
        name: name.to_string(),
        description: None,
        developer_count: 0,
        task_count: 0,
        created_at: None,
        updated_at: None,
    }
}

/// Creates an unassigned `TODO` task in `project_id`.
pub fn test_task(id: EntityId, title: &str, project_id: EntityId) -> Task {
    test_task_full(id, title, project_id, TaskStatus::Todo, None)
}

/// Creates a test task with full control over status and assignee.
pub fn test_task_full(
    id: EntityId,
    title: &str,
    project_id: EntityId,
    status: TaskStatus,
    developer_id: Option<EntityId>,
) -> Task {
    Task {
        id,
        title: title.to_string(),
        description: None,
        status,
        project_id,
        project_name: None,
        developer_id,
        developer_name: None,
        due_date: None,
        created_at: None,
        updated_at: None,
    }
}

/// Creates a test developer. The email is derived from the name.
pub fn test_developer(id: EntityId, name: &str, project_id: Option<EntityId>) -> Developer {
    Developer {
        id,
        name: name.to_string(),
        email: format!("{}@example.com", name.to_lowercase().replace(' ', ".")),
        role: None,
        project_id,
        project_name: None,
        task_count: 0,
        created_at: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_defaults() {
        let task = test_task(3, "Fix bug", 1);
        assert_eq!(task.status, TaskStatus::Todo);
        assert_eq!(task.project_id, 1);
        assert!(task.developer_id.is_none());
    }

    #[test]
    fn test_developer_email_from_name() {
        let dev = test_developer(1, "Ada Lovelace", Some(2));
        assert_eq!(dev.email, "ada.lovelace@example.com");
        assert_eq!(dev.project_id, Some(2));
    }
}
