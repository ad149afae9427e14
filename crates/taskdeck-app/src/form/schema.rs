//! Field rules and per-entity form schemas

use taskdeck_client::Draft;
use taskdeck_core::{EntityId, EntityKind, Project, ProjectDraft, Task, TaskDraft, TaskStatus};

use super::{FieldError, FormError, FormState, Validity};
use crate::screens::ScreenEntity;

/// One validation rule. Rules other than `Required` only apply to
/// non-empty values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldRule {
    Required,
    MinLength(usize),
    OneOf(&'static [&'static str]),
    /// Numeric entity id
    Id,
}

/// A named field and its rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub label: &'static str,
    pub rules: &'static [FieldRule],
}

impl FieldSpec {
    pub fn validate(&self, value: &str) -> Validity {
        if value.is_empty() {
            return if self.rules.contains(&FieldRule::Required) {
                Validity::Invalid(FieldError::Required)
            } else {
                Validity::Valid
            };
        }

        for rule in self.rules {
            let failed = match rule {
                FieldRule::Required => None,
                FieldRule::MinLength(min) if value.chars().count() < *min => {
                    Some(FieldError::TooShort { min: *min })
                }
                FieldRule::MinLength(_) => None,
                FieldRule::OneOf(allowed) if !allowed.iter().any(|a| *a == value) => {
                    Some(FieldError::NotAllowed)
                }
                FieldRule::OneOf(_) => None,
                FieldRule::Id if value.trim().parse::<EntityId>().is_err() => {
                    Some(FieldError::InvalidId)
                }
                FieldRule::Id => None,
            };
            if let Some(err) = failed {
                return Validity::Invalid(err);
            }
        }
        Validity::Valid
    }
}

/// Fields, defaults, and draft construction for one editable entity kind
pub trait FormSchema {
    /// Entity loaded in edit mode
    type Entity: ScreenEntity;

    const FIELDS: &'static [FieldSpec];

    /// Related kinds offered as choices (`{id, label}` pickers)
    const OPTIONS: &'static [EntityKind] = &[];

    fn kind() -> EntityKind {
        Self::Entity::KIND
    }

    /// Initial values in create mode
    fn defaults() -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Field values copied from a loaded entity in edit mode
    fn seed(entity: &Self::Entity) -> Vec<(&'static str, String)>;

    /// Build the create/update payload from a valid form
    fn draft(form: &FormState) -> Result<Draft, FormError>;
}

fn parse_id(form: &FormState, field: &str) -> Result<EntityId, FormError> {
    let raw = form.value(field);
    raw.trim()
        .parse::<EntityId>()
        .map_err(|_| FormError::InvalidValue {
            field: field.to_string(),
            message: format!("{:?} is not a valid id", raw),
        })
}

// ─────────────────────────────────────────────────────────────────────────────
// Task
// ─────────────────────────────────────────────────────────────────────────────

const STATUS_VALUES: &[&str] = &["TODO", "IN_PROGRESS", "DONE"];

/// Task form: title, description, status, project, developer
#[derive(Debug, Clone, Copy)]
pub struct TaskSchema;

impl FormSchema for TaskSchema {
    type Entity = Task;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "title",
            label: "Title",
            rules: &[FieldRule::Required, FieldRule::MinLength(3)],
        },
        FieldSpec {
            name: "description",
            label: "Description",
            rules: &[],
        },
        FieldSpec {
            name: "status",
            label: "Status",
            rules: &[FieldRule::Required, FieldRule::OneOf(STATUS_VALUES)],
        },
        FieldSpec {
            name: "projectId",
            label: "Project",
            rules: &[FieldRule::Required, FieldRule::Id],
        },
        FieldSpec {
            name: "developerId",
            label: "Developer",
            rules: &[FieldRule::Id],
        },
    ];

    const OPTIONS: &'static [EntityKind] = &[EntityKind::Project, EntityKind::Developer];

    fn defaults() -> Vec<(&'static str, String)> {
        vec![("status", TaskStatus::Todo.as_str().to_string())]
    }

    fn seed(task: &Task) -> Vec<(&'static str, String)> {
        vec![
            ("title", task.title.clone()),
            ("description", task.description.clone().unwrap_or_default()),
            ("status", task.status.as_str().to_string()),
            ("projectId", task.project_id.to_string()),
            (
                "developerId",
                task.developer_id.map(|id| id.to_string()).unwrap_or_default(),
            ),
        ]
    }

    fn draft(form: &FormState) -> Result<Draft, FormError> {
        let status = form
            .value("status")
            .parse::<TaskStatus>()
            .map_err(|e| FormError::InvalidValue {
                field: "status".to_string(),
                message: e.to_string(),
            })?;
        let developer_id = match form.optional("developerId") {
            Some(_) => Some(parse_id(form, "developerId")?),
            None => None,
        };

        Ok(Draft::Task(TaskDraft {
            title: form.value("title").to_string(),
            description: form.optional("description"),
            status,
            project_id: parse_id(form, "projectId")?,
            developer_id,
        }))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Project
// ─────────────────────────────────────────────────────────────────────────────

/// Project form: name and description
#[derive(Debug, Clone, Copy)]
pub struct ProjectSchema;

impl FormSchema for ProjectSchema {
    type Entity = Project;

    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec {
            name: "name",
            label: "Name",
            rules: &[FieldRule::Required, FieldRule::MinLength(3)],
        },
        FieldSpec {
            name: "description",
            label: "Description",
            rules: &[],
        },
    ];

    fn seed(project: &Project) -> Vec<(&'static str, String)> {
        vec![
            ("name", project.name.clone()),
            (
                "description",
                project.description.clone().unwrap_or_default(),
            ),
        ]
    }

    fn draft(form: &FormState) -> Result<Draft, FormError> {
        Ok(Draft::Project(ProjectDraft {
            name: form.value("name").to_string(),
            description: form.optional("description"),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_client::test_utils::test_task_full;

    fn task_form() -> FormState {
        FormState::new(TaskSchema::FIELDS, &TaskSchema::defaults())
    }

    #[test]
    fn test_task_defaults_status_todo() {
        let form = task_form();
        assert_eq!(form.value("status"), "TODO");
        assert!(!form.is_valid());
    }

    #[test]
    fn test_task_rules() {
        let mut form = task_form();
        form.set("title", "ab").unwrap();
        form.set("projectId", "1").unwrap();
        assert_eq!(
            form.validity("title"),
            Some(&Validity::Invalid(FieldError::TooShort { min: 3 }))
        );

        form.set("title", "Fix bug").unwrap();
        assert!(form.is_valid());

        form.set("status", "BLOCKED").unwrap();
        assert_eq!(
            form.validity("status"),
            Some(&Validity::Invalid(FieldError::NotAllowed))
        );
        form.set("status", "DONE").unwrap();

        form.set("developerId", "abc").unwrap();
        assert_eq!(
            form.validity("developerId"),
            Some(&Validity::Invalid(FieldError::InvalidId))
        );
        form.set("developerId", "").unwrap();
        assert!(form.is_valid());
    }

    #[test]
    fn test_task_draft_omits_blank_optionals() {
        let mut form = task_form();
        form.set("title", "Fix bug").unwrap();
        form.set("projectId", "1").unwrap();
        form.set("description", "").unwrap();

        let draft = TaskSchema::draft(&form).unwrap();
        assert_eq!(
            draft,
            Draft::Task(TaskDraft {
                title: "Fix bug".to_string(),
                description: None,
                status: TaskStatus::Todo,
                project_id: 1,
                developer_id: None,
            })
        );
    }

    #[test]
    fn test_task_seed_from_entity() {
        let task = test_task_full(5, "Write docs", 2, TaskStatus::InProgress, Some(7));
        let mut form = task_form();
        form.seed(&TaskSchema::seed(&task));

        assert_eq!(form.value("title"), "Write docs");
        assert_eq!(form.value("status"), "IN_PROGRESS");
        assert_eq!(form.value("projectId"), "2");
        assert_eq!(form.value("developerId"), "7");
        assert_eq!(form.value("description"), "");
        assert!(form.is_valid());
    }

    #[test]
    fn test_project_schema() {
        let mut form = FormState::new(ProjectSchema::FIELDS, &ProjectSchema::defaults());
        assert!(!form.is_valid());
        form.set("name", "Apollo").unwrap();
        assert!(form.is_valid());
        assert_eq!(
            ProjectSchema::draft(&form).unwrap(),
            Draft::Project(ProjectDraft {
                name: "Apollo".to_string(),
                description: None,
            })
        );
        assert_eq!(ProjectSchema::kind(), EntityKind::Project);
    }
}
