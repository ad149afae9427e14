//! In-memory backend
//!
//! A stand-in for the remote API that applies the same rules as the real
//! service layer:
//! - unknown ids fail with `NotFound` ("Task not found with id: 4")
//! - a task's project must exist; an assigned developer must belong to the
//!   task's project
//! - project names and developer emails are unique (`Validation`)
//! - a task update only touches title, description, and status
//!
//! Optional latency makes completion order observable, and `fail_next`
//! injects a one-shot failure for tests.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use taskdeck_core::{
    ApiError, ApiResult, Developer, DeveloperDraft, EntityId, EntityKind, Project, ProjectDraft,
    Task, TaskDraft, TaskStatus,
};

use crate::client::EntityClient;
use crate::gateway::ClientSet;

/// Gateway backed by a [`MemoryStore`]
pub type MemoryGateway = ClientSet<ProjectClient, TaskClient, DeveloperClient>;

/// Entity Client operation, recorded for every call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    GetAll,
    GetById,
    Create,
    Update,
    Delete,
}

/// One recorded Entity Client call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Call {
    pub kind: EntityKind,
    pub op: Operation,
}

#[derive(Debug, Default)]
struct Tables {
    projects: BTreeMap<EntityId, Project>,
    tasks: BTreeMap<EntityId, Task>,
    developers: BTreeMap<EntityId, Developer>,
    next_id: EntityId,
    calls: Vec<Call>,
    fail_next: Option<ApiError>,
}

impl Tables {
    fn allocate_id(&mut self) -> EntityId {
        self.next_id += 1;
        self.next_id
    }

    /// Record the call and consume an injected failure, if any
    fn begin(&mut self, kind: EntityKind, op: Operation) -> ApiResult<()> {
        self.calls.push(Call { kind, op });
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn project_view(&self, project: &Project) -> Project {
        let mut view = project.clone();
        view.developer_count = self
            .developers
            .values()
            .filter(|d| d.project_id == Some(project.id))
            .count();
        view.task_count = self
            .tasks
            .values()
            .filter(|t| t.project_id == project.id)
            .count();
        view
    }

    fn task_view(&self, task: &Task) -> Task {
        let mut view = task.clone();
        view.project_name = self.projects.get(&task.project_id).map(|p| p.name.clone());
        view.developer_name = task
            .developer_id
            .and_then(|id| self.developers.get(&id))
            .map(|d| d.name.clone());
        view
    }

    fn developer_view(&self, developer: &Developer) -> Developer {
        let mut view = developer.clone();
        view.project_name = developer
            .project_id
            .and_then(|id| self.projects.get(&id))
            .map(|p| p.name.clone());
        view.task_count = self
            .tasks
            .values()
            .filter(|t| t.developer_id == Some(developer.id))
            .count();
        view
    }

    fn project_name_taken(&self, name: &str, except: Option<EntityId>) -> bool {
        self.projects
            .values()
            .any(|p| p.name == name && Some(p.id) != except)
    }

    fn email_taken(&self, email: &str, except: Option<EntityId>) -> bool {
        self.developers
            .values()
            .any(|d| d.email == email && Some(d.id) != except)
    }
}

fn not_found(kind: EntityKind, id: EntityId) -> ApiError {
    ApiError::not_found(format!("{} not found with id: {}", kind.title(), id))
}

/// Shared in-memory store. Cloning shares the same tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
    latency: Duration,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay every call by `latency` before touching the tables
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Build a gateway whose three clients share this store
    pub fn gateway(&self) -> MemoryGateway {
        ClientSet::new(
            ProjectClient {
                store: self.clone(),
            },
            TaskClient {
                store: self.clone(),
            },
            DeveloperClient {
                store: self.clone(),
            },
        )
    }

    /// Make the next call (of any kind) fail with `err`
    pub async fn fail_next(&self, err: ApiError) {
        self.tables.lock().await.fail_next = Some(err);
    }

    /// Every call made so far, in order
    pub async fn calls(&self) -> Vec<Call> {
        self.tables.lock().await.calls.clone()
    }

    /// Number of calls matching `kind` and `op`
    pub async fn call_count(&self, kind: EntityKind, op: Operation) -> usize {
        self.tables
            .lock()
            .await
            .calls
            .iter()
            .filter(|c| c.kind == kind && c.op == op)
            .count()
    }

    /// Populate the store with a small sample data set.
    ///
    /// Seeding bypasses call recording and injected failures.
    pub async fn seed_demo(&self) {
        let mut t = self.tables.lock().await;
        let now = Utc::now();

        for (name, description) in [
            ("Apollo", Some("Customer portal rewrite")),
            ("Hermes", Some("Notification service")),
        ] {
            let id = t.allocate_id();
            t.projects.insert(
                id,
                Project {
                    id,
                    name: name.to_string(),
                    description: description.map(str::to_string),
                    developer_count: 0,
                    task_count: 0,
                    created_at: Some(now),
                    updated_at: Some(now),
                },
            );
        }
        let project_ids: Vec<_> = t.projects.keys().copied().collect();

        for (name, email, role, project) in [
            ("Ada Lovelace", "ada@example.com", "Backend", project_ids[0]),
            ("Grace Hopper", "grace@example.com", "Frontend", project_ids[1]),
        ] {
            let id = t.allocate_id();
            t.developers.insert(
                id,
                Developer {
                    id,
                    name: name.to_string(),
                    email: email.to_string(),
                    role: Some(role.to_string()),
                    project_id: Some(project),
                    project_name: None,
                    task_count: 0,
                    created_at: Some(now),
                },
            );
        }
        let developer_ids: Vec<_> = t.developers.keys().copied().collect();

        for (title, status, project, developer) in [
            (
                "Set up CI pipeline",
                TaskStatus::Done,
                project_ids[0],
                Some(developer_ids[0]),
            ),
            (
                "Design login page",
                TaskStatus::InProgress,
                project_ids[0],
                None,
            ),
            (
                "Email templates",
                TaskStatus::Todo,
                project_ids[1],
                Some(developer_ids[1]),
            ),
        ] {
            let id = t.allocate_id();
            t.tasks.insert(
                id,
                Task {
                    id,
                    title: title.to_string(),
                    description: None,
                    status,
                    project_id: project,
                    project_name: None,
                    developer_id: developer,
                    developer_name: None,
                    due_date: None,
                    created_at: Some(now),
                    updated_at: Some(now),
                },
            );
        }

        debug!(
            "Seeded memory store: {} projects, {} developers, {} tasks",
            t.projects.len(),
            t.developers.len(),
            t.tasks.len()
        );
    }

    async fn pause(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Projects
// ─────────────────────────────────────────────────────────────────────────────

/// Project client over a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct ProjectClient {
    store: MemoryStore,
}

impl EntityClient for ProjectClient {
    type Entity = Project;
    type Draft = ProjectDraft;

    async fn get_all(&self) -> ApiResult<Vec<Project>> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Project, Operation::GetAll)?;
        Ok(t.projects.values().map(|p| t.project_view(p)).collect())
    }

    async fn get_by_id(&self, id: EntityId) -> ApiResult<Project> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Project, Operation::GetById)?;
        t.projects
            .get(&id)
            .map(|p| t.project_view(p))
            .ok_or_else(|| not_found(EntityKind::Project, id))
    }

    async fn create(&self, draft: ProjectDraft) -> ApiResult<Project> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Project, Operation::Create)?;
        if t.project_name_taken(&draft.name, None) {
            return Err(ApiError::validation(format!(
                "Project with name '{}' already exists",
                draft.name
            )));
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let project = Project {
            id,
            name: draft.name,
            description: draft.description,
            developer_count: 0,
            task_count: 0,
            created_at: Some(now),
            updated_at: Some(now),
        };
        t.projects.insert(id, project.clone());
        Ok(project)
    }

    async fn update(&self, id: EntityId, draft: ProjectDraft) -> ApiResult<Project> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Project, Operation::Update)?;
        if !t.projects.contains_key(&id) {
            return Err(not_found(EntityKind::Project, id));
        }
        if t.project_name_taken(&draft.name, Some(id)) {
            return Err(ApiError::validation(format!(
                "Project with name '{}' already exists",
                draft.name
            )));
        }

        let updated = match t.projects.get_mut(&id) {
            Some(project) => {
                project.name = draft.name;
                project.description = draft.description;
                project.updated_at = Some(Utc::now());
                project.clone()
            }
            None => return Err(not_found(EntityKind::Project, id)),
        };
        Ok(t.project_view(&updated))
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Project, Operation::Delete)?;
        if t.projects.remove(&id).is_none() {
            return Err(not_found(EntityKind::Project, id));
        }
        // Tasks go with their project; developers become unassigned
        t.tasks.retain(|_, task| task.project_id != id);
        for developer in t.developers.values_mut() {
            if developer.project_id == Some(id) {
                developer.project_id = None;
            }
        }
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Task client over a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct TaskClient {
    store: MemoryStore,
}

impl EntityClient for TaskClient {
    type Entity = Task;
    type Draft = TaskDraft;

    async fn get_all(&self) -> ApiResult<Vec<Task>> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Task, Operation::GetAll)?;
        Ok(t.tasks.values().map(|task| t.task_view(task)).collect())
    }

    async fn get_by_id(&self, id: EntityId) -> ApiResult<Task> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Task, Operation::GetById)?;
        t.tasks
            .get(&id)
            .map(|task| t.task_view(task))
            .ok_or_else(|| not_found(EntityKind::Task, id))
    }

    async fn create(&self, draft: TaskDraft) -> ApiResult<Task> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Task, Operation::Create)?;
        if !t.projects.contains_key(&draft.project_id) {
            return Err(not_found(EntityKind::Project, draft.project_id));
        }
        if let Some(developer_id) = draft.developer_id {
            let developer = t
                .developers
                .get(&developer_id)
                .ok_or_else(|| not_found(EntityKind::Developer, developer_id))?;
            if developer.project_id != Some(draft.project_id) {
                return Err(ApiError::validation(
                    "Developer must be assigned to the same project as the task",
                ));
            }
        }

        let id = t.allocate_id();
        let now = Utc::now();
        let task = Task {
            id,
            title: draft.title,
            description: draft.description,
            status: draft.status,
            project_id: draft.project_id,
            project_name: None,
            developer_id: draft.developer_id,
            developer_name: None,
            due_date: None,
            created_at: Some(now),
            updated_at: Some(now),
        };
        t.tasks.insert(id, task.clone());
        Ok(t.task_view(&task))
    }

    async fn update(&self, id: EntityId, draft: TaskDraft) -> ApiResult<Task> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Task, Operation::Update)?;
        let updated = match t.tasks.get_mut(&id) {
            Some(task) => {
                task.title = draft.title;
                task.description = draft.description;
                task.status = draft.status;
                task.updated_at = Some(Utc::now());
                task.clone()
            }
            None => return Err(not_found(EntityKind::Task, id)),
        };
        Ok(t.task_view(&updated))
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Task, Operation::Delete)?;
        t.tasks
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| not_found(EntityKind::Task, id))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Developers
// ─────────────────────────────────────────────────────────────────────────────

/// Developer client over a [`MemoryStore`]
#[derive(Debug, Clone)]
pub struct DeveloperClient {
    store: MemoryStore,
}

impl EntityClient for DeveloperClient {
    type Entity = Developer;
    type Draft = DeveloperDraft;

    async fn get_all(&self) -> ApiResult<Vec<Developer>> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Developer, Operation::GetAll)?;
        Ok(t.developers.values().map(|d| t.developer_view(d)).collect())
    }

    async fn get_by_id(&self, id: EntityId) -> ApiResult<Developer> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Developer, Operation::GetById)?;
        t.developers
            .get(&id)
            .map(|d| t.developer_view(d))
            .ok_or_else(|| not_found(EntityKind::Developer, id))
    }

    async fn create(&self, draft: DeveloperDraft) -> ApiResult<Developer> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Developer, Operation::Create)?;
        if t.email_taken(&draft.email, None) {
            return Err(ApiError::validation(format!(
                "Developer with email '{}' already exists",
                draft.email
            )));
        }
        if let Some(project_id) = draft.project_id {
            if !t.projects.contains_key(&project_id) {
                return Err(not_found(EntityKind::Project, project_id));
            }
        }

        let id = t.allocate_id();
        let developer = Developer {
            id,
            name: draft.name,
            email: draft.email,
            role: draft.role,
            project_id: draft.project_id,
            project_name: None,
            task_count: 0,
            created_at: Some(Utc::now()),
        };
        t.developers.insert(id, developer.clone());
        Ok(t.developer_view(&developer))
    }

    async fn update(&self, id: EntityId, draft: DeveloperDraft) -> ApiResult<Developer> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Developer, Operation::Update)?;
        if !t.developers.contains_key(&id) {
            return Err(not_found(EntityKind::Developer, id));
        }
        if t.email_taken(&draft.email, Some(id)) {
            return Err(ApiError::validation(format!(
                "Developer with email '{}' already exists",
                draft.email
            )));
        }

        let updated = match t.developers.get_mut(&id) {
            Some(developer) => {
                developer.name = draft.name;
                developer.email = draft.email;
                developer.role = draft.role;
                developer.clone()
            }
            None => return Err(not_found(EntityKind::Developer, id)),
        };
        Ok(t.developer_view(&updated))
    }

    async fn delete(&self, id: EntityId) -> ApiResult<()> {
        self.store.pause().await;
        let mut t = self.store.tables.lock().await;
        t.begin(EntityKind::Developer, Operation::Delete)?;
        if t.developers.remove(&id).is_none() {
            return Err(not_found(EntityKind::Developer, id));
        }
        for task in t.tasks.values_mut() {
            if task.developer_id == Some(id) {
                task.developer_id = None;
            }
        }
        Ok(())
    }
}
