//! Gateway: routes kind-tagged queries and mutations to the per-kind clients
//!
//! The app layer describes work as plain data ([`Query`], [`Mutation`]) so
//! that update handlers stay free of I/O. The gateway is the only place that
//! turns those descriptions into Entity Client calls.

use std::fmt;

use taskdeck_core::{
    ApiResult, Developer, DeveloperDraft, EntityId, EntityKind, Project, ProjectDraft, Task,
    TaskDraft,
};

use crate::client::EntityClient;

// ─────────────────────────────────────────────────────────────────────────────
// Queries
// ─────────────────────────────────────────────────────────────────────────────

/// A read request bound to a resource cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Query {
    /// `get_all()` for a kind
    All(EntityKind),
    /// `get_by_id(id)` for a kind
    ById(EntityKind, EntityId),
}

impl Query {
    pub fn kind(&self) -> EntityKind {
        match self {
            Query::All(kind) | Query::ById(kind, _) => *kind,
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::All(kind) => write!(f, "{}.get_all", kind.noun()),
            Query::ById(kind, id) => write!(f, "{}.get_by_id({})", kind.noun(), id),
        }
    }
}

/// Successful query payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryData {
    Projects(Vec<Project>),
    Project(Project),
    Tasks(Vec<Task>),
    Task(Task),
    Developers(Vec<Developer>),
    Developer(Developer),
}

// ─────────────────────────────────────────────────────────────────────────────
// Mutations
// ─────────────────────────────────────────────────────────────────────────────

/// Create/update payload for any kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    Project(ProjectDraft),
    Task(TaskDraft),
    Developer(DeveloperDraft),
}

impl Draft {
    pub fn kind(&self) -> EntityKind {
        match self {
            Draft::Project(_) => EntityKind::Project,
            Draft::Task(_) => EntityKind::Task,
            Draft::Developer(_) => EntityKind::Developer,
        }
    }
}

/// A write request executed by the mutation dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    Create(Draft),
    Update(EntityId, Draft),
    Delete(EntityKind, EntityId),
}

impl Mutation {
    pub fn kind(&self) -> EntityKind {
        match self {
            Mutation::Create(draft) | Mutation::Update(_, draft) => draft.kind(),
            Mutation::Delete(kind, _) => *kind,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            Mutation::Create(_) => "create",
            Mutation::Update(..) => "update",
            Mutation::Delete(..) => "delete",
        }
    }

    /// Message shown when the backend gives nothing more specific
    /// ("Failed to delete project")
    pub fn failure_fallback(&self) -> String {
        format!("Failed to {} {}", self.verb(), self.kind().noun())
    }
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mutation::Create(draft) => write!(f, "{}.create", draft.kind().noun()),
            Mutation::Update(id, draft) => write!(f, "{}.update({})", draft.kind().noun(), id),
            Mutation::Delete(kind, id) => write!(f, "{}.delete({})", kind.noun(), id),
        }
    }
}

/// A single saved entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Project(Project),
    Task(Task),
    Developer(Developer),
}

impl Record {
    pub fn id(&self) -> EntityId {
        match self {
            Record::Project(p) => p.id,
            Record::Task(t) => t.id,
            Record::Developer(d) => d.id,
        }
    }
}

/// Successful mutation payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationData {
    Created(Record),
    Updated(Record),
    Deleted { kind: EntityKind, id: EntityId },
}

// ─────────────────────────────────────────────────────────────────────────────
// Gateway
// ─────────────────────────────────────────────────────────────────────────────

/// Executes queries and mutations against the backend
#[trait_variant::make(Gateway: Send)]
pub trait LocalGateway {
    async fn fetch(&self, query: Query) -> ApiResult<QueryData>;

    async fn mutate(&self, mutation: Mutation) -> ApiResult<MutationData>;
}

/// Gateway over one Entity Client per kind
#[derive(Debug, Clone)]
pub struct ClientSet<P, T, D> {
    pub projects: P,
    pub tasks: T,
    pub developers: D,
}

impl<P, T, D> ClientSet<P, T, D> {
    pub fn new(projects: P, tasks: T, developers: D) -> Self {
        Self {
            projects,
            tasks,
            developers,
        }
    }
}

impl<P, T, D> Gateway for ClientSet<P, T, D>
where
    P: EntityClient<Entity = Project, Draft = ProjectDraft> + Sync,
    T: EntityClient<Entity = Task, Draft = TaskDraft> + Sync,
    D: EntityClient<Entity = Developer, Draft = DeveloperDraft> + Sync,
{
    async fn fetch(&self, query: Query) -> ApiResult<QueryData> {
        let data = match query {
            Query::All(EntityKind::Project) => QueryData::Projects(self.projects.get_all().await?),
            Query::All(EntityKind::Task) => QueryData::Tasks(self.tasks.get_all().await?),
            Query::All(EntityKind::Developer) => {
                QueryData::Developers(self.developers.get_all().await?)
            }
            Query::ById(EntityKind::Project, id) => {
                QueryData::Project(self.projects.get_by_id(id).await?)
            }
            Query::ById(EntityKind::Task, id) => QueryData::Task(self.tasks.get_by_id(id).await?),
            Query::ById(EntityKind::Developer, id) => {
                QueryData::Developer(self.developers.get_by_id(id).await?)
            }
        };
        Ok(data)
    }

    async fn mutate(&self, mutation: Mutation) -> ApiResult<MutationData> {
        let data = match mutation {
            Mutation::Create(Draft::Project(draft)) => {
                MutationData::Created(Record::Project(self.projects.create(draft).await?))
            }
            Mutation::Create(Draft::Task(draft)) => {
                MutationData::Created(Record::Task(self.tasks.create(draft).await?))
            }
            Mutation::Create(Draft::Developer(draft)) => {
                MutationData::Created(Record::Developer(self.developers.create(draft).await?))
            }
            Mutation::Update(id, Draft::Project(draft)) => {
                MutationData::Updated(Record::Project(self.projects.update(id, draft).await?))
            }
            Mutation::Update(id, Draft::Task(draft)) => {
                MutationData::Updated(Record::Task(self.tasks.update(id, draft).await?))
            }
            Mutation::Update(id, Draft::Developer(draft)) => {
                MutationData::Updated(Record::Developer(self.developers.update(id, draft).await?))
            }
            Mutation::Delete(kind, id) => {
                match kind {
                    EntityKind::Project => self.projects.delete(id).await?,
                    EntityKind::Task => self.tasks.delete(id).await?,
                    EntityKind::Developer => self.developers.delete(id).await?,
                }
                MutationData::Deleted { kind, id }
            }
        };
        Ok(data)
    }
}
