//! Resource cell: the state of one asynchronous fetch
//!
//! A cell never performs I/O itself. `load()` returns a [`FetchTicket`] that
//! the runtime executes; the outcome comes back through `complete()` tagged
//! with the generation captured at load time. Only the latest generation is
//! applied, so completions are ordered by generation rather than arrival.

use serde::Serialize;
use tracing::{debug, trace};

use taskdeck_client::{Query, QueryData};
use taskdeck_core::{ApiResult, Developer, EntityId, Project, Task};

/// Lifecycle of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceStatus {
    #[default]
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// A fetch to execute on behalf of a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub query: Query,
    pub generation: u64,
}

/// Whether a completion was applied or dropped as stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

/// Extract a typed value from a query payload.
///
/// Returns `None` when the payload belongs to a different query.
pub trait FromQueryData: Sized {
    fn from_query_data(data: QueryData) -> Option<Self>;
}

impl FromQueryData for Project {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Project(p) => Some(p),
            _ => None,
        }
    }
}

impl FromQueryData for Task {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Task(t) => Some(t),
            _ => None,
        }
    }
}

impl FromQueryData for Developer {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Developer(d) => Some(d),
            _ => None,
        }
    }
}

impl FromQueryData for Vec<Project> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Projects(p) => Some(p),
            _ => None,
        }
    }
}

impl FromQueryData for Vec<Task> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Tasks(t) => Some(t),
            _ => None,
        }
    }
}

impl FromQueryData for Vec<Developer> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Developers(d) => Some(d),
            _ => None,
        }
    }
}

/// A selectable option in a form (project or developer picker)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Choice {
    pub id: EntityId,
    pub label: String,
}

impl FromQueryData for Vec<Choice> {
    fn from_query_data(data: QueryData) -> Option<Self> {
        match data {
            QueryData::Projects(projects) => Some(
                projects
                    .into_iter()
                    .map(|p| Choice {
                        id: p.id,
                        label: p.name,
                    })
                    .collect(),
            ),
            QueryData::Developers(developers) => Some(
                developers
                    .into_iter()
                    .map(|d| Choice {
                        id: d.id,
                        label: d.name,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }
}

/// Fallback shown when a load fails without a usable backend message
pub fn load_failure_fallback(query: &Query) -> String {
    match query {
        Query::All(kind) => format!("Failed to load {}", kind.segment()),
        Query::ById(kind, _) => format!("Failed to load {} details", kind.noun()),
    }
}

/// What the render layer should show for a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceView<'a, T> {
    /// Nothing requested yet
    Idle,
    /// Loading with nothing to show yet
    Spinner,
    /// Data is available. `refreshing` while a reload is in flight,
    /// `banner` when the latest load failed.
    Content {
        value: &'a T,
        refreshing: bool,
        banner: Option<&'a str>,
    },
    /// Failed with no data to fall back on
    Error { message: &'a str },
}

/// State of one asynchronous fetch bound to a query
#[derive(Debug, Clone)]
pub struct ResourceCell<T> {
    query: Query,
    status: ResourceStatus,
    value: Option<T>,
    error: Option<String>,
    generation: u64,
    failure_message: Option<String>,
}

impl<T> ResourceCell<T> {
    /// Create an idle cell for `query`. Nothing is fetched until `load()`.
    pub fn new(query: Query) -> Self {
        Self {
            query,
            status: ResourceStatus::Idle,
            value: None,
            error: None,
            generation: 0,
            failure_message: None,
        }
    }

    /// Show `message` for every failed load instead of the backend's text
    pub fn with_failure_message(mut self, message: impl Into<String>) -> Self {
        self.failure_message = Some(message.into());
        self
    }

    /// Start a fetch for the current query.
    ///
    /// The previously loaded value stays available until the new result
    /// arrives; any earlier in-flight generation becomes stale.
    pub fn load(&mut self) -> FetchTicket {
        self.generation += 1;
        self.status = ResourceStatus::Loading;
        self.error = None;
        debug!("Loading {} (generation {})", self.query, self.generation);
        FetchTicket {
            query: self.query,
            generation: self.generation,
        }
    }

    /// Same as `load()`. Always re-executes, even when already loaded.
    pub fn reload(&mut self) -> FetchTicket {
        self.load()
    }

    /// Bind a new query and load it. The old query's value is dropped.
    pub fn reparameterize(&mut self, query: Query) -> FetchTicket {
        self.query = query;
        self.value = None;
        self.load()
    }

    /// Apply a fetch result if `generation` is still current
    pub fn complete(&mut self, generation: u64, result: ApiResult<T>) -> Completion {
        if generation != self.generation {
            trace!(
                "Dropping stale result for {} (generation {}, current {})",
                self.query,
                generation,
                self.generation
            );
            return Completion::Stale;
        }

        match result {
            Ok(value) => {
                self.value = Some(value);
                self.error = None;
                self.status = ResourceStatus::Loaded;
            }
            Err(e) => {
                debug!(kind = e.kind(), "Load of {} failed: {}", self.query, e);
                self.error = Some(match &self.failure_message {
                    Some(message) => message.clone(),
                    None => e.user_message(&load_failure_fallback(&self.query)),
                });
                self.status = ResourceStatus::Failed;
            }
        }
        Completion::Applied
    }

    pub fn query(&self) -> Query {
        self.query
    }

    pub fn status(&self) -> ResourceStatus {
        self.status
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.status == ResourceStatus::Loading
    }

    /// Last successfully loaded value, including while reloading or failed
    pub fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// Value only when the latest load succeeded
    pub fn loaded(&self) -> Option<&T> {
        match self.status {
            ResourceStatus::Loaded => self.value.as_ref(),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn view(&self) -> ResourceView<'_, T> {
        match (&self.value, self.status) {
            (_, ResourceStatus::Idle) if self.value.is_none() => ResourceView::Idle,
            (Some(value), status) => ResourceView::Content {
                value,
                refreshing: status == ResourceStatus::Loading,
                banner: self.error.as_deref(),
            },
            (None, ResourceStatus::Failed) => ResourceView::Error {
                message: self.error.as_deref().unwrap_or_default(),
            },
            (None, _) => ResourceView::Spinner,
        }
    }
}

impl<T: FromQueryData> ResourceCell<T> {
    /// Apply a raw gateway result.
    ///
    /// A payload of the wrong shape is treated as a failed load.
    pub fn complete_query(&mut self, generation: u64, result: ApiResult<QueryData>) -> Completion {
        let query = self.query;
        let typed = result.and_then(|data| {
            T::from_query_data(data).ok_or_else(|| {
                taskdeck_core::ApiError::network(format!("unexpected response to {}", query))
            })
        });
        self.complete(generation, typed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_client::test_utils::{test_project, test_task};
    use taskdeck_core::{ApiError, EntityKind};

    fn task_list() -> ResourceCell<Vec<Task>> {
        ResourceCell::new(Query::All(EntityKind::Task))
    }

    #[test]
    fn test_new_cell_is_idle() {
        let cell = task_list();
        assert_eq!(cell.status(), ResourceStatus::Idle);
        assert_eq!(cell.generation(), 0);
        assert!(cell.value().is_none());
        assert_eq!(cell.view(), ResourceView::Idle);
    }

    #[test]
    fn test_load_increments_generation() {
        let mut cell = task_list();
        let first = cell.load();
        let second = cell.reload();
        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert_eq!(second.query, Query::All(EntityKind::Task));
        assert!(cell.is_loading());
    }

    #[test]
    fn test_out_of_order_completions_keep_latest() {
        let mut cell = task_list();
        let g1 = cell.load().generation;
        let g2 = cell.reload().generation;
        let g3 = cell.reload().generation;

        let v3 = vec![test_task(3, "third", 1)];
        assert_eq!(cell.complete(g3, Ok(v3.clone())), Completion::Applied);
        assert_eq!(
            cell.complete(g1, Ok(vec![test_task(1, "first", 1)])),
            Completion::Stale
        );
        assert_eq!(
            cell.complete(g2, Err(ApiError::network("timeout"))),
            Completion::Stale
        );

        assert_eq!(cell.status(), ResourceStatus::Loaded);
        assert_eq!(cell.value(), Some(&v3));
        assert!(cell.error().is_none());
    }

    #[test]
    fn test_failure_keeps_previous_value() {
        let mut cell = task_list();
        let g = cell.load().generation;
        cell.complete(g, Ok(vec![test_task(1, "kept", 1)]));

        let g = cell.reload().generation;
        cell.complete(g, Err(ApiError::network("connection refused")));

        assert_eq!(cell.status(), ResourceStatus::Failed);
        assert_eq!(cell.error(), Some("Failed to load tasks"));
        assert_eq!(cell.value().map(Vec::len), Some(1));
        assert!(cell.loaded().is_none());
    }

    #[test]
    fn test_not_found_uses_backend_message() {
        let mut cell: ResourceCell<Task> = ResourceCell::new(Query::ById(EntityKind::Task, 9));
        let g = cell.load().generation;
        cell.complete(g, Err(ApiError::not_found("Task not found with id: 9")));
        assert_eq!(cell.error(), Some("Task not found with id: 9"));
        assert_eq!(
            cell.view(),
            ResourceView::Error {
                message: "Task not found with id: 9"
            }
        );
    }

    #[test]
    fn test_load_clears_error_but_keeps_value() {
        let mut cell: ResourceCell<Project> =
            ResourceCell::new(Query::ById(EntityKind::Project, 1));
        let g = cell.load().generation;
        cell.complete(g, Ok(test_project(1, "Apollo")));
        let g = cell.reload().generation;
        cell.complete(g, Err(ApiError::network("down")));
        assert_eq!(cell.error(), Some("Failed to load project details"));

        cell.reload();
        assert!(cell.error().is_none());
        assert!(matches!(
            cell.view(),
            ResourceView::Content {
                refreshing: true,
                banner: None,
                ..
            }
        ));
    }

    #[test]
    fn test_reparameterize_drops_old_value_and_stales_old_load() {
        let mut cell: ResourceCell<Task> = ResourceCell::new(Query::ById(EntityKind::Task, 1));
        let g1 = cell.load().generation;
        cell.complete(g1, Ok(test_task(1, "one", 1)));

        let pending = cell.reload().generation;
        let ticket = cell.reparameterize(Query::ById(EntityKind::Task, 2));
        assert_eq!(ticket.query, Query::ById(EntityKind::Task, 2));
        assert!(cell.value().is_none());
        assert_eq!(cell.view(), ResourceView::Spinner);

        assert_eq!(
            cell.complete(pending, Ok(test_task(1, "one", 1))),
            Completion::Stale
        );
        cell.complete(ticket.generation, Ok(test_task(2, "two", 1)));
        assert_eq!(cell.value().map(|t| t.id), Some(2));
    }

    #[test]
    fn test_view_shows_banner_alongside_data() {
        let mut cell = task_list();
        let g = cell.load().generation;
        cell.complete(g, Ok(vec![]));
        let g = cell.reload().generation;
        cell.complete(g, Err(ApiError::network("reset")));

        match cell.view() {
            ResourceView::Content {
                refreshing, banner, ..
            } => {
                assert!(!refreshing);
                assert_eq!(banner, Some("Failed to load tasks"));
            }
            other => panic!("expected content, got {:?}", other),
        }
    }

    #[test]
    fn test_failure_message_override() {
        let mut cell: ResourceCell<Task> = ResourceCell::new(Query::ById(EntityKind::Task, 9))
            .with_failure_message("Failed to load task. Please try again.");
        let g = cell.load().generation;
        cell.complete(g, Err(ApiError::not_found("Task not found with id: 9")));
        assert_eq!(cell.error(), Some("Failed to load task. Please try again."));
    }

    #[test]
    fn test_complete_query_rejects_mismatched_payload() {
        let mut cell = task_list();
        let g = cell.load().generation;
        cell.complete_query(g, Ok(QueryData::Projects(vec![])));
        assert_eq!(cell.status(), ResourceStatus::Failed);
    }

    #[test]
    fn test_choices_from_projects() {
        let data = QueryData::Projects(vec![test_project(1, "Apollo"), test_project(2, "Hermes")]);
        let choices = Vec::<Choice>::from_query_data(data).unwrap();
        assert_eq!(
            choices,
            vec![
                Choice {
                    id: 1,
                    label: "Apollo".to_string()
                },
                Choice {
                    id: 2,
                    label: "Hermes".to_string()
                }
            ]
        );
    }
}
