//! Screen controllers
//!
//! Each controller owns its resource cells, form state, and mutation
//! dispatcher. Controllers never perform I/O; operations return [`Effect`]s
//! that the update loop turns into actions or navigation.
//!
//! - `list`: all entities of a kind, with delete + reload
//! - `detail`: one entity by id, with delete + navigate away
//! - `form`: create/edit with validation and edit-mode prefetch

pub mod detail;
pub mod form;
pub mod list;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use taskdeck_client::{MutationData, QueryData};
use taskdeck_core::{ApiResult, Developer, EntityId, EntityKind, Project, Task};

use crate::confirm::Confirm;
use crate::form::{FormError, ProjectSchema, TaskSchema};
use crate::mutation::{DispatchError, MutationTicket};
use crate::navigation::Route;
use crate::resource::{Completion, FetchTicket, FromQueryData};
use crate::snapshot::ScreenSnapshot;

pub use detail::DetailScreen;
pub use form::{FormMode, FormPhase, FormScreen};
pub use list::ListScreen;

/// Identity of one screen instance.
///
/// A fresh id is assigned every time a screen is opened, so completions
/// addressed to a screen that has since been replaced can be recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScreenId(pub u64);

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "screen-{}", self.0)
    }
}

/// Which cell on a screen a fetch belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CellSlot {
    /// The screen's main cell (list, detail entity, or edit prefetch)
    Primary,
    /// Project choices on a form
    Projects,
    /// Developer choices on a form
    Developers,
}

impl CellSlot {
    pub fn for_options(kind: EntityKind) -> Self {
        match kind {
            EntityKind::Project => CellSlot::Projects,
            EntityKind::Developer | EntityKind::Task => CellSlot::Developers,
        }
    }
}

impl fmt::Display for CellSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellSlot::Primary => write!(f, "primary"),
            CellSlot::Projects => write!(f, "projects"),
            CellSlot::Developers => write!(f, "developers"),
        }
    }
}

/// Work requested by a controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch { slot: CellSlot, ticket: FetchTicket },
    Mutate(MutationTicket),
    Navigate(Route),
}

impl Effect {
    pub fn fetch(slot: CellSlot, ticket: FetchTicket) -> Self {
        Effect::Fetch { slot, ticket }
    }
}

/// Entity shown by list and detail screens
pub trait ScreenEntity:
    FromQueryData + Serialize + Clone + fmt::Debug + Send + Sync + 'static
{
    const KIND: EntityKind;

    fn id(&self) -> EntityId;
}

impl ScreenEntity for Project {
    const KIND: EntityKind = EntityKind::Project;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl ScreenEntity for Task {
    const KIND: EntityKind = EntityKind::Task;

    fn id(&self) -> EntityId {
        self.id
    }
}

impl ScreenEntity for Developer {
    const KIND: EntityKind = EntityKind::Developer;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Confirmation text for deleting an entity of `kind`
pub fn delete_prompt(kind: EntityKind) -> String {
    format!("Are you sure you want to delete this {}?", kind.noun())
}

/// A screen operation that could not be carried out
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScreenError {
    #[error("'{action}' is not available on {route}")]
    Unsupported { action: &'static str, route: Route },

    #[error("'{0}' needs an id on this screen")]
    MissingId(&'static str),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error(transparent)]
    Form(#[from] FormError),
}

/// Operations every screen accepts.
///
/// Defaults reject the operation, so each controller only implements what
/// it supports.
pub trait ScreenController {
    /// Route this screen currently represents
    fn route(&self) -> Route;

    /// Initial loads when the screen is opened
    fn enter(&mut self) -> Vec<Effect>;

    /// Handle navigation to `route` while this screen is open.
    ///
    /// `None` means the route needs a new screen instance.
    fn reenter(&mut self, route: Route) -> Option<Vec<Effect>>;

    fn reload(&mut self) -> Vec<Effect>;

    fn on_fetch(
        &mut self,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    ) -> Completion;

    fn on_mutation(&mut self, ticket: u64, result: ApiResult<MutationData>) -> Vec<Effect>;

    fn snapshot(&self) -> ScreenSnapshot;

    fn delete(
        &mut self,
        _id: Option<EntityId>,
        _confirm: &dyn Confirm,
    ) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("delete"))
    }

    fn view(&mut self, _id: Option<EntityId>) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("view"))
    }

    fn edit(&mut self, _id: Option<EntityId>) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("edit"))
    }

    fn create(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("new"))
    }

    fn set_field(&mut self, _field: &str, _value: String) -> Result<(), ScreenError> {
        Err(self.unsupported("set"))
    }

    fn touch_field(&mut self, _field: &str) -> Result<(), ScreenError> {
        Err(self.unsupported("touch"))
    }

    fn submit(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("submit"))
    }

    fn cancel(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Err(self.unsupported("cancel"))
    }

    fn unsupported(&self, action: &'static str) -> ScreenError {
        ScreenError::Unsupported {
            action,
            route: self.route(),
        }
    }
}

/// The open screen, one variant per route shape and kind
#[derive(Debug)]
pub enum Screen {
    ProjectList(ListScreen<Project>),
    TaskList(ListScreen<Task>),
    DeveloperList(ListScreen<Developer>),
    ProjectDetail(DetailScreen<Project>),
    TaskDetail(DetailScreen<Task>),
    DeveloperDetail(DetailScreen<Developer>),
    ProjectForm(FormScreen<ProjectSchema>),
    TaskForm(FormScreen<TaskSchema>),
}

impl Screen {
    /// Build an unloaded screen for `route`.
    ///
    /// Returns `None` for routes without a screen (developer forms).
    pub fn for_route(route: Route) -> Option<Self> {
        let screen = match route {
            Route::List(EntityKind::Project) => Screen::ProjectList(ListScreen::new()),
            Route::List(EntityKind::Task) => Screen::TaskList(ListScreen::new()),
            Route::List(EntityKind::Developer) => Screen::DeveloperList(ListScreen::new()),
            Route::Detail(EntityKind::Project, id) => Screen::ProjectDetail(DetailScreen::new(id)),
            Route::Detail(EntityKind::Task, id) => Screen::TaskDetail(DetailScreen::new(id)),
            Route::Detail(EntityKind::Developer, id) => {
                Screen::DeveloperDetail(DetailScreen::new(id))
            }
            Route::New(EntityKind::Project) => Screen::ProjectForm(FormScreen::create()),
            Route::New(EntityKind::Task) => Screen::TaskForm(FormScreen::create()),
            Route::Edit(EntityKind::Project, id) => Screen::ProjectForm(FormScreen::edit(id)),
            Route::Edit(EntityKind::Task, id) => Screen::TaskForm(FormScreen::edit(id)),
            Route::New(EntityKind::Developer) | Route::Edit(EntityKind::Developer, _) => {
                return None
            }
        };
        Some(screen)
    }

    pub fn controller(&self) -> &dyn ScreenController {
        match self {
            Screen::ProjectList(s) => s,
            Screen::TaskList(s) => s,
            Screen::DeveloperList(s) => s,
            Screen::ProjectDetail(s) => s,
            Screen::TaskDetail(s) => s,
            Screen::DeveloperDetail(s) => s,
            Screen::ProjectForm(s) => s,
            Screen::TaskForm(s) => s,
        }
    }

    pub fn controller_mut(&mut self) -> &mut dyn ScreenController {
        match self {
            Screen::ProjectList(s) => s,
            Screen::TaskList(s) => s,
            Screen::DeveloperList(s) => s,
            Screen::ProjectDetail(s) => s,
            Screen::TaskDetail(s) => s,
            Screen::DeveloperDetail(s) => s,
            Screen::ProjectForm(s) => s,
            Screen::TaskForm(s) => s,
        }
    }
}
