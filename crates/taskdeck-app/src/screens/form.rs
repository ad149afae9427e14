//! Form screen: create or edit one entity
//!
//! Phases: `AwaitingPrefetch` (edit mode only) -> `Populated` -> `Editing`
//! -> `Submitting` -> `Done`, or back to the pre-submit phase with
//! `submit_error` set.
//!
//! In edit mode every applied prefetch result is copied into the form, so a
//! second load of the same entity overwrites unsaved edits. Results landing
//! while a submit is in flight (or after it succeeded) only update the cell.

use std::collections::BTreeMap;
use std::marker::PhantomData;

use serde::Serialize;
use tracing::{debug, info, warn};

use taskdeck_client::{Mutation, MutationData, Query, QueryData};
use taskdeck_core::{ApiResult, EntityId, EntityKind};

use super::{CellSlot, Effect, ScreenController, ScreenError};
use crate::form::{FormError, FormSchema, FormState};
use crate::mutation::{MutationDispatcher, MutationOutcome};
use crate::navigation::Route;
use crate::resource::{Choice, Completion, ResourceCell, ResourceStatus};
use crate::snapshot::{ContentSnapshot, FormSnapshot, ScreenSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "id")]
pub enum FormMode {
    Create,
    Edit(EntityId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormPhase {
    AwaitingPrefetch,
    Populated,
    Editing,
    Submitting,
    Done,
}

#[derive(Debug)]
pub struct FormScreen<S: FormSchema> {
    mode: FormMode,
    phase: FormPhase,
    /// Phase to return to if the submit fails
    resume_phase: FormPhase,
    form: FormState,
    prefetch: Option<ResourceCell<S::Entity>>,
    projects: Option<ResourceCell<Vec<Choice>>>,
    developers: Option<ResourceCell<Vec<Choice>>>,
    dispatcher: MutationDispatcher,
    _schema: PhantomData<S>,
}

impl<S: FormSchema> FormScreen<S> {
    fn with_mode(mode: FormMode) -> Self {
        let option_cell = |kind: EntityKind| {
            S::OPTIONS
                .contains(&kind)
                .then(|| ResourceCell::new(Query::All(kind)))
        };
        let (phase, prefetch) = match mode {
            FormMode::Create => (FormPhase::Populated, None),
            FormMode::Edit(id) => (
                FormPhase::AwaitingPrefetch,
                Some(
                    ResourceCell::new(Query::ById(S::kind(), id)).with_failure_message(format!(
                        "Failed to load {}. Please try again.",
                        S::kind().noun()
                    )),
                ),
            ),
        };

        Self {
            mode,
            phase,
            resume_phase: phase,
            form: FormState::new(S::FIELDS, &S::defaults()),
            prefetch,
            projects: option_cell(EntityKind::Project),
            developers: option_cell(EntityKind::Developer),
            dispatcher: MutationDispatcher::new(),
            _schema: PhantomData,
        }
    }

    /// Empty form with schema defaults
    pub fn create() -> Self {
        Self::with_mode(FormMode::Create)
    }

    /// Form for an existing entity; values arrive with the prefetch
    pub fn edit(id: EntityId) -> Self {
        Self::with_mode(FormMode::Edit(id))
    }

    /// Start the option loads and, in edit mode, the prefetch
    pub fn enter(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(cell) = self.projects.as_mut() {
            effects.push(Effect::fetch(CellSlot::Projects, cell.load()));
        }
        if let Some(cell) = self.developers.as_mut() {
            effects.push(Effect::fetch(CellSlot::Developers, cell.load()));
        }
        if let Some(cell) = self.prefetch.as_mut() {
            effects.push(Effect::fetch(CellSlot::Primary, cell.load()));
        }
        effects
    }

    /// Load the edited entity again. Its result re-seeds the form.
    pub fn refetch(&mut self) -> Option<Effect> {
        let cell = self.prefetch.as_mut()?;
        Some(Effect::fetch(CellSlot::Primary, cell.reload()))
    }

    pub fn set_field(&mut self, field: &str, value: impl Into<String>) -> Result<(), FormError> {
        self.form.set(field, value)?;
        self.mark_editing();
        Ok(())
    }

    /// Mark a field touched (blur) without changing its value
    pub fn touch(&mut self, field: &str) -> Result<(), FormError> {
        self.form.touch(field)?;
        self.mark_editing();
        Ok(())
    }

    fn mark_editing(&mut self) {
        if matches!(
            self.phase,
            FormPhase::Populated | FormPhase::AwaitingPrefetch
        ) {
            self.phase = FormPhase::Editing;
        }
    }

    /// Validate and dispatch a create or update.
    ///
    /// An invalid form touches every field and sends nothing.
    pub fn submit(&mut self) -> Result<Option<Effect>, ScreenError> {
        if !self.form.is_valid() {
            debug!("{} form invalid, not submitting", S::kind());
            self.form.touch_all();
            return Ok(None);
        }

        let draft = S::draft(&self.form)?;
        let mutation = match self.mode {
            FormMode::Create => Mutation::Create(draft),
            FormMode::Edit(id) => Mutation::Update(id, draft),
        };
        let ticket = self.dispatcher.execute(mutation)?;

        self.form.submitting = true;
        self.form.submit_error = None;
        self.resume_phase = self.phase;
        self.phase = FormPhase::Submitting;
        Ok(Some(Effect::Mutate(ticket)))
    }

    /// Leave without saving
    pub fn cancel(&self) -> Effect {
        Effect::Navigate(Route::List(S::kind()))
    }

    pub fn on_fetch(
        &mut self,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    ) -> Completion {
        match slot {
            CellSlot::Primary => self.on_prefetch(generation, result),
            CellSlot::Projects | CellSlot::Developers => {
                let cell = match slot {
                    CellSlot::Projects => self.projects.as_mut(),
                    _ => self.developers.as_mut(),
                };
                let Some(cell) = cell else {
                    debug!("{} form has no {} options", S::kind(), slot);
                    return Completion::Stale;
                };
                let completion = cell.complete_query(generation, result);
                if let Some(err) = cell.error() {
                    warn!("Loading {} options failed: {}", slot, err);
                }
                completion
            }
        }
    }

    fn on_prefetch(&mut self, generation: u64, result: ApiResult<QueryData>) -> Completion {
        let Some(cell) = self.prefetch.as_mut() else {
            debug!("{} form is not prefetching", S::kind());
            return Completion::Stale;
        };

        let completion = cell.complete_query(generation, result);
        if completion != Completion::Applied || cell.status() != ResourceStatus::Loaded {
            return completion;
        }
        if matches!(self.phase, FormPhase::Submitting | FormPhase::Done) {
            debug!(
                "{} form is {:?}, keeping submitted values (generation {})",
                S::kind(),
                self.phase,
                generation
            );
            return completion;
        }
        if let Some(entity) = cell.value() {
            debug!("Seeding {} form (generation {})", S::kind(), generation);
            self.form.seed(&S::seed(entity));
            self.phase = FormPhase::Populated;
        }
        completion
    }

    /// Navigate to the list on success; keep the inputs and show the error
    /// otherwise
    pub fn on_mutation(
        &mut self,
        ticket: u64,
        result: ApiResult<MutationData>,
    ) -> Option<Effect> {
        let outcome = self.dispatcher.settle(ticket, result)?;
        self.form.submitting = false;

        match outcome {
            MutationOutcome::Success(_) => {
                info!("Saved {} form", S::kind());
                self.phase = FormPhase::Done;
                Some(Effect::Navigate(Route::List(S::kind())))
            }
            MutationOutcome::Failure(message) => {
                warn!("Saving {} form failed: {}", S::kind(), message);
                let verb = match self.mode {
                    FormMode::Create => "create",
                    FormMode::Edit(_) => "update",
                };
                self.form.submit_error = Some(format!(
                    "Failed to {} {}. Please try again.",
                    verb,
                    S::kind().noun()
                ));
                self.phase = self.resume_phase;
                None
            }
        }
    }

    pub fn mode(&self) -> FormMode {
        self.mode
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    pub fn submitting(&self) -> bool {
        self.form.submitting
    }

    pub fn submit_error(&self) -> Option<&str> {
        self.form.submit_error.as_deref()
    }

    pub fn prefetch(&self) -> Option<&ResourceCell<S::Entity>> {
        self.prefetch.as_ref()
    }

    /// Loaded choices for a related kind
    pub fn options(&self, kind: EntityKind) -> &[Choice] {
        let cell = match kind {
            EntityKind::Project => self.projects.as_ref(),
            EntityKind::Developer => self.developers.as_ref(),
            EntityKind::Task => None,
        };
        cell.and_then(ResourceCell::value)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// "Create New Task" / "Edit Task"
    pub fn page_title(&self) -> String {
        match self.mode {
            FormMode::Create => format!("Create New {}", S::kind().title()),
            FormMode::Edit(_) => format!("Edit {}", S::kind().title()),
        }
    }

    /// "Create Task" / "Creating..." / "Update Task" / "Updating..."
    pub fn submit_label(&self) -> String {
        match (self.mode, self.form.submitting) {
            (FormMode::Create, false) => format!("Create {}", S::kind().title()),
            (FormMode::Create, true) => "Creating...".to_string(),
            (FormMode::Edit(_), false) => format!("Update {}", S::kind().title()),
            (FormMode::Edit(_), true) => "Updating...".to_string(),
        }
    }
}

impl<S: FormSchema> ScreenController for FormScreen<S> {
    fn route(&self) -> Route {
        match self.mode {
            FormMode::Create => Route::New(S::kind()),
            FormMode::Edit(id) => Route::Edit(S::kind(), id),
        }
    }

    fn enter(&mut self) -> Vec<Effect> {
        FormScreen::enter(self)
    }

    /// Re-entering the same edit route loads the entity again
    fn reenter(&mut self, route: Route) -> Option<Vec<Effect>> {
        match (route, self.mode) {
            (Route::Edit(kind, id), FormMode::Edit(current)) if kind == S::kind() && id == current => {
                Some(self.refetch().into_iter().collect())
            }
            _ => None,
        }
    }

    fn reload(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if let Some(cell) = self.projects.as_mut() {
            effects.push(Effect::fetch(CellSlot::Projects, cell.reload()));
        }
        if let Some(cell) = self.developers.as_mut() {
            effects.push(Effect::fetch(CellSlot::Developers, cell.reload()));
        }
        effects.extend(self.refetch());
        effects
    }

    fn on_fetch(
        &mut self,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    ) -> Completion {
        FormScreen::on_fetch(self, slot, generation, result)
    }

    fn on_mutation(&mut self, ticket: u64, result: ApiResult<MutationData>) -> Vec<Effect> {
        FormScreen::on_mutation(self, ticket, result)
            .into_iter()
            .collect()
    }

    fn snapshot(&self) -> ScreenSnapshot {
        let mut options = BTreeMap::new();
        if let Some(cell) = &self.projects {
            options.insert("projects", ContentSnapshot::from_view(cell.view()));
        }
        if let Some(cell) = &self.developers {
            options.insert("developers", ContentSnapshot::from_view(cell.view()));
        }

        ScreenSnapshot::Form(FormSnapshot {
            kind: S::kind(),
            mode: self.mode,
            phase: self.phase,
            page_title: self.page_title(),
            submit_label: self.submit_label(),
            fields: self.form.field_views(),
            valid: self.form.is_valid(),
            submitting: self.form.submitting,
            submit_error: self.form.submit_error.clone(),
            prefetch: self
                .prefetch
                .as_ref()
                .map(|cell| ContentSnapshot::from_view(cell.view())),
            options,
        })
    }

    fn set_field(&mut self, field: &str, value: String) -> Result<(), ScreenError> {
        Ok(FormScreen::set_field(self, field, value)?)
    }

    fn touch_field(&mut self, field: &str) -> Result<(), ScreenError> {
        Ok(self.touch(field)?)
    }

    fn submit(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Ok(FormScreen::submit(self)?.into_iter().collect())
    }

    fn cancel(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Ok(vec![FormScreen::cancel(self)])
    }
}
