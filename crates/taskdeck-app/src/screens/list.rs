//! List screen: every entity of one kind
//!
//! After a successful delete the list is refetched from the backend; rows are
//! never spliced out locally.

use tracing::{debug, info, warn};

use taskdeck_client::{Mutation, MutationData, Query, QueryData};
use taskdeck_core::{ApiResult, EntityId};

use super::{delete_prompt, CellSlot, Effect, ScreenController, ScreenEntity, ScreenError};
use crate::confirm::Confirm;
use crate::mutation::{DispatchError, MutationDispatcher, MutationOutcome};
use crate::navigation::Route;
use crate::resource::{Completion, FromQueryData, ResourceCell};
use crate::snapshot::{ContentSnapshot, ListSnapshot, ScreenSnapshot};

#[derive(Debug)]
pub struct ListScreen<E> {
    cell: ResourceCell<Vec<E>>,
    dispatcher: MutationDispatcher,
    action_error: Option<String>,
}

impl<E: ScreenEntity> Default for ListScreen<E>
where
    Vec<E>: FromQueryData,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ScreenEntity> ListScreen<E>
where
    Vec<E>: FromQueryData,
{
    pub fn new() -> Self {
        Self {
            cell: ResourceCell::new(Query::All(E::KIND)),
            dispatcher: MutationDispatcher::new(),
            action_error: None,
        }
    }

    pub fn load(&mut self) -> Effect {
        Effect::fetch(CellSlot::Primary, self.cell.load())
    }

    /// Refetch everything, even when already loaded
    pub fn reload(&mut self) -> Effect {
        Effect::fetch(CellSlot::Primary, self.cell.reload())
    }

    pub fn is_loading(&self) -> bool {
        self.cell.is_loading()
    }

    /// Loaded rows. Empty unless the latest load succeeded.
    pub fn items(&self) -> &[E] {
        self.cell.loaded().map(Vec::as_slice).unwrap_or(&[])
    }

    /// Load failure message
    pub fn error(&self) -> Option<&str> {
        self.cell.error()
    }

    /// Last delete failure message
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    /// Whether a delete is in flight
    pub fn deleting(&self) -> bool {
        self.dispatcher.is_in_flight()
    }

    pub fn cell(&self) -> &ResourceCell<Vec<E>> {
        &self.cell
    }

    /// Ask for confirmation, then dispatch a delete.
    ///
    /// Returns `Ok(None)` when the user declines.
    pub fn delete(
        &mut self,
        id: EntityId,
        confirm: &dyn Confirm,
    ) -> Result<Option<Effect>, DispatchError> {
        if let Some(ticket) = self.dispatcher.in_flight() {
            return Err(DispatchError::Busy {
                in_flight: ticket.mutation.verb().to_string(),
            });
        }
        if !confirm.confirm(&delete_prompt(E::KIND)) {
            debug!("Delete of {} {} declined", E::KIND, id);
            return Ok(None);
        }

        self.action_error = None;
        let ticket = self.dispatcher.execute(Mutation::Delete(E::KIND, id))?;
        Ok(Some(Effect::Mutate(ticket)))
    }

    pub fn on_fetch(&mut self, generation: u64, result: ApiResult<QueryData>) -> Completion {
        self.cell.complete_query(generation, result)
    }

    /// Reload after a successful delete; surface the message otherwise
    pub fn on_mutation(
        &mut self,
        ticket: u64,
        result: ApiResult<MutationData>,
    ) -> Option<Effect> {
        match self.dispatcher.settle(ticket, result)? {
            MutationOutcome::Success(data) => {
                info!("{:?} succeeded, reloading {} list", data, E::KIND);
                Some(self.reload())
            }
            MutationOutcome::Failure(message) => {
                warn!("Delete failed on {} list: {}", E::KIND, message);
                self.action_error = Some(message);
                None
            }
        }
    }
}

impl<E: ScreenEntity> ScreenController for ListScreen<E>
where
    Vec<E>: FromQueryData,
{
    fn route(&self) -> Route {
        Route::List(E::KIND)
    }

    fn enter(&mut self) -> Vec<Effect> {
        vec![self.load()]
    }

    fn reenter(&mut self, route: Route) -> Option<Vec<Effect>> {
        (route == self.route()).then(|| vec![ListScreen::reload(self)])
    }

    fn reload(&mut self) -> Vec<Effect> {
        vec![ListScreen::reload(self)]
    }

    fn on_fetch(
        &mut self,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    ) -> Completion {
        match slot {
            CellSlot::Primary => ListScreen::on_fetch(self, generation, result),
            other => {
                debug!("List screen has no {} cell", other);
                Completion::Stale
            }
        }
    }

    fn on_mutation(&mut self, ticket: u64, result: ApiResult<MutationData>) -> Vec<Effect> {
        ListScreen::on_mutation(self, ticket, result)
            .into_iter()
            .collect()
    }

    fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot::List(ListSnapshot {
            kind: E::KIND,
            content: ContentSnapshot::from_view(self.cell.view()),
            deleting: self.deleting(),
            action_error: self.action_error.clone(),
        })
    }

    fn delete(
        &mut self,
        id: Option<EntityId>,
        confirm: &dyn Confirm,
    ) -> Result<Vec<Effect>, ScreenError> {
        let id = id.ok_or(ScreenError::MissingId("delete"))?;
        Ok(ListScreen::delete(self, id, confirm)?.into_iter().collect())
    }

    fn view(&mut self, id: Option<EntityId>) -> Result<Vec<Effect>, ScreenError> {
        let id = id.ok_or(ScreenError::MissingId("view"))?;
        Ok(vec![Effect::Navigate(Route::Detail(E::KIND, id))])
    }

    fn edit(&mut self, id: Option<EntityId>) -> Result<Vec<Effect>, ScreenError> {
        if !Route::has_form(E::KIND) {
            return Err(self.unsupported("edit"));
        }
        let id = id.ok_or(ScreenError::MissingId("edit"))?;
        Ok(vec![Effect::Navigate(Route::Edit(E::KIND, id))])
    }

    fn create(&mut self) -> Result<Vec<Effect>, ScreenError> {
        if !Route::has_form(E::KIND) {
            return Err(self.unsupported("new"));
        }
        Ok(vec![Effect::Navigate(Route::New(E::KIND))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AutoConfirm, MockConfirm};
    use taskdeck_client::test_utils::test_project;
    use taskdeck_core::{ApiError, Developer, EntityKind, Project};

    fn loaded_projects() -> ListScreen<Project> {
        let mut screen = ListScreen::<Project>::new();
        let Effect::Fetch { ticket, .. } = screen.load() else {
            panic!("expected fetch");
        };
        screen.on_fetch(
            ticket.generation,
            Ok(QueryData::Projects(vec![
                test_project(1, "Apollo"),
                test_project(2, "Hermes"),
            ])),
        );
        screen
    }

    #[test]
    fn test_items_empty_until_loaded() {
        let mut screen = ListScreen::<Project>::new();
        screen.load();
        assert!(screen.is_loading());
        assert!(screen.items().is_empty());
    }

    #[test]
    fn test_items_empty_after_failed_reload() {
        let mut screen = loaded_projects();
        assert_eq!(screen.items().len(), 2);

        let Effect::Fetch { ticket, .. } = screen.reload() else {
            panic!("expected fetch");
        };
        screen.on_fetch(ticket.generation, Err(ApiError::network("down")));
        assert!(screen.items().is_empty());
        assert_eq!(screen.error(), Some("Failed to load projects"));
    }

    #[test]
    fn test_delete_asks_for_confirmation() {
        let mut screen = loaded_projects();
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .withf(|message| message.to_string() == "Are you sure you want to delete this project?")
            .times(1)
            .return_const(false);

        let effect = screen.delete(1, &confirm).unwrap();
        assert!(effect.is_none());
        assert!(!screen.deleting());
    }

    #[test]
    fn test_delete_success_reloads() {
        let mut screen = loaded_projects();
        let Some(Effect::Mutate(ticket)) = screen.delete(2, &AutoConfirm(true)).unwrap() else {
            panic!("expected mutation");
        };
        assert_eq!(ticket.mutation, Mutation::Delete(EntityKind::Project, 2));
        assert!(screen.deleting());
        let before = screen.cell().generation();

        let effect = screen.on_mutation(
            ticket.id,
            Ok(MutationData::Deleted {
                kind: EntityKind::Project,
                id: 2,
            }),
        );
        match effect {
            Some(Effect::Fetch { slot, ticket }) => {
                assert_eq!(slot, CellSlot::Primary);
                assert_eq!(ticket.query, Query::All(EntityKind::Project));
                assert_eq!(ticket.generation, before + 1);
            }
            other => panic!("expected reload, got {:?}", other),
        }
        // Rows stay until the refetch lands
        assert_eq!(screen.cell().value().map(Vec::len), Some(2));
    }

    #[test]
    fn test_delete_failure_keeps_list() {
        let mut screen = loaded_projects();
        let Some(Effect::Mutate(ticket)) = screen.delete(2, &AutoConfirm(true)).unwrap() else {
            panic!("expected mutation");
        };
        let effect = screen.on_mutation(ticket.id, Err(ApiError::network("reset")));
        assert!(effect.is_none());
        assert_eq!(screen.action_error(), Some("Failed to delete project"));
        assert_eq!(screen.items().len(), 2);
        assert!(!screen.deleting());
    }

    #[test]
    fn test_second_delete_rejected_while_first_in_flight() {
        let mut screen = loaded_projects();
        screen.delete(1, &AutoConfirm(true)).unwrap();

        let mut confirm = MockConfirm::new();
        confirm.expect_confirm().times(0);
        let err = screen.delete(2, &confirm).unwrap_err();
        assert!(matches!(err, DispatchError::Busy { .. }));
    }

    #[test]
    fn test_developer_list_has_no_forms() {
        let mut screen = ListScreen::<Developer>::new();
        screen.load();
        assert!(ScreenController::create(&mut screen).is_err());
        assert!(ScreenController::edit(&mut screen, Some(1)).is_err());
        assert_eq!(
            ScreenController::view(&mut screen, Some(4)).unwrap(),
            vec![Effect::Navigate(Route::Detail(EntityKind::Developer, 4))]
        );
    }
}
