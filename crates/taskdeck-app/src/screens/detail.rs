//! Detail screen: one entity, parameterized by the route id

use tracing::{debug, info, warn};

use taskdeck_client::{Mutation, MutationData, Query, QueryData};
use taskdeck_core::{ApiResult, EntityId};

use super::{delete_prompt, CellSlot, Effect, ScreenController, ScreenEntity, ScreenError};
use crate::confirm::Confirm;
use crate::mutation::{DispatchError, MutationDispatcher, MutationOutcome};
use crate::navigation::Route;
use crate::resource::{Completion, ResourceCell};
use crate::snapshot::{ContentSnapshot, DetailSnapshot, ScreenSnapshot};

#[derive(Debug)]
pub struct DetailScreen<E> {
    id: EntityId,
    cell: ResourceCell<E>,
    dispatcher: MutationDispatcher,
    action_error: Option<String>,
}

impl<E: ScreenEntity> DetailScreen<E> {
    pub fn new(id: EntityId) -> Self {
        Self {
            id,
            cell: ResourceCell::new(Query::ById(E::KIND, id)),
            dispatcher: MutationDispatcher::new(),
            action_error: None,
        }
    }

    /// First entry: load the entity for the current id
    pub fn enter(&mut self) -> Effect {
        Effect::fetch(CellSlot::Primary, self.cell.load())
    }

    /// Follow a route id change.
    ///
    /// A new id reparameterizes the cell; any load still in flight for the
    /// old id becomes stale. The same id is a no-op.
    pub fn set_id(&mut self, id: EntityId) -> Option<Effect> {
        if id == self.id {
            return None;
        }
        debug!("{} detail switching from {} to {}", E::KIND, self.id, id);
        self.id = id;
        self.action_error = None;
        let ticket = self.cell.reparameterize(Query::ById(E::KIND, id));
        Some(Effect::fetch(CellSlot::Primary, ticket))
    }

    pub fn reload(&mut self) -> Effect {
        Effect::fetch(CellSlot::Primary, self.cell.reload())
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity(&self) -> Option<&E> {
        self.cell.value()
    }

    pub fn is_loading(&self) -> bool {
        self.cell.is_loading()
    }

    pub fn error(&self) -> Option<&str> {
        self.cell.error()
    }

    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn deleting(&self) -> bool {
        self.dispatcher.is_in_flight()
    }

    pub fn cell(&self) -> &ResourceCell<E> {
        &self.cell
    }

    /// Ask for confirmation, then dispatch a delete of the shown entity
    pub fn delete(&mut self, confirm: &dyn Confirm) -> Result<Option<Effect>, DispatchError> {
        if let Some(ticket) = self.dispatcher.in_flight() {
            return Err(DispatchError::Busy {
                in_flight: ticket.mutation.verb().to_string(),
            });
        }
        let prompt = format!("{} This action cannot be undone.", delete_prompt(E::KIND));
        if !confirm.confirm(&prompt) {
            debug!("Delete of {} {} declined", E::KIND, self.id);
            return Ok(None);
        }

        self.action_error = None;
        let ticket = self
            .dispatcher
            .execute(Mutation::Delete(E::KIND, self.id))?;
        Ok(Some(Effect::Mutate(ticket)))
    }

    pub fn on_fetch(&mut self, generation: u64, result: ApiResult<QueryData>) -> Completion {
        self.cell.complete_query(generation, result)
    }

    /// Leave for the list after a successful delete; stay and surface the
    /// message otherwise
    pub fn on_mutation(
        &mut self,
        ticket: u64,
        result: ApiResult<MutationData>,
    ) -> Option<Effect> {
        match self.dispatcher.settle(ticket, result)? {
            MutationOutcome::Success(_) => {
                info!("Deleted {} {}", E::KIND, self.id);
                Some(Effect::Navigate(Route::List(E::KIND)))
            }
            MutationOutcome::Failure(message) => {
                warn!("Delete of {} {} failed: {}", E::KIND, self.id, message);
                self.action_error = Some(message);
                None
            }
        }
    }
}

impl<E: ScreenEntity> ScreenController for DetailScreen<E> {
    fn route(&self) -> Route {
        Route::Detail(E::KIND, self.id)
    }

    fn enter(&mut self) -> Vec<Effect> {
        vec![DetailScreen::enter(self)]
    }

    fn reenter(&mut self, route: Route) -> Option<Vec<Effect>> {
        match route {
            Route::Detail(kind, id) if kind == E::KIND => Some(self.set_id(id).into_iter().collect()),
            _ => None,
        }
    }

    fn reload(&mut self) -> Vec<Effect> {
        vec![DetailScreen::reload(self)]
    }

    fn on_fetch(
        &mut self,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    ) -> Completion {
        match slot {
            CellSlot::Primary => DetailScreen::on_fetch(self, generation, result),
            other => {
                debug!("Detail screen has no {} cell", other);
                Completion::Stale
            }
        }
    }

    fn on_mutation(&mut self, ticket: u64, result: ApiResult<MutationData>) -> Vec<Effect> {
        DetailScreen::on_mutation(self, ticket, result)
            .into_iter()
            .collect()
    }

    fn snapshot(&self) -> ScreenSnapshot {
        ScreenSnapshot::Detail(DetailSnapshot {
            kind: E::KIND,
            id: self.id,
            content: ContentSnapshot::from_view(self.cell.view()),
            deleting: self.deleting(),
            editable: Route::has_form(E::KIND),
            action_error: self.action_error.clone(),
        })
    }

    fn delete(
        &mut self,
        id: Option<EntityId>,
        confirm: &dyn Confirm,
    ) -> Result<Vec<Effect>, ScreenError> {
        if let Some(id) = id.filter(|id| *id != self.id) {
            debug!("Ignoring id {} on {} detail; deleting {}", id, E::KIND, self.id);
        }
        Ok(DetailScreen::delete(self, confirm)?.into_iter().collect())
    }

    fn edit(&mut self, _id: Option<EntityId>) -> Result<Vec<Effect>, ScreenError> {
        if !Route::has_form(E::KIND) {
            return Err(self.unsupported("edit"));
        }
        Ok(vec![Effect::Navigate(Route::Edit(E::KIND, self.id))])
    }

    /// Back to the list
    fn cancel(&mut self) -> Result<Vec<Effect>, ScreenError> {
        Ok(vec![Effect::Navigate(Route::List(E::KIND))])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confirm::{AutoConfirm, MockConfirm};
    use crate::resource::ResourceStatus;
    use taskdeck_client::test_utils::test_project;
    use taskdeck_core::{ApiError, Developer, EntityKind, Project};

    fn fetch_generation(effect: Effect) -> u64 {
        match effect {
            Effect::Fetch { ticket, .. } => ticket.generation,
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    fn loaded(id: EntityId) -> DetailScreen<Project> {
        let mut screen = DetailScreen::<Project>::new(id);
        let g = fetch_generation(screen.enter());
        screen.on_fetch(g, Ok(QueryData::Project(test_project(id, "Apollo"))));
        screen
    }

    #[test]
    fn test_enter_loads_by_id() {
        let mut screen = DetailScreen::<Project>::new(3);
        match screen.enter() {
            Effect::Fetch { ticket, .. } => {
                assert_eq!(ticket.query, Query::ById(EntityKind::Project, 3))
            }
            other => panic!("expected fetch, got {:?}", other),
        }
    }

    #[test]
    fn test_id_change_discards_in_flight_load() {
        let mut screen = DetailScreen::<Project>::new(1);
        let old = fetch_generation(screen.enter());
        let new = fetch_generation(screen.set_id(2).unwrap());

        assert_eq!(
            screen.on_fetch(old, Ok(QueryData::Project(test_project(1, "Old")))),
            Completion::Stale
        );
        assert!(screen.entity().is_none());

        screen.on_fetch(new, Ok(QueryData::Project(test_project(2, "New"))));
        assert_eq!(screen.entity().map(|p| p.id), Some(2));
    }

    #[test]
    fn test_same_id_is_noop() {
        let mut screen = loaded(1);
        assert!(screen.set_id(1).is_none());
        assert_eq!(screen.cell().status(), ResourceStatus::Loaded);
    }

    #[test]
    fn test_delete_confirm_text() {
        let mut screen = loaded(1);
        let mut confirm = MockConfirm::new();
        confirm
            .expect_confirm()
            .withf(|message| {
                message.to_string()
                    == "Are you sure you want to delete this project? This action cannot be undone."
            })
            .times(1)
            .return_const(false);
        assert_eq!(screen.delete(&confirm).unwrap(), None);
    }

    #[test]
    fn test_delete_success_navigates_to_list() {
        let mut screen = loaded(4);
        let Some(Effect::Mutate(ticket)) = screen.delete(&AutoConfirm(true)).unwrap() else {
            panic!("expected mutation");
        };
        assert_eq!(ticket.mutation, Mutation::Delete(EntityKind::Project, 4));
        let generation = screen.cell().generation();

        let effect = screen.on_mutation(
            ticket.id,
            Ok(MutationData::Deleted {
                kind: EntityKind::Project,
                id: 4,
            }),
        );
        assert_eq!(
            effect,
            Some(Effect::Navigate(Route::List(EntityKind::Project)))
        );
        // No reload of the deleted entity
        assert_eq!(screen.cell().generation(), generation);
    }

    #[test]
    fn test_delete_failure_stays() {
        let mut screen = loaded(4);
        let Some(Effect::Mutate(ticket)) = screen.delete(&AutoConfirm(true)).unwrap() else {
            panic!("expected mutation");
        };
        let effect = screen.on_mutation(ticket.id, Err(ApiError::network("timeout")));
        assert!(effect.is_none());
        assert_eq!(screen.action_error(), Some("Failed to delete project"));
        assert!(screen.entity().is_some());
    }

    #[test]
    fn test_load_failure_message() {
        let mut screen = DetailScreen::<Project>::new(9);
        let g = fetch_generation(screen.enter());
        screen.on_fetch(g, Err(ApiError::network("refused")));
        assert_eq!(screen.error(), Some("Failed to load project details"));
    }

    #[test]
    fn test_reenter_other_id_reparameterizes() {
        let mut screen = loaded(1);
        let effects = screen
            .reenter(Route::Detail(EntityKind::Project, 2))
            .unwrap();
        assert_eq!(effects.len(), 1);
        assert_eq!(screen.id(), 2);
        assert!(screen.reenter(Route::List(EntityKind::Project)).is_none());
    }

    #[test]
    fn test_developer_detail_is_read_only() {
        let mut screen = DetailScreen::<Developer>::new(1);
        assert!(ScreenController::edit(&mut screen, None).is_err());
    }
}
