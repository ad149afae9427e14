//! Mutation dispatcher: single-flight create/update/delete
//!
//! The dispatcher only tracks whether a mutation is in flight and turns the
//! result into an outcome. It never touches resource cells; the owning
//! screen decides whether to reload or navigate.

use thiserror::Error;
use tracing::{debug, warn};

use taskdeck_client::{Mutation, MutationData};
use taskdeck_core::ApiResult;

/// Rejection of a mutation request
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Another {in_flight} is still in progress")]
    Busy { in_flight: String },
}

/// A mutation to execute, identified for settlement
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationTicket {
    pub id: u64,
    pub mutation: Mutation,
}

/// Result of a settled mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    Success(MutationData),
    /// User-facing failure message
    Failure(String),
}

#[derive(Debug, Default)]
pub struct MutationDispatcher {
    next_id: u64,
    in_flight: Option<MutationTicket>,
}

impl MutationDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the dispatcher for `mutation`.
    ///
    /// Rejected without queuing while another mutation is unsettled.
    pub fn execute(&mut self, mutation: Mutation) -> Result<MutationTicket, DispatchError> {
        if let Some(current) = &self.in_flight {
            debug!("Rejecting {}: {} in flight", mutation, current.mutation);
            return Err(DispatchError::Busy {
                in_flight: current.mutation.verb().to_string(),
            });
        }

        self.next_id += 1;
        let ticket = MutationTicket {
            id: self.next_id,
            mutation,
        };
        debug!("Dispatching {} (ticket {})", ticket.mutation, ticket.id);
        self.in_flight = Some(ticket.clone());
        Ok(ticket)
    }

    /// Release the dispatcher and map the result.
    ///
    /// Returns `None` for a ticket that is not the one in flight.
    pub fn settle(
        &mut self,
        ticket_id: u64,
        result: ApiResult<MutationData>,
    ) -> Option<MutationOutcome> {
        match &self.in_flight {
            Some(ticket) if ticket.id == ticket_id => {}
            _ => {
                debug!("Ignoring settlement for unknown ticket {}", ticket_id);
                return None;
            }
        }
        let ticket = self.in_flight.take()?;

        Some(match result {
            Ok(data) => MutationOutcome::Success(data),
            Err(e) => {
                warn!(kind = e.kind(), "{} failed: {}", ticket.mutation, e);
                MutationOutcome::Failure(e.user_message(&ticket.mutation.failure_fallback()))
            }
        })
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    pub fn in_flight(&self) -> Option<&MutationTicket> {
        self.in_flight.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskdeck_core::{ApiError, EntityKind};

    fn delete_project(id: u64) -> Mutation {
        Mutation::Delete(EntityKind::Project, id)
    }

    #[test]
    fn test_second_execute_is_rejected_while_in_flight() {
        let mut dispatcher = MutationDispatcher::new();
        let first = dispatcher.execute(delete_project(1)).unwrap();

        let err = dispatcher.execute(delete_project(2)).unwrap_err();
        assert_eq!(
            err,
            DispatchError::Busy {
                in_flight: "delete".to_string()
            }
        );
        assert!(dispatcher.is_in_flight());

        let outcome = dispatcher.settle(
            first.id,
            Ok(MutationData::Deleted {
                kind: EntityKind::Project,
                id: 1,
            }),
        );
        assert!(matches!(outcome, Some(MutationOutcome::Success(_))));
        assert!(!dispatcher.is_in_flight());
    }

    #[test]
    fn test_execute_after_settle_gets_new_ticket() {
        let mut dispatcher = MutationDispatcher::new();
        let first = dispatcher.execute(delete_project(1)).unwrap();
        dispatcher.settle(first.id, Err(ApiError::network("down")));
        let second = dispatcher.execute(delete_project(1)).unwrap();
        assert_ne!(first.id, second.id);
    }

    #[test]
    fn test_failure_uses_operation_fallback() {
        let mut dispatcher = MutationDispatcher::new();
        let ticket = dispatcher.execute(delete_project(1)).unwrap();
        let outcome = dispatcher.settle(ticket.id, Err(ApiError::network("reset by peer")));
        assert_eq!(
            outcome,
            Some(MutationOutcome::Failure(
                "Failed to delete project".to_string()
            ))
        );
    }

    #[test]
    fn test_failure_prefers_backend_message() {
        let mut dispatcher = MutationDispatcher::new();
        let ticket = dispatcher.execute(delete_project(7)).unwrap();
        let outcome = dispatcher.settle(
            ticket.id,
            Err(ApiError::not_found("Project not found with id: 7")),
        );
        assert_eq!(
            outcome,
            Some(MutationOutcome::Failure(
                "Project not found with id: 7".to_string()
            ))
        );
    }

    #[test]
    fn test_settle_unknown_ticket_is_ignored() {
        let mut dispatcher = MutationDispatcher::new();
        let ticket = dispatcher.execute(delete_project(1)).unwrap();
        let data = MutationData::Deleted {
            kind: EntityKind::Project,
            id: 1,
        };
        assert!(dispatcher.settle(ticket.id + 1, Ok(data)).is_none());
        assert!(dispatcher.is_in_flight());
    }
}
