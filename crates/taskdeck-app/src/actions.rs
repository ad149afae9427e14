//! Action handlers: UpdateAction dispatch and background task spawning
//!
//! Every gateway call runs on its own tokio task. The result comes back to
//! the update loop as a message addressed to the screen that asked for it;
//! there is no cancellation beyond shutdown, an abandoned call simply
//! finishes and its result is dropped by the handler.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use taskdeck_client::Gateway;

use crate::handler::UpdateAction;
use crate::message::Message;

/// Execute an action by spawning a background task
pub fn handle_action<G>(
    action: UpdateAction,
    msg_tx: mpsc::Sender<Message>,
    gateway: Arc<G>,
    shutdown_rx: watch::Receiver<bool>,
) where
    G: Gateway + Sync + 'static,
{
    match action {
        UpdateAction::Fetch {
            screen,
            slot,
            ticket,
        } => {
            tokio::spawn(async move {
                let mut shutdown_rx = shutdown_rx;
                let result = tokio::select! {
                    result = gateway.fetch(ticket.query) => result,
                    _ = shutdown_rx.changed() => {
                        debug!("Shutdown before {} completed", ticket.query);
                        return;
                    }
                };

                let message = Message::FetchCompleted {
                    screen,
                    slot,
                    generation: ticket.generation,
                    result,
                };
                if msg_tx.send(message).await.is_err() {
                    debug!("Message channel closed, dropping {} result", ticket.query);
                }
            });
        }

        UpdateAction::Mutate { screen, ticket } => {
            tokio::spawn(async move {
                let mut shutdown_rx = shutdown_rx;
                let result = tokio::select! {
                    result = gateway.mutate(ticket.mutation.clone()) => result,
                    _ = shutdown_rx.changed() => {
                        warn!("Shutdown while {} was in flight", ticket.mutation);
                        return;
                    }
                };

                let message = Message::MutationSettled {
                    screen,
                    ticket: ticket.id,
                    result,
                };
                if msg_tx.send(message).await.is_err() {
                    debug!("Message channel closed, dropping {} result", ticket.mutation);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mutation::MutationTicket;
    use crate::resource::FetchTicket;
    use crate::screens::{CellSlot, ScreenId};
    use taskdeck_client::{MemoryStore, Mutation, Query, QueryData};
    use taskdeck_core::{ApiError, EntityKind};

    fn channels() -> (
        mpsc::Sender<Message>,
        mpsc::Receiver<Message>,
        watch::Sender<bool>,
        watch::Receiver<bool>,
    ) {
        let (msg_tx, msg_rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        (msg_tx, msg_rx, shutdown_tx, shutdown_rx)
    }

    #[tokio::test]
    async fn test_fetch_sends_completion_with_generation() {
        let store = MemoryStore::new();
        store.seed_demo().await;
        let (msg_tx, mut msg_rx, _shutdown_tx, shutdown_rx) = channels();

        handle_action(
            UpdateAction::Fetch {
                screen: ScreenId(3),
                slot: CellSlot::Primary,
                ticket: FetchTicket {
                    query: Query::All(EntityKind::Project),
                    generation: 7,
                },
            },
            msg_tx,
            Arc::new(store.gateway()),
            shutdown_rx,
        );

        match msg_rx.recv().await {
            Some(Message::FetchCompleted {
                screen,
                generation,
                result: Ok(QueryData::Projects(projects)),
                ..
            }) => {
                assert_eq!(screen, ScreenId(3));
                assert_eq!(generation, 7);
                assert_eq!(projects.len(), 2);
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_mutation_failure_is_delivered() {
        let store = MemoryStore::new();
        store.fail_next(ApiError::network("connection reset")).await;
        let (msg_tx, mut msg_rx, _shutdown_tx, shutdown_rx) = channels();

        handle_action(
            UpdateAction::Mutate {
                screen: ScreenId(1),
                ticket: MutationTicket {
                    id: 4,
                    mutation: Mutation::Delete(EntityKind::Task, 1),
                },
            },
            msg_tx,
            Arc::new(store.gateway()),
            shutdown_rx,
        );

        match msg_rx.recv().await {
            Some(Message::MutationSettled {
                ticket,
                result: Err(err),
                ..
            }) => {
                assert_eq!(ticket, 4);
                assert_eq!(err, ApiError::network("connection reset"));
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_shutdown_abandons_call() {
        let store = MemoryStore::new().with_latency(std::time::Duration::from_secs(5));
        let (msg_tx, mut msg_rx, shutdown_tx, shutdown_rx) = channels();

        handle_action(
            UpdateAction::Mutate {
                screen: ScreenId(1),
                ticket: MutationTicket {
                    id: 1,
                    mutation: Mutation::Delete(EntityKind::Task, 1),
                },
            },
            msg_tx,
            Arc::new(store.gateway()),
            shutdown_rx,
        );
        shutdown_tx.send(true).unwrap();

        // Sender dropped by the abandoned task, so the channel closes
        assert!(msg_rx.recv().await.is_none());
    }
}
