//! Message processing
//!
//! Runs a message through the TEA update function, follows up on any
//! resulting messages, and dispatches every action it produces.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::trace;

use taskdeck_client::Gateway;

use crate::actions::handle_action;
use crate::handler;
use crate::message::Message;
use crate::state::AppState;

/// Process a message through the TEA update function
pub fn process_message<G>(
    state: &mut AppState,
    message: Message,
    msg_tx: &mpsc::Sender<Message>,
    gateway: &Arc<G>,
    shutdown_rx: &watch::Receiver<bool>,
) where
    G: Gateway + Sync + 'static,
{
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = handler::update(state, m);

        for action in result.actions {
            trace!("Dispatching {:?}", action);
            handle_action(action, msg_tx.clone(), gateway.clone(), shutdown_rx.clone());
        }

        // Continue with follow-up message
        msg = result.message;
    }
}
