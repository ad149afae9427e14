//! Handler module - TEA update function
//!
//! - `update`: Main update() function and message dispatch

pub(crate) mod update;


use crate::message::Message;
use crate::mutation::MutationTicket;
use crate::resource::FetchTicket;
use crate::screens::{CellSlot, Effect, ScreenId};

// Re-export main entry point
pub use update::update;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Run a query for one cell of a screen
    Fetch {
        screen: ScreenId,
        slot: CellSlot,
        ticket: FetchTicket,
    },

    /// Run a create/update/delete for a screen's dispatcher
    Mutate {
        screen: ScreenId,
        ticket: MutationTicket,
    },
}

impl UpdateAction {
    pub fn screen(&self) -> ScreenId {
        match self {
            UpdateAction::Fetch { screen, .. } | UpdateAction::Mutate { screen, .. } => *screen,
        }
    }
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Actions for the event loop to perform
    pub actions: Vec<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            actions: Vec::new(),
        }
    }

    pub fn actions(actions: Vec<UpdateAction>) -> Self {
        Self {
            message: None,
            actions,
        }
    }

    /// Turn controller effects for `screen` into actions and a follow-up
    /// navigation
    pub fn from_effects(screen: ScreenId, effects: Vec<Effect>) -> Self {
        let mut result = Self::none();
        for effect in effects {
            match effect {
                Effect::Fetch { slot, ticket } => result.actions.push(UpdateAction::Fetch {
                    screen,
                    slot,
                    ticket,
                }),
                Effect::Mutate(ticket) => {
                    result.actions.push(UpdateAction::Mutate { screen, ticket })
                }
                Effect::Navigate(route) => result.message = Some(Message::Navigate(route)),
            }
        }
        result
    }
}
