//! Message types for the application (TEA pattern)

use taskdeck_client::{MutationData, QueryData};
use taskdeck_core::{ApiResult, EntityId};

use crate::navigation::Route;
use crate::screens::{CellSlot, ScreenId};

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    // ─────────────────────────────────────────────────────────────
    // Navigation
    // ─────────────────────────────────────────────────────────────
    /// Open a route, reusing the current screen when it can follow
    Navigate(Route),
    /// Return to the previous route
    Back,
    /// Refetch everything the current screen shows
    Reload,

    // ─────────────────────────────────────────────────────────────
    // Screen commands
    // ─────────────────────────────────────────────────────────────
    /// Delete an entity. Lists need the id; detail screens use their own.
    Delete { id: Option<EntityId> },
    /// Open a detail screen from a list
    View { id: EntityId },
    /// Open the edit form
    Edit { id: Option<EntityId> },
    /// Open the create form
    Create,
    SetField { field: String, value: String },
    TouchField { field: String },
    Submit,
    Cancel,

    // ─────────────────────────────────────────────────────────────
    // Completions
    // ─────────────────────────────────────────────────────────────
    /// A fetch finished
    FetchCompleted {
        screen: ScreenId,
        slot: CellSlot,
        generation: u64,
        result: ApiResult<QueryData>,
    },
    /// A mutation finished
    MutationSettled {
        screen: ScreenId,
        ticket: u64,
        result: ApiResult<MutationData>,
    },

    /// Shut down
    Quit,
}

impl Message {
    /// Whether the message comes from the user rather than a background task
    pub fn is_command(&self) -> bool {
        !matches!(
            self,
            Message::FetchCompleted { .. } | Message::MutationSettled { .. } | Message::Quit
        )
    }
}
