//! taskdeck-app - Screen state and orchestration for taskdeck
//!
//! This crate implements the TEA (The Elm Architecture) pattern for state
//! management: resource cells, the mutation dispatcher, list/detail/form
//! screen controllers, navigation, configuration loading, and the Engine
//! that runs gateway calls in the background and publishes snapshots.

pub mod actions;
pub mod config;
pub mod confirm;
pub mod engine;
pub mod form;
pub mod handler;
pub mod message;
pub mod mutation;
pub mod navigation;
pub mod process;
pub mod resource;
pub mod screens;
pub mod signals;
pub mod snapshot;
pub mod state;

// Re-export primary types
pub use confirm::{AutoConfirm, BoxedConfirm, Confirm, TtyConfirm};
pub use engine::Engine;
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use mutation::{DispatchError, MutationDispatcher, MutationOutcome, MutationTicket};
pub use navigation::{Navigator, Route, RouteParams, RouteParseError};
pub use resource::{Completion, FetchTicket, ResourceCell, ResourceStatus, ResourceView};
pub use screens::{Screen, ScreenController, ScreenId};
pub use snapshot::{AppSnapshot, ContentSnapshot, ScreenSnapshot};
pub use state::AppState;
