//! # taskdeck-core - Core Domain Types
//!
//! Foundation crate for taskdeck. Provides the entity model, error handling,
//! and logging setup shared by the client, app, and console crates.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, chrono, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Project`], [`Task`], [`Developer`] - Entities as returned by the backend
//! - [`ProjectDraft`], [`TaskDraft`], [`DeveloperDraft`] - Create/update payloads
//! - [`TaskStatus`] - Task workflow status with a static label table
//! - [`EntityKind`] - Which of the three entity kinds a request targets
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Infrastructure error enum with `is_fatal` classification
//! - [`ApiError`] - Entity Client failure taxonomy (network / validation / not found)
//! - [`Result`], [`ApiResult`] - Type aliases
//! - [`ResultExt`] - Logs a failed step and passes the error on
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use taskdeck_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

// Re-export commonly used types at crate root for convenience
pub use error::{ApiError, ApiResult, Error, Result, ResultExt};
pub use types::{
    Developer, DeveloperDraft, EntityId, EntityKind, ParseStatusError, Project, ProjectDraft,
    Task, TaskDraft, TaskStatus,
};
