//! # taskdeck-client - Backend Access
//!
//! The Entity Client contract and the gateway that routes kind-tagged
//! requests to it.
//!
//! Depends on [`taskdeck_core`] for entities and [`ApiError`](taskdeck_core::ApiError).
//!
//! ## Public API
//!
//! ### Contract
//! - [`EntityClient`] - CRUD access to one entity kind (`Send` futures)
//! - [`Gateway`] - Executes a [`Query`] or [`Mutation`] against the right client
//! - [`ClientSet`] - Gateway over one client per kind
//!
//! ### In-Memory Backend
//! - [`MemoryStore`] - Shared tables applying the backend's validation rules
//! - [`MemoryGateway`] - `ClientSet` of the three memory clients

pub mod client;
pub mod gateway;
pub mod memory;
#[cfg(any(test, feature = "test-helpers"))]
pub mod test_utils;

pub use client::{EntityClient, LocalEntityClient};
pub use gateway::{
    ClientSet, Draft, Gateway, LocalGateway, Mutation, MutationData, Query, QueryData, Record,
};
pub use memory::{
    Call, DeveloperClient, MemoryGateway, MemoryStore, Operation, ProjectClient, TaskClient,
};
