//! Entity Client contract
//!
//! One client per entity kind. Each call resolves to a single value or fails
//! with an [`ApiError`]. Timeouts and retries, if any, belong to the
//! implementation; callers never impose their own.

use taskdeck_core::{ApiResult, EntityId};

/// CRUD access to one entity kind.
///
/// `EntityClient` is the `Send` variant used by the runtime, which executes
/// calls on tokio tasks.
#[trait_variant::make(EntityClient: Send)]
pub trait LocalEntityClient {
    /// Entity as returned by the backend
    type Entity;

    /// Payload accepted by `create` and `update`
    type Draft;

    /// Fetch every entity of this kind
    async fn get_all(&self) -> ApiResult<Vec<Self::Entity>>;

    /// Fetch one entity. Fails with `NotFound` for unknown ids.
    async fn get_by_id(&self, id: EntityId) -> ApiResult<Self::Entity>;

    /// Create an entity; the backend assigns the id
    async fn create(&self, draft: Self::Draft) -> ApiResult<Self::Entity>;

    /// Replace an existing entity's editable fields
    async fn update(&self, id: EntityId, draft: Self::Draft) -> ApiResult<Self::Entity>;

    /// Delete an entity
    async fn delete(&self, id: EntityId) -> ApiResult<()>;
}
