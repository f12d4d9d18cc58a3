//! Update trait for modifying entities.

use async_trait::async_trait;

use crate::client::GitlabClient;
use crate::error::Result;

/// Update an existing entity.
///
/// # Example
///
/// ```no_run
/// use glapi::{GitlabClient, Issue, IssueId, IssueUpdateParams, ProjectRef, StateEvent, Update};
///
/// # async fn example(client: &GitlabClient) -> glapi::Result<()> {
/// let closed = Issue::update(
///     client,
///     IssueId::new(ProjectRef::Id(42), 7),
///     IssueUpdateParams {
///         state_event: Some(StateEvent::Close),
///         ..Default::default()
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Update: Sized {
    /// The ID type for this entity.
    type Id: Send;

    /// Fields to change; unset fields are left alone.
    type Params: Send;

    /// Update the entity and return the updated version.
    ///
    /// # Errors
    ///
    /// Returns an error if the entity is not found or the request fails.
    async fn update(client: &GitlabClient, id: Self::Id, params: Self::Params) -> Result<Self>;
}
