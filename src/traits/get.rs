//! Get trait for fetching single entities.

use async_trait::async_trait;

use crate::client::GitlabClient;
use crate::error::Result;

/// Fetch a single entity by ID.
///
/// # Example
///
/// ```no_run
/// use glapi::{Get, GitlabClient, Project, ProjectRef};
///
/// # async fn example(client: &GitlabClient) -> glapi::Result<()> {
/// let project = Project::get(client, ProjectRef::path("group/project")).await?;
/// println!("{}", project.path_with_namespace);
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Get: Sized {
    /// Identifier accepted by the endpoint (numeric id, path, username).
    type Id: Send;

    /// Fetch the entity by ID.
    ///
    /// # Errors
    ///
    /// Returns a server error with status 404 if the entity does not exist.
    async fn get(client: &GitlabClient, id: Self::Id) -> Result<Self>;
}
