//! List trait for fetching collections of entities.

use async_trait::async_trait;

use crate::client::GitlabClient;
use crate::error::Result;
use crate::pagination::{fetch_all, Page, Paged};

/// List entities with GitLab pagination.
///
/// # Example
///
/// ```no_run
/// use glapi::{GitlabClient, List, Page, Project, ProjectListQuery};
///
/// # async fn example(client: &GitlabClient) -> glapi::Result<()> {
/// let query = ProjectListQuery {
///     search: Some("api".to_string()),
///     ..Default::default()
/// };
///
/// // One page
/// let page = Project::list_page(client, &query, Some(Page::new(1, 20))).await?;
///
/// // Every page
/// let all = Project::list_all(client, &query).await?;
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait List: Sized + Send {
    /// Filters and scope for the listing.
    type Query: Send + Sync;

    /// Fetch one page. `None` requests the default page.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>>;

    /// Fetch every page, following the `next` link of each response.
    ///
    /// # Errors
    ///
    /// Returns the first error encountered; earlier pages are discarded.
    async fn list_all(client: &GitlabClient, query: &Self::Query) -> Result<Vec<Self>> {
        let mut items = Vec::new();
        fetch_all(|page| Self::list_page(client, query, page), &mut items).await?;
        Ok(items)
    }
}
