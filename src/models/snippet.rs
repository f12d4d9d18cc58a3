//! Project snippet model and trait implementations.

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{project_url, ProjectRef, UserBasic, Visibility};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::traits::{Get, List, Update};

const SNIPPETS: &str = "/projects/:id/snippets";
const SNIPPET: &str = "/projects/:id/snippets/:snippet_id";
const SNIPPET_RAW: &str = "/projects/:id/snippets/:snippet_id/raw";

/// A code snippet attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snippet {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub author: Option<UserBasic>,
    #[serde(default)]
    pub project_id: Option<u64>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A snippet, by project and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnippetId {
    pub project: ProjectRef,
    pub snippet_id: u64,
}

impl SnippetId {
    pub fn new(project: impl Into<ProjectRef>, snippet_id: u64) -> Self {
        Self {
            project: project.into(),
            snippet_id,
        }
    }

    fn url(&self, template: &str) -> Result<String> {
        project_url(template, &self.project, &[(":snippet_id", &self.snippet_id)])
    }
}

/// Parameters for creating a snippet.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSnippetParams {
    pub title: String,
    pub file_name: String,
    #[serde(rename = "content")]
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

/// Parameters for editing a snippet. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SnippetUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "content", skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<Visibility>,
}

#[async_trait]
impl Get for Snippet {
    type Id = SnippetId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: SnippetId) -> Result<Self> {
        client.get(&id.url(SNIPPET)?, &Params::new()).await
    }
}

#[async_trait]
impl List for Snippet {
    type Query = ProjectRef;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        project: &ProjectRef,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = project_url(SNIPPETS, project, &[])?;
        client.get_page(&path, &Params::new(), page).await
    }
}

#[async_trait]
impl Update for Snippet {
    type Id = SnippetId;
    type Params = SnippetUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &GitlabClient, id: SnippetId, params: Self::Params) -> Result<Self> {
        client
            .put(&id.url(SNIPPET)?, &Params::from_serialize(&params)?)
            .await
    }
}

/// Create a snippet in a project.
#[tracing::instrument(skip(client, params), fields(title = %params.title))]
pub async fn create_snippet(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &CreateSnippetParams,
) -> Result<Snippet> {
    let path = project_url(SNIPPETS, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Delete a snippet.
#[tracing::instrument(skip(client))]
pub async fn delete_snippet(client: &GitlabClient, id: &SnippetId) -> Result<()> {
    client.delete_discard(&id.url(SNIPPET)?, &Params::new()).await
}

/// Raw content of a snippet.
#[tracing::instrument(skip(client))]
pub async fn get_snippet_content(client: &GitlabClient, id: &SnippetId) -> Result<Bytes> {
    client.get_raw(&id.url(SNIPPET_RAW)?, &Params::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snippet_urls() {
        let id = SnippetId::new(ProjectRef::Id(3), 9);
        assert_eq!(id.url(SNIPPET_RAW).unwrap(), "/projects/3/snippets/9/raw");
    }

    #[test]
    fn test_create_params_send_code_as_content() {
        let params = Params::from_serialize(&CreateSnippetParams {
            title: "t".to_string(),
            file_name: "a.rs".to_string(),
            code: "fn main() {}".to_string(),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.get("content"), Some("fn main() {}"));
        assert_eq!(params.get("code"), None);
    }

    #[test]
    fn test_snippet_deserialize() {
        let json = r#"{
            "id": 1,
            "title": "test",
            "file_name": "add.rb",
            "author": {"id": 1, "username": "john_smith", "name": "John Smith"},
            "expires_at": null,
            "created_at": "2012-06-28T10:52:04Z"
        }"#;
        let snippet: Snippet = serde_json::from_str(json).unwrap();
        assert_eq!(snippet.file_name.as_deref(), Some("add.rb"));
        assert_eq!(snippet.author.unwrap().username, "john_smith");
    }
}
