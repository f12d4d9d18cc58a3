//! Project labels.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::{GitlabError, Result};
use crate::models::common::{encode_segment, project_url, ProjectRef};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::traits::{Get, List};

const LABELS: &str = "/projects/:id/labels";
const LABEL: &str = "/projects/:id/labels/:label";

/// A project label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    #[serde(default)]
    pub id: u64,
    pub name: String,
    /// `#RRGGBB` or a CSS color name.
    pub color: String,
    #[serde(default)]
    pub text_color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub open_issues_count: u32,
    #[serde(default)]
    pub closed_issues_count: u32,
    #[serde(default)]
    pub open_merge_requests_count: u32,
    #[serde(default)]
    pub priority: Option<u32>,
}

/// A label, by project and label id or name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelId {
    pub project: ProjectRef,
    /// Numeric id or name. Names are percent-encoded into the path.
    pub label: String,
}

impl LabelId {
    pub fn new(project: impl Into<ProjectRef>, label: impl ToString) -> Self {
        Self {
            project: project.into(),
            label: label.to_string(),
        }
    }

    fn url(&self) -> Result<String> {
        if self.label.trim().is_empty() {
            return Err(GitlabError::InvalidParameter(
                "label needs an id or a name".to_string(),
            ));
        }
        project_url(LABEL, &self.project, &[(":label", &encode_segment(&self.label))])
    }
}

/// Parameters for creating a label.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateLabelParams {
    pub name: String,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<u32>,
}

/// Parameters for editing a label. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LabelUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[async_trait]
impl Get for Label {
    type Id = LabelId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: LabelId) -> Result<Self> {
        client.get(&id.url()?, &Params::new()).await
    }
}

#[async_trait]
impl List for Label {
    type Query = ProjectRef;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        project: &ProjectRef,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = project_url(LABELS, project, &[])?;
        client.get_page(&path, &Params::new(), page).await
    }
}

/// Create a label in a project.
#[tracing::instrument(skip(client, params), fields(name = %params.name))]
pub async fn create_label(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &CreateLabelParams,
) -> Result<Label> {
    if params.name.trim().is_empty() {
        return Err(GitlabError::InvalidParameter(
            "label name is required".to_string(),
        ));
    }
    let path = project_url(LABELS, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Rename, recolor or redescribe a label.
#[tracing::instrument(skip(client, params))]
pub async fn update_label(
    client: &GitlabClient,
    id: &LabelId,
    params: &LabelUpdateParams,
) -> Result<Label> {
    client
        .put(&id.url()?, &Params::from_serialize(params)?)
        .await
}

/// Delete a label.
#[tracing::instrument(skip(client))]
pub async fn delete_label(client: &GitlabClient, id: &LabelId) -> Result<()> {
    client.delete_discard(&id.url()?, &Params::new()).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_url_encodes_name() {
        let id = LabelId::new(3u64, "needs review");
        assert_eq!(id.url().unwrap(), "/projects/3/labels/needs%20review");

        let id = LabelId::new("group/app", 41);
        assert_eq!(id.url().unwrap(), "/projects/group%2Fapp/labels/41");
    }

    #[test]
    fn test_empty_label_is_invalid() {
        let err = LabelId::new(3u64, "").url().unwrap_err();
        assert!(matches!(err, GitlabError::InvalidParameter(_)));
    }

    #[test]
    fn test_label_deserialize_minimal() {
        let label: Label = serde_json::from_str(r##"{"name": "bug", "color": "#d9534f"}"##).unwrap();
        assert_eq!(label.name, "bug");
        assert_eq!(label.id, 0);
        assert_eq!(label.open_issues_count, 0);
    }
}
