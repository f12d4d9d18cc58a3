//! Merge request model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{project_url, ProjectRef, StateEvent, UserBasic};
use crate::models::milestone::Milestone;
use crate::pagination::{Page, Paged};
use crate::params::{comma_separated, Params};
use crate::traits::{Get, List, Update};

const MERGE_REQUESTS: &str = "/projects/:id/merge_requests";
const MERGE_REQUEST: &str = "/projects/:id/merge_requests/:merge_request_iid";
const MERGE_REQUEST_MERGE: &str = "/projects/:id/merge_requests/:merge_request_iid/merge";
const MERGE_REQUEST_NOTES: &str = "/projects/:id/merge_requests/:merge_request_iid/notes";

/// Merge request state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MergeState {
    Opened,
    Closed,
    Locked,
    Merged,
}

/// A GitLab merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeRequest {
    pub id: u64,
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub state: MergeState,
    pub source_branch: String,
    pub target_branch: String,
    #[serde(default)]
    pub source_project_id: Option<u64>,
    #[serde(default)]
    pub target_project_id: Option<u64>,
    #[serde(default)]
    pub upvotes: u32,
    #[serde(default)]
    pub downvotes: u32,
    #[serde(default)]
    pub author: Option<UserBasic>,
    #[serde(default)]
    pub assignee: Option<UserBasic>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub work_in_progress: bool,
    #[serde(default)]
    pub merge_status: Option<String>,
    #[serde(default)]
    pub sha: Option<String>,
    #[serde(default)]
    pub merge_commit_sha: Option<String>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// A comment on a merge request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MergeComment {
    #[serde(default)]
    pub id: Option<u64>,
    #[serde(alias = "note")]
    pub body: String,
    #[serde(default)]
    pub author: Option<UserBasic>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// A merge request, by project and per-project number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeRequestId {
    pub project: ProjectRef,
    pub iid: u64,
}

impl MergeRequestId {
    pub fn new(project: impl Into<ProjectRef>, iid: u64) -> Self {
        Self {
            project: project.into(),
            iid,
        }
    }

    fn url(&self, template: &str) -> Result<String> {
        project_url(template, &self.project, &[(":merge_request_iid", &self.iid)])
    }
}

impl MergeRequest {
    pub fn merge_request_id(&self) -> MergeRequestId {
        MergeRequestId::new(ProjectRef::Id(self.project_id), self.iid)
    }
}

/// Query parameters for listing the merge requests of a project.
#[derive(Debug, Clone, Serialize)]
pub struct MergeRequestListQuery {
    #[serde(skip)]
    pub project: ProjectRef,

    /// `opened`, `closed`, `locked`, `merged` or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// `created_at` or `updated_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,

    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,
}

impl MergeRequestListQuery {
    /// Every merge request of a project, in the server's default order.
    pub fn new(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: project.into(),
            state: None,
            order_by: None,
            sort: None,
            labels: None,
        }
    }
}

/// Parameters for opening a merge request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMergeRequestParams {
    pub source_branch: String,
    pub target_branch: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    /// Fork target; defaults to the source project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_project_id: Option<u64>,
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remove_source_branch: Option<bool>,
}

/// Parameters for editing a merge request. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MergeRequestUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event: Option<StateEvent>,
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,
}

/// Options for accepting a merge request.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AcceptMergeRequestParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merge_commit_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub should_remove_source_branch: Option<bool>,
    /// Merge only if the source branch head is still this commit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sha: Option<String>,
}

#[async_trait]
impl Get for MergeRequest {
    type Id = MergeRequestId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: MergeRequestId) -> Result<Self> {
        client.get(&id.url(MERGE_REQUEST)?, &Params::new()).await
    }
}

#[async_trait]
impl List for MergeRequest {
    type Query = MergeRequestListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = project_url(MERGE_REQUESTS, &query.project, &[])?;
        let params = Params::from_serialize(query)?;
        client.get_page(&path, &params, page).await
    }
}

#[async_trait]
impl Update for MergeRequest {
    type Id = MergeRequestId;
    type Params = MergeRequestUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(
        client: &GitlabClient,
        id: MergeRequestId,
        params: Self::Params,
    ) -> Result<Self> {
        client
            .put(&id.url(MERGE_REQUEST)?, &Params::from_serialize(&params)?)
            .await
    }
}

/// Open a merge request.
#[tracing::instrument(skip(client))]
pub async fn create_merge_request(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &CreateMergeRequestParams,
) -> Result<MergeRequest> {
    let path = project_url(MERGE_REQUESTS, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Merge an open merge request.
#[tracing::instrument(skip(client))]
pub async fn accept_merge_request(
    client: &GitlabClient,
    id: &MergeRequestId,
    params: &AcceptMergeRequestParams,
) -> Result<MergeRequest> {
    client
        .put(&id.url(MERGE_REQUEST_MERGE)?, &Params::from_serialize(params)?)
        .await
}

/// Post a comment on a merge request.
#[tracing::instrument(skip(client, body))]
pub async fn comment_merge_request(
    client: &GitlabClient,
    id: &MergeRequestId,
    body: &str,
) -> Result<MergeComment> {
    let params = Params::new().with("body", body);
    client.post(&id.url(MERGE_REQUEST_NOTES)?, &params).await
}

/// Every comment on a merge request.
pub async fn get_merge_request_comments(
    client: &GitlabClient,
    id: &MergeRequestId,
) -> Result<Vec<MergeComment>> {
    client
        .get_all(&id.url(MERGE_REQUEST_NOTES)?, &Params::new())
        .await
}
