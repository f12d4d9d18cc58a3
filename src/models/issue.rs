//! Issue model and trait implementations.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::Result;
use crate::models::common::{project_url, ProjectRef, StateEvent, UserBasic};
use crate::models::milestone::Milestone;
use crate::pagination::{Page, Paged};
use crate::params::{comma_separated, Params};
use crate::traits::{Get, List, Update};

const ISSUES: &str = "/issues";
const PROJECT_ISSUES: &str = "/projects/:id/issues";
const PROJECT_ISSUE: &str = "/projects/:id/issues/:issue_iid";

/// A GitLab issue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Issue {
    pub id: u64,
    /// Number of the issue within its project.
    pub iid: u64,
    pub project_id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `opened` or `closed`.
    pub state: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub milestone: Option<Milestone>,
    #[serde(default)]
    pub author: Option<UserBasic>,
    #[serde(default)]
    pub assignee: Option<UserBasic>,
    #[serde(default)]
    pub assignees: Vec<UserBasic>,
    #[serde(default)]
    pub confidential: bool,
    #[serde(default)]
    pub user_notes_count: u32,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
}

impl Issue {
    pub fn is_open(&self) -> bool {
        self.state == "opened"
    }

    /// Identifier usable with [`Get`] and [`Update`].
    pub fn issue_id(&self) -> IssueId {
        IssueId::new(ProjectRef::Id(self.project_id), self.iid)
    }
}

/// An issue, by project and per-project number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueId {
    pub project: ProjectRef,
    pub iid: u64,
}

impl IssueId {
    pub fn new(project: impl Into<ProjectRef>, iid: u64) -> Self {
        Self {
            project: project.into(),
            iid,
        }
    }

    fn url(&self) -> Result<String> {
        project_url(PROJECT_ISSUE, &self.project, &[(":issue_iid", &self.iid)])
    }
}

/// Query parameters for listing issues.
///
/// Without a project, the listing covers every issue visible to the caller.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueListQuery {
    /// Restrict to one project.
    #[serde(skip)]
    pub project: Option<ProjectRef>,

    /// `opened`, `closed` or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Issues carrying every one of these labels.
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,

    /// Milestone title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,

    /// `created_by_me`, `assigned_to_me` or `all`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,

    /// `created_at` or `updated_at`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<String>,

    /// `asc` or `desc`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
}

impl IssueListQuery {
    /// Every issue of one project.
    pub fn for_project(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: Some(project.into()),
            ..Default::default()
        }
    }
}

/// Parameters for opening an issue.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateIssueParams {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

/// Parameters for editing an issue. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IssueUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignee_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub milestone_id: Option<u64>,
    #[serde(
        serialize_with = "comma_separated",
        skip_serializing_if = "Option::is_none"
    )]
    pub labels: Option<Vec<String>>,
    /// Close or reopen the issue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event: Option<StateEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidential: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
}

#[async_trait]
impl Get for Issue {
    type Id = IssueId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: IssueId) -> Result<Self> {
        client.get(&id.url()?, &Params::new()).await
    }
}

#[async_trait]
impl List for Issue {
    type Query = IssueListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = match &query.project {
            Some(project) => project_url(PROJECT_ISSUES, project, &[])?,
            None => ISSUES.to_string(),
        };
        let params = Params::from_serialize(query)?;
        client.get_page(&path, &params, page).await
    }
}

#[async_trait]
impl Update for Issue {
    type Id = IssueId;
    type Params = IssueUpdateParams;

    #[tracing::instrument(skip(client))]
    async fn update(client: &GitlabClient, id: IssueId, params: Self::Params) -> Result<Self> {
        client.put(&id.url()?, &Params::from_serialize(&params)?).await
    }
}

/// Open an issue in a project.
#[tracing::instrument(skip(client))]
pub async fn create_issue(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &CreateIssueParams,
) -> Result<Issue> {
    let path = project_url(PROJECT_ISSUES, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

/// Close an issue.
pub async fn close_issue(client: &GitlabClient, id: IssueId) -> Result<Issue> {
    Issue::update(
        client,
        id,
        IssueUpdateParams {
            state_event: Some(StateEvent::Close),
            ..Default::default()
        },
    )
    .await
}

/// Reopen a closed issue.
pub async fn reopen_issue(client: &GitlabClient, id: IssueId) -> Result<Issue> {
    Issue::update(
        client,
        id,
        IssueUpdateParams {
            state_event: Some(StateEvent::Reopen),
            ..Default::default()
        },
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_deserialize() {
        let json = r#"{
            "id": 76,
            "iid": 6,
            "project_id": 8,
            "title": "Consequatur vero maxime deserunt laboriosam est voluptas dolorem.",
            "description": null,
            "state": "opened",
            "labels": ["foo", "bar"],
            "milestone": {"id": 1, "title": "v1.0", "due_date": "2024-03-01"},
            "author": {"id": 1, "username": "root", "name": "Administrator"},
            "assignee": null,
            "due_date": null,
            "created_at": "2016-01-04T15:31:51.081Z"
        }"#;
        let issue: Issue = serde_json::from_str(json).unwrap();
        assert!(issue.is_open());
        assert_eq!(issue.labels, vec!["foo", "bar"]);
        assert_eq!(
            issue.milestone.as_ref().unwrap().due_date,
            NaiveDate::from_ymd_opt(2024, 3, 1)
        );
        assert_eq!(issue.issue_id(), IssueId::new(8u64, 6));
    }

    #[test]
    fn test_issue_url() {
        let id = IssueId::new("group/app", 3);
        assert_eq!(id.url().unwrap(), "/projects/group%2Fapp/issues/3");
    }

    #[test]
    fn test_list_query_skips_project_and_joins_labels() {
        let query = IssueListQuery {
            state: Some("opened".to_string()),
            labels: Some(vec!["bug".to_string(), "ui".to_string()]),
            ..IssueListQuery::for_project(1u64)
        };
        let params = Params::from_serialize(&query).unwrap();
        assert_eq!(params.encode(), "state=opened&labels=bug%2Cui");
    }

    #[test]
    fn test_close_params() {
        let params = Params::from_serialize(&IssueUpdateParams {
            state_event: Some(StateEvent::Close),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.encode(), "state_event=close");
    }
}
