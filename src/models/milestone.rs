//! Project milestones.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::client::GitlabClient;
use crate::error::{GitlabError, Result};
use crate::models::common::{project_url, ProjectRef};
use crate::pagination::{Page, Paged};
use crate::params::Params;
use crate::traits::{Get, List, Update};

const MILESTONES: &str = "/projects/:id/milestones";
const MILESTONE: &str = "/projects/:id/milestones/:milestone_id";

/// A project milestone. Also embedded in issues and merge requests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Milestone {
    pub id: u64,
    #[serde(default)]
    pub iid: Option<u64>,
    #[serde(default)]
    pub project_id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `active` or `closed`.
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub web_url: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Milestone {
    pub fn is_active(&self) -> bool {
        self.state.as_deref() == Some("active")
    }
}

/// A milestone, by project and id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MilestoneId {
    pub project: ProjectRef,
    pub milestone_id: u64,
}

impl MilestoneId {
    pub fn new(project: impl Into<ProjectRef>, milestone_id: u64) -> Self {
        Self {
            project: project.into(),
            milestone_id,
        }
    }

    fn url(&self) -> Result<String> {
        project_url(MILESTONE, &self.project, &[(":milestone_id", &self.milestone_id)])
    }
}

/// Milestone state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MilestoneStateEvent {
    Activate,
    Close,
}

/// Query parameters for listing a project's milestones.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneListQuery {
    #[serde(skip)]
    pub project: ProjectRef,

    /// `active` or `closed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

impl MilestoneListQuery {
    pub fn new(project: impl Into<ProjectRef>) -> Self {
        Self {
            project: project.into(),
            state: None,
            search: None,
        }
    }
}

/// Parameters for creating a milestone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateMilestoneParams {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
}

/// Parameters for editing a milestone. Unset fields keep their value.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MilestoneUpdateParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state_event: Option<MilestoneStateEvent>,
}

#[async_trait]
impl Get for Milestone {
    type Id = MilestoneId;

    #[tracing::instrument(skip(client))]
    async fn get(client: &GitlabClient, id: MilestoneId) -> Result<Self> {
        client.get(&id.url()?, &Params::new()).await
    }
}

#[async_trait]
impl List for Milestone {
    type Query = MilestoneListQuery;

    #[tracing::instrument(skip(client))]
    async fn list_page(
        client: &GitlabClient,
        query: &Self::Query,
        page: Option<Page>,
    ) -> Result<Paged<Self>> {
        let path = project_url(MILESTONES, &query.project, &[])?;
        client
            .get_page(&path, &Params::from_serialize(query)?, page)
            .await
    }
}

#[async_trait]
impl Update for Milestone {
    type Id = MilestoneId;
    type Params = MilestoneUpdateParams;

    #[tracing::instrument(skip(client, params))]
    async fn update(client: &GitlabClient, id: MilestoneId, params: Self::Params) -> Result<Self> {
        client
            .put(&id.url()?, &Params::from_serialize(&params)?)
            .await
    }
}

/// Create a milestone in a project.
#[tracing::instrument(skip(client, params), fields(title = %params.title))]
pub async fn create_milestone(
    client: &GitlabClient,
    project: &ProjectRef,
    params: &CreateMilestoneParams,
) -> Result<Milestone> {
    if params.title.trim().is_empty() {
        return Err(GitlabError::InvalidParameter(
            "milestone title is required".to_string(),
        ));
    }
    let path = project_url(MILESTONES, project, &[])?;
    client.post(&path, &Params::from_serialize(params)?).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_milestone_deserialize() {
        let json = r#"{
            "id": 12,
            "iid": 3,
            "project_id": 16,
            "title": "10.0",
            "state": "active",
            "due_date": "2013-11-29",
            "start_date": null
        }"#;
        let milestone: Milestone = serde_json::from_str(json).unwrap();
        assert!(milestone.is_active());
        assert_eq!(milestone.due_date, NaiveDate::from_ymd_opt(2013, 11, 29));
        assert_eq!(milestone.start_date, None);
    }

    #[test]
    fn test_update_params_state_event() {
        let params = Params::from_serialize(&MilestoneUpdateParams {
            state_event: Some(MilestoneStateEvent::Close),
            due_date: NaiveDate::from_ymd_opt(2024, 3, 1),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(params.encode(), "due_date=2024-03-01&state_event=close");
    }

    #[test]
    fn test_milestone_url() {
        let id = MilestoneId::new("tools/linter", 7);
        assert_eq!(id.url().unwrap(), "/projects/tools%2Flinter/milestones/7");
    }
}
